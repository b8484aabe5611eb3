use petal_ngin::audio::{AudioControl, PlaybackState, SilentAudio};

use crate::common::test_utils::MockAudio;

mod common;

#[test]
fn starts_paused() {
    let control = AudioControl::new(MockAudio::loaded());
    assert_eq!(control.state(), PlaybackState::Paused);
}

#[test]
fn double_toggle_returns_to_paused() {
    let audio = MockAudio::loaded();
    let mut control = AudioControl::new(audio.clone());

    assert_eq!(control.toggle(), PlaybackState::Playing);
    assert_eq!(control.toggle(), PlaybackState::Paused);

    assert_eq!(control.state(), PlaybackState::Paused);
    assert_eq!(audio.plays(), 1);
    assert_eq!(audio.pauses(), 1);
}

#[test]
fn play_before_load_starts_once_loaded() {
    let audio = MockAudio::default();
    let mut control = AudioControl::new(audio.clone());

    assert_eq!(control.toggle(), PlaybackState::Playing);
    assert_eq!(audio.plays(), 0);

    audio.loaded.set(true);
    control.on_loaded();
    assert_eq!(audio.plays(), 1);
    assert_eq!(control.state(), PlaybackState::Playing);
}

#[test]
fn paused_again_before_load_stays_silent() {
    let audio = MockAudio::default();
    let mut control = AudioControl::new(audio.clone());
    control.toggle();
    control.toggle();

    audio.loaded.set(true);
    control.on_loaded();
    assert_eq!(audio.plays(), 0);
    assert_eq!(audio.pauses(), 0);
}

#[test]
fn setting_the_current_state_does_nothing() {
    let audio = MockAudio::loaded();
    let mut control = AudioControl::new(audio.clone());
    control.set_state(PlaybackState::Paused);
    assert_eq!(audio.pauses(), 0);

    control.set_state(PlaybackState::Playing);
    control.set_state(PlaybackState::Playing);
    assert_eq!(audio.plays(), 1);
}

#[test]
fn boxed_backends_toggle_too() {
    let mut control: AudioControl<Box<dyn petal_ngin::audio::AudioBackend>> =
        AudioControl::new(Box::new(SilentAudio::new(None)));
    assert!(control.toggle().is_playing());
    assert!(!control.toggle().is_playing());
}

//! Ambient audio with an explicit play/pause state.
//!
//! [`AudioControl`] owns the playback state and forwards transitions to an
//! [`AudioBackend`]. The state flips immediately on every toggle even if the
//! backend has not finished loading; playback then starts in
//! [`AudioControl::on_loaded`].

#[cfg(target_arch = "wasm32")]
pub mod web;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Paused,
    Playing,
}

impl PlaybackState {
    pub fn toggled(self) -> Self {
        match self {
            Self::Paused => Self::Playing,
            Self::Playing => Self::Paused,
        }
    }

    pub fn is_playing(self) -> bool {
        self == Self::Playing
    }
}

/// Something that can actually make (or stop making) sound.
pub trait AudioBackend {
    fn is_loaded(&self) -> bool;

    fn play(&mut self);

    fn pause(&mut self);
}

impl<B: AudioBackend + ?Sized> AudioBackend for Box<B> {
    fn is_loaded(&self) -> bool {
        (**self).is_loaded()
    }

    fn play(&mut self) {
        (**self).play()
    }

    fn pause(&mut self) {
        (**self).pause()
    }
}

#[derive(Debug)]
pub struct AudioControl<B> {
    backend: B,
    state: PlaybackState,
}

impl<B: AudioBackend> AudioControl<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: PlaybackState::Paused,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Flips between playing and paused and returns the new state.
    pub fn toggle(&mut self) -> PlaybackState {
        let next = self.state.toggled();
        self.set_state(next);
        next
    }

    pub fn set_state(&mut self, state: PlaybackState) {
        if state == self.state {
            return;
        }
        self.state = state;
        if !self.backend.is_loaded() {
            if state.is_playing() {
                log::warn!(
                    "play requested before the audio finished loading; it starts once loaded"
                );
            }
            return;
        }
        match state {
            PlaybackState::Playing => self.backend.play(),
            PlaybackState::Paused => self.backend.pause(),
        }
    }

    /// Called once the backend has its data. Starts playback if play was already requested.
    pub fn on_loaded(&mut self) {
        log::info!("audio loaded");
        if self.state.is_playing() {
            self.backend.play();
        }
    }
}

/// Backend for targets without an audio device binding. It only logs.
#[derive(Clone, Debug, Default)]
pub struct SilentAudio {
    url: Option<String>,
}

impl SilentAudio {
    pub fn new(url: Option<String>) -> Self {
        Self { url }
    }
}

impl AudioBackend for SilentAudio {
    fn is_loaded(&self) -> bool {
        true
    }

    fn play(&mut self) {
        match &self.url {
            Some(url) => log::info!("play {url} (no audio output on this platform)"),
            None => log::info!("play (no audio track configured)"),
        }
    }

    fn pause(&mut self) {
        log::info!("pause");
    }
}

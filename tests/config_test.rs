use petal_ngin::{
    config::{DragTarget, SceneConfig, hex_to_linear},
    particles::SphereSampling,
};

use crate::common::test_utils::assert_close;

mod common;

#[test]
fn default_is_the_warrior_scene() {
    assert_eq!(SceneConfig::default(), SceneConfig::warrior());
}

#[test]
fn warrior_preset() {
    let config = SceneConfig::warrior();
    assert_eq!(config.background, 0x7a202d);
    assert_eq!(config.camera_position, [0.0, 2.0, 4.0]);
    assert_eq!(config.model_scale, [0.1, 0.1, 0.1]);
    assert_eq!(config.particle_count, 10_000);
    assert_eq!(config.cloud_radius, 13.0);
    assert_eq!(config.sampling, SphereSampling::CenterBiased);
    assert_eq!(config.drag_target, DragTarget::ModelOnly);
    assert!(config.audio_url.is_some());
    assert_eq!(config.play_button_id, "playbutton");
}

#[test]
fn sunglass_preset() {
    let config = SceneConfig::sunglass();
    assert_eq!(config.background, 0x615b5c);
    assert_eq!(config.camera_position, [0.0, 0.0, 5.0]);
    assert_eq!(config.model_scale, [2.0, 2.0, 1.0]);
    assert_eq!(config.drag_target, DragTarget::ModelAndPetals);
    assert!(config.audio_url.is_none());
    assert!(config.model_url.ends_with("vibrant.glb"));
    // Shared with the warrior scene
    assert_eq!(config.particle_count, 10_000);
    assert_eq!(config.fov_y_deg, 75.0);
}

#[test]
fn builders_override_single_fields() {
    let config = SceneConfig::default().with_seed(9).with_particle_count(12);
    assert_eq!(config.seed, Some(9));
    assert_eq!(config.particle_count, 12);
    assert_eq!(config.background, SceneConfig::warrior().background);
}

#[test]
fn hex_colours_convert_to_linear() {
    assert_eq!(hex_to_linear(0x000000), [0.0, 0.0, 0.0]);
    assert_eq!(hex_to_linear(0xffffff), [1.0, 1.0, 1.0]);
    let [r, g, b] = hex_to_linear(0x7a202d);
    assert_close(r, 0.1946);
    assert_close(g, 0.0144);
    assert_close(b, 0.0262);
}

#[test]
fn clear_colour_is_opaque() {
    let colour = SceneConfig::sunglass().clear_colour();
    assert_eq!(colour.a, 1.0);
    assert!(colour.r > colour.b);
}

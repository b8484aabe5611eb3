//! Scene configuration.
//!
//! Everything the scene needs to know up front lives in [`SceneConfig`]: asset
//! locations, camera and light placement, model scales, cloud size, motion
//! constants and the DOM ids used on the web. Two presets cover the two scene
//! variants: [`SceneConfig::warrior`] (the default) and [`SceneConfig::sunglass`].

use crate::particles::SphereSampling;

/// Which scene nodes the drag control moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragTarget {
    /// Only the primary model group is draggable; petals live in their own group.
    ModelOnly,
    /// Petals are merged into the draggable model group and move with it.
    ModelAndPetals,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub model_url: String,
    pub petal_url: String,
    pub audio_url: Option<String>,

    /// Background colour as `0xRRGGBB` in sRGB.
    pub background: u32,

    pub camera_position: [f32; 3],
    pub fov_y_deg: f32,
    pub z_near: f32,
    pub z_far: f32,

    /// Ambient light colour as `0xRRGGBB` in sRGB.
    pub light_colour: u32,
    pub light_intensity: f32,
    pub light_position: [f32; 3],

    pub model_scale: [f32; 3],
    pub model_position: [f32; 3],
    pub petal_scale: [f32; 3],

    pub particle_count: usize,
    pub cloud_radius: f32,
    pub sampling: SphereSampling,
    /// Fixed seed for reproducible clouds; `None` seeds from entropy.
    pub seed: Option<u64>,

    /// Y-axis spin added to every petal per reference frame (radians).
    pub petal_spin: f32,
    /// Amplitude of the per-petal x-axis wobble per reference frame (radians).
    pub petal_wobble: f32,
    /// Y-axis spin added to the group holding the petals per reference frame (radians).
    pub group_spin: f32,
    /// Frame rate the motion constants were tuned for.
    pub reference_fps: f32,

    pub audio_volume: f32,
    pub audio_loop: bool,

    pub drag_target: DragTarget,

    pub container_id: String,
    pub play_button_id: String,
}

impl SceneConfig {
    /// Warrior model inside a cloud of cherry blossom petals on a deep red background.
    pub fn warrior() -> Self {
        Self {
            model_url: "https://particle-implementation.vercel.app/nyra_woman_warrior.glb".into(),
            petal_url: "https://particle-implementation.vercel.app/cherry_blossom_petal.glb".into(),
            audio_url: Some("https://particle-implementation.vercel.app/audio1.mp3".into()),
            background: 0x7a202d,
            camera_position: [0.0, 2.0, 4.0],
            fov_y_deg: 75.0,
            z_near: 0.1,
            z_far: 1000.0,
            light_colour: 0xffffff,
            light_intensity: 1.0,
            light_position: [5.0, 10.0, 7.5],
            model_scale: [0.1, 0.1, 0.1],
            model_position: [0.0, 0.0, 0.0],
            petal_scale: [0.1, 0.1, 0.1],
            particle_count: 10_000,
            cloud_radius: 13.0,
            sampling: SphereSampling::CenterBiased,
            seed: None,
            petal_spin: 0.01,
            petal_wobble: 0.005,
            group_spin: 0.005,
            reference_fps: 60.0,
            audio_volume: 0.5,
            audio_loop: true,
            drag_target: DragTarget::ModelOnly,
            container_id: "app".into(),
            play_button_id: "playbutton".into(),
        }
    }

    /// Sunglass model served locally, petals dragged and spun together with the model, no audio.
    pub fn sunglass() -> Self {
        Self {
            model_url: "http://localhost:5174/vibrant.glb".into(),
            petal_url: "http://localhost:5174/cherry_blossom_petal.glb".into(),
            audio_url: None,
            background: 0x615b5c,
            camera_position: [0.0, 0.0, 5.0],
            model_scale: [2.0, 2.0, 1.0],
            drag_target: DragTarget::ModelAndPetals,
            ..Self::warrior()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_particle_count(mut self, particle_count: usize) -> Self {
        self.particle_count = particle_count;
        self
    }

    /// The background as a linear clear colour for an sRGB surface.
    pub fn clear_colour(&self) -> wgpu::Color {
        let [r, g, b] = hex_to_linear(self.background);
        wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        }
    }

    pub fn light_colour_linear(&self) -> [f32; 3] {
        hex_to_linear(self.light_colour)
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::warrior()
    }
}

/// Converts an sRGB `0xRRGGBB` colour into linear RGB components.
pub fn hex_to_linear(hex: u32) -> [f32; 3] {
    let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
    [channel(16), channel(8), channel(0)]
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

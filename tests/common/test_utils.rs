#![allow(dead_code)]

use std::{cell::Cell, rc::Rc};

use petal_ngin::{
    audio::AudioBackend,
    data_structures::scene_graph::{ContainerNode, SceneNode},
};
use rand::{SeedableRng, rngs::StdRng};

/// Counts the calls a real backend would turn into sound.
#[derive(Clone, Default)]
pub struct MockAudio {
    pub loaded: Rc<Cell<bool>>,
    pub plays: Rc<Cell<u32>>,
    pub pauses: Rc<Cell<u32>>,
}

impl MockAudio {
    pub fn loaded() -> Self {
        let audio = Self::default();
        audio.loaded.set(true);
        audio
    }

    pub fn plays(&self) -> u32 {
        self.plays.get()
    }

    pub fn pauses(&self) -> u32 {
        self.pauses.get()
    }
}

impl AudioBackend for MockAudio {
    fn is_loaded(&self) -> bool {
        self.loaded.get()
    }

    fn play(&mut self) {
        self.plays.set(self.plays.get() + 1);
    }

    fn pause(&mut self) {
        self.pauses.set(self.pauses.get() + 1);
    }
}

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// A single-instance node with one child, shaped like a placed glTF scene.
pub fn template() -> Box<dyn SceneNode> {
    let mut root = ContainerNode::new(1);
    root.add_child(Box::new(ContainerNode::new(1)));
    Box::new(root)
}

pub fn failed_load() -> anyhow::Result<Box<dyn SceneNode>> {
    Err(anyhow::anyhow!("request for https://example.invalid/model.glb failed"))
}

pub fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-4,
        "expected {expected}, got {actual}"
    );
}

//! The petal cloud: placement of every petal and its per-frame motion.

use std::f32::consts::PI;

use cgmath::{Euler, Rad, Vector3, Zero};
use rand::Rng;

use crate::{
    config::SceneConfig,
    data_structures::{group::Group, instance::Instance, scene_graph::SceneNode},
    frame::FrameTick,
};

/// One petal's pose. The position never changes after scattering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Petal {
    pub position: Vector3<f32>,
    pub rotation: Euler<Rad<f32>>,
}

impl Petal {
    pub fn to_instance(&self, scale: Vector3<f32>) -> Instance {
        Instance::from_euler(self.position, self.rotation, scale)
    }
}

/// Per-reference-frame motion constants, in radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PetalMotion {
    pub spin: f32,
    pub wobble: f32,
    pub group_spin: f32,
}

impl From<&SceneConfig> for PetalMotion {
    fn from(config: &SceneConfig) -> Self {
        Self {
            spin: config.petal_spin,
            wobble: config.petal_wobble,
            group_spin: config.group_spin,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PetalCloud {
    petals: Vec<Petal>,
    motion: PetalMotion,
}

impl PetalCloud {
    /// Places `count` petals on `points`, each with a random rotation in `[0, π)` per axis.
    ///
    /// Points are reused in order when there are fewer points than petals; with
    /// no points at all every petal starts at the origin.
    pub fn scatter<R: Rng + ?Sized>(
        points: &[Vector3<f32>],
        count: usize,
        rng: &mut R,
        motion: PetalMotion,
    ) -> Self {
        let petals = (0..count)
            .map(|i| {
                let position = if points.is_empty() {
                    Vector3::zero()
                } else {
                    points[i % points.len()]
                };
                Petal {
                    position,
                    rotation: Euler::new(
                        Rad(rng.gen_range(0.0..PI)),
                        Rad(rng.gen_range(0.0..PI)),
                        Rad(rng.gen_range(0.0..PI)),
                    ),
                }
            })
            .collect();
        Self { petals, motion }
    }

    /// Advances every petal and spins `group` by one tick.
    pub fn advance(&mut self, tick: &FrameTick, group: &mut Group) {
        let PetalMotion {
            spin,
            wobble,
            group_spin,
        } = self.motion;
        for (i, petal) in self.petals.iter_mut().enumerate() {
            petal.rotation.y += Rad(spin * tick.scale);
            petal.rotation.x += Rad((tick.elapsed + i as f32).sin() * wobble * tick.scale);
        }
        group.rotation_y += Rad(group_spin * tick.scale);
    }

    /// Copies the petal poses into the instances of `node`, one petal per instance.
    pub fn write_local_transforms(&self, node: &mut dyn SceneNode, scale: Vector3<f32>) {
        node.set_local_transform_all(&mut |i, local| {
            if let Some(petal) = self.petals.get(i) {
                *local = petal.to_instance(scale);
            }
        });
    }

    pub fn petals(&self) -> &[Petal] {
        &self.petals
    }

    pub fn len(&self) -> usize {
        self.petals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.petals.is_empty()
    }
}

//! A flat bag of scene nodes sharing one transform.
//!
//! The scene has exactly two of these: the model group and the petal group.
//! A group only translates and spins its members about the y axis.

use cgmath::{Euler, Rad, Vector3, Zero};

use crate::{
    data_structures::{bounds::Aabb, instance::Instance, scene_graph::SceneNode},
    render::Instanced,
};

pub struct Group {
    pub name: String,
    pub position: Vector3<f32>,
    pub rotation_y: Rad<f32>,
    members: Vec<Box<dyn SceneNode>>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: Vector3::zero(),
            rotation_y: Rad(0.0),
            members: Vec::new(),
        }
    }

    pub fn add(&mut self, node: Box<dyn SceneNode>) {
        self.members.push(node);
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[Box<dyn SceneNode>] {
        &self.members
    }

    pub fn members_mut(&mut self) -> &mut [Box<dyn SceneNode>] {
        &mut self.members
    }

    /// The group's own transform, applied on top of every member.
    pub fn transform(&self) -> Instance {
        Instance::from_euler(
            self.position,
            Euler::new(Rad(0.0), self.rotation_y, Rad(0.0)),
            Vector3::new(1.0, 1.0, 1.0),
        )
    }

    /// Adds a freshly loaded node, or logs why there is none.
    ///
    /// Returns whether a node was attached. A failed load leaves the group untouched.
    pub fn attach_loaded(&mut self, loaded: anyhow::Result<Box<dyn SceneNode>>) -> bool {
        match loaded {
            Ok(node) => {
                log::info!(
                    "attached {} instance(s) to group '{}'",
                    node.instance_count(),
                    self.name
                );
                self.add(node);
                true
            }
            Err(e) => {
                log::error!("failed to load asset for group '{}': {:#}", self.name, e);
                false
            }
        }
    }

    pub fn update_world_transforms(&mut self) {
        let transform = self.transform();
        for member in &mut self.members {
            let count = member.instance_count();
            let parents = vec![transform.clone(); count];
            member.update_world_transforms(0..count, &parents);
        }
    }

    pub fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device) {
        self.members
            .iter_mut()
            .for_each(|member| member.write_to_buffers(queue, device));
    }

    /// World-space boxes of every mesh instance in the group, for picking.
    pub fn instance_bounds(&self) -> Vec<Aabb> {
        let mut out = Vec::new();
        for member in self.members.iter() {
            member.instance_bounds(&mut out);
        }
        out
    }

    pub fn get_render(&self) -> Vec<Instanced<'_>> {
        self.members
            .iter()
            .flat_map(|member| member.get_render())
            .collect()
    }
}

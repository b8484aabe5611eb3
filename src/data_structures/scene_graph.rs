//! Scene graph and hierarchical scene organization.
//!
//! Every node stores a `(local, world)` transform pair per instance. A parent
//! with `n` instances passes its `n` world transforms down to its children, which
//! therefore always carry the same number of instances as their parent. Cloning
//! instance `i` of a node clones instance `i` of the whole subtree, which is how a
//! single loaded petal becomes thousands of petals.

use std::{ops::Range, sync::Arc};

use log::warn;
use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        bounds::Aabb,
        instance::{Instance, InstanceRaw},
        model,
    },
    render::Instanced,
};

/// Converts a glTF node and its descendants into scene nodes.
///
/// Nodes with a mesh become [`ModelNode`]s with one [`model::Mesh`] per
/// primitive; everything else becomes a [`ContainerNode`]. The node's own
/// transform is stored as the local transform of instance 0.
pub fn to_scene_node(
    node: gltf::scene::Node,
    buffers: &[Vec<u8>],
    device: &wgpu::Device,
    materials: &Arc<Vec<model::Material>>,
    fallback_material: usize,
) -> Box<dyn SceneNode> {
    let mut scene_node: Box<dyn SceneNode> = match node.mesh() {
        Some(mesh) => {
            let mesh_name = mesh.name().unwrap_or("unknown_mesh");
            let meshes = mesh
                .primitives()
                .map(|primitive| {
                    let reader = primitive
                        .reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));

                    let mut vertices: Vec<model::ModelVertex> = reader
                        .read_positions()
                        .map(|positions| {
                            positions
                                .map(|position| model::ModelVertex {
                                    position,
                                    tex_coords: Default::default(),
                                    normal: Default::default(),
                                })
                                .collect()
                        })
                        .unwrap_or_default();
                    if let Some(normals) = reader.read_normals() {
                        vertices
                            .iter_mut()
                            .zip(normals)
                            .for_each(|(vertex, normal)| vertex.normal = normal);
                    }
                    if let Some(tex_coords) = reader.read_tex_coords(0) {
                        vertices
                            .iter_mut()
                            .zip(tex_coords.into_f32())
                            .for_each(|(vertex, uv)| vertex.tex_coords = uv);
                    }

                    // Non-indexed primitives draw their vertices in order
                    let indices: Vec<u32> = match reader.read_indices() {
                        Some(indices) => indices.into_u32().collect(),
                        None => (0..vertices.len() as u32).collect(),
                    };

                    let bounds = Aabb::from_points(vertices.iter().map(|v| v.position.into()));

                    let vertex_buffer =
                        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                            label: Some(&format!("{mesh_name} Vertex Buffer")),
                            contents: bytemuck::cast_slice(&vertices),
                            usage: wgpu::BufferUsages::VERTEX,
                        });
                    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("{mesh_name} Index Buffer")),
                        contents: bytemuck::cast_slice(&indices),
                        usage: wgpu::BufferUsages::INDEX,
                    });

                    model::Mesh {
                        name: mesh_name.to_string(),
                        vertex_buffer,
                        index_buffer,
                        num_elements: indices.len() as u32,
                        material: primitive.material().index().unwrap_or(fallback_material),
                        bounds,
                    }
                })
                .collect();
            let model = model::Model {
                meshes,
                materials: Arc::clone(materials),
            };
            Box::new(ModelNode::from_model(1, device, model))
        }
        None => Box::new(ContainerNode::new(1)),
    };

    let (translation, rotation, scale) = node.transform().decomposed();
    scene_node.set_local_transform(
        0,
        Instance {
            position: translation.into(),
            rotation: rotation.into(),
            scale: scale.into(),
        },
    );
    for child in node.children() {
        scene_node.add_child(to_scene_node(
            child,
            buffers,
            device,
            materials,
            fallback_material,
        ));
    }

    scene_node
}

pub trait SceneNode {
    fn instance_count(&self) -> usize;

    fn get_world_transforms(&self) -> Vec<Instance>;

    fn get_local_transform(&self, idx: usize) -> Option<Instance>;

    fn set_local_transform(&mut self, idx: usize, instance: Instance);

    /// Mutates the local transform of every instance; the closure receives the instance index.
    fn set_local_transform_all(&mut self, mutation: &mut dyn FnMut(usize, &mut Instance));

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>>;

    fn add_child(&mut self, child: Box<dyn SceneNode>);

    /// Appends instances with the given local transforms.
    ///
    /// Children receive the same number of new instances, each a copy of their
    /// instance 0. Returns the new instance count.
    fn add_instances(&mut self, instances: Vec<Instance>) -> usize;

    /**
     * Inserts a new instance which is a clone of the instance with index `i`,
     * recursively for all children.
     *
     * The return value is the new instance count.
     */
    fn clone_instance(&mut self, i: usize) -> usize;

    /**
     * Multiple instances of a parent can be passed down to multiple instances of multiple
     * children. The argument `parents_world_transform` with a matching `range` size provides
     * control over which instances are transformed.
     */
    fn update_world_transforms(
        &mut self,
        range: Range<usize>,
        parents_world_transform: &[Instance],
    );

    fn update_world_transform_all(&mut self) {
        let range = 0..self.instance_count();
        let identity = vec![Instance::default(); range.len()];
        self.update_world_transforms(range, &identity);
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device);

    /// Pushes the world-space box of every mesh instance in this subtree onto `out`.
    fn instance_bounds(&self, out: &mut Vec<Aabb>);

    fn get_render(&self) -> Vec<Instanced<'_>>;
}

/// Applies `parents` to `instances[range]` and returns the resulting world transforms,
/// or `None` if the range does not fit.
fn propagate(
    instances: &mut [(Instance, Instance)],
    range: Range<usize>,
    parents: &[Instance],
) -> Option<Vec<Instance>> {
    if parents.len() > instances.len() {
        warn!(
            "You tried to transform with len {}, but there are only {} instances to transform.",
            parents.len(),
            instances.len()
        );
        return None;
    }
    let Some(slice) = instances.get_mut(range.clone()) else {
        warn!(
            "You tried to transform range {}..{}, which is out of bounds for parent len {}.",
            range.start,
            range.end,
            instances.len(),
        );
        return None;
    };
    Some(
        slice
            .iter_mut()
            .zip(parents)
            .map(|((local, world), parent)| {
                *world = parent * &*local;
                world.clone()
            })
            .collect(),
    )
}

fn clone_pair(instances: &mut Vec<(Instance, Instance)>, i: usize) -> bool {
    match instances.get(i).cloned() {
        Some(pair) => {
            instances.push(pair);
            true
        }
        None => {
            warn!(
                "Cannot clone instance {} of a node with {} instances.",
                i,
                instances.len()
            );
            false
        }
    }
}

fn child_template(child: &dyn SceneNode) -> Instance {
    child.get_local_transform(0).unwrap_or_default()
}

/// A node without geometry. It only groups children and transforms them.
pub struct ContainerNode {
    pub children: Vec<Box<dyn SceneNode>>,
    pub instances: Vec<(Instance, Instance)>,
}

impl ContainerNode {
    pub fn new(amount: usize) -> Self {
        Self {
            instances: vec![(Instance::default(), Instance::default()); amount],
            children: vec![],
        }
    }
}

impl SceneNode for ContainerNode {
    fn instance_count(&self) -> usize {
        self.instances.len()
    }

    fn get_world_transforms(&self) -> Vec<Instance> {
        self.instances.iter().map(|(_, world)| world.clone()).collect()
    }

    fn get_local_transform(&self, idx: usize) -> Option<Instance> {
        self.instances.get(idx).map(|(local, _)| local.clone())
    }

    fn set_local_transform(&mut self, idx: usize, instance: Instance) {
        if let Some((local, _)) = self.instances.get_mut(idx) {
            *local = instance;
        }
    }

    fn set_local_transform_all(&mut self, mutation: &mut dyn FnMut(usize, &mut Instance)) {
        self.instances
            .iter_mut()
            .enumerate()
            .for_each(|(i, (local, _))| mutation(i, local));
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn add_instances(&mut self, instances: Vec<Instance>) -> usize {
        let len = instances.len();
        self.instances
            .extend(instances.into_iter().map(|local| (local.clone(), local)));
        for child in &mut self.children {
            let template = child_template(child.as_ref());
            child.add_instances(vec![template; len]);
        }
        self.instances.len()
    }

    fn clone_instance(&mut self, i: usize) -> usize {
        if clone_pair(&mut self.instances, i) {
            for child in &mut self.children {
                child.clone_instance(i);
            }
        }
        self.instances.len()
    }

    fn update_world_transforms(
        &mut self,
        range: Range<usize>,
        parents_world_transform: &[Instance],
    ) {
        let Some(world_transforms) =
            propagate(&mut self.instances, range.clone(), parents_world_transform)
        else {
            return;
        };
        for child in self.children.iter_mut() {
            child.update_world_transforms(range.clone(), &world_transforms);
        }
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device) {
        self.children
            .iter_mut()
            .for_each(|child| child.write_to_buffers(queue, device));
    }

    fn instance_bounds(&self, out: &mut Vec<Aabb>) {
        for child in self.children.iter() {
            child.instance_bounds(out);
        }
    }

    fn get_render(&self) -> Vec<Instanced<'_>> {
        self.children
            .iter()
            .flat_map(|child| child.get_render())
            .collect()
    }
}

/// A node that draws a [`model::Model`] once per instance.
pub struct ModelNode {
    children: Vec<Box<dyn SceneNode>>,
    instance_buffer: wgpu::Buffer,
    instances: Vec<(Instance, Instance)>,
    buffer_size_needs_change: bool,
    model: model::Model,
}

impl ModelNode {
    pub fn from_model(amount: usize, device: &wgpu::Device, model: model::Model) -> Self {
        let instances = vec![(Instance::default(), Instance::default()); amount];

        let instance_data = instances
            .iter()
            .map(|(_, world)| world.to_raw())
            .collect::<Vec<_>>();

        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Instance Buffer"),
            contents: bytemuck::cast_slice(&instance_data),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            children: vec![],
            instance_buffer,
            instances,
            buffer_size_needs_change: false,
            model,
        }
    }
}

impl SceneNode for ModelNode {
    fn instance_count(&self) -> usize {
        self.instances.len()
    }

    fn get_world_transforms(&self) -> Vec<Instance> {
        self.instances.iter().map(|(_, world)| world.clone()).collect()
    }

    fn get_local_transform(&self, idx: usize) -> Option<Instance> {
        self.instances.get(idx).map(|(local, _)| local.clone())
    }

    fn set_local_transform(&mut self, idx: usize, instance: Instance) {
        if let Some((local, _)) = self.instances.get_mut(idx) {
            *local = instance;
        }
    }

    fn set_local_transform_all(&mut self, mutation: &mut dyn FnMut(usize, &mut Instance)) {
        self.instances
            .iter_mut()
            .enumerate()
            .for_each(|(i, (local, _))| mutation(i, local));
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn add_instances(&mut self, instances: Vec<Instance>) -> usize {
        let len = instances.len();
        self.instances
            .extend(instances.into_iter().map(|local| (local.clone(), local)));
        for child in &mut self.children {
            let template = child_template(child.as_ref());
            child.add_instances(vec![template; len]);
        }
        self.buffer_size_needs_change = true;
        self.instances.len()
    }

    fn clone_instance(&mut self, i: usize) -> usize {
        if clone_pair(&mut self.instances, i) {
            for child in &mut self.children {
                child.clone_instance(i);
            }
            self.buffer_size_needs_change = true;
        }
        self.instances.len()
    }

    fn update_world_transforms(
        &mut self,
        range: Range<usize>,
        parents_world_transform: &[Instance],
    ) {
        let Some(world_transforms) =
            propagate(&mut self.instances, range.clone(), parents_world_transform)
        else {
            return;
        };
        for child in self.children.iter_mut() {
            child.update_world_transforms(range.clone(), &world_transforms);
        }
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device) {
        let raw_instances: Vec<InstanceRaw> = self
            .instances
            .iter()
            .map(|(_, world)| world.to_raw())
            .collect();
        if self.buffer_size_needs_change {
            self.instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Instance Buffer"),
                contents: bytemuck::cast_slice(&raw_instances),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            });
            self.buffer_size_needs_change = false;
        } else if !raw_instances.is_empty() {
            queue.write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::cast_slice(&raw_instances),
            );
        }
        self.children
            .iter_mut()
            .for_each(|child| child.write_to_buffers(queue, device));
    }

    fn instance_bounds(&self, out: &mut Vec<Aabb>) {
        let local: Vec<Aabb> = self.model.meshes.iter().filter_map(|m| m.bounds).collect();
        for (_, world) in self.instances.iter() {
            let matrix = world.to_matrix();
            out.extend(local.iter().map(|aabb| aabb.transformed(&matrix)));
        }
        for child in self.children.iter() {
            child.instance_bounds(out);
        }
    }

    fn get_render(&self) -> Vec<Instanced<'_>> {
        self.children
            .iter()
            .flat_map(|child| child.get_render())
            .chain([Instanced {
                instance: &self.instance_buffer,
                model: &self.model,
                amount: self.instances.len(),
            }])
            .collect()
    }
}

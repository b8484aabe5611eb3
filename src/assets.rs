//! Asset loading for the scene.
//!
//! Both loads are plain futures resolving to a [`SceneEvent`]. Nothing touches
//! the scene graph until the event is handled by the flow.

use std::fmt::Debug;

use crate::{
    context::InitContext,
    data_structures::{
        instance::Instance,
        scene_graph::{ContainerNode, SceneNode},
    },
    resources::{GltfSource, build_scene, fetch_gltf},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetKind {
    Model,
    PetalTemplate,
}

pub enum SceneEvent {
    Loaded(AssetKind, anyhow::Result<Box<dyn SceneNode>>),
}

impl Debug for SceneEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Loaded(kind, Ok(node)) => f
                .debug_tuple("Loaded")
                .field(kind)
                .field(&format_args!("Ok({} instance(s))", node.instance_count()))
                .finish(),
            Self::Loaded(kind, Err(e)) => f.debug_tuple("Loaded").field(kind).field(e).finish(),
        }
    }
}

/// Wraps `node` in a single-instance container carrying `placement`.
///
/// The loaded file keeps its own node transforms; the placement is applied on top.
pub fn place(node: Box<dyn SceneNode>, placement: Instance) -> Box<dyn SceneNode> {
    let mut container = ContainerNode::new(1);
    container.instances[0] = (placement.clone(), placement);
    container.children.push(node);
    Box::new(container)
}

/// Clones instance 0 of `node` until it has `count` instances. Returns the final count.
pub fn replicate(node: &mut dyn SceneNode, count: usize) -> usize {
    if node.instance_count() == 0 {
        return 0;
    }
    while node.instance_count() < count {
        node.clone_instance(0);
    }
    node.instance_count()
}

fn loaded(kind: AssetKind, url: &str, result: anyhow::Result<Box<dyn SceneNode>>) -> SceneEvent {
    match &result {
        Ok(node) => log::debug!("{kind:?} {url} resolved to {} instance(s)", node.instance_count()),
        Err(e) => log::debug!("{kind:?} {url} failed: {e:#}"),
    }
    SceneEvent::Loaded(kind, result)
}

/// Fetches and parses `url` off the GPU. A failure is already the event to deliver.
pub async fn fetch(kind: AssetKind, url: &str) -> Result<GltfSource, SceneEvent> {
    fetch_gltf(url).await.map_err(|e| loaded(kind, url, Err(e)))
}

async fn load(init: InitContext, kind: AssetKind, url: String, placement: Instance) -> SceneEvent {
    let source = match fetch(kind, &url).await {
        Ok(source) => source,
        Err(failed) => return failed,
    };
    let built = build_scene(&source, &init.device, &init.queue, &init.texture_layout);
    loaded(kind, &url, built.map(|node| place(node, placement)))
}

pub async fn load_model(init: InitContext, url: String, placement: Instance) -> SceneEvent {
    log::info!("loading model {url}");
    load(init, AssetKind::Model, url, placement).await
}

/// Loads the petal as a single template instance; replication happens on attach.
pub async fn load_petal_template(init: InitContext, url: String) -> SceneEvent {
    log::info!("loading petal template {url}");
    load(init, AssetKind::PetalTemplate, url, Instance::default()).await
}

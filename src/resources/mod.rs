//! Loading of remote and local assets.
//!
//! Absolute `http(s)` URLs are fetched with `reqwest` on every target. Relative
//! names resolve against `./assets/` natively and against `<origin>/assets/` in
//! the browser.

use std::sync::Arc;

use anyhow::{Context as _, bail};

use crate::data_structures::{
    model,
    scene_graph::{ContainerNode, SceneNode, to_scene_node},
    texture::Texture,
};

fn is_remote(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Resolves `uri` (as found inside a glTF file) relative to the file at `base`.
pub fn resolve_uri(base: &str, uri: &str) -> String {
    if uri.contains("://") || uri.starts_with('/') {
        return uri.to_string();
    }
    match base.rfind('/') {
        Some(idx) => format!("{}{}", &base[..=idx], uri),
        None => uri.to_string(),
    }
}

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().context("no browser window")?;
    let origin = window
        .location()
        .origin()
        .map_err(|e| anyhow::anyhow!("cannot read page origin: {e:?}"))?;
    let base = reqwest::Url::parse(&format!("{origin}/assets/"))?;
    Ok(base.join(file_name)?)
}

async fn fetch(url: &str) -> anyhow::Result<Vec<u8>> {
    let response = reqwest::get(url)
        .await?
        .error_for_status()
        .with_context(|| format!("request for {url} failed"))?;
    Ok(response.bytes().await?.to_vec())
}

pub async fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    if file_name.starts_with("data:") {
        bail!("embedded data URIs are not supported");
    }
    if is_remote(file_name) {
        return fetch(file_name).await;
    }

    #[cfg(target_arch = "wasm32")]
    let data = fetch(format_url(file_name)?.as_str()).await?;

    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let path = std::path::Path::new("./").join("assets").join(file_name);
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("cannot read {}", path.display()))?
    };

    Ok(data)
}

/// Converts a linear glTF base colour factor to sRGB-encoded bytes.
pub fn factor_to_rgba8(factor: [f32; 4]) -> [u8; 4] {
    let encode = |c: f32| {
        let c = c.clamp(0.0, 1.0);
        let s = if c <= 0.003_130_8 {
            c * 12.92
        } else {
            1.055 * c.powf(1.0 / 2.4) - 0.055
        };
        (s * 255.0).round() as u8
    };
    [
        encode(factor[0]),
        encode(factor[1]),
        encode(factor[2]),
        (factor[3].clamp(0.0, 1.0) * 255.0).round() as u8,
    ]
}

fn buffer_view_bytes<'a>(
    view: &gltf::buffer::View,
    buffers: &'a [Vec<u8>],
) -> anyhow::Result<&'a [u8]> {
    let buffer = buffers
        .get(view.buffer().index())
        .with_context(|| format!("buffer {} is missing", view.buffer().index()))?;
    let start = view.offset();
    let end = start + view.length();
    buffer
        .get(start..end)
        .with_context(|| {
            format!("buffer view {start}..{end} exceeds buffer of {} bytes", buffer.len())
        })
}

/// A parsed glTF file with every external buffer and image already fetched.
///
/// Building GPU resources from it is synchronous.
pub struct GltfSource {
    pub url: String,
    pub document: gltf::Document,
    pub buffers: Vec<Vec<u8>>,
    /// Bytes of each image stored outside the file, indexed like `document.images()`.
    pub images: Vec<Option<Vec<u8>>>,
}

/// Fetches `url` and everything it references, without touching the GPU.
pub async fn fetch_gltf(url: &str) -> anyhow::Result<GltfSource> {
    let bytes = load_binary(url)
        .await
        .with_context(|| format!("cannot fetch {url}"))?;
    let gltf::Gltf { document, blob } =
        gltf::Gltf::from_slice(&bytes).with_context(|| format!("{url} is not valid glTF"))?;

    let mut buffers = Vec::new();
    for buffer in document.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                let blob = blob
                    .as_deref()
                    .with_context(|| format!("{url} references a missing binary chunk"))?;
                buffers.push(blob.to_vec());
            }
            gltf::buffer::Source::Uri(uri) => {
                let bin = load_binary(&resolve_uri(url, uri))
                    .await
                    .with_context(|| format!("cannot fetch buffer {uri} of {url}"))?;
                buffers.push(bin);
            }
        }
    }

    let mut images = Vec::new();
    for image in document.images() {
        let external = match image.source() {
            gltf::image::Source::View { .. } => None,
            gltf::image::Source::Uri { uri, .. } => Some(
                load_binary(&resolve_uri(url, uri))
                    .await
                    .with_context(|| format!("cannot fetch image {uri} of {url}"))?,
            ),
        };
        images.push(external);
    }

    log::debug!(
        "fetched {url}: {} bytes, {} buffer(s), {} image(s)",
        bytes.len(),
        buffers.len(),
        images.len()
    );
    Ok(GltfSource {
        url: url.to_string(),
        document,
        buffers,
        images,
    })
}

fn material_texture(
    source: &GltfSource,
    material: &gltf::Material<'_>,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<Texture> {
    let pbr = material.pbr_metallic_roughness();
    let label = material.name().unwrap_or(source.url.as_str());
    let Some(info) = pbr.base_color_texture() else {
        return Ok(Texture::from_colour(
            device,
            queue,
            factor_to_rgba8(pbr.base_color_factor()),
            label,
        ));
    };
    let image = info.texture().source();
    let decoded = match image.source() {
        gltf::image::Source::View { view, mime_type } => {
            let bytes = buffer_view_bytes(&view, &source.buffers)?;
            Texture::from_bytes(device, queue, bytes, label, Some(mime_type))
        }
        gltf::image::Source::Uri { uri, mime_type } => {
            let bytes = source
                .images
                .get(image.index())
                .and_then(Option::as_deref)
                .with_context(|| format!("image {uri} was not fetched"))?;
            Texture::from_bytes(device, queue, bytes, label, mime_type)
        }
    };
    decoded.with_context(|| format!("cannot decode base colour texture of material {label}"))
}

/// Builds the scene node tree of a fetched glTF file.
///
/// The returned root has exactly one instance. A file with several root nodes
/// is wrapped in a [`ContainerNode`].
pub fn build_scene(
    source: &GltfSource,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
) -> anyhow::Result<Box<dyn SceneNode>> {
    let url = source.url.as_str();
    let mut materials = Vec::new();
    for material in source.document.materials() {
        let diffuse = material_texture(source, &material, device, queue)?;
        let name = material.name().unwrap_or("material");
        materials.push(model::Material::new(device, name, diffuse, layout));
    }
    // Primitives without a material are drawn plain white
    let fallback_material = materials.len();
    materials.push(model::Material::new(
        device,
        "default",
        Texture::from_colour(device, queue, [255, 255, 255, 255], "default"),
        layout,
    ));
    let materials = Arc::new(materials);

    let scene = source
        .document
        .default_scene()
        .or_else(|| source.document.scenes().next())
        .with_context(|| format!("{url} contains no scene"))?;
    let mut roots: Vec<Box<dyn SceneNode>> = scene
        .nodes()
        .map(|node| to_scene_node(node, &source.buffers, device, &materials, fallback_material))
        .collect();

    log::info!(
        "loaded {url}: {} root node(s), {} material(s)",
        roots.len(),
        materials.len()
    );

    let root = match roots.len() {
        1 => roots.remove(0),
        _ => {
            let mut container = ContainerNode::new(1);
            container.children = roots;
            Box::new(container)
        }
    };
    Ok(root)
}

use std::path::PathBuf;

use petal_ngin::{
    assets::{self, AssetKind, SceneEvent},
    resources::{factor_to_rgba8, fetch_gltf, load_binary, resolve_uri},
};

/// A fresh directory under the system temp dir holding `files`.
fn scratch_dir(name: &str, files: &[(&str, &[u8])]) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("petal-ngin-{name}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir is writable");
    for (file, bytes) in files {
        std::fs::write(dir.join(file), bytes).expect("temp dir is writable");
    }
    dir
}

#[test]
fn relative_uris_resolve_next_to_the_file() {
    assert_eq!(resolve_uri("models/petal.gltf", "petal.bin"), "models/petal.bin");
    assert_eq!(
        resolve_uri("https://cdn.example.com/a/b/model.gltf", "textures/diffuse.png"),
        "https://cdn.example.com/a/b/textures/diffuse.png"
    );
    assert_eq!(resolve_uri("model.gltf", "model.bin"), "model.bin");
}

#[test]
fn absolute_uris_are_kept() {
    assert_eq!(
        resolve_uri("models/petal.gltf", "https://example.com/t.png"),
        "https://example.com/t.png"
    );
    assert_eq!(resolve_uri("models/petal.gltf", "/static/t.png"), "/static/t.png");
}

#[test]
fn colour_factors_become_srgb_bytes() {
    assert_eq!(factor_to_rgba8([1.0, 1.0, 1.0, 1.0]), [255, 255, 255, 255]);
    assert_eq!(factor_to_rgba8([0.0, 0.0, 0.0, 0.0]), [0, 0, 0, 0]);
    // Linear 0.5 is sRGB 188; alpha stays linear
    assert_eq!(factor_to_rgba8([0.5, 0.5, 0.5, 0.5]), [188, 188, 188, 128]);
    assert_eq!(factor_to_rgba8([2.0, -1.0, 0.0, 3.0]), [255, 0, 0, 255]);
}

#[tokio::test]
async fn missing_local_asset_is_an_error() {
    let err = load_binary("does-not-exist/petal.glb")
        .await
        .expect_err("file is missing");
    assert!(format!("{err:#}").contains("petal.glb"), "{err:#}");
}

#[tokio::test]
async fn data_uris_are_rejected() {
    assert!(load_binary("data:application/octet-stream;base64,AAAA").await.is_err());
}

#[tokio::test]
async fn missing_model_resolves_to_a_failed_load() {
    match assets::fetch(AssetKind::Model, "does-not-exist/model.glb").await {
        Err(SceneEvent::Loaded(AssetKind::Model, Err(e))) => {
            assert!(format!("{e:#}").contains("model.glb"), "{e:#}");
        }
        other => panic!("expected a failed model load, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn garbage_bytes_are_not_gltf() {
    let dir = scratch_dir("garbage", &[("model.glb", &b"definitely not a model"[..])]);
    let url = dir.join("model.glb").display().to_string();
    match assets::fetch(AssetKind::PetalTemplate, &url).await {
        Err(SceneEvent::Loaded(AssetKind::PetalTemplate, Err(e))) => {
            assert!(format!("{e:#}").contains("is not valid glTF"), "{e:#}");
        }
        other => panic!("expected a failed petal load, got {:?}", other.map(|_| ())),
    }
}

const WITH_BUFFER: &str = r#"{
    "asset": { "version": "2.0" },
    "buffers": [{ "byteLength": 4, "uri": "petal.bin" }],
    "scenes": [{ "nodes": [] }],
    "scene": 0
}"#;

#[tokio::test]
async fn external_buffers_are_fetched_next_to_the_file() {
    let dir = scratch_dir(
        "buffer",
        &[("petal.gltf", WITH_BUFFER.as_bytes()), ("petal.bin", &b"\x01\x02\x03\x04"[..])],
    );
    let url = dir.join("petal.gltf").display().to_string();
    let source = fetch_gltf(&url).await.expect("buffer sits next to the file");
    assert_eq!(source.url, url);
    assert_eq!(source.buffers, vec![vec![1, 2, 3, 4]]);
    assert!(source.images.is_empty());
    assert_eq!(source.document.scenes().count(), 1);
}

const WITH_MISSING_IMAGE: &str = r#"{
    "asset": { "version": "2.0" },
    "images": [{ "uri": "missing.png" }],
    "scenes": [{ "nodes": [] }],
    "scene": 0
}"#;

#[tokio::test]
async fn missing_image_fails_the_fetch() {
    let dir = scratch_dir("image", &[("petal.gltf", WITH_MISSING_IMAGE.as_bytes())]);
    let url = dir.join("petal.gltf").display().to_string();
    let err = fetch_gltf(&url).await.err().expect("image is missing");
    assert!(format!("{err:#}").contains("missing.png"), "{err:#}");
}

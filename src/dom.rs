//! Browser page wiring: the canvas and the play button.

use anyhow::{Context as _, anyhow};
use wasm_bindgen::{JsCast, closure::Closure};
use web_sys as web;

fn document() -> anyhow::Result<(web::Window, web::Document)> {
    let window = web::window().context("no browser window")?;
    let document = window.document().context("window has no document")?;
    Ok((window, document))
}

/// Creates a canvas sized to the window and appends it to the element `container_id`.
///
/// Falls back to `<body>` when the container does not exist.
pub fn mount_canvas(container_id: &str) -> anyhow::Result<web::HtmlCanvasElement> {
    let (window, document) = document()?;
    let canvas = document
        .create_element("canvas")
        .map_err(|e| anyhow!("cannot create canvas: {e:?}"))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|_| anyhow!("created element is not a canvas"))?;

    let dimension = |value: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
        value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as u32
    };
    canvas.set_width(dimension(window.inner_width()));
    canvas.set_height(dimension(window.inner_height()));

    let parent: web::Node = match document.get_element_by_id(container_id) {
        Some(container) => container.into(),
        None => {
            log::warn!("no element with id '{container_id}', appending the canvas to <body>");
            document.body().context("document has no body")?.into()
        }
    };
    parent
        .append_child(&canvas)
        .map_err(|e| anyhow!("cannot append canvas: {e:?}"))?;
    Ok(canvas)
}

/// Calls `handler` on every click of the element `id`.
pub fn add_click_listener(id: &str, mut handler: impl FnMut() + 'static) -> anyhow::Result<()> {
    let (_, document) = document()?;
    let element = document
        .get_element_by_id(id)
        .with_context(|| format!("no element with id '{id}'"))?;
    let closure = Closure::wrap(Box::new(move || handler()) as Box<dyn FnMut()>);
    element
        .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
        .map_err(|e| anyhow!("cannot listen for clicks on '{id}': {e:?}"))?;
    // The listener lives as long as the page
    closure.forget();
    Ok(())
}

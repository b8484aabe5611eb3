//! Web Audio backend: one decoded buffer looping through a gain node.

use std::{cell::RefCell, rc::Rc};

use anyhow::{Context as _, anyhow};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

use super::{AudioBackend, AudioControl};

fn js_err(what: &'static str) -> impl FnOnce(wasm_bindgen::JsValue) -> anyhow::Error {
    move |e| anyhow!("{what}: {e:?}")
}

pub struct WebAudio {
    ctx: web::AudioContext,
    gain: web::GainNode,
    looping: bool,
    buffer: Rc<RefCell<Option<web::AudioBuffer>>>,
    source: Option<web::AudioBufferSourceNode>,
    /// Context time at which the current source started.
    started_at: f64,
    /// Seconds of the track played before the current source.
    progress: f64,
}

impl WebAudio {
    pub fn new(volume: f32, looping: bool) -> anyhow::Result<Self> {
        let ctx = web::AudioContext::new().map_err(js_err("AudioContext"))?;
        let gain = web::GainNode::new(&ctx).map_err(js_err("GainNode"))?;
        gain.gain().set_value(volume);
        gain.connect_with_audio_node(&ctx.destination())
            .map_err(js_err("connect gain"))?;
        Ok(Self {
            ctx,
            gain,
            looping,
            buffer: Rc::new(RefCell::new(None)),
            source: None,
            started_at: 0.0,
            progress: 0.0,
        })
    }

    /// Handle used to fill the buffer once it has been fetched and decoded.
    pub fn loader(&self) -> AudioLoader {
        AudioLoader {
            ctx: self.ctx.clone(),
            slot: Rc::clone(&self.buffer),
        }
    }

    fn offset(&self, duration: f64) -> f64 {
        if self.looping && duration > 0.0 {
            self.progress % duration
        } else {
            self.progress.min(duration)
        }
    }

    fn start_source(&mut self) -> anyhow::Result<()> {
        let buffer = self.buffer.borrow();
        let buffer = buffer.as_ref().context("no decoded audio")?;
        // Autoplay policies keep the context suspended until a user gesture
        if let Err(e) = self.ctx.resume() {
            log::debug!("cannot resume the audio context: {:?}", e);
        }
        let source = self
            .ctx
            .create_buffer_source()
            .map_err(js_err("AudioBufferSourceNode"))?;
        source.set_buffer(Some(buffer));
        source.set_loop(self.looping);
        source
            .connect_with_audio_node(&self.gain)
            .map_err(js_err("connect source"))?;
        let offset = self.offset(buffer.duration());
        source
            .start_with_when_and_grain_offset(0.0, offset)
            .map_err(js_err("start"))?;
        self.started_at = self.ctx.current_time();
        self.source = Some(source);
        Ok(())
    }
}

impl AudioBackend for WebAudio {
    fn is_loaded(&self) -> bool {
        self.buffer.borrow().is_some()
    }

    fn play(&mut self) {
        if self.source.is_some() {
            return;
        }
        if let Err(e) = self.start_source() {
            log::error!("cannot start audio: {:#}", e);
        }
    }

    fn pause(&mut self) {
        let Some(source) = self.source.take() else {
            return;
        };
        self.progress += self.ctx.current_time() - self.started_at;
        if let Err(e) = web::AudioScheduledSourceNode::stop(&source) {
            log::error!("cannot stop audio: {:?}", e);
        }
        if let Err(e) = source.disconnect() {
            log::debug!("cannot disconnect the audio source: {:?}", e);
        }
    }
}

async fn fetch_and_decode(ctx: &web::AudioContext, url: &str) -> anyhow::Result<web::AudioBuffer> {
    let bytes = crate::resources::load_binary(url).await?;
    let array = js_sys::Uint8Array::from(bytes.as_slice());
    let promise = ctx
        .decode_audio_data(&array.buffer())
        .map_err(js_err("decodeAudioData"))?;
    let decoded = JsFuture::from(promise)
        .await
        .map_err(js_err("decodeAudioData"))?;
    decoded
        .dyn_into::<web::AudioBuffer>()
        .map_err(js_err("decoded value is not an AudioBuffer"))
}

pub struct AudioLoader {
    ctx: web::AudioContext,
    slot: Rc<RefCell<Option<web::AudioBuffer>>>,
}

/// Fetches and decodes `url` in the background, then hands it to `control`.
pub fn spawn_load<B: AudioBackend + 'static>(
    control: Rc<RefCell<AudioControl<B>>>,
    loader: AudioLoader,
    url: String,
) {
    let AudioLoader { ctx, slot } = loader;
    wasm_bindgen_futures::spawn_local(async move {
        match fetch_and_decode(&ctx, &url).await {
            Ok(buffer) => {
                *slot.borrow_mut() = Some(buffer);
                control.borrow_mut().on_loaded();
            }
            Err(e) => log::error!("failed to load audio {url}: {:#}", e),
        }
    });
}

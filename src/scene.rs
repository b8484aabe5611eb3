//! The petal scene: a glTF model inside a slowly turning cloud of petals.
//!
//! [`SceneGraph`] holds everything that changes frame to frame and needs no
//! GPU. [`PetalScene`] is the [`GraphicsFlow`] around it that starts the loads,
//! routes pointer and keyboard input and uploads instance data.

use std::{cell::RefCell, rc::Rc};

use cgmath::{Deg, One, Quaternion, Vector3};
use instant::Duration;
use rand::{SeedableRng, rngs::StdRng};
use winit::{
    event::{ElementState, MouseButton, WindowEvent},
    keyboard::{Key, NamedKey},
};

use crate::{
    assets::{self, AssetKind, SceneEvent},
    audio::{AudioBackend, AudioControl, PlaybackState},
    camera::Camera,
    config::{DragTarget, SceneConfig},
    context::{Context, InitContext},
    data_structures::{group::Group, instance::Instance, scene_graph::SceneNode},
    flow::{FlowConstructor, GraphicsFlow, Launch, Out},
    frame::{FrameClock, FrameTick},
    interaction::DragControls,
    particles::ParticleCloud,
    petals::{PetalCloud, PetalMotion},
    render::Render,
};

pub type SharedAudio = Rc<RefCell<AudioControl<Box<dyn AudioBackend>>>>;

#[derive(Debug, Default)]
pub struct SceneState {
    pub playback: PlaybackState,
    /// Frames updated so far; one per displayed frame.
    pub frames: u64,
}

/// The two groups and the petal motion, free of any GPU resource.
pub struct SceneGraph {
    pub model_group: Group,
    pub petal_group: Group,
    drag_target: DragTarget,
    petals: Option<PetalCloud>,
    /// Index of the petal node within its home group.
    petal_member: Option<usize>,
    motion: PetalMotion,
    petal_scale: Vector3<f32>,
}

impl SceneGraph {
    pub fn new(config: &SceneConfig) -> Self {
        Self {
            model_group: Group::new("model"),
            petal_group: Group::new("petals"),
            drag_target: config.drag_target,
            petals: None,
            petal_member: None,
            motion: PetalMotion::from(config),
            petal_scale: config.petal_scale.into(),
        }
    }

    /// The group the petals live in and the one that spins.
    pub fn petal_home(&self) -> &Group {
        match self.drag_target {
            DragTarget::ModelOnly => &self.petal_group,
            DragTarget::ModelAndPetals => &self.model_group,
        }
    }

    fn petal_home_mut(&mut self) -> &mut Group {
        match self.drag_target {
            DragTarget::ModelOnly => &mut self.petal_group,
            DragTarget::ModelAndPetals => &mut self.model_group,
        }
    }

    /// Attaches the primary model. A failed load is logged and leaves the group empty.
    pub fn attach_model(&mut self, loaded: anyhow::Result<Box<dyn SceneNode>>) -> bool {
        self.model_group.attach_loaded(loaded)
    }

    /// Replicates the petal template `count` times over `cloud` and attaches it.
    pub fn attach_petals<R: rand::Rng + ?Sized>(
        &mut self,
        loaded: anyhow::Result<Box<dyn SceneNode>>,
        cloud: &ParticleCloud,
        count: usize,
        rng: &mut R,
    ) -> bool {
        if self.petals.is_some() {
            log::warn!("petals are already attached; ignoring a second template");
            return false;
        }
        let mut template = match loaded {
            Ok(template) => template,
            Err(e) => return self.petal_home_mut().attach_loaded(Err(e)),
        };
        if count == 0 {
            log::warn!("petal count is zero; no petals are added");
            return false;
        }
        assets::replicate(template.as_mut(), count);
        let petals = PetalCloud::scatter(cloud.points(), count, rng, self.motion);
        petals.write_local_transforms(template.as_mut(), self.petal_scale);

        let home = self.petal_home_mut();
        let member = home.len();
        if !home.attach_loaded(Ok(template)) {
            return false;
        }
        self.petal_member = Some(member);
        self.petals = Some(petals);
        true
    }

    pub fn petals(&self) -> Option<&PetalCloud> {
        self.petals.as_ref()
    }

    /// Instances of the attached petal node; zero before the petal asset resolves.
    pub fn petal_instance_count(&self) -> usize {
        self.petal_member
            .and_then(|member| self.petal_home().members().get(member))
            .map_or(0, |node| node.instance_count())
    }

    /// Advances the petals by one tick and recomputes every world transform.
    pub fn advance(&mut self, tick: &FrameTick) {
        let home = match self.drag_target {
            DragTarget::ModelOnly => &mut self.petal_group,
            DragTarget::ModelAndPetals => &mut self.model_group,
        };
        match self.petals.as_mut() {
            Some(petals) => {
                petals.advance(tick, home);
                if let Some(node) = self.petal_member.and_then(|m| home.members_mut().get_mut(m)) {
                    petals.write_local_transforms(node.as_mut(), self.petal_scale);
                }
            }
            // The group turns whether or not its petals have arrived
            None => home.rotation_y += cgmath::Rad(self.motion.group_spin * tick.scale),
        }
        self.model_group.update_world_transforms();
        self.petal_group.update_world_transforms();
    }

    pub fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device) {
        self.model_group.write_to_buffers(queue, device);
        self.petal_group.write_to_buffers(queue, device);
    }
}

pub struct PetalScene {
    config: SceneConfig,
    graph: SceneGraph,
    cloud: ParticleCloud,
    clock: FrameClock,
    drag: DragControls,
    audio: SharedAudio,
    rng: StdRng,
}

impl PetalScene {
    pub fn new(config: SceneConfig, audio: SharedAudio) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let cloud = ParticleCloud::generate(
            &mut rng,
            config.particle_count,
            config.cloud_radius,
            config.sampling,
        );
        log::info!(
            "sampled {} points within radius {}",
            cloud.len(),
            cloud.radius()
        );
        Self {
            graph: SceneGraph::new(&config),
            clock: FrameClock::new(config.reference_fps),
            drag: DragControls::new(),
            cloud,
            audio,
            rng,
            config,
        }
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn cloud(&self) -> &ParticleCloud {
        &self.cloud
    }

    /// Advances the motion by one frame of length `dt`. Nothing is uploaded.
    pub fn step(&mut self, state: &mut SceneState, dt: Duration) {
        let tick = self.clock.tick(dt);
        self.graph.advance(&tick);
        state.frames = self.clock.ticks();
        // The DOM button toggles outside of any flow hook
        state.playback = self.audio.borrow().state();
    }

    /// Attaches a resolved load to its group.
    pub fn handle(&mut self, event: SceneEvent) {
        match event {
            SceneEvent::Loaded(AssetKind::Model, loaded) => {
                self.graph.attach_model(loaded);
            }
            SceneEvent::Loaded(AssetKind::PetalTemplate, loaded) => {
                let count = self.config.particle_count;
                self.graph
                    .attach_petals(loaded, &self.cloud, count, &mut self.rng);
            }
        }
    }

    fn model_placement(&self) -> Instance {
        Instance {
            position: self.config.model_position.into(),
            rotation: Quaternion::one(),
            scale: self.config.model_scale.into(),
        }
    }

    fn toggle_audio(&self, state: &mut SceneState) {
        state.playback = self.audio.borrow_mut().toggle();
        log::info!("audio {:?}", state.playback);
    }
}

impl GraphicsFlow<SceneState, SceneEvent> for PetalScene {
    fn on_init(&mut self, ctx: &mut Context, _state: &mut SceneState) -> Out<SceneEvent> {
        ctx.clear_colour = self.config.clear_colour();
        ctx.camera.camera = Camera::new(self.config.camera_position, Deg(-90.0), Deg(0.0));
        ctx.projection.fovy = Deg(self.config.fov_y_deg).into();
        ctx.projection.znear = self.config.z_near;
        ctx.projection.zfar = self.config.z_far;
        ctx.update_camera();
        ctx.light.set(
            crate::pipelines::light::LightUniform::new(
                self.config.light_position,
                self.config.light_colour_linear(),
                self.config.light_intensity,
            ),
            &ctx.queue,
        );

        let init = InitContext::from(&*ctx);
        let model: Box<dyn Future<Output = SceneEvent>> = Box::new(assets::load_model(
            init.clone(),
            self.config.model_url.clone(),
            self.model_placement(),
        ));
        let petal: Box<dyn Future<Output = SceneEvent>> = Box::new(assets::load_petal_template(
            init,
            self.config.petal_url.clone(),
        ));
        Out::FutEvent(vec![model, petal])
    }

    fn on_update(
        &mut self,
        ctx: &Context,
        state: &mut SceneState,
        dt: Duration,
    ) -> Out<SceneEvent> {
        self.step(state, dt);
        self.graph.write_to_buffers(&ctx.queue, &ctx.device);
        Out::Empty
    }

    fn on_window_events(
        &mut self,
        ctx: &Context,
        state: &mut SceneState,
        event: &WindowEvent,
    ) -> Out<SceneEvent> {
        match event {
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                let ray = ctx.mouse_ray();
                let group = &self.graph.model_group;
                self.drag.pointer_down(
                    &ray,
                    ctx.camera.camera.forward(),
                    group.position,
                    &group.instance_bounds(),
                );
            }
            WindowEvent::MouseInput {
                state: ElementState::Released,
                button: MouseButton::Left,
                ..
            } => {
                self.drag.pointer_up();
            }
            WindowEvent::CursorMoved { .. } if self.drag.is_dragging() => {
                if let Some(position) = self.drag.pointer_move(&ctx.mouse_ray()) {
                    self.graph.model_group.position = position;
                }
            }
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && !event.repeat
                    && event.logical_key == Key::Named(NamedKey::Space) =>
            {
                self.toggle_audio(state);
            }
            _ => {}
        }
        Out::Empty
    }

    fn on_custom_events(
        &mut self,
        _ctx: &Context,
        _state: &mut SceneState,
        event: SceneEvent,
    ) -> Option<SceneEvent> {
        self.handle(event);
        None
    }

    fn on_render(&self) -> Render<'_> {
        Render::Composed(vec![
            Render::from(&self.graph.model_group),
            Render::from(&self.graph.petal_group),
        ])
    }
}

pub fn shared_audio(backend: Box<dyn AudioBackend>) -> SharedAudio {
    Rc::new(RefCell::new(AudioControl::new(backend)))
}

#[cfg(not(target_arch = "wasm32"))]
fn make_audio(config: &SceneConfig) -> SharedAudio {
    shared_audio(Box::new(crate::audio::SilentAudio::new(
        config.audio_url.clone(),
    )))
}

#[cfg(target_arch = "wasm32")]
fn make_audio(config: &SceneConfig) -> SharedAudio {
    use crate::audio::{SilentAudio, web::WebAudio};

    let Some(url) = config.audio_url.clone() else {
        return shared_audio(Box::new(SilentAudio::new(None)));
    };
    let web_audio = match WebAudio::new(config.audio_volume, config.audio_loop) {
        Ok(web_audio) => web_audio,
        Err(e) => {
            log::error!("audio is unavailable: {:#}", e);
            return shared_audio(Box::new(SilentAudio::new(Some(url))));
        }
    };
    let loader = web_audio.loader();
    let control = shared_audio(Box::new(web_audio));
    crate::audio::web::spawn_load(Rc::clone(&control), loader, url);

    let clicks = Rc::clone(&control);
    if let Err(e) = crate::dom::add_click_listener(&config.play_button_id, move || {
        let state = clicks.borrow_mut().toggle();
        log::info!("audio {:?}", state);
    }) {
        log::warn!("play button unavailable: {:#}", e);
    }
    control
}

/// Builds the scene described by `config` and runs it until the window closes.
///
/// On the web this returns right after the event loop is handed to the browser.
pub fn create_scene(config: SceneConfig) -> anyhow::Result<()> {
    let audio = make_audio(&config);
    let launch = Launch {
        title: "petal-ngin".to_string(),
        container_id: config.container_id.clone(),
    };
    // Loads start from `on_init`, once the GPU context exists
    let constructor: FlowConstructor<SceneState, SceneEvent> = Box::new(move |_: InitContext| {
        Box::pin(async move {
            Box::new(PetalScene::new(config, audio))
                as Box<dyn GraphicsFlow<SceneState, SceneEvent>>
        })
    });
    crate::flow::run(launch, vec![constructor])
}

/// Mounts the scene into the element `container_id`.
///
/// `preset` selects `"sunglass"`; anything else (or nothing) is the warrior scene.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(js_name = createScene)]
pub fn create_scene_js(
    container_id: String,
    preset: Option<String>,
) -> Result<(), wasm_bindgen::JsValue> {
    let mut config = match preset.as_deref() {
        Some("sunglass") => SceneConfig::sunglass(),
        _ => SceneConfig::warrior(),
    };
    config.container_id = container_id;
    create_scene(config).map_err(|e| wasm_bindgen::JsValue::from_str(&format!("{e:#}")))
}

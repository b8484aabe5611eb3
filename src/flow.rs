//! Flow control and application event loop.
//!
//! A "flow" represents a scene that handles user input, updates its state
//! and provides renderable objects each frame.
//!
//! # User-facing types
//!
//! - [`GraphicsFlow<S, E>`] is the trait for scenes that handle events and rendering
//! - [`Out<E>`] is the output type for async event handling
//! - [`Launch`] names the window (native) or the DOM container (web) to render into
//!
//! # Lifecycle
//!
//! Each displayed frame runs exactly once through:
//! 1. resolve finished futures into events
//! 2. call `on_update` on every flow with the time since the previous frame
//! 3. collect every flow's `on_render` and draw it in one pass
//! 4. present and request the next frame

use std::{fmt::Debug, iter, pin::Pin, sync::Arc};

use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    context::{Context, InitContext},
    data_structures::{model::DrawModel, texture::Texture},
    render::Instanced,
};

///
/// This is the Output Type for every lifecycle hook where the user can pass async events that are
/// handled according to the platform you're running on.
///
/// `Out::FutEvent` can be used to resolve a future of an Event that is put in the Event Queue after
/// being resolved. The caller is responsible for handling the event later on and it will have no
/// side effects unless handled.
///
/// `Empty` is the default output used when no eventing/futures need to be handled.
///
pub enum Out<E> {
    FutEvent(Vec<Box<dyn Future<Output = E>>>),
    Empty,
}

impl<E> Default for Out<E> {
    fn default() -> Self {
        Self::Empty
    }
}

/// Trait for implementing a renderable scene.
///
/// 1. `on_init()` is called once when the flow is created; configure the context here
/// 2. `on_window_events()` is called for each winit window event
/// 3. `on_update()` is called every frame
/// 4. `on_custom_events()` is called for resolved `Out::FutEvent`s
/// 5. `on_render()` is called every frame and specifies how to render `self`
pub trait GraphicsFlow<S, E> {
    fn on_init(&mut self, ctx: &mut Context, state: &mut S) -> Out<E>;

    /// Called every frame with the elapsed time `dt`.
    fn on_update(&mut self, ctx: &Context, state: &mut S, dt: Duration) -> Out<E>;

    fn on_window_events(&mut self, ctx: &Context, state: &mut S, event: &WindowEvent) -> Out<E>;

    /// Handle custom application events.
    ///
    /// Returns the event if it was not consumed, allowing it to be passed to
    /// the next flow. Returning `None` means the event was consumed.
    fn on_custom_events(&mut self, ctx: &Context, state: &mut S, event: E) -> Option<E>;

    fn on_render(&self) -> crate::render::Render<'_>;
}

impl<State, Event> Debug for dyn GraphicsFlow<State, Event> + 'static {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("GraphicsFlow")
    }
}

/// A flow constructor: takes an `InitContext` and asynchronously returns a boxed flow.
pub type FlowConstructor<S, E> =
    Box<dyn FnOnce(InitContext) -> Pin<Box<dyn Future<Output = Box<dyn GraphicsFlow<S, E>>>>>>;

/// Where the app renders to.
#[derive(Clone, Debug)]
pub struct Launch {
    pub title: String,
    /// DOM id of the element the canvas is appended to. Unused natively.
    pub container_id: String,
}

impl Default for Launch {
    fn default() -> Self {
        Self {
            title: "petal-ngin".to_string(),
            container_id: "app".to_string(),
        }
    }
}

/// Application state bundle: GPU context, app state, and surface status.
#[derive(Debug)]
pub struct AppState<State: 'static> {
    pub(crate) ctx: Context,
    state: State,
    is_surface_configured: bool,
}

impl<State: Default> AppState<State> {
    async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let ctx = Context::new(window).await?;
        Ok(Self {
            ctx,
            state: State::default(),
            is_surface_configured: false,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.config.width = width;
            self.ctx.config.height = height;
            self.is_surface_configured = true;
            self.ctx.projection.resize(width, height);
            self.ctx
                .surface
                .configure(&self.ctx.device, &self.ctx.config);
            self.ctx.depth_texture = Texture::create_depth_texture(
                &self.ctx.device,
                [self.ctx.config.width, self.ctx.config.height],
                "depth_texture",
            );
            self.ctx.update_camera();
        }
    }

    fn render<Event>(
        &mut self,
        graphics_flows: &[Box<dyn GraphicsFlow<State, Event>>],
    ) -> Result<(), wgpu::SurfaceError> {
        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            let mut basics: Vec<Instanced> = Vec::new();
            graphics_flows
                .iter()
                .for_each(|flow| flow.on_render().collect(&mut basics));

            render_pass.set_pipeline(&self.ctx.pipelines.basic);
            for instanced in basics {
                if instanced.amount == 0 || instanced.instance.size() == 0 {
                    continue;
                }
                render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
                render_pass.draw_model_instanced(
                    instanced.model,
                    0..instanced.amount as u32,
                    &self.ctx.camera.bind_group,
                    &self.ctx.light.bind_group,
                );
            }
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

pub(crate) enum FlowEvent<State: 'static, Event: 'static> {
    #[allow(dead_code)]
    Initialized {
        state: AppState<State>,
        flows: Vec<Box<dyn GraphicsFlow<State, Event>>>,
    },
    Custom(Event),
    #[allow(dead_code)]
    Failed(anyhow::Error),
}

impl<State, Event> Debug for FlowEvent<State, Event> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized { state: _, flows } => {
                f.debug_struct("Initialized").field("flows", flows).finish()
            }
            Self::Custom(_) => f.write_str("Custom(E)"),
            Self::Failed(e) => f.debug_tuple("Failed").field(e).finish(),
        }
    }
}

type PendingEvent<State, Event> = Pin<Box<dyn Future<Output = FlowEvent<State, Event>>>>;

pub struct App<State: 'static, Event: 'static> {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    /// Futures handed out by flows, polled once per frame.
    #[cfg(not(target_arch = "wasm32"))]
    pending: Vec<PendingEvent<State, Event>>,
    proxy: EventLoopProxy<FlowEvent<State, Event>>,
    launch: Launch,
    state: Option<AppState<State>>,
    graphics_flows: Vec<Box<dyn GraphicsFlow<State, Event>>>,
    // Taken once the window exists
    constructors: Option<Vec<FlowConstructor<State, Event>>>,
    last_time: Instant,
    failure: Option<anyhow::Error>,
}

impl<State, Event> App<State, Event>
where
    State: 'static + Default,
    Event: 'static,
{
    fn new(
        event_loop: &EventLoop<FlowEvent<State, Event>>,
        launch: Launch,
        constructors: Vec<FlowConstructor<State, Event>>,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime: tokio::runtime::Runtime::new()?,
            #[cfg(not(target_arch = "wasm32"))]
            pending: Vec::new(),
            proxy: event_loop.create_proxy(),
            launch,
            state: None,
            graphics_flows: Vec::new(),
            constructors: Some(constructors),
            last_time: Instant::now(),
            failure: None,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:#}", error);
        self.failure = Some(error);
        event_loop.exit();
    }

    fn window_attributes(&self) -> anyhow::Result<winit::window::WindowAttributes> {
        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title(&self.launch.title);

        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::WindowAttributesExtWebSys;

            let canvas = crate::dom::mount_canvas(&self.launch.container_id)?;
            window_attributes = window_attributes.with_canvas(Some(canvas));
        }

        Ok(window_attributes)
    }

    /// Runs `on_init` on every flow after the context exists.
    fn init_flows(&mut self) {
        let Some(app_state) = self.state.as_mut() else {
            return;
        };
        let size = app_state.ctx.window.inner_size();
        app_state.resize(size.width, size.height);
        for flow in self.graphics_flows.iter_mut() {
            let out = flow.on_init(&mut app_state.ctx, &mut app_state.state);
            handle_flow_output(
                #[cfg(target_arch = "wasm32")]
                &self.proxy,
                #[cfg(not(target_arch = "wasm32"))]
                &mut self.pending,
                out,
            );
        }
        app_state.ctx.window.request_redraw();
    }

    /// Resolves finished futures into events for the next `user_event` round.
    #[cfg(not(target_arch = "wasm32"))]
    fn poll_pending(&mut self) {
        use std::task::{Context as TaskContext, Poll};

        if self.pending.is_empty() {
            return;
        }
        // IO futures (reqwest, tokio::fs) need the runtime's reactor
        let _guard = self.async_runtime.enter();
        let mut cx = TaskContext::from_waker(futures::task::noop_waker_ref());
        let mut ready = Vec::new();
        self.pending.retain_mut(|fut| match fut.as_mut().poll(&mut cx) {
            Poll::Ready(event) => {
                ready.push(event);
                false
            }
            Poll::Pending => true,
        });
        for event in ready {
            if let Err(e) = self.proxy.send_event(event) {
                log::error!("Event loop was closed before all events could be processed: {e}");
            }
        }
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        #[cfg(not(target_arch = "wasm32"))]
        self.poll_pending();

        let Some(state) = self.state.as_mut() else {
            return;
        };
        let dt: Duration = self.last_time.elapsed();
        self.last_time = Instant::now();

        for flow in self.graphics_flows.iter_mut() {
            let out = flow.on_update(&state.ctx, &mut state.state, dt);
            handle_flow_output(
                #[cfg(target_arch = "wasm32")]
                &self.proxy,
                #[cfg(not(target_arch = "wasm32"))]
                &mut self.pending,
                out,
            );
        }

        let rendered = state.render(&self.graphics_flows);
        // The next frame is scheduled by the one before it
        state.ctx.window.request_redraw();
        match rendered {
            Ok(()) => {}
            // Reconfigure the surface if it's lost or outdated
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = state.ctx.window.inner_size();
                state.resize(size.width, size.height);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                self.fail(event_loop, anyhow::anyhow!("the GPU ran out of memory"))
            }
            Err(e) => log::error!("Unable to render {}", e),
        }
    }
}

impl<State: 'static + Default, Event: 'static> ApplicationHandler<FlowEvent<State, Event>>
    for App<State, Event>
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let Some(constructors) = self.constructors.take() else {
            return;
        };
        let window = match self
            .window_attributes()
            .and_then(|attributes| Ok(event_loop.create_window(attributes)?))
        {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.context("cannot create the window")),
        };

        let init_future = async move {
            let app_state = AppState::new(window).await?;
            let flow_futures: Vec<_> = constructors
                .into_iter()
                .map(|constructor| constructor((&app_state.ctx).into()))
                .collect();
            let flows: Vec<_> = futures::future::join_all(flow_futures).await;
            anyhow::Ok((app_state, flows))
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(init_future) {
                Ok((app_state, flows)) => {
                    self.state = Some(app_state);
                    self.graphics_flows = flows;
                    self.init_flows();
                }
                Err(e) => self.fail(event_loop, e.context("cannot create the main context")),
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let event = match init_future.await {
                    Ok((state, flows)) => FlowEvent::Initialized { state, flows },
                    Err(e) => FlowEvent::Failed(e.context("cannot create the main context")),
                };
                if proxy.send_event(event).is_err() {
                    log::error!("the event loop closed during initialisation");
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FlowEvent<State, Event>) {
        match event {
            FlowEvent::Initialized { state, flows } => {
                self.state = Some(state);
                self.graphics_flows = flows;
                self.init_flows();
            }
            FlowEvent::Custom(custom_event) => {
                if let Some(state) = &mut self.state {
                    let result = self
                        .graphics_flows
                        .iter_mut()
                        .fold(Some(custom_event), |event, flow| {
                            flow.on_custom_events(&state.ctx, &mut state.state, event?)
                        });
                    if result.is_some() {
                        log::warn!("Warning! Custom event was not consumed this cycle");
                    }
                }
            }
            FlowEvent::Failed(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };

        if let WindowEvent::CursorMoved { position, .. } = &event {
            state.ctx.mouse.coords = *position;
        }

        for flow in self.graphics_flows.iter_mut() {
            let out = flow.on_window_events(&state.ctx, &mut state.state, &event);
            handle_flow_output(
                #[cfg(target_arch = "wasm32")]
                &self.proxy,
                #[cfg(not(target_arch = "wasm32"))]
                &mut self.pending,
                out,
            );
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => self.frame(event_loop),
            _ => {}
        }
    }
}

fn handle_flow_output<State, Event>(
    #[cfg(target_arch = "wasm32")] proxy: &EventLoopProxy<FlowEvent<State, Event>>,
    #[cfg(not(target_arch = "wasm32"))] pending: &mut Vec<PendingEvent<State, Event>>,
    out: Out<Event>,
) where
    State: 'static,
    Event: 'static,
{
    // Resolved futures always come back through the event loop, never mid-frame
    let events: Vec<PendingEvent<State, Event>> = match out {
        Out::FutEvent(futures) => futures
            .into_iter()
            .map(|fut| -> PendingEvent<State, Event> {
                Box::pin(async move { FlowEvent::Custom(Pin::from(fut).await) })
            })
            .collect(),
        Out::Empty => return,
    };

    #[cfg(not(target_arch = "wasm32"))]
    pending.extend(events);

    #[cfg(target_arch = "wasm32")]
    for fut in events {
        let proxy = proxy.clone();
        wasm_bindgen_futures::spawn_local(async move {
            if proxy.send_event(fut.await).is_err() {
                log::error!("Event loop was closed before all events could be processed.");
            }
        });
    }
}

/// Opens the window (or mounts the canvas) and runs `constructors` until the window closes.
pub fn run<State: 'static + Default, Event: 'static>(
    launch: Launch,
    constructors: Vec<FlowConstructor<State, Event>>,
) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        // A second scene on the same page finds the logger already installed
        let _ = console_log::init_with_level(log::Level::Info);
    }

    let event_loop: EventLoop<FlowEvent<State, Event>> = EventLoop::with_user_event().build()?;
    #[allow(unused_mut)]
    let mut app: App<State, Event> = App::new(&event_loop, launch, constructors)?;

    #[cfg(not(target_arch = "wasm32"))]
    {
        event_loop.run_app(&mut app)?;
        match app.failure.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    #[cfg(target_arch = "wasm32")]
    {
        use winit::platform::web::EventLoopExtWebSys;

        event_loop.spawn_app(app);
        Ok(())
    }
}

use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::context::GpuContext;
use crate::core::{App as CoreApp, AppControl, FrameCtx, SetupCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::render::Scheduler;
use crate::time::FrameClock;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "prism".to_string(),
            initial_size: LogicalSize::new(800.0, 600.0),
        }
    }
}

/// Runtime requests made from a frame callback.
///
/// Applied after the callback returns.
#[derive(Debug, Default)]
pub struct RuntimeCtx {
    exit: bool,
}

impl RuntimeCtx {
    pub fn exit(&mut self) {
        self.exit = true;
    }
}

/// [`Scheduler`] backed by `Window::request_redraw`.
///
/// Requests are collected during callbacks and turned into one redraw when
/// the event loop is about to wait.
#[derive(Debug, Default)]
struct RedrawScheduler {
    pending: bool,
}

impl RedrawScheduler {
    fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

impl Scheduler for RedrawScheduler {
    fn request_frame(&mut self) {
        self.pending = true;
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens one window, runs `app` in it and returns when the window closes.
    ///
    /// Fails if the window, the GPU or `App::setup` fails.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    clock: FrameClock,
    scheduler: RedrawScheduler,

    window: Window,

    #[borrows(window)]
    #[covariant]
    render: GpuContext<'this>,
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    entry: Option<WindowEntry>,
    failure: Option<anyhow::Error>,
    exit_requested: bool,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            entry: None,
            failure: None,
            exit_requested: false,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure = Some(err);
        self.exit_requested = true;
        event_loop.exit();
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<WindowEntry> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();

        let mut entry = WindowEntryTryBuilder {
            clock: FrameClock::default(),
            scheduler: RedrawScheduler::default(),
            window,
            render_builder: |w| {
                pollster::block_on(Gpu::new(w, gpu_init))
                    .map(GpuContext::new)
                    .context("GPU initialization failed for window")
            },
        }
        .try_build()?;

        let app = &mut self.app;
        entry.with_mut(|fields| {
            let mut ctx = SetupCtx {
                window: WindowCtx {
                    id: fields.window.id(),
                    window: fields.window,
                },
                render: fields.render,
                scheduler: fields.scheduler,
            };
            app.setup(&mut ctx)
        })
        .context("sample setup failed")?;

        // Clock starts once setup is done, so the first frame sees ~0 elapsed.
        entry.with_clock_mut(|clock| clock.reset());
        entry.with_window(|w| w.request_redraw());
        Ok(entry)
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };

        entry.with_render_mut(|render| render.resize(new_size));
        if new_size.width > 0 && new_size.height > 0 {
            self.app
                .on_resize(new_size.width as f32 / new_size.height as f32);
        }
        entry.with_window(|w| w.request_redraw());
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.exit_requested {
            return;
        }

        match self.create_window_entry(event_loop) {
            Ok(entry) => self.entry = Some(entry),
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Redraw only on request; static samples stay idle until exposed.
        if let Some(entry) = self.entry.as_mut() {
            entry.with_mut(|fields| {
                if fields.scheduler.take() {
                    fields.window.request_redraw();
                }
            });
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        // Split borrows to avoid `self` capture inside `ouroboros` closures.
        let (app, entry) = (&mut self.app, &mut self.entry);
        let Some(entry) = entry.as_mut().filter(|e| e.borrow_window().id() == window_id) else {
            return;
        };

        let control = entry.with_scheduler_mut(|scheduler| app.on_window_event(&event, scheduler));
        if control == AppControl::Exit {
            self.exit_requested = true;
            event_loop.exit();
            return;
        }

        match &event {
            WindowEvent::CloseRequested => {
                self.entry = None;
                self.exit_requested = true;
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => self.resize(*new_size),

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = entry.with_window(|w| w.inner_size());
                self.resize(new_size);
            }

            WindowEvent::RedrawRequested => {
                let mut runtime_ctx = RuntimeCtx::default();
                let mut control = AppControl::Continue;

                entry.with_mut(|fields| {
                    let time = fields.clock.tick();
                    let mut ctx = FrameCtx {
                        window: WindowCtx {
                            id: window_id,
                            window: fields.window,
                        },
                        render: fields.render,
                        time,
                        scheduler: fields.scheduler,
                        runtime: &mut runtime_ctx,
                    };
                    control = app.on_frame(&mut ctx);
                });

                if control == AppControl::Exit || runtime_ctx.exit {
                    self.exit_requested = true;
                    event_loop.exit();
                }
            }

            _ => {}
        }
    }
}

use std::ops::ControlFlow;
use std::time::{Duration, Instant};

use anyhow::Context;
use prism_engine::core::{App, AppControl, FrameCtx, SetupCtx};
use prism_engine::render::{RenderLoop, Scheduler};
use prism_engine::setup::ShaderLibrary;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::scene::{Sample, Scene};

/// Hosts one [`Scene`] in the runtime.
///
/// Static scenes redraw whenever the host asks (exposure, resize). Animated
/// scenes run a [`RenderLoop`] that requests the next frame after each tick.
/// Space pauses and resumes the animation, Escape quits.
pub struct SampleApp {
    sample: Sample,
    shaders: ShaderLibrary,
    scene: Option<Box<dyn Scene>>,
    render_loop: RenderLoop,

    /// Total time spent paused; subtracted from the clock's elapsed time.
    paused_for: Duration,
    paused_since: Option<Instant>,
    /// Pose drawn by the last tick, redrawn while paused.
    last_pose: Duration,
}

impl SampleApp {
    pub fn new(sample: Sample, shaders: ShaderLibrary) -> Self {
        Self {
            sample,
            shaders,
            scene: None,
            render_loop: RenderLoop::new(),
            paused_for: Duration::ZERO,
            paused_since: None,
            last_pose: Duration::ZERO,
        }
    }

    fn toggle_pause(&mut self, scheduler: &mut dyn Scheduler) {
        if !self.scene.as_ref().is_some_and(|s| s.is_animated()) {
            return;
        }

        if self.render_loop.is_running() {
            self.render_loop.stop();
            self.paused_since = Some(Instant::now());
            log::info!("paused at {:.2}s", self.last_pose.as_secs_f32());
        } else {
            if let Some(since) = self.paused_since.take() {
                self.paused_for += since.elapsed();
            }
            self.render_loop.start(scheduler);
            log::info!("resumed");
        }
    }
}

impl App for SampleApp {
    fn setup(&mut self, ctx: &mut SetupCtx<'_, '_>) -> anyhow::Result<()> {
        let scene = self
            .sample
            .build(&mut *ctx.render, &self.shaders, ctx.window.aspect_ratio())
            .with_context(|| format!("failed to set up `{}`", self.sample.name()))?;

        if scene.is_animated() {
            self.render_loop.start(&mut *ctx.scheduler);
        }

        log::info!("{} ready", self.sample.name());
        self.scene = Some(scene);
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let Some(scene) = self.scene.as_mut() else {
            return AppControl::Continue;
        };

        let pose = ctx.time.elapsed.saturating_sub(self.paused_for);
        let render_loop = &mut self.render_loop;
        let last_pose = &mut self.last_pose;

        ctx.render(|gpu, scheduler| {
            if !scene.is_animated() {
                scene.draw(gpu, Duration::ZERO);
                return;
            }

            let ticked = render_loop.tick(pose, scheduler, |elapsed| {
                scene.draw(gpu, elapsed);
                *last_pose = elapsed;
                ControlFlow::Continue(())
            });

            if !ticked {
                scene.draw(gpu, *last_pose);
            }
        })
    }

    fn on_window_event(&mut self, event: &WindowEvent, scheduler: &mut dyn Scheduler) -> AppControl {
        let WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    physical_key: PhysicalKey::Code(code),
                    state: ElementState::Pressed,
                    repeat: false,
                    ..
                },
            ..
        } = event
        else {
            return AppControl::Continue;
        };

        match code {
            KeyCode::Escape => AppControl::Exit,
            KeyCode::Space => {
                self.toggle_pause(scheduler);
                AppControl::Continue
            }
            _ => AppControl::Continue,
        }
    }

    fn on_resize(&mut self, aspect: f32) {
        if let Some(scene) = self.scene.as_mut() {
            scene.set_aspect(aspect);
        }
    }
}

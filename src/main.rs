use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use simview::{controller, logging, model, view};

use controller::{DampingHook, InputEvent, MouseButton, PointMassEngine, Viewer, DEFAULT_FRAME_BUDGET};
use model::Mechanism;
use view::{GpuContext, SceneRenderer};

/// Interactive viewer for stepped point-mass simulations.
#[derive(Parser)]
#[command(name = "simview", version)]
struct Args {
    /// Path to the mechanism JSON file
    model: PathBuf,

    /// Simulated seconds advanced per rendered frame
    #[arg(long, default_value_t = DEFAULT_FRAME_BUDGET)]
    frame_budget: f64,

    /// Gain of the default damping controller
    #[arg(long, default_value_t = 0.1)]
    damping: f64,
}

struct App {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    window: Arc<Window>,

    renderer: SceneRenderer,
    viewer: Viewer,

    // Most recent pointer position; winit button events do not carry one.
    cursor: (f64, f64),
}

impl App {
    async fn new(window: Arc<Window>, viewer: Viewer) -> Self {
        let size = window.inner_size();
        let gpu = GpuContext::new(window.clone(), size.width, size.height).await;

        let renderer = SceneRenderer::new(
            &gpu.device,
            gpu.format,
            size.width,
            size.height,
            viewer.model.bodies.len(),
        );

        Self {
            surface: gpu.surface,
            device: gpu.device,
            queue: gpu.queue,
            config: gpu.config,
            size,
            window,
            renderer,
            viewer,
            cursor: (0.0, 0.0),
        }
    }

    /// Translates a winit window event into a queued viewer event.
    fn input(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Backspace),
                        ..
                    },
                ..
            } => {
                self.viewer.push_event(InputEvent::ResetPressed);
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.viewer.push_event(InputEvent::Modifiers {
                    shift: modifiers.state().shift_key(),
                });
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    winit::event::MouseButton::Left => MouseButton::Left,
                    winit::event::MouseButton::Middle => MouseButton::Middle,
                    winit::event::MouseButton::Right => MouseButton::Right,
                    _ => return,
                };
                self.viewer.push_event(InputEvent::Button {
                    button,
                    pressed: *state == ElementState::Pressed,
                    x: self.cursor.0,
                    y: self.cursor.1,
                });
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x, position.y);
                self.viewer.push_event(InputEvent::CursorMoved {
                    x: position.x,
                    y: position.y,
                });
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y as f64,
                    MouseScrollDelta::PixelDelta(pos) => pos.y / 50.0,
                };
                self.viewer.push_event(InputEvent::Scroll { y });
            }
            _ => {}
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.renderer.resize(&self.device, new_size.width, new_size.height);
        }
    }

    /// One frame: drain input, run the scheduler for one budget, refresh the
    /// scene snapshot, draw, present.
    fn frame(&mut self) -> Result<(), simview::controller::EngineError> {
        self.viewer.process_events(self.size.height as f64);
        self.viewer.advance_frame()?;
        self.renderer.update_scene(
            &self.queue,
            &self.viewer.model,
            &self.viewer.state,
            &self.viewer.rig,
            (self.config.width, self.config.height),
        );
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    logging::init();
    let args = Args::parse();

    let (mechanism, state) = Mechanism::load(&args.model)
        .with_context(|| format!("cannot load model {}", args.model.display()))?;

    let viewer = Viewer::new(
        mechanism,
        state,
        Box::new(PointMassEngine::new()),
        args.frame_budget,
        Box::new(DampingHook::new(args.damping)),
    );

    let event_loop = EventLoop::new()?;
    let window_attributes = Window::default_attributes()
        .with_title("simview")
        .with_inner_size(winit::dpi::LogicalSize::new(1200, 900));
    let window = Arc::new(event_loop.create_window(window_attributes)?);

    let mut app = pollster::block_on(App::new(window.clone(), viewer));

    let engine_fault = Rc::new(Cell::new(false));
    let fault_flag = engine_fault.clone();

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent {
            ref event,
            window_id,
        } if window_id == app.window.id() => {
            app.input(event);
            match event {
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::Resized(physical_size) => {
                    app.resize(*physical_size);
                }
                WindowEvent::RedrawRequested => {
                    if let Err(e) = app.frame() {
                        tracing::error!("{e}");
                        fault_flag.set(true);
                        elwt.exit();
                        return;
                    }
                    match app.renderer.draw(&app.device, &app.queue, &app.surface) {
                        Ok(_) => {}
                        Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                            app.resize(app.size)
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            tracing::error!("surface out of memory");
                            fault_flag.set(true);
                            elwt.exit();
                        }
                        Err(e) => tracing::warn!("{e:?}"),
                    }
                }
                _ => {}
            }
        }
        Event::AboutToWait => {
            app.window.request_redraw();
        }
        _ => {}
    })?;

    if engine_fault.get() {
        anyhow::bail!("viewer stopped after an unrecoverable engine fault");
    }
    Ok(())
}

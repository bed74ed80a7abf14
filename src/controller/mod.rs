// CONTROLLER: input handling, camera manipulation, stepping, orchestration
pub mod camera_controller;
pub mod control;
pub mod frame_loop;
pub mod input;
pub mod physics;

pub use camera_controller::{CameraAction, CameraController};
pub use control::{ControlHook, DampingHook, NullHook};
pub use frame_loop::{FrameScheduler, Viewer, DEFAULT_FRAME_BUDGET};
pub use input::{InputAction, InputEvent, InputState, MouseButton};
pub use physics::{EngineError, PhysicsEngine, PointMassEngine};

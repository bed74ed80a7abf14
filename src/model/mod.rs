// MODEL: mechanism description, simulation state, and camera data
pub mod camera;
pub mod mechanism;

pub use camera::CameraRig;
pub use mechanism::{Body, LoadError, Mechanism, SimState};

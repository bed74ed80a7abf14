pub mod logging;
pub mod utils;

// MVC Architecture
pub mod controller;
pub mod model;
pub mod view;

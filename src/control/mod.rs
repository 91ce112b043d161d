pub mod camera_controller;
pub mod easing;
pub mod labels;
pub mod picking;
pub mod state;

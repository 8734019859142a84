//! pyrite: a small interactive 3D renderer built around bindable GPU
//! resources. Drawables are flat lists of shared bindables resolved through
//! an identity cache; models compose drawables under a transform hierarchy.

pub mod app;
pub mod bindable;
pub mod camera;
pub mod drawable;
pub mod gfx;
pub mod logging;
pub mod model;
pub mod renderer;
pub mod scene;

pub mod camera;
pub mod engine;
pub mod frame;
pub mod painter;
pub mod scene;

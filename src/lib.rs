pub mod app;
pub mod hex;
pub mod hive;
pub mod interact;
pub mod render;
pub mod ui;

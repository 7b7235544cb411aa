pub mod detail;
pub mod integration;
pub mod settings;
pub mod style;
pub mod thumbnails;
pub mod tooltip;

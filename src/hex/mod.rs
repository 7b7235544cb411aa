pub mod coords;
pub mod layout;
pub mod scatter;
pub mod spiral;
pub mod tile;

//! Page interaction state: navigation dropdowns and the image-tile grid.

pub mod nav;
pub mod tiles;

pub use nav::DropdownNav;
pub use tiles::{Tile, TileEvent, TileGrid};

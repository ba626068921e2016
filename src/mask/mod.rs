/// Masking surface
///
/// This module handles:
/// - The two-layer surface (scaled base image + stroke overlay)
/// - Paint/erase stroke rasterization
/// - Exporting the overlay as a binary mask image

pub mod raster;
pub mod surface;

pub use raster::Point;
pub use surface::{MaskSurface, Tool};

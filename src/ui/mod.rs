/// User interface module
///
/// - The masking canvas interaction layer (mask_canvas.rs)
/// - Screen layouts for each application state (screens.rs)

pub mod mask_canvas;
pub mod screens;

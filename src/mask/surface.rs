use image::imageops::FilterType;
use image::{DynamicImage, Rgba, RgbaImage};
use tracing::{debug, info, warn};

use super::raster::{self, Blend, Point};
use crate::codec::CodecError;
use crate::state::data::PortableImage;

/// Brush width bounds in display pixels
pub const MIN_BRUSH_WIDTH: f32 = 5.0;
pub const MAX_BRUSH_WIDTH: f32 = 100.0;
pub const DEFAULT_BRUSH_WIDTH: f32 = 20.0;

/// rgba(251, 191, 36, 0.5)
pub const HIGHLIGHT: Rgba<u8> = Rgba([251, 191, 36, 128]);

/// Name given to every exported mask
pub const MASK_FILE_NAME: &str = "mask.png";

/// Drawing mode, selected by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Paint,
    Erase,
}

/// Base image and stroke overlay, always the same size
#[derive(Debug)]
struct Layers {
    base: RgbaImage,
    overlay: RgbaImage,
    scale: f32,
}

/// Two-layer masking surface
///
/// Holds the scaled base image and a stroke overlay. Strokes are rasterized
/// into the overlay as they arrive and can only be removed by erasing or by
/// clearing the whole overlay.
#[derive(Debug)]
pub struct MaskSurface {
    layers: Option<Layers>,
    tool: Tool,
    brush_width: f32,
    /// Last point of the active stroke (None when not stroking)
    last_point: Option<Point>,
    /// Bumped on every overlay change so views can rebuild their handles
    revision: u64,
}

impl Default for MaskSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl MaskSurface {
    pub fn new() -> Self {
        Self {
            layers: None,
            tool: Tool::default(),
            brush_width: DEFAULT_BRUSH_WIDTH,
            last_point: None,
            revision: 0,
        }
    }

    /// Display scale for an image of `natural_width` inside `container_width`.
    ///
    /// Never upscales.
    pub fn display_scale(natural_width: u32, container_width: f32) -> f32 {
        if natural_width == 0 {
            return 1.0;
        }
        (container_width.max(0.0) / natural_width as f32).min(1.0)
    }

    /// Decode `image` and size both layers for `container_width`.
    ///
    /// Any previous overlay is discarded.
    pub fn initialize(&mut self, image: &PortableImage, container_width: f32) -> Result<(), CodecError> {
        let decoded = image.decode()?;
        self.initialize_with(&decoded, container_width);
        info!(
            "🖌️  Masking surface ready for {} ({}x{} display)",
            image.name,
            self.size().map(|s| s.0).unwrap_or(0),
            self.size().map(|s| s.1).unwrap_or(0)
        );
        Ok(())
    }

    /// Same as [`initialize`](Self::initialize) for already decoded pixels.
    pub fn initialize_with(&mut self, natural: &DynamicImage, container_width: f32) {
        let scale = Self::display_scale(natural.width(), container_width);
        let width = ((natural.width() as f32 * scale).floor() as u32).max(1);
        let height = ((natural.height() as f32 * scale).floor() as u32).max(1);

        let base = if (width, height) == (natural.width(), natural.height()) {
            natural.to_rgba8()
        } else {
            natural
                .resize_exact(width, height, FilterType::Triangle)
                .to_rgba8()
        };

        self.layers = Some(Layers {
            base,
            overlay: RgbaImage::new(width, height),
            scale,
        });
        self.last_point = None;
        self.revision += 1;
    }

    /// Drop both layers (back to the uninitialized state).
    pub fn unload(&mut self) {
        self.layers = None;
        self.last_point = None;
        self.revision += 1;
    }

    pub fn is_initialized(&self) -> bool {
        self.layers.is_some()
    }

    /// Display size of both layers
    pub fn size(&self) -> Option<(u32, u32)> {
        self.layers.as_ref().map(|l| l.overlay.dimensions())
    }

    pub fn scale(&self) -> Option<f32> {
        self.layers.as_ref().map(|l| l.scale)
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    pub fn brush_width(&self) -> f32 {
        self.brush_width
    }

    pub fn set_brush_width(&mut self, width: f32) {
        self.brush_width = width.clamp(MIN_BRUSH_WIDTH, MAX_BRUSH_WIDTH);
    }

    pub fn is_stroking(&self) -> bool {
        self.last_point.is_some()
    }

    /// Start a stroke at `point` (overlay-local coordinates).
    pub fn begin_stroke(&mut self, point: Point) {
        if self.layers.is_none() {
            return;
        }
        self.last_point = Some(point);
        self.draw_segment(point, point);
    }

    /// Extend the active stroke to `point`. Ignored when no stroke is active.
    pub fn continue_stroke(&mut self, point: Point) {
        let Some(last) = self.last_point else {
            return;
        };
        self.draw_segment(last, point);
        self.last_point = Some(point);
    }

    pub fn end_stroke(&mut self) {
        self.last_point = None;
    }

    /// Wipe the whole overlay in one step.
    pub fn clear(&mut self) {
        if let Some(layers) = self.layers.as_mut() {
            raster::clear(&mut layers.overlay);
            self.revision += 1;
            debug!("🧽 Mask cleared");
        }
    }

    fn draw_segment(&mut self, from: Point, to: Point) {
        let blend = match self.tool {
            Tool::Paint => Blend::Paint(HIGHLIGHT),
            Tool::Erase => Blend::Erase,
        };

        if let Some(layers) = self.layers.as_mut() {
            if raster::stroke_segment(&mut layers.overlay, from, to, self.brush_width, blend) {
                self.revision += 1;
            }
        }
    }

    /// Export the overlay as a binary black/white PNG mask.
    ///
    /// Returns `None` before initialization or when encoding fails.
    pub fn produce_mask(&self) -> Option<PortableImage> {
        let layers = self.layers.as_ref()?;
        let mask = raster::binary_mask(&layers.overlay);

        match PortableImage::from_png(MASK_FILE_NAME, &mask) {
            Ok(image) => Some(image),
            Err(e) => {
                warn!("⚠️  Mask export failed: {}", e);
                None
            }
        }
    }

    pub fn base_pixels(&self) -> Option<&RgbaImage> {
        self.layers.as_ref().map(|l| &l.base)
    }

    pub fn overlay_pixels(&self) -> Option<&RgbaImage> {
        self.layers.as_ref().map(|l| &l.overlay)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

//! Raster map canvas in Plate Carrée projection.
//!
//! A [`MapCanvas`] owns one RGBA frame. Backgrounds are painted once through a
//! [`BackgroundSource`], markers are drawn as they arrive, and [`MapRenderer::refresh`]
//! writes the current frame, including the label, as PNG.

pub mod background;
mod canvas;
pub mod color;
mod projection;
mod text;

pub use background::{BackgroundSource, SolidBackground, TileBackground};
pub use canvas::*;
pub use projection::*;
pub use text::{BoxStyle, FONT_CANDIDATES, load_font};
pub use image::{Rgba, RgbaImage};

use ab_glyph::{FontArc, PxScale};
use anyhow::{Context, Result};
use image::{Rgba, RgbaImage};
use imageproc::{
	drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size},
	rect::Rect,
};
use std::path::Path;

/// Font files tried in order when no font is configured.
pub const FONT_CANDIDATES: &[&str] = &[
	"/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
	"/usr/share/fonts/TTF/DejaVuSans.ttf",
	"/usr/share/fonts/dejavu/DejaVuSans.ttf",
	"/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
	"/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
	"/System/Library/Fonts/Supplemental/Arial.ttf",
	"/Library/Fonts/Arial.ttf",
	"C:\\Windows\\Fonts\\arial.ttf",
];

/// Loads the configured font, or the first readable entry of [`FONT_CANDIDATES`].
///
/// # Errors
///
/// Returns an error only if a configured font cannot be read or parsed.
pub fn load_font(configured: Option<&Path>) -> Result<Option<FontArc>> {
	if let Some(path) = configured {
		return read_font(path).map(Some);
	}

	for candidate in FONT_CANDIDATES {
		let path = Path::new(candidate);
		if !path.is_file() {
			continue;
		}
		match read_font(path) {
			Ok(font) => {
				log::debug!("using font '{}'", path.display());
				return Ok(Some(font));
			}
			Err(err) => log::debug!("{err:#}"),
		}
	}
	Ok(None)
}

fn read_font(path: &Path) -> Result<FontArc> {
	let data = std::fs::read(path).with_context(|| format!("Failed to read font '{}'", path.display()))?;
	FontArc::try_from_vec(data).with_context(|| format!("Failed to parse font '{}'", path.display()))
}

/// Colours of a boxed label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoxStyle {
	pub text: Rgba<u8>,
	pub face: Rgba<u8>,
	pub edge: Rgba<u8>,
}

/// Draws `text` in a padded box centred on `center`.
pub(crate) fn draw_text_box(
	image: &mut RgbaImage,
	font: &FontArc,
	text: &str,
	size_px: f32,
	center: (f64, f64),
	style: &BoxStyle,
) {
	let scale = PxScale::from(size_px);
	let (text_width, text_height) = text_size(scale, font, text);
	let pad = (0.3 * size_px).round() as u32;
	let box_width = text_width + 2 * pad;
	let box_height = text_height + 2 * pad;

	let x = (center.0 - f64::from(box_width) / 2.0).round() as i32;
	let y = (center.1 - f64::from(box_height) / 2.0).round() as i32;
	let rect = Rect::at(x, y).of_size(box_width.max(1), box_height.max(1));
	draw_filled_rect_mut(image, rect, style.face);
	draw_hollow_rect_mut(image, rect, style.edge);
	draw_text_mut(image, style.text, x + pad as i32, y + pad as i32, scale, font, text);
}

/// Draws `text` horizontally centred on `center_x` with its bottom edge at `bottom`.
pub(crate) fn draw_text_above(
	image: &mut RgbaImage,
	font: &FontArc,
	text: &str,
	size_px: f32,
	color: Rgba<u8>,
	center_x: f64,
	bottom: f64,
) {
	let scale = PxScale::from(size_px);
	let (width, height) = text_size(scale, font, text);
	let x = (center_x - f64::from(width) / 2.0).round() as i32;
	let y = (bottom - f64::from(height)).round() as i32;
	draw_text_mut(image, color, x, y, scale, font, text);
}

//! Colour parsing for config values.

use anyhow::{Result, bail};
use image::Rgba;

/// Parses a hex colour into an RGBA pixel.
///
/// Accepts `RGB`, `RGBA`, `RRGGBB` and `RRGGBBAA`, with or without a leading `#`.
/// Colours without alpha are opaque.
///
/// # Examples
///
/// ```
/// use image::Rgba;
/// use tweetmap_image::color::parse_color;
///
/// assert_eq!(parse_color("#FF0000").unwrap(), Rgba([255, 0, 0, 255]));
/// assert_eq!(parse_color("0F08").unwrap(), Rgba([0, 255, 0, 136]));
/// ```
pub fn parse_color(text: &str) -> Result<Rgba<u8>> {
	let hex = text.trim().trim_start_matches('#');
	if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
		bail!("Invalid colour '{text}': only hex digits are allowed");
	}

	let digits: Vec<u8> = match hex.len() {
		3 | 4 => hex.bytes().flat_map(|b| [b, b]).collect(),
		6 | 8 => hex.bytes().collect(),
		_ => bail!("Invalid colour '{text}': expected 3, 4, 6, or 8 hex characters"),
	};

	let mut channels = [255u8; 4];
	for (channel, pair) in channels.iter_mut().zip(digits.chunks(2)) {
		let pair = std::str::from_utf8(pair)?;
		*channel = u8::from_str_radix(pair, 16)?;
	}
	Ok(Rgba(channels))
}

/// Converts an opaque colour given as fractions in `[0, 1]`.
pub fn from_unit_rgb(r: f32, g: f32, b: f32) -> Rgba<u8> {
	let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
	Rgba([channel(r), channel(g), channel(b), 255])
}

/// Formats a colour as `#RRGGBB`, or `#RRGGBBAA` when it is not opaque.
pub fn to_hex(color: Rgba<u8>) -> String {
	let [r, g, b, a] = color.0;
	if a == 255 {
		format!("#{r:02X}{g:02X}{b:02X}")
	} else {
		format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
	}
}

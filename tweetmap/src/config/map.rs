use serde::Deserialize;
use std::path::{Path, PathBuf};
use tweetmap_core::GeoBBox;

#[derive(Debug, Default, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MapConfig {
	/// Visible extent `[x_min, y_min, x_max, y_max]`.
	pub extent: Option<GeoBBox>,

	/// Figure width in inches.
	pub width: Option<f64>,

	/// Figure height in inches.
	pub height: Option<f64>,

	pub dpi: Option<u32>,

	/// Text above the map. An empty string removes the preset title.
	pub title: Option<String>,

	/// PNG file rewritten on every refresh.
	pub output: Option<PathBuf>,

	/// TrueType font for the title and label.
	pub font: Option<PathBuf>,

	#[serde(default)]
	pub marker: MarkerConfig,

	#[serde(default)]
	pub label: LabelConfig,

	pub background: Option<BackgroundConfig>,
}

#[derive(Debug, Default, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MarkerConfig {
	/// Hex colour, e.g. `"#FF0000"`.
	pub color: Option<String>,
	/// Diameter in points.
	pub size: Option<f64>,
}

#[derive(Debug, Default, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LabelConfig {
	pub scale_x: Option<f64>,
	pub scale_y: Option<f64>,
}

/// Either a plain colour or raster tiles. With tiles, `color` fills what the tiles don't cover.
#[derive(Debug, Default, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BackgroundConfig {
	pub color: Option<String>,
	pub tiles: Option<TilesConfig>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TilesConfig {
	/// URL template with `{z}`, `{x}` and `{y}`.
	pub url: String,
	pub zoom: u8,
}

impl MapConfig {
	pub fn override_optional_output(&mut self, output: &Option<PathBuf>) {
		if output.is_some() {
			self.output = output.clone();
		}
	}
	pub fn override_optional_extent(&mut self, extent: &Option<GeoBBox>) {
		if extent.is_some() {
			self.extent = *extent;
		}
	}

	/// Makes relative file paths relative to `base`.
	pub fn resolve_paths(&mut self, base: &Path) {
		for path in [&mut self.output, &mut self.font].into_iter().flatten() {
			if path.is_relative() {
				*path = base.join(&*path);
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn parse_tiles_background() {
		let config: MapConfig = serde_yaml_ng::from_str(
			"background:\n  color: '#FFFFFF'\n  tiles: { url: 'https://t.example/{z}/{x}/{y}.jpg', zoom: 6 }\n",
		)
		.unwrap();
		assert_eq!(
			config.background,
			Some(BackgroundConfig {
				color: Some(String::from("#FFFFFF")),
				tiles: Some(TilesConfig {
					url: String::from("https://t.example/{z}/{x}/{y}.jpg"),
					zoom: 6
				})
			})
		);
		assert_eq!(config.marker, MarkerConfig::default());
	}

	#[test]
	fn rejects_unknown_fields() {
		assert!(serde_yaml_ng::from_str::<MapConfig>("marker: { colour: red }").is_err());
		assert!(serde_yaml_ng::from_str::<MapConfig>("zoom: 3").is_err());
	}

	#[test]
	fn resolves_relative_paths() {
		let mut config = MapConfig {
			output: Some(PathBuf::from("out/map.png")),
			font: Some(PathBuf::from("/fonts/a.ttf")),
			..MapConfig::default()
		};
		config.resolve_paths(Path::new("/etc/tweetmap"));
		assert_eq!(config.output, Some(PathBuf::from("/etc/tweetmap/out/map.png")));
		assert_eq!(config.font, Some(PathBuf::from("/fonts/a.ttf")));
	}

	#[test]
	fn overrides() {
		let mut config = MapConfig::default();
		config.override_optional_output(&Some(PathBuf::from("x.png")));
		config.override_optional_extent(&None);
		assert_eq!(config.output, Some(PathBuf::from("x.png")));
		assert_eq!(config.extent, None);
	}
}

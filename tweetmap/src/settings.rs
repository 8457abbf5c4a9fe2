use crate::{Preset, config::Config};
use anyhow::{Context, Result, bail, ensure};
use std::{path::PathBuf, time::Duration};
use tweetmap_core::GeoBBox;
use tweetmap_image::{
	BackgroundSource, CanvasOptions, MapCanvas, Rgba, SolidBackground, TileBackground, color::parse_color, load_font,
};
use tweetmap_stream::RetryPolicy;

/// What fills the map axes.
#[derive(Clone, Debug, PartialEq)]
pub enum Background {
	Solid(Rgba<u8>),
	Tiles { url: String, zoom: u8, fallback: Rgba<u8> },
}

/// Everything needed to open a canvas and a stream.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
	pub stream_url: String,
	pub locations: GeoBBox,
	pub retry: RetryPolicy,
	pub canvas: CanvasOptions,
	pub font: Option<PathBuf>,
	pub background: Background,
}

impl Settings {
	/// Starts from `preset` and applies every value set in `config`.
	pub fn resolve(preset: Preset, config: &Config) -> Result<Settings> {
		let mut settings = preset.settings()?;

		let stream = &config.stream;
		if let Some(url) = &stream.url {
			settings.stream_url = url.clone();
		}
		if let Some(locations) = stream.locations {
			settings.locations = locations;
		}
		if let Some(retry_count) = stream.retry_count {
			settings.retry.retry_count = retry_count;
		}
		if let Some(seconds) = stream.retry_delay_seconds {
			settings.retry.retry_delay = Duration::from_secs(seconds);
		}

		let map = &config.map;
		let canvas = &mut settings.canvas;
		if let Some(extent) = map.extent {
			canvas.extent = extent;
		}
		if let Some(width) = map.width {
			canvas.width = width;
		}
		if let Some(height) = map.height {
			canvas.height = height;
		}
		if let Some(dpi) = map.dpi {
			canvas.dpi = dpi;
		}
		if let Some(title) = &map.title {
			canvas.title = if title.is_empty() { None } else { Some(title.clone()) };
		}
		if let Some(output) = &map.output {
			canvas.output = output.clone();
		}
		if let Some(color) = &map.marker.color {
			canvas.marker.color = parse_color(color).context("Failed to parse 'map.marker.color'")?;
		}
		if let Some(size) = map.marker.size {
			ensure!(size > 0.0, "'map.marker.size' must be positive, got {size}");
			canvas.marker.size = size;
		}
		if let Some(scale_x) = map.label.scale_x {
			canvas.label.scale_x = scale_x;
		}
		if let Some(scale_y) = map.label.scale_y {
			canvas.label.scale_y = scale_y;
		}
		if map.font.is_some() {
			settings.font = map.font.clone();
		}

		if let Some(background) = &map.background {
			let color = background
				.color
				.as_deref()
				.map(parse_color)
				.transpose()
				.context("Failed to parse 'map.background.color'")?;
			settings.background = match (&background.tiles, color) {
				(Some(tiles), fallback) => Background::Tiles {
					url: tiles.url.clone(),
					zoom: tiles.zoom,
					fallback: fallback.unwrap_or(Rgba([255, 255, 255, 255])),
				},
				(None, Some(color)) => Background::Solid(color),
				(None, None) => bail!("'map.background' needs 'color' or 'tiles'"),
			};
		}

		Ok(settings)
	}

	/// Creates the canvas, paints its background and finishes its layout.
	///
	/// A background that cannot be painted (e.g. unreachable tile server) is logged and the
	/// map stays plain.
	pub async fn open_canvas(&self) -> Result<MapCanvas> {
		let font = load_font(self.font.as_deref())?;
		let mut canvas = MapCanvas::new(self.canvas.clone(), font)?;

		let source: Box<dyn BackgroundSource> = match &self.background {
			Background::Solid(color) => Box::new(SolidBackground::new(*color)),
			Background::Tiles { url, zoom, fallback } => {
				Box::new(TileBackground::new(url, *zoom)?.with_fallback(*fallback))
			}
		};
		if let Err(err) = canvas.add_background(source.as_ref()).await {
			log::warn!("{err:#}; continuing without background");
		}
		canvas.finish_layout();
		Ok(canvas)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use tweetmap_image::MapRenderer;

	fn resolve(preset: Preset, yaml: &str) -> Result<Settings> {
		Settings::resolve(preset, &Config::from_string(yaml).unwrap())
	}

	#[test]
	fn empty_config_keeps_preset() {
		assert_eq!(resolve(Preset::Japan, "").unwrap(), Preset::Japan.settings().unwrap());
		assert_eq!(resolve(Preset::Worldwide, "").unwrap(), Preset::Worldwide.settings().unwrap());
	}

	#[test]
	fn config_overrides_preset() {
		let settings = resolve(
			Preset::Japan,
			r##"
stream:
  url: "http://127.0.0.1:9/filter"
  retry_count: 2
  retry_delay_seconds: 0
map:
  dpi: 100
  title: "Japan"
  marker: { color: "#00F", size: 4 }
  label: { scale_y: 1.1 }
  background: { color: "#CCCCCC" }
"##,
		)
		.unwrap();

		assert_eq!(settings.stream_url, "http://127.0.0.1:9/filter");
		assert_eq!(
			settings.retry,
			RetryPolicy {
				retry_count: 2,
				retry_delay: Duration::ZERO
			}
		);
		assert_eq!(settings.locations, Preset::Japan.bbox().unwrap());
		assert_eq!(settings.canvas.dpi, 100);
		assert_eq!(settings.canvas.title.as_deref(), Some("Japan"));
		assert_eq!(settings.canvas.marker.color, Rgba([0, 0, 255, 255]));
		assert_eq!(settings.canvas.marker.size, 4.0);
		assert_eq!((settings.canvas.label.scale_x, settings.canvas.label.scale_y), (1.02, 1.1));
		assert_eq!(settings.background, Background::Solid(Rgba([204, 204, 204, 255])));
	}

	#[test]
	fn empty_title_removes_it() {
		let settings = resolve(Preset::Worldwide, "map:\n  title: ''").unwrap();
		assert_eq!(settings.canvas.title, None);
	}

	#[test]
	fn tiles_use_color_as_fallback() {
		let settings = resolve(
			Preset::Worldwide,
			"map:\n  background:\n    color: '#000'\n    tiles: { url: 'https://t/{z}/{x}/{y}.png', zoom: 2 }",
		)
		.unwrap();
		assert_eq!(
			settings.background,
			Background::Tiles {
				url: String::from("https://t/{z}/{x}/{y}.png"),
				zoom: 2,
				fallback: Rgba([0, 0, 0, 255])
			}
		);
	}

	#[test]
	fn invalid_values() {
		let err = resolve(Preset::Worldwide, "map:\n  marker: { color: red }").unwrap_err();
		assert_eq!(err.to_string(), "Failed to parse 'map.marker.color'");
		assert!(resolve(Preset::Worldwide, "map:\n  marker: { size: 0 }").is_err());
		assert!(resolve(Preset::Worldwide, "map:\n  background: {}").is_err());
	}

	#[tokio::test]
	async fn opens_canvas_with_solid_background() {
		let dir = tempfile::tempdir().unwrap();
		let mut settings = Preset::Worldwide.settings().unwrap();
		settings.canvas.output = dir.path().join("map.png");

		let mut canvas = settings.open_canvas().await.unwrap();
		assert_eq!(canvas.size(), (1350, 750));
		let (px, py) = canvas.viewport().to_pixel(0.0, 0.0);
		assert_eq!(*canvas.render().get_pixel(px as u32, py as u32), Rgba([164, 198, 227, 255]));
		canvas.refresh().unwrap();
		assert!(dir.path().join("map.png").is_file());

		canvas.plot_point(139.7, 35.7);
		assert_eq!(canvas.plotted(), 1);
		assert!(canvas.points().is_empty());
		assert!(canvas.set_extent(GeoBBox::world()).is_err());
	}
}

use crate::{Background, Settings};
use anyhow::Result;
use std::path::PathBuf;
use tweetmap_core::GeoBBox;
use tweetmap_image::{CanvasOptions, LabelStyle, Rgba};
use tweetmap_stream::{DEFAULT_STREAM_URL, RetryPolicy};

/// Stamen watercolor raster tiles.
pub const WATERCOLOR_TILES_URL: &str = "https://tiles.stadiamaps.com/tiles/stamen_watercolor/{z}/{x}/{y}.jpg";

const SEA: Rgba<u8> = Rgba([164, 198, 227, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Ready-made stream and map settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Preset {
	/// The whole world on a plain sea-coloured map
	#[default]
	Worldwide,
	/// Japan on watercolor tiles
	Japan,
}

impl Preset {
	/// Bounding box used both as stream filter and as map extent.
	pub fn bbox(self) -> Result<GeoBBox> {
		match self {
			Preset::Worldwide => Ok(GeoBBox::world()),
			Preset::Japan => GeoBBox::new(122.372118838, 29.9785169793, 150.0007330301, 42.4539733251),
		}
	}

	pub fn settings(self) -> Result<Settings> {
		let bbox = self.bbox()?;
		let (title, label, background) = match self {
			Preset::Worldwide => (
				Some(String::from("Tweet's around the world")),
				LabelStyle::default(),
				Background::Solid(SEA),
			),
			Preset::Japan => (
				None,
				LabelStyle {
					scale_x: 1.02,
					scale_y: 1.03,
					..LabelStyle::default()
				},
				Background::Tiles {
					url: String::from(WATERCOLOR_TILES_URL),
					zoom: 6,
					fallback: WHITE,
				},
			),
		};

		Ok(Settings {
			stream_url: String::from(DEFAULT_STREAM_URL),
			locations: bbox,
			retry: RetryPolicy::default(),
			canvas: CanvasOptions {
				extent: bbox,
				title,
				label,
				output: PathBuf::from("tweets.png"),
				..CanvasOptions::default()
			},
			font: None,
			background,
		})
	}
}

//! Tile coordinates in a Web Mercator pyramid
//!
//! Background imagery comes from XYZ raster tile servers. This module maps geographic
//! coordinates to tile indices and back, and enumerates the tiles that cover a
//! bounding box.
//!
//! # Examples
//!
//! ```
//! use tweetmap_core::TileCoord;
//!
//! let coord = TileCoord::new(5, 6, 7).unwrap();
//! assert_eq!(coord.level, 5);
//!
//! // Tokyo at zoom 6
//! let coord = TileCoord::from_geo(139.7, 35.7, 6).unwrap();
//! assert_eq!((coord.x, coord.y), (56, 25));
//! ```

use crate::{GeoBBox, types::geo_bbox::MAX_MERCATOR_LAT};
use anyhow::{Context, Result, ensure};
use std::{
	f64::consts::PI,
	fmt::{self, Debug},
};

/// A tile coordinate in a Web Mercator tile pyramid, with zoom level, x, and y indices.
#[derive(Eq, PartialEq, Clone, Hash, Copy)]
pub struct TileCoord {
	/// The zoom level of the tile.
	pub level: u8,
	/// The x index of the tile.
	pub x: u32,
	/// The y index of the tile.
	pub y: u32,
}

impl TileCoord {
	/// Create a new `TileCoord` at the given zoom `level` and tile indices `x`, `y`.
	///
	/// # Errors
	/// Returns an error if `level` > 31 or x/y are out of bounds for the level.
	pub fn new(level: u8, x: u32, y: u32) -> Result<TileCoord> {
		ensure!(level <= 31, "level ({level}) must be <= 31");
		let max = 2u64.pow(u32::from(level));
		ensure!(u64::from(x) < max, "x ({x}) out of bounds for level {level}");
		ensure!(u64::from(y) < max, "y ({y}) out of bounds for level {level}");
		Ok(TileCoord { level, x, y })
	}

	/// Fractional tile position of a geographic coordinate at zoom level `z`.
	///
	/// The integer part is the tile index, the fractional part the position inside
	/// the tile. Latitudes are clamped to the Web Mercator range.
	#[must_use]
	pub fn geo_to_position(x: f64, y: f64, z: u8) -> (f64, f64) {
		let zoom: f64 = 2.0f64.powi(i32::from(z));
		let y = y.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
		(
			zoom * (x / 360.0 + 0.5),
			zoom * (0.5 - 0.5 * (y * PI / 360.0 + PI / 4.0).tan().ln() / PI),
		)
	}

	/// Create a `TileCoord` from geographic coordinates (longitude, latitude) at a given zoom level.
	///
	/// # Errors
	///
	/// Returns an error if coordinates are out of valid ranges.
	pub fn from_geo(x: f64, y: f64, z: u8) -> Result<TileCoord> {
		ensure!(z <= 31, "z ({z}) must be <= 31");
		ensure!((-180.0..=180.0).contains(&x), "x ({x}) must be within [-180, 180]");
		ensure!((-90.0..=90.0).contains(&y), "y ({y}) must be within [-90, 90]");

		let zoom: f64 = 2.0f64.powi(i32::from(z));
		let (tx, ty) = TileCoord::geo_to_position(x, y, z);

		TileCoord::new(
			z,
			// clamped to the valid tile range
			tx.min(zoom - 1.0).max(0.0).floor() as u32,
			ty.min(zoom - 1.0).max(0.0).floor() as u32,
		)
		.with_context(|| format!("Failed to convert geo coordinates ({x}, {y}, {z}) to TileCoord"))
	}

	/// Convert tile coordinates to the geographic northwest corner `[longitude, latitude]`.
	///
	/// # Examples
	///
	/// ```
	/// use tweetmap_core::TileCoord;
	///
	/// let [lon, lat] = TileCoord::coord_to_geo(10, 1, 1020);
	/// assert_eq!(format!("{lon:.5}"), "-179.64844");
	/// assert_eq!(format!("{lat:.5}"), "-84.92832");
	/// ```
	#[must_use]
	pub fn coord_to_geo(level: u8, x: u32, y: u32) -> [f64; 2] {
		let zoom: f64 = 2.0f64.powi(i32::from(level));
		[
			(f64::from(x) / zoom - 0.5) * 360.0,
			((PI * (1.0 - 2.0 * f64::from(y) / zoom)).exp().atan() / PI - 0.25) * 360.0,
		]
	}

	/// Convert this tile coordinate to geographic longitude/latitude in degrees.
	#[must_use]
	pub fn as_geo(&self) -> [f64; 2] {
		TileCoord::coord_to_geo(self.level, self.x, self.y)
	}

	/// All tiles at `level` that intersect `bbox`, row by row from north to south.
	///
	/// # Errors
	///
	/// Returns an error if `level` > 31.
	pub fn covering(bbox: &GeoBBox, level: u8) -> Result<Vec<TileCoord>> {
		let mut bbox = *bbox;
		bbox.limit_to_mercator();
		let north_west = TileCoord::from_geo(bbox.x_min, bbox.y_max, level)?;
		let south_east = TileCoord::from_geo(bbox.x_max, bbox.y_min, level)?;

		let mut tiles = Vec::new();
		for y in north_west.y..=south_east.y {
			for x in north_west.x..=south_east.x {
				tiles.push(TileCoord { level, x, y });
			}
		}
		Ok(tiles)
	}

	/// Substitute `{z}`, `{x}` and `{y}` in a tile URL template.
	///
	/// # Examples
	///
	/// ```
	/// use tweetmap_core::TileCoord;
	///
	/// let coord = TileCoord::new(6, 56, 25).unwrap();
	/// assert_eq!(coord.fill_template("https://tiles/{z}/{x}/{y}.jpg"), "https://tiles/6/56/25.jpg");
	/// ```
	#[must_use]
	pub fn fill_template(&self, template: &str) -> String {
		template
			.replace("{z}", &self.level.to_string())
			.replace("{x}", &self.x.to_string())
			.replace("{y}", &self.y.to_string())
	}
}

impl Debug for TileCoord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "TileCoord({}, [{}, {}])", self.level, self.x, self.y)
	}
}

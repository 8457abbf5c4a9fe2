use crate::GeoPoint;
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::fmt::Debug;

pub const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;
const MAX_MERCATOR_LNG: f64 = 180.0;

/// A geographical bounding box (`GeoBBox`) represents a rectangular area on a map
/// defined by its minimum and maximum longitude (x) and latitude (y) coordinates.
///
/// The bounding box is defined by four `f64` values:
/// - `x_min` (west): Minimum longitude.
/// - `y_min` (south): Minimum latitude.
/// - `x_max` (east): Maximum longitude.
/// - `y_max` (north): Maximum latitude.
///
/// It is used twice: as the `locations` filter sent once when a stream is opened,
/// and as the visible extent of a map canvas.
///
/// # Examples
///
/// ```
/// use tweetmap_core::GeoBBox;
///
/// let bbox = GeoBBox::new(-10.0, -5.0, 10.0, 5.0).unwrap();
/// assert_eq!(bbox.as_tuple(), (-10.0, -5.0, 10.0, 5.0));
/// assert_eq!(bbox.as_string_list(), "-10,-5,10,5");
/// ```
#[derive(Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "Vec<f64>")]
#[allow(clippy::manual_non_exhaustive)]
pub struct GeoBBox {
	pub x_min: f64,
	pub y_min: f64,
	pub x_max: f64,
	pub y_max: f64,
	phantom: (),
}

impl GeoBBox {
	/// Creates a new `GeoBBox` from four `f64` values:
	/// `west, south, east, north`.
	///
	/// # Errors
	///
	/// Returns an error if a longitude lies outside `[-180, 180]`, a latitude outside
	/// `[-90, 90]`, or a minimum is larger than its maximum.
	#[must_use = "GeoBBox::new returns a Result; handle the error or unwrap"]
	pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Result<GeoBBox> {
		GeoBBox {
			x_min,
			y_min,
			x_max,
			y_max,
			phantom: (),
		}
		.checked()
	}

	/// The whole world, `[-180, -90, 180, 90]`.
	#[must_use]
	pub fn world() -> GeoBBox {
		GeoBBox {
			x_min: -180.0,
			y_min: -90.0,
			x_max: 180.0,
			y_max: 90.0,
			phantom: (),
		}
	}

	/// Clamps the bounding box *in‑place* to the latitude/longitude limits of the
	/// Web Mercator projection.
	///
	/// # Examples
	/// ```
	/// use tweetmap_core::GeoBBox;
	///
	/// let mut bbox = GeoBBox::world();
	/// bbox.limit_to_mercator();
	/// assert_eq!(
	///     bbox.as_tuple(),
	///     (-180.0, -85.05112877980659, 180.0, 85.05112877980659)
	/// );
	/// ```
	pub fn limit_to_mercator(&mut self) {
		self.x_min = self.x_min.clamp(-MAX_MERCATOR_LNG, MAX_MERCATOR_LNG);
		self.y_min = self.y_min.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
		self.x_max = self.x_max.clamp(-MAX_MERCATOR_LNG, MAX_MERCATOR_LNG);
		self.y_max = self.y_max.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
	}

	/// Returns the bounding box as a fixed‑size array `[f64; 4]` in the order
	/// `[west, south, east, north]`.
	#[must_use]
	pub fn as_array(&self) -> [f64; 4] {
		[self.x_min, self.y_min, self.x_max, self.y_max]
	}

	/// Returns the bounding box as a tuple `(x_min, y_min, x_max, y_max)`.
	#[must_use]
	pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
		(self.x_min, self.y_min, self.x_max, self.y_max)
	}

	/// Returns the bounding box as a string in the form `x_min,y_min,x_max,y_max`.
	///
	/// This is the wire format of the `locations` stream parameter.
	#[must_use]
	pub fn as_string_list(&self) -> String {
		format!("{},{},{},{}", self.x_min, self.y_min, self.x_max, self.y_max)
	}

	/// Width in degrees of longitude.
	#[must_use]
	pub fn width(&self) -> f64 {
		self.x_max - self.x_min
	}

	/// Height in degrees of latitude.
	#[must_use]
	pub fn height(&self) -> f64 {
		self.y_max - self.y_min
	}

	/// Returns `true` if the point lies inside or on the border of the bounding box.
	///
	/// # Examples
	/// ```
	/// use tweetmap_core::{GeoBBox, GeoPoint};
	///
	/// let bbox = GeoBBox::world();
	/// assert!(bbox.contains(&GeoPoint::new(139.7, 35.7).unwrap()));
	/// ```
	#[must_use]
	pub fn contains(&self, point: &GeoPoint) -> bool {
		point.x >= self.x_min && point.x <= self.x_max && point.y >= self.y_min && point.y <= self.y_max
	}

	fn checked(self) -> Result<Self> {
		ensure!(self.x_min >= -180., "x_min ({}) must be >= -180", self.x_min);
		ensure!(self.y_min >= -90., "y_min ({}) must be >= -90", self.y_min);
		ensure!(self.x_max <= 180., "x_max ({}) must be <= 180", self.x_max);
		ensure!(self.y_max <= 90., "y_max ({}) must be <= 90", self.y_max);
		ensure!(
			self.x_min <= self.x_max,
			"x_min ({}) must be <= x_max ({})",
			self.x_min,
			self.x_max
		);
		ensure!(
			self.y_min <= self.y_max,
			"y_min ({}) must be <= y_max ({})",
			self.y_min,
			self.y_max
		);
		Ok(self)
	}
}

impl Debug for GeoBBox {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"GeoBBox({}, {}, {}, {})",
			self.x_min, self.y_min, self.x_max, self.y_max
		)
	}
}

impl TryFrom<Vec<f64>> for GeoBBox {
	type Error = anyhow::Error;

	/// Attempts to build a `GeoBBox` from a `Vec<f64>` with exactly four elements
	/// `[west, south, east, north]`.
	fn try_from(input: Vec<f64>) -> Result<Self> {
		ensure!(
			input.len() == 4,
			"GeoBBox must have 4 elements (x_min, y_min, x_max, y_max)"
		);
		GeoBBox::new(input[0], input[1], input[2], input[3])
			.with_context(|| format!("Failed to convert {input:?} to GeoBBox"))
	}
}

impl TryFrom<[f64; 4]> for GeoBBox {
	type Error = anyhow::Error;

	fn try_from(input: [f64; 4]) -> Result<Self> {
		GeoBBox::new(input[0], input[1], input[2], input[3])
	}
}

impl TryFrom<&str> for GeoBBox {
	type Error = anyhow::Error;

	/// Parses `"lon_min,lat_min,lon_max,lat_max"`. Spaces and semicolons are accepted as separators too.
	///
	/// # Examples
	/// ```
	/// use tweetmap_core::GeoBBox;
	///
	/// let bbox = GeoBBox::try_from("-180,-90,180,90").unwrap();
	/// assert_eq!(bbox, GeoBBox::world());
	/// ```
	fn try_from(input: &str) -> Result<Self> {
		log::trace!("parsing bbox {input:?}");
		let values = input
			.split([' ', ',', ';'])
			.filter(|s| !s.is_empty())
			.map(|s| {
				s.parse::<f64>()
					.with_context(|| format!("bbox value {s:?} is not a number"))
			})
			.collect::<Result<Vec<f64>>>()?;
		GeoBBox::try_from(values)
	}
}

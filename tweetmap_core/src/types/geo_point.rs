use anyhow::{Result, bail, ensure};
use serde::Deserialize;
use std::fmt::{self, Debug};

/// A WGS84 position with `x` = longitude and `y` = latitude, both in degrees.
#[derive(Clone, Copy, PartialEq)]
pub struct GeoPoint {
	pub x: f64,
	pub y: f64,
}

impl GeoPoint {
	/// # Errors
	///
	/// Returns an error if a value is not finite or outside the WGS84 ranges.
	pub fn new(x: f64, y: f64) -> Result<GeoPoint> {
		ensure!(x.is_finite() && y.is_finite(), "coordinates ({x}, {y}) must be finite");
		ensure!((-180.0..=180.0).contains(&x), "longitude ({x}) must be within [-180, 180]");
		ensure!((-90.0..=90.0).contains(&y), "latitude ({y}) must be within [-90, 90]");
		Ok(GeoPoint { x, y })
	}

	#[must_use]
	pub fn as_tuple(&self) -> (f64, f64) {
		(self.x, self.y)
	}
}

impl Debug for GeoPoint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "GeoPoint({}, {})", self.x, self.y)
	}
}

/// GeoJSON point as it appears in the `coordinates` field of a post:
/// `{"type": "Point", "coordinates": [lon, lat]}`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct GeoJsonPoint {
	#[serde(rename = "type")]
	pub kind: String,
	pub coordinates: Vec<f64>,
}

impl TryFrom<&GeoJsonPoint> for GeoPoint {
	type Error = anyhow::Error;

	fn try_from(value: &GeoJsonPoint) -> Result<Self> {
		if value.kind != "Point" {
			bail!("expected GeoJSON type \"Point\", got {:?}", value.kind);
		}
		match value.coordinates.as_slice() {
			[x, y] => GeoPoint::new(*x, *y),
			other => bail!("a point needs exactly 2 coordinates, got {}", other.len()),
		}
	}
}

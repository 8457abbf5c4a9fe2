use crate::{GeoJsonPoint, GeoPoint};
use serde::Deserialize;

/// Author of a post, only the handle is kept.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct PostUser {
	#[serde(default)]
	pub screen_name: String,
}

/// One inbound post.
///
/// Only `coordinates` drives the map. `id`, `text` and `user` are kept for log lines.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct PostEvent {
	#[serde(default)]
	pub id: Option<u64>,
	#[serde(default)]
	pub text: Option<String>,
	#[serde(default)]
	pub user: Option<PostUser>,
	#[serde(default)]
	pub coordinates: Option<GeoJsonPoint>,
}

impl PostEvent {
	/// A post without any location.
	#[must_use]
	pub fn without_coordinates() -> PostEvent {
		PostEvent::default()
	}

	/// A post located at `(x, y)`.
	#[must_use]
	pub fn at(x: f64, y: f64) -> PostEvent {
		PostEvent {
			coordinates: Some(GeoJsonPoint {
				kind: String::from("Point"),
				coordinates: vec![x, y],
			}),
			..PostEvent::default()
		}
	}

	/// The exact location of the post, if it carries one.
	///
	/// A malformed coordinate object is treated as missing.
	#[must_use]
	pub fn point(&self) -> Option<GeoPoint> {
		let coordinates = self.coordinates.as_ref()?;
		match GeoPoint::try_from(coordinates) {
			Ok(point) => Some(point),
			Err(err) => {
				log::debug!("ignoring coordinates of post {:?}: {err:#}", self.id);
				None
			}
		}
	}

	/// Short human readable description: `@handle: text`.
	#[must_use]
	pub fn summary(&self) -> String {
		let handle = self.user.as_ref().map_or("?", |u| u.screen_name.as_str());
		let text = self.text.as_deref().unwrap_or("").replace('\n', " ");
		format!("@{handle}: {text}")
	}
}

use serde::Deserialize;
use tweetmap_core::GeoBBox;

#[derive(Debug, Default, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StreamConfig {
	/// Filter endpoint.
	pub url: Option<String>,

	/// Bounding box `[x_min, y_min, x_max, y_max]` sent as `locations`.
	pub locations: Option<GeoBBox>,

	/// Consecutive failed attempts before giving up.
	pub retry_count: Option<u32>,

	/// Pause between attempts.
	pub retry_delay_seconds: Option<u64>,
}

impl StreamConfig {
	pub fn override_optional_url(&mut self, url: &Option<String>) {
		if url.is_some() {
			self.url = url.clone();
		}
	}
	pub fn override_optional_locations(&mut self, locations: &Option<GeoBBox>) {
		if locations.is_some() {
			self.locations = *locations;
		}
	}
}

use super::{MapConfig, StreamConfig};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
	fs::File,
	io::{BufReader, Read},
	path::Path,
};
use tweetmap_stream::Credentials;

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
	/// OAuth 1.0a secrets
	#[serde(default)]
	pub credentials: Credentials,

	/// Stream subscription
	#[serde(default)]
	pub stream: StreamConfig,

	/// Map rendering
	#[serde(default)]
	pub map: MapConfig,
}

impl Config {
	pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
		Ok(serde_yaml_ng::from_reader(reader)?)
	}

	pub fn from_string(text: &str) -> Result<Self> {
		Ok(serde_yaml_ng::from_str(text)?)
	}

	/// Parses a file and resolves relative paths against its directory.
	pub fn from_path(path: &Path) -> Result<Self> {
		let file = File::open(path).with_context(|| format!("Failed to open config '{}'", path.display()))?;
		let mut cfg = Config::from_reader(BufReader::new(file))
			.with_context(|| format!("Failed to parse config '{}'", path.display()))?;

		if let Some(base) = path.parent() {
			cfg.map.resolve_paths(base);
		}
		Ok(cfg)
	}

	/// A commented example configuration.
	pub fn demo_yaml() -> &'static str {
		include_str!("demo.yml")
	}
}

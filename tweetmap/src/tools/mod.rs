pub mod config;
pub mod replay;
pub mod stream;

use anyhow::Result;
use std::path::PathBuf;
use tweetmap::{Preset, Settings, config::Config};

/// Options shared by every command that draws a map.
#[derive(clap::Args, Debug)]
pub struct MapArgs {
	/// Configuration file (YAML). Command line arguments override its settings.
	#[arg(short = 'c', long, value_name = "FILE", display_order = 0)]
	pub config: Option<PathBuf>,

	/// Built-in stream and map settings
	#[arg(short = 'p', long, value_enum, default_value_t = Preset::Worldwide, display_order = 0)]
	pub preset: Preset,

	/// PNG file the map is written to on every update
	#[arg(short = 'o', long, value_name = "FILE", display_order = 1)]
	pub output: Option<PathBuf>,
}

impl MapArgs {
	/// Loads the configuration file, if any, and applies the command line overrides.
	pub fn load_config(&self) -> Result<Config> {
		let mut config = if let Some(config_path) = &self.config {
			Config::from_path(config_path)?
		} else {
			Config::default()
		};
		config.map.override_optional_output(&self.output);
		Ok(config)
	}

	pub fn resolve(&self, config: &Config) -> Result<Settings> {
		Settings::resolve(self.preset, config)
	}
}

//! # tweetmap
//!
//! Plots geotagged posts from a location-filtered stream on a live map.
//!
//! - [`config`]: the YAML configuration file
//! - [`Preset`]: ready-made map and stream settings, `worldwide` and `japan`
//! - [`Settings`]: a preset merged with a configuration, ready to open a canvas
//! - [`MapListener`]: the stream listener that plots every geotagged post
//!
//! ```rust,no_run
//! use tweetmap::{MapListener, Preset, Settings, config::Config};
//! use tweetmap::stream::StreamClient;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_path(std::path::Path::new("tweetmap.yml"))?;
//!     let settings = Settings::resolve(Preset::Japan, &config)?;
//!
//!     let mut listener = MapListener::new(settings.open_canvas().await?);
//!     let mut client = StreamClient::builder(&config.credentials)?
//!         .url(&settings.stream_url)
//!         .retry_policy(settings.retry.clone())
//!         .build()?;
//!     client.filter(&settings.locations, &mut listener).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
mod listener;
mod presets;
mod settings;

pub use listener::*;
pub use presets::*;
pub use settings::*;

pub use tweetmap_core as core;
pub use tweetmap_image as image;
pub use tweetmap_stream as stream;

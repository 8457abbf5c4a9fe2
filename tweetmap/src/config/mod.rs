//! tweetmap configuration.
//!
//! - [`Config`](crate::config::Config): top-level loader and YAML parser
//! - [`StreamConfig`](crate::config::StreamConfig): endpoint, locations and retry budget
//! - [`MapConfig`](crate::config::MapConfig): figure, marker, label and background
//!
//! Credentials use [`Credentials`](tweetmap_stream::Credentials) directly. Every field is
//! optional; missing values come from the selected [`Preset`](crate::Preset).

mod main;
mod map;
mod stream;

pub use main::Config;
pub use map::{BackgroundConfig, LabelConfig, MapConfig, MarkerConfig, TilesConfig};
pub use stream::StreamConfig;

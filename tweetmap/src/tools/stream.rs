use super::MapArgs;
use anyhow::Result;
use tweetmap::MapListener;
use tweetmap_core::GeoBBox;
use tweetmap_image::MapRenderer;
use tweetmap_stream::{CredentialProvider, EnvCredentials, StreamClient};

#[derive(clap::Args, Debug)]
#[command(disable_version_flag = true)]
pub struct Subcommand {
	#[command(flatten)]
	pub map: MapArgs,

	/// Bounding box "x_min,y_min,x_max,y_max" for the stream filter and the map extent
	#[arg(short = 'b', long, value_parser = parse_bbox, allow_hyphen_values = true, display_order = 1)]
	pub bbox: Option<GeoBBox>,

	/// Stream endpoint
	#[arg(long, display_order = 2)]
	pub url: Option<String>,
}

fn parse_bbox(text: &str) -> Result<GeoBBox, String> {
	GeoBBox::try_from(text).map_err(|e| format!("{e:#}"))
}

#[tokio::main(flavor = "current_thread")]
pub async fn run(arguments: &Subcommand) -> Result<()> {
	let mut config = arguments.map.load_config()?;
	config.credentials.override_with(&EnvCredentials::from_env());
	config.credentials.validate()?;
	config.stream.override_optional_url(&arguments.url);
	config.stream.override_optional_locations(&arguments.bbox);
	config.map.override_optional_extent(&arguments.bbox);

	let settings = arguments.map.resolve(&config)?;
	let mut client = StreamClient::builder(&config.credentials)?
		.url(&settings.stream_url)
		.retry_policy(settings.retry.clone())
		.build()?;

	let mut listener = MapListener::new(settings.open_canvas().await?);
	listener.renderer_mut().refresh()?;
	log::info!(
		"streaming posts inside {:?}, map is written to '{}'",
		settings.locations,
		listener.renderer().output().display()
	);

	let outcome = client.filter(&settings.locations, &mut listener).await?;
	log::info!("stream ended ({outcome:?}) after {} geotagged posts", listener.count());
	Ok(())
}

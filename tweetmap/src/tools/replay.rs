use super::MapArgs;
use anyhow::{Context, Result};
use std::{
	fs::File,
	io::{BufRead, BufReader},
	path::PathBuf,
};
use tweetmap::{MapListener, label_text};
use tweetmap_image::MapRenderer;
use tweetmap_stream::{ListenerControl, dispatch_line};

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// Recorded stream, one JSON message per line
	#[arg(required = true)]
	pub file: PathBuf,

	#[command(flatten)]
	pub map: MapArgs,
}

#[tokio::main(flavor = "current_thread")]
pub async fn run(arguments: &Subcommand) -> Result<()> {
	let config = arguments.map.load_config()?;
	let settings = arguments.map.resolve(&config)?;

	let file = File::open(&arguments.file).with_context(|| format!("Failed to open '{}'", arguments.file.display()))?;
	let mut listener = MapListener::new(settings.open_canvas().await?);
	listener.renderer_mut().refresh()?;

	let mut lines: usize = 0;
	for line in BufReader::new(file).lines() {
		let line = line.with_context(|| format!("Failed to read '{}'", arguments.file.display()))?;
		lines += 1;
		if dispatch_line(&line, &mut listener)? == ListenerControl::Stop {
			log::info!("listener stopped the replay at line {lines}");
			break;
		}
	}
	listener.renderer_mut().refresh()?;

	log::info!(
		"replayed {lines} lines from '{}' into '{}'",
		arguments.file.display(),
		listener.renderer().output().display()
	);
	println!("{}", label_text(listener.count()));
	Ok(())
}

#[cfg(test)]
mod tests {
	use crate::tests::run_command;
	use assert_fs::{TempDir, prelude::*};

	#[test]
	fn replays_file() {
		let dir = TempDir::new().unwrap();
		let input = dir.child("stream.jsonl");
		input
			.write_str(concat!(
				"{\"id\":1,\"user\":{\"screen_name\":\"a\"},\"coordinates\":null}\n",
				"{\"id\":2,\"user\":{\"screen_name\":\"b\"},\"coordinates\":{\"type\":\"Point\",\"coordinates\":[139.7,35.7]}}\n",
			))
			.unwrap();
		let output = dir.child("map.png");

		run_command(vec![
			"tweetmap",
			"replay",
			input.path().to_str().unwrap(),
			"--output",
			output.path().to_str().unwrap(),
		])
		.unwrap();
		output.assert(predicates::path::is_file());
	}

	#[test]
	fn missing_file() {
		let err = run_command(vec!["tweetmap", "replay", "/does/not/exist.jsonl"]).unwrap_err();
		assert_eq!(err.to_string(), "Failed to open '/does/not/exist.jsonl'");
	}
}

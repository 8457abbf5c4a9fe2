mod tools;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, propagate_version = true, disable_help_subcommand = true)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	#[command(flatten)]
	verbose: Verbosity<InfoLevel>,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Plot live posts from the filtered stream
	Stream(tools::stream::Subcommand),

	/// Plot posts from a recorded stream file
	Replay(tools::replay::Subcommand),

	/// Print an example configuration file
	Config(tools::config::Subcommand),
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	env_logger::Builder::new()
		.filter_level(cli.verbose.log_level_filter())
		.format_timestamp(None)
		.init();

	run(cli)
}

fn run(cli: Cli) -> Result<()> {
	match &cli.command {
		Commands::Stream(arguments) => tools::stream::run(arguments),
		Commands::Replay(arguments) => tools::replay::run(arguments),
		Commands::Config(arguments) => tools::config::run(arguments),
	}
}

#[cfg(test)]
mod tests {
	use crate::{Cli, run};
	use anyhow::Result;
	use clap::Parser;

	/// Parses and runs `arg_vec`, returning the parsed `Cli` as debug text.
	pub fn run_command(arg_vec: Vec<&str>) -> Result<String> {
		let cli = Cli::try_parse_from(arg_vec)?;
		let msg = format!("{cli:?}");
		run(cli)?;
		Ok(msg)
	}

	#[test]
	fn help() {
		let err = run_command(vec!["tweetmap"]).unwrap_err().to_string();
		assert!(err.starts_with("Plots geotagged posts from a filtered streaming API on a live-updating map."));
		assert!(err.contains("\nUsage: tweetmap [OPTIONS] <COMMAND>"));
	}

	#[test]
	fn version() {
		let err = run_command(vec!["tweetmap", "-V"]).unwrap_err().to_string();
		assert!(err.starts_with("tweetmap "));
	}

	#[test]
	fn replay_subcommand() {
		let output = run_command(vec!["tweetmap", "replay"]).unwrap_err().to_string();
		assert!(output.starts_with("Plot posts from a recorded stream file"));
	}

	#[test]
	fn config_subcommand() {
		let output = run_command(vec!["tweetmap", "config"]).unwrap();
		assert!(output.starts_with("Cli { command: Config("));
	}

	#[test]
	fn unknown_preset() {
		let err = run_command(vec!["tweetmap", "stream", "--preset", "mars"]).unwrap_err();
		assert!(err.to_string().contains("invalid value 'mars'"), "{err}");
	}
}

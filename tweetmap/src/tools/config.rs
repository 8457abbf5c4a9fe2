use anyhow::Result;
use tweetmap::config::Config;

#[derive(clap::Args, Debug)]
#[command(disable_version_flag = true)]
pub struct Subcommand {}

pub fn run(_arguments: &Subcommand) -> Result<()> {
	print!("{}", Config::demo_yaml());
	Ok(())
}

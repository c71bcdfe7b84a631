use clap::{Parser, Subcommand};
use std::path::PathBuf;

use desk_buddy::config::BuddyConfig;

#[derive(Parser, Debug)]
#[command(
    name = "desk-buddy",
    about = "A sassy animated desktop assistant",
    version
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Option<CliCommand>,
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,
    /// Base directory holding one folder per animation; repeat for fallbacks.
    #[arg(long = "assets", short = 'a')]
    pub assets: Vec<PathBuf>,
    #[arg(long)]
    pub audio_dir: Option<PathBuf>,
    /// Ask one question, wait for the answer to play out, then exit.
    #[arg(long, short = 'p')]
    pub prompt: Option<String>,
    #[arg(long)]
    pub mute: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// Send one prompt to the configured assistant and print the parsed reply.
    Check {
        #[arg(default_value = "Hello, who are you?")]
        prompt: String,
    },
}

impl CliArgs {
    /// Command-line values win over the config file.
    pub fn apply_to(&self, config: &mut BuddyConfig) {
        if !self.assets.is_empty() {
            config.asset_dirs = self.assets.clone();
        }
        if let Some(dir) = &self.audio_dir {
            config.audio_dir = dir.clone();
        }
        if self.prompt.is_some() {
            config.welcome = false;
        }
    }
}

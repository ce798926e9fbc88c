//! Cueframe CLI: command-line interface for subtitle frame rendering.
//!
//! Usage:
//!   cueframe convert <INPUT>   Render every cue of a subtitle file into a ZIP
//!   cueframe render <TEXT>     Render ad-hoc text to a single preview image
//!   cueframe inspect <INPUT>   List the cues parsed from a subtitle file
//!   cueframe check             Report the resolved font and effective config

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

use commands::RenderArgs;

#[derive(Parser)]
#[command(
    name = "cueframe",
    about = "Render subtitle cues to still frames, with Arabic and bidi support",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to $XDG_CONFIG_HOME/cueframe/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render every cue of a subtitle file into a ZIP of frames
    Convert {
        /// Subtitle file (.srt, .ass, .ssa)
        input: PathBuf,

        /// Output archive path
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Render ad-hoc text to one image for previewing layout
    Render {
        /// Text to render; lines are split on newlines or a literal "\n"
        text: String,

        /// Output image path
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// List the cues parsed from a subtitle file
    Inspect {
        /// Subtitle file (.srt, .ass, .ssa)
        input: PathBuf,
    },

    /// Report which font resolves and the effective configuration
    Check,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = cueframe_common::AppConfig::load(cli.config.as_deref())
        .map_err(|e| anyhow::anyhow!("Failed to load config: {e}"))?;
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    cueframe_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Convert {
            input,
            output,
            render,
        } => commands::convert::run(config, input, output, render),
        Commands::Render {
            text,
            output,
            render,
        } => commands::render::run(config, text, output, render),
        Commands::Inspect { input } => commands::inspect::run(input),
        Commands::Check => commands::check::run(config, cli.config),
    }
}

use clap::Parser;
use env_logger::{Env, Target};
use log::{debug, info};
use std::path::PathBuf;

use modbundle::bundler::Bundler;
use modbundle::config::Config;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Source tree to bundle [default: TidyNotes]
    #[arg(short, long)]
    target: Option<PathBuf>,

    /// Directory receiving the bundles [default: "AI Integration"]
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Source file extension [default: swift]
    #[arg(short, long)]
    extension: Option<String>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only report errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Progress lines are the tool's normal output, so they go to stdout at info level
    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .target(Target::Stdout)
        .init();

    debug!(
        "Verbosity level: {} (log level: {})",
        cli.verbose, log_level
    );

    let mut config = Config::load(cli.config.as_deref())?;

    // Command line flags override every config layer
    if let Some(target) = cli.target {
        config.target = target;
    }
    if let Some(output_dir) = cli.output_dir {
        config.output_dir = output_dir;
    }
    if let Some(extension) = cli.extension {
        config.set_extension(&extension)?;
    }

    debug!("Configuration: {:?}", config);

    let summary = Bundler::new(config).run()?;
    info!("Bundled {} source files", summary.files_bundled);

    Ok(())
}

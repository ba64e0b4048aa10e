// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, Context};
use log::{error, warn, info, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::io::Write;
use std::io::BufReader;
use std::fs::File;
use std::path::{Path, PathBuf};
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use crate::app_config::Config;
use crate::editor::{BatchCorrections, CorrectionSource, NoCorrections, PromptCorrections};
use crate::transcript::TimeWindow;
use app_controller::Controller;

mod app_config;
mod app_controller;
mod editor;
mod errors;
mod media;
mod providers;
mod summarizer;
mod transcript;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Cut a captioned clip out of a video (default workflow)
    Clip(ClipArgs),

    /// Print the full transcript text for a video URL
    Transcript {
        /// Video URL to fetch the transcript for
        #[arg(value_name = "URL")]
        url: String,
    },

    /// Summarize the transcript of a video URL
    Summarize {
        /// Video URL to summarize
        #[arg(value_name = "URL")]
        url: String,
    },

    /// Generate shell completions for snipcap
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct ClipArgs {
    /// Video URL to clip
    #[arg(value_name = "URL")]
    url: String,

    /// Clip start in seconds from the source origin
    #[arg(value_name = "START")]
    start: f64,

    /// Clip end in seconds from the source origin
    #[arg(value_name = "END")]
    end: f64,

    /// Output file for the rendered clip
    #[arg(short, long, default_value = "clip.mp4")]
    output: PathBuf,

    /// Corrections file: one line per caption, blank line keeps the original
    #[arg(long, conflicts_with = "interactive")]
    corrections: Option<PathBuf>,

    /// Review each caption interactively before rendering
    #[arg(short, long)]
    interactive: bool,

    /// Override the configured canvas width
    #[arg(long, requires = "height")]
    width: Option<u32>,

    /// Override the configured canvas height
    #[arg(long, requires = "width")]
    height: Option<u32>,
}

/// snipcap - captioned clips from transcribed videos
///
/// Cuts a time window out of a source video and bakes the matching
/// transcript lines onto it as caption overlays, with an optional
/// review pass to correct caption text before rendering.
#[derive(Parser, Debug)]
#[command(name = "snipcap")]
#[command(version = "0.1.0")]
#[command(about = "Captioned clip composer for transcribed videos")]
#[command(long_about = "snipcap trims a window out of a source video and overlays the matching
time-coded transcript lines as captions.

EXAMPLES:
    snipcap clip 'https://youtu.be/abc123' 10.0 22.0          # Clip with captions as-is
    snipcap clip 'https://youtu.be/abc123' 10 22 -i           # Review each caption first
    snipcap clip 'https://youtu.be/abc123' 10 22 --corrections fixes.txt
    snipcap transcript 'https://youtu.be/abc123'              # Dump the transcript text
    snipcap summarize 'https://youtu.be/abc123'               # One-shot summary
    snipcap completions bash > snipcap.bash                   # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a
    different config file with --config-path. If the config file doesn't
    exist, a default one will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let color = Self::color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:5} {}\x1B[0m",
                color,
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default; the level
    // is updated after the config is loaded
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "snipcap", &mut std::io::stdout());
        return Ok(());
    }

    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &cli.log_level {
        let config_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level_filter(&config_level));
    }

    let mut config = load_or_create_config(&cli.config_path)?;

    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    } else {
        log::set_max_level(level_filter(&config.log_level));
    }

    match cli.command {
        Commands::Clip(args) => run_clip(config, args).await,
        Commands::Transcript { url } => run_transcript(config, &url).await,
        Commands::Summarize { url } => run_summarize(config, &url).await,
        Commands::Completions { .. } => unreachable!("handled above"),
    }
}

/// Load the configuration file, creating a default one when missing
fn load_or_create_config(config_path: &str) -> Result<Config> {
    let config = if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();

        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    Ok(config)
}

async fn run_clip(mut config: Config, args: ClipArgs) -> Result<()> {
    if let (Some(width), Some(height)) = (args.width, args.height) {
        config.render.width = width;
        config.render.height = height;
    }

    config.validate().context("Configuration validation failed")?;

    let window = TimeWindow::new(args.start, args.end)
        .context("Invalid clip window")?;

    let corrections: Box<dyn CorrectionSource> = if args.interactive {
        Box::new(PromptCorrections)
    } else if let Some(path) = &args.corrections {
        Box::new(BatchCorrections::from_file(path)?)
    } else {
        Box::new(NoCorrections)
    };

    let controller = Controller::with_config(config)?;

    match controller
        .run_clip(&args.url, window, corrections.as_ref(), &args.output)
        .await
    {
        Ok(artifact) => {
            info!("Success: {:?}", artifact.path);
            Ok(())
        }
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

async fn run_transcript(config: Config, url: &str) -> Result<()> {
    config.validate().context("Configuration validation failed")?;
    let controller = Controller::with_config(config)?;

    match controller.run_transcript(url).await {
        Ok(text) => {
            println!("{}", text);
            Ok(())
        }
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

async fn run_summarize(config: Config, url: &str) -> Result<()> {
    config.validate().context("Configuration validation failed")?;
    let controller = Controller::with_config(config)?;

    match controller.run_summary(url).await {
        Ok(summary) => {
            println!("{}", summary);
            Ok(())
        }
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use polytable::app_config::{self, Config};
use polytable::app_controller::Controller;
use polytable::file_utils::FileManager;

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

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for polytable
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// polytable - multilingual picture tables
///
/// Translates a list of items into several languages, fetches one image per
/// item and writes a LaTeX table pairing them.
#[derive(Parser, Debug)]
#[command(name = "polytable")]
#[command(version)]
#[command(about = "Build a multilingual picture table from a list of items")]
#[command(long_about = "polytable reads one item per line, translates every item into each configured
language, downloads one image per item and writes a LaTeX longtable.

EXAMPLES:
    polytable                                   # Use lista.txt and polytable.json
    polytable frutas.txt -o frutas.tex          # Custom items and output file
    polytable -d imagenes frutas.txt            # Keep images in ./imagenes
    polytable --skip-images frutas.txt          # Translations only
    polytable --concurrency 2 -l debug          # Fewer parallel requests, verbose logs
    polytable completions bash > polytable.bash # Generate bash completions

CONFIGURATION:
    Configuration is stored in polytable.json by default. You can specify a
    different config file with --config. If the config file doesn't exist, a
    default one will be created automatically.

OUTPUT:
    Compile the generated document with lualatex.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Items file, one item per line
    #[arg(value_name = "ITEMS_FILE")]
    items_file: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long = "config", default_value = "polytable.json")]
    config_path: String,

    /// Output document path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory for the item images
    #[arg(short = 'd', long = "dest")]
    destination_dir: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Maximum translation requests in flight
    #[arg(long)]
    concurrency: Option<usize>,

    /// Translate only, render every image as missing
    #[arg(long)]
    skip_images: bool,
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

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
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
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_emoji_for_level(record.level()),
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
    // Filter everything through the max level, adjusted once the config is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "polytable", &mut std::io::stdout());
        return Ok(());
    }

    run(cli).await
}

async fn run(options: CommandLineOptions) -> Result<()> {
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = load_or_create_config(&options.config_path)?;
    apply_overrides(&mut config, &options);

    config.validate().context("Configuration validation failed")?;

    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let controller = Controller::with_config(config)?.skip_images(options.skip_images);
    let summary = controller.run().await?;

    if summary.failed > 0 {
        warn!("{} images could not be acquired, run again to retry them", summary.failed);
    }

    Ok(())
}

// Load configuration, writing the default one if the file is missing
fn load_or_create_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .with_context(|| format!("Failed to open config file: {}", config_path))?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", config_path))?;
        return Ok(config);
    }

    warn!("Config file not found at '{}', creating default config.", config_path);
    let config = Config::default();
    let config_json = serde_json::to_string_pretty(&config)
        .context("Failed to serialize default config to JSON")?;
    FileManager::write_to_file(config_path, &config_json)
        .with_context(|| format!("Failed to write default config to file: {}", config_path))?;
    info!("Default configuration written to {}", config_path);

    Ok(config)
}

// Override config values with CLI options if provided
fn apply_overrides(config: &mut Config, options: &CommandLineOptions) {
    if let Some(items_file) = &options.items_file {
        config.items_file = items_file.to_string_lossy().into_owned();
    }
    if let Some(output) = &options.output {
        config.output_file = output.to_string_lossy().into_owned();
    }
    if let Some(destination_dir) = &options.destination_dir {
        config.images.destination_dir = destination_dir.clone();
    }
    if let Some(concurrency) = options.concurrency {
        config.translation.concurrent_requests = concurrency;
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}

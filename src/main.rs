// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use autosubs::app_config::{self, Config, RedactionConfig};
use autosubs::{AttributionPolicy, Controller};

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

/// CLI Wrapper for AttributionPolicy to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliAttribution {
    FirstContact,
    MajorityOverlap,
}

impl From<CliAttribution> for AttributionPolicy {
    fn from(cli: CliAttribution) -> Self {
        match cli {
            CliAttribution::FirstContact => AttributionPolicy::FirstContact,
            CliAttribution::MajorityOverlap => AttributionPolicy::MajorityOverlap,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Merge a transcript with speaker turns and build subtitle cues
    Align(AlignArgs),

    /// Re-segment an existing SRT file into subtitle cues
    Srt(SrtArgs),

    /// Generate shell completions for autosubs
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Options shared by the processing commands
#[derive(Args, Debug)]
struct CommonArgs {
    /// Directory for output files (defaults to the input's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Timeline frame rate
    #[arg(long)]
    frame_rate: Option<f64>,

    /// Timeline frame matching the start of the audio
    #[arg(long)]
    mark_in: Option<u64>,

    /// Comma separated words to censor
    #[arg(long, env = "AUTOSUBS_CENSOR")]
    censor: Option<String>,
}

#[derive(Args, Debug)]
struct AlignArgs {
    /// Transcript JSON file, or a directory of *.transcript.json files
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Diarization JSON file (defaults to <name>.diarization.json next to the input)
    #[arg(short, long)]
    diarization: Option<PathBuf>,

    /// How segments spanning several turns pick a speaker
    #[arg(short, long, value_enum)]
    attribution: Option<CliAttribution>,

    /// Force overwrite of existing output files in folder mode
    #[arg(short, long)]
    force_overwrite: bool,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args, Debug)]
struct SrtArgs {
    /// SRT file to convert
    #[arg(value_name = "SRT_FILE")]
    input_path: PathBuf,

    #[command(flatten)]
    common: CommonArgs,
}

/// autosubs - speaker-aware subtitle alignment
///
/// Merges a timed transcript with diarization output and turns the result
/// into frame-accurate subtitle cues.
#[derive(Parser, Debug)]
#[command(name = "autosubs")]
#[command(version)]
#[command(about = "Speaker-aware subtitle alignment")]
#[command(long_about = "autosubs merges transcriber and diarizer output into speaker-labeled subtitles.

EXAMPLES:
    autosubs align talk.transcript.json                  # Uses talk.diarization.json if present
    autosubs align talk.transcript.json -d speakers.json # Explicit diarization file
    autosubs align /recordings/ -f                       # Process a whole directory
    autosubs srt talk.srt --frame-rate 25 --mark-in 90000
    autosubs completions bash > autosubs.bash            # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
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
        log::set_boxed_logger(Box::new(CustomLogger::new(level)))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI color for log level
    fn decoration(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌ ", "1;31"),
            Level::Warn => ("🚧 ", "1;33"),
            Level::Info => (" ", "1;32"),
            Level::Debug => ("🔍 ", "1;36"),
            Level::Trace => ("📋 ", "1;35"),
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
            let (emoji, color) = Self::decoration(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                color, now, emoji, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Verbosity is controlled through log::set_max_level from here on
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "autosubs", &mut std::io::stdout());
            Ok(())
        }
        Commands::Align(args) => run_align(args).await,
        Commands::Srt(args) => run_srt(args),
    }
}

/// Load the config file and apply command line overrides
fn load_config(common: &CommonArgs) -> Result<Config> {
    if let Some(level) = &common.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&common.config_path)?;

    if let Some(frame_rate) = common.frame_rate {
        config.frame_rate = frame_rate;
    }
    if let Some(mark_in) = common.mark_in {
        config.placement.timeline_start_frame = mark_in;
    }
    if let Some(censor) = &common.censor {
        config.redaction = RedactionConfig::from_list(censor);
    }
    if let Some(level) = &common.log_level {
        config.log_level = level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;

    if common.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    Ok(config)
}

fn output_dir_for(common: &CommonArgs, input: &Path) -> PathBuf {
    common
        .output_dir
        .clone()
        .unwrap_or_else(|| input.parent().unwrap_or(Path::new(".")).to_path_buf())
}

async fn run_align(args: AlignArgs) -> Result<()> {
    let mut config = load_config(&args.common)?;
    if let Some(attribution) = &args.attribution {
        config.attribution = attribution.clone().into();
    }
    let controller = Controller::with_config(config)?;

    if args.input_path.is_dir() {
        if args.diarization.is_some() {
            return Err(anyhow!("--diarization cannot be used with a directory input"));
        }
        let summary = controller.run_folder(&args.input_path, args.force_overwrite).await?;
        if summary.failed > 0 {
            return Err(anyhow!("{} file(s) failed to align", summary.failed));
        }
        return Ok(());
    }

    if !args.input_path.is_file() {
        return Err(anyhow!("Input path does not exist: {:?}", args.input_path));
    }

    let output_dir = output_dir_for(&args.common, &args.input_path);
    let output = controller
        .run_file(&args.input_path, args.diarization.as_deref(), &output_dir)
        .await?;

    if let Some(top) = &output.transcript.top_speaker {
        info!("Top speaker: {} ({}% of lines)", top.label, top.percentage);
    }
    Ok(())
}

fn run_srt(args: SrtArgs) -> Result<()> {
    let config = load_config(&args.common)?;
    let controller = Controller::with_config(config)?;

    if !args.input_path.is_file() {
        return Err(anyhow!("Input file does not exist: {:?}", args.input_path));
    }

    let output_dir = output_dir_for(&args.common, &args.input_path);
    controller.run_srt_file(&args.input_path, &output_dir)?;
    Ok(())
}

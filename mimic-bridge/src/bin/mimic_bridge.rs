use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mimic_bridge::{
    actuator::{JsonLinesActuator, PoseActuator, RecordingActuator},
    bridge_config::BridgeConfig,
    logging,
    session::Bridge,
};
use mimic_translator::{
    artifacts::DirectoryArtifactSink,
    config::ConfigFile,
    record::{parse_record, parse_records},
};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Configuration file (.json, .yaml or .yml), packaged defaults otherwise
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Append pose commands to this file as json lines.
    /// "-" writes to stdout. Without it poses are only logged
    #[arg(long, global = true)]
    commands: Option<PathBuf>,

    /// Log as json
    #[arg(long, global = true)]
    json_logs: bool,

    /// Sets the level of verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Translate and send a single landmark frame
    Translate {
        /// Json object mapping landmark names to coordinates, as one record
        /// of the pose service
        frame: PathBuf,
    },
    /// Filter sampled video frames and send a pose per valid frame
    Video {
        /// Json list of per-frame records from the pose service
        frames: PathBuf,

        /// Where frame images and landmark documents go
        #[arg(long, default_value = "mimic_output")]
        output_dir: PathBuf,
    },
    /// Print the effective configuration as yaml
    Config,
}

fn load_config(path: Option<&Path>) -> Result<BridgeConfig> {
    match path {
        Some(path) => BridgeConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(BridgeConfig::included()),
    }
}

async fn open_actuator(path: Option<&Path>) -> Result<Box<dyn PoseActuator>> {
    match path {
        Some(path) if path == Path::new("-") => {
            Ok(Box::new(JsonLinesActuator::new(tokio::io::stdout())))
        }
        Some(path) => {
            let file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .await
                .with_context(|| format!("failed to open {}", path.display()))?;
            Ok(Box::new(JsonLinesActuator::new(file)))
        }
        None => {
            tracing::info!("no command output configured, poses are recorded only");
            Ok(Box::new(RecordingActuator::default()))
        }
    }
}

fn print_report<T: Serialize>(report: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::setup_tracing(args.verbose, args.json_logs);

    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Config => {
            print!("{}", config.serialize_to_yaml()?);
        }
        Command::Translate { frame } => {
            let text = tokio::fs::read_to_string(&frame)
                .await
                .with_context(|| format!("failed to read {}", frame.display()))?;
            let record = parse_record(&text)?;
            let (frame, _) = record.into_parts(&config.pipeline.visualization_key);
            let actuator = open_actuator(args.commands.as_deref()).await?;
            let mut bridge = Bridge::new(config, actuator);
            let report = bridge.pose_from_frame(&frame).await?;
            print_report(&report)?;
        }
        Command::Video { frames, output_dir } => {
            let text = tokio::fs::read_to_string(&frames)
                .await
                .with_context(|| format!("failed to read {}", frames.display()))?;
            let records = parse_records(&text)?;
            let mut sink = DirectoryArtifactSink::create(&output_dir)
                .with_context(|| format!("failed to create {}", output_dir.display()))?;
            let actuator = open_actuator(args.commands.as_deref()).await?;
            let mut bridge = Bridge::new(config, actuator);
            let report = bridge.pose_from_video(records, &mut sink).await?;
            print_report(&report)?;
        }
    }
    Ok(())
}

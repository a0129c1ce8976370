use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info, Level};

use vidmark::{
    compositor::Engine,
    config::{Config, EffectProject},
    segment,
};

#[derive(Parser)]
#[command(
    name = "vidmark",
    version,
    about = "Timed overlays, captions and zoom effects for video",
    long_about = "vidmark composites timed effects (transparent PNG overlays, shapes, captions, zooms) onto video frames, and slices, cuts or extends timelines through ffmpeg."
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply a project file of timed effects to a video
    Render {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Output video file
        #[arg(short, long)]
        output: PathBuf,

        /// Effect project file (TOML, [[effect]] tables in paint order)
        #[arg(short, long)]
        project: PathBuf,

        /// Configuration file (optional)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Keep only a time range of a video
    Slice {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// Range start, as seconds or HH:MM:SS
        #[arg(short, long)]
        start: String,

        /// Range end, as seconds or HH:MM:SS
        #[arg(short, long)]
        end: String,
    },

    /// Remove a time range and rejoin the remainder
    Cut {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// Start of the removed range, as seconds or HH:MM:SS
        #[arg(long)]
        from: String,

        /// End of the removed range, as seconds or HH:MM:SS
        #[arg(long)]
        to: String,
    },

    /// Insert a clip at a point in the timeline
    Insert {
        /// Main video file
        #[arg(short, long)]
        input: PathBuf,

        /// Clip to insert
        #[arg(short, long)]
        clip: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// Insertion point, as seconds or HH:MM:SS
        #[arg(short, long)]
        at: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .init();

    info!("Starting vidmark v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Render {
            input,
            output,
            project,
            config,
        } => {
            let config = match config {
                Some(path) => {
                    info!("Loading configuration from {:?}", path);
                    Config::from_file(&path)?
                }
                None => Config::default(),
            };

            let project = EffectProject::from_file(&project)?;
            info!("Loaded {} effects", project.effects.len());

            let engine = Engine::new(config, project.effects);
            let report = engine.render(&input, &output).await?;
            info!("Render complete! Output saved to: {}", report.path);
        }

        Command::Slice {
            input,
            output,
            start,
            end,
        } => {
            let outcome = segment::slice(&input, &output, &start, &end).await?;
            report_outcome("Slice", outcome)?;
        }

        Command::Cut {
            input,
            output,
            from,
            to,
        } => {
            let outcome = segment::cut(&input, &output, &from, &to).await?;
            report_outcome("Cut", outcome)?;
        }

        Command::Insert {
            input,
            clip,
            output,
            at,
        } => {
            let outcome = segment::insert(&input, &clip, &output, &at).await?;
            report_outcome("Insert", outcome)?;
        }
    }

    Ok(())
}

fn report_outcome(operation: &str, outcome: vidmark::SegmentOutcome) -> Result<()> {
    if outcome.is_success() {
        info!(
            "{} complete (strategy: {})",
            operation,
            outcome.strategy.unwrap_or("unknown")
        );
        Ok(())
    } else {
        for diagnostic in &outcome.diagnostics {
            error!("{}", diagnostic);
        }
        anyhow::bail!("{} failed after all strategies", operation.to_lowercase())
    }
}

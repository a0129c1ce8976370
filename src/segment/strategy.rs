use std::process::Command;

use tokio::task;
use tracing::{debug, info, warn};

/// One invocation strategy: a named ffmpeg argument list.
///
/// Strategies are tried in declaration order; the first that exits
/// successfully wins and the rest are skipped.
#[derive(Debug, Clone)]
pub struct Strategy {
    pub name: &'static str,
    pub args: Vec<String>,
}

impl Strategy {
    pub fn new(name: &'static str, args: Vec<String>) -> Self {
        Self { name, args }
    }
}

/// Status value for a segment operation.
///
/// Strategy exhaustion is an expected outcome, not a fault: the caller gets
/// the accumulated diagnostics of every failed attempt instead of an error.
#[derive(Debug, Clone)]
pub struct SegmentOutcome {
    pub succeeded: bool,
    /// Name of the winning strategy, when one succeeded
    pub strategy: Option<&'static str>,
    /// One stderr excerpt per failed attempt, in attempt order
    pub diagnostics: Vec<String>,
}

impl SegmentOutcome {
    pub fn success(strategy: &'static str, diagnostics: Vec<String>) -> Self {
        Self {
            succeeded: true,
            strategy: Some(strategy),
            diagnostics,
        }
    }

    pub fn failure(diagnostics: Vec<String>) -> Self {
        Self {
            succeeded: false,
            strategy: None,
            diagnostics,
        }
    }

    pub fn is_success(&self) -> bool {
        self.succeeded
    }
}

/// Run strategies in order, short-circuiting on the first success
pub async fn run_chain(strategies: Vec<Strategy>) -> SegmentOutcome {
    let mut diagnostics = Vec::new();

    for strategy in strategies {
        info!("Attempting strategy '{}'...", strategy.name);
        match run_tool(strategy.args.clone()).await {
            Ok(()) => {
                info!("Strategy '{}' succeeded", strategy.name);
                return SegmentOutcome::success(strategy.name, diagnostics);
            }
            Err(diag) => {
                warn!("Strategy '{}' failed", strategy.name);
                debug!("{}", diag);
                diagnostics.push(format!("{}: {}", strategy.name, diag));
            }
        }
    }

    SegmentOutcome::failure(diagnostics)
}

/// Invoke ffmpeg once, mapping a non-zero exit to its stderr text
pub(crate) async fn run_tool(args: Vec<String>) -> std::result::Result<(), String> {
    let output = task::spawn_blocking(move || Command::new("ffmpeg").args(&args).output())
        .await
        .map_err(|e| format!("task join failed: {}", e))?
        .map_err(|e| format!("ffmpeg could not be invoked: {}", e))?;

    if output.status.success() {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        // Keep the tail; ffmpeg's banner is noise and the error is last
        let tail: String = stderr
            .lines()
            .rev()
            .take(12)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect::<Vec<_>>()
            .join("\n");
        Err(tail)
    }
}

//! # Checkpoint Timer
//!
//! Nested wall-clock timing of multi-phase operations.
//!
//! ```rust
//! use symforge_utils::timer::CheckpointTimer;
//!
//! let mut timer = CheckpointTimer::new();
//! timer.begin("build");
//! timer.begin("minimal symbols");
//! timer.end().unwrap();
//! timer.end().unwrap();
//!
//! let report = timer.report();
//! assert!(report.starts_with("build"));
//! assert!(report.contains("|   minimal symbols"));
//! ```

use std::fmt::Write as _;
use std::time::{Duration, Instant};

/// Timer misuse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimerError
{
    #[error("checkpoint ended with none open")]
    Unbalanced,
}

#[derive(Debug, Clone)]
struct Checkpoint
{
    label: String,
    depth: usize,
    started: Instant,
    elapsed: Option<Duration>,
}

/// Records `begin`/`end` pairs and their nesting.
#[derive(Debug, Clone, Default)]
pub struct CheckpointTimer
{
    checkpoints: Vec<Checkpoint>,
    open: Vec<usize>,
    max_depth: usize,
}

impl CheckpointTimer
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Open a checkpoint nested in the currently open one.
    pub fn begin(&mut self, label: impl Into<String>)
    {
        let depth = self.open.len();
        self.max_depth = self.max_depth.max(depth + 1);
        self.open.push(self.checkpoints.len());
        self.checkpoints.push(Checkpoint {
            label: label.into(),
            depth,
            started: Instant::now(),
            elapsed: None,
        });
    }

    /// Close the innermost open checkpoint and return its duration.
    ///
    /// ## Errors
    ///
    /// [`TimerError::Unbalanced`] if no checkpoint is open.
    pub fn end(&mut self) -> Result<Duration, TimerError>
    {
        let index = self.open.pop().ok_or(TimerError::Unbalanced)?;
        let checkpoint = &mut self.checkpoints[index];
        let elapsed = checkpoint.started.elapsed();
        checkpoint.elapsed = Some(elapsed);
        Ok(elapsed)
    }

    /// Deepest nesting reached so far.
    pub fn max_depth(&self) -> usize
    {
        self.max_depth
    }

    /// Number of checkpoints still open.
    pub fn open_count(&self) -> usize
    {
        self.open.len()
    }

    /// Elapsed time of the first closed checkpoint called `label`.
    pub fn elapsed(&self, label: &str) -> Option<Duration>
    {
        self.checkpoints
            .iter()
            .find(|checkpoint| checkpoint.label == label)
            .and_then(|checkpoint| checkpoint.elapsed)
    }

    /// Render the checkpoint tree, one line per checkpoint.
    pub fn report(&self) -> String
    {
        let mut out = String::new();
        for checkpoint in &self.checkpoints {
            out.push_str(&"|   ".repeat(checkpoint.depth));
            match checkpoint.elapsed {
                Some(elapsed) => {
                    let _ = writeln!(out, "{}: {:.3} ms", checkpoint.label, elapsed.as_secs_f64() * 1_000.0);
                }
                None => {
                    let _ = writeln!(out, "{}: (open)", checkpoint.label);
                }
            }
        }
        out
    }
}

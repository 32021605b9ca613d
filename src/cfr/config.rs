//! Configuration and error types for the CFR solver.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The CFR traversal variant driving training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Vanilla CFR: every chance outcome and every action enumerated.
    Standard,
    /// Chance-sampling CFR: one chance outcome drawn per traversal.
    Chance,
    /// External-sampling MCCFR: opponent and chance actions sampled.
    External,
    /// Outcome-sampling MCCFR: a single playout per traversal.
    Outcome,
}

impl Mode {
    /// All supported modes, in CLI documentation order.
    pub const ALL: [Mode; 4] = [Mode::Standard, Mode::Chance, Mode::External, Mode::Outcome];

    /// The lowercase name used on the CLI and in artifact file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Standard => "standard",
            Mode::Chance => "chance",
            Mode::External => "external",
            Mode::Outcome => "outcome",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Mode::Standard),
            "chance" => Ok(Mode::Chance),
            "external" => Ok(Mode::External),
            "outcome" => Ok(Mode::Outcome),
            other => Err(SolverError::InvalidMode(other.to_string())),
        }
    }
}

/// Configuration for the training driver.
///
/// # Example
/// ```
/// use cfr_solver::cfr::{Mode, TrainerConfig};
///
/// let config = TrainerConfig::default().with_mode(Mode::External).with_seed(42);
/// assert_eq!(config.mode, Mode::External);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Traversal variant to train with.
    pub mode: Mode,

    /// Random seed for reproducibility. When absent the generator is seeded
    /// from a nondeterministic source.
    pub seed: Option<u64>,

    /// Root directory for strategy artifacts; the game name is appended as a
    /// subdirectory.
    pub strategy_dir: PathBuf,

    /// Emit a progress line every this many iterations.
    pub progress_interval: u64,

    /// Write an intermediate strategy snapshot every this many iterations.
    pub snapshot_interval: u64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Standard,
            seed: None,
            strategy_dir: PathBuf::from("strategies"),
            progress_interval: 1_000,
            snapshot_interval: 10_000_000,
        }
    }
}

impl TrainerConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the traversal variant.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Builder method: set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder method: set the artifact root directory.
    pub fn with_strategy_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.strategy_dir = dir.into();
        self
    }

    /// Builder method: set the progress-line interval.
    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    /// Builder method: set the snapshot interval.
    pub fn with_snapshot_interval(mut self, interval: u64) -> Self {
        self.snapshot_interval = interval.max(1);
        self
    }
}

/// Errors surfaced at the driver and artifact boundaries.
///
/// The traversal engine itself is a pure function of the game and does not
/// produce errors; violated traversal invariants are programming bugs and
/// terminate with a diagnostic instead.
#[derive(Debug)]
pub enum SolverError {
    /// Unrecognized traversal mode name.
    InvalidMode(String),
    /// A configuration value outside its accepted range.
    InvalidConfig(String),
    /// Failed to read or write a strategy artifact.
    Io(String),
    /// A strategy artifact could not be parsed.
    Parse(String),
    /// The requested mode cannot honor the static-player table.
    Unsupported(String),
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::InvalidMode(mode) => {
                write!(f, "unknown mode \"{}\" (accepted: ", mode)?;
                for (i, m) in Mode::ALL.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(m.as_str())?;
                }
                f.write_str(")")
            }
            SolverError::InvalidConfig(message) => write!(f, "invalid configuration: {}", message),
            SolverError::Io(message) => write!(f, "strategy artifact I/O failed: {}", message),
            SolverError::Parse(message) => write!(f, "strategy artifact parse failed: {}", message),
            SolverError::Unsupported(message) => write!(f, "unsupported: {}", message),
        }
    }
}

impl std::error::Error for SolverError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_round_trips_through_str() {
        for mode in Mode::ALL {
            assert_eq!(mode.as_str().parse::<Mode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let err = "vanilla".parse::<Mode>().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("vanilla"));
        assert!(message.contains("standard"));
        assert!(message.contains("outcome"));
    }

    #[test]
    fn test_default_config() {
        let config = TrainerConfig::default();
        assert_eq!(config.mode, Mode::Standard);
        assert_eq!(config.seed, None);
        assert_eq!(config.progress_interval, 1_000);
        assert_eq!(config.snapshot_interval, 10_000_000);
    }

    #[test]
    fn test_builder_methods() {
        let config = TrainerConfig::new()
            .with_mode(Mode::Outcome)
            .with_seed(7)
            .with_strategy_dir("out")
            .with_progress_interval(0);
        assert_eq!(config.mode, Mode::Outcome);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.strategy_dir, PathBuf::from("out"));
        assert_eq!(config.progress_interval, 1);
    }
}

//! Error type for tracer construction and worker plumbing.
//!
//! The field math itself is total: degenerate inputs are clamped or yield zero
//! contributions. Only configuration and thread management can fail.

use std::error::Error;
use std::fmt;
use std::io;

/// Errors raised while building or ticking a tracer
#[derive(Debug)]
pub enum TracerError {
    /// A configuration value is out of range.
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
    /// A worker thread could not be spawned.
    WorkerSpawn(io::Error),
    /// A worker panicked while advancing a slab.
    WorkerPanicked {
        /// Outer grid index of the slab being processed.
        slab: usize,
    },
    /// The worker pool's channels closed before every slab came back.
    PoolDisconnected,
}

impl TracerError {
    pub(crate) fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for TracerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig { field, reason } => {
                write!(f, "invalid tracer config: {field} {reason}")
            }
            Self::WorkerSpawn(e) => write!(f, "worker thread spawn failed: {e}"),
            Self::WorkerPanicked { slab } => {
                write!(f, "worker panicked while advancing slab {slab}")
            }
            Self::PoolDisconnected => write!(f, "worker pool disconnected mid-tick"),
        }
    }
}

impl Error for TracerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::WorkerSpawn(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for TracerError {
    fn from(e: io::Error) -> Self {
        Self::WorkerSpawn(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = TracerError::invalid_config("i_count", "must be at least 1, got 0");
        assert_eq!(
            err.to_string(),
            "invalid tracer config: i_count must be at least 1, got 0"
        );
        assert_eq!(
            TracerError::WorkerPanicked { slab: 3 }.to_string(),
            "worker panicked while advancing slab 3"
        );
    }

    #[test]
    fn test_spawn_error_has_source() {
        let err = TracerError::from(io::Error::other("no threads"));
        assert!(err.source().is_some());
        assert!(TracerError::PoolDisconnected.source().is_none());
    }
}

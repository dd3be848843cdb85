use crate::AffinityError;
use std::io;
use thiserror::Error;

/// Reasons a benchmark run can stop before producing a [`crate::Report`].
#[derive(Debug, Error)]
pub enum BenchError {
    #[error(transparent)]
    Affinity(#[from] AffinityError),

    #[error("invalid benchmark parameters: {0}")]
    InvalidParams(&'static str),

    #[error("failed to spawn {role} thread: {source}")]
    Spawn {
        role: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("{0} thread panicked")]
    RolePanicked(&'static str),
}

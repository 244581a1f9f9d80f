use std::io;

use thiserror::Error;

use crate::provider::ProviderError;

/// Top-level failures of a dashboard session.
#[derive(Debug, Error)]
pub enum Error {
    /// The first fetch failed; the dashboard never starts without data.
    #[error("unable to get kubernetes metrics: {0}")]
    InitialFetch(#[source] ProviderError),
    /// A periodic fetch failed; the previous batch stays on screen.
    #[error("metrics poll failed: {0}")]
    Poll(#[source] ProviderError),
    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),
    #[error("unable to start runtime: {0}")]
    Runtime(#[source] io::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Everything except a steady-state poll failure ends the session.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::Poll(_))
    }
}

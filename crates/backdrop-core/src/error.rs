use thiserror::Error;

/// Errors surfaced to the host.
///
/// Everything else in the simulation (degenerate distances, frame hitches,
/// stale appearance events) is handled where it happens and never reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackdropError {
    #[error("unknown background mode `{0}`")]
    UnknownMode(String),
}

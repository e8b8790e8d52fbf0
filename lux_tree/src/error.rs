//! Error types for the tracking path and the application shell.

use thiserror::Error;

/// Why hand tracking is not (or no longer) producing frames.
#[derive(Debug, Error)]
pub enum TrackingError {
    /// The device or backend could not be opened.
    #[error("hand tracking unavailable: {0}")]
    Unavailable(String),

    /// The source ended while the tracker was running.
    #[error("landmark source closed")]
    SourceClosed,

    #[error("could not start the tracker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("window: {0}")]
    Window(String),

    #[error(transparent)]
    Tracking(#[from] TrackingError),
}

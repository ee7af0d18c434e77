use thiserror::Error;

#[derive(Debug, Error)]
pub enum PacingError {
    /// The pacing wait observed the worker's cancellation flag. The run is
    /// stopping; the enclosing loop must not start another iteration.
    #[error("Pacing wait interrupted; run is stopping.")]
    Interrupted,
}

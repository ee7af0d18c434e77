//! Iteration pacing for virtual-user worker threads.
//!
//! Pacing enforces a minimum wall-clock duration per loop iteration,
//! independent of how long the iteration's own work took. The wait is
//! evaluated retroactively, one iteration behind: [`begin_iteration`] first
//! settles the previous iteration's remaining time, then records the target
//! for the current one. The final iteration of a run is therefore never
//! delayed, since nothing paces against it.
//!
//! State is held in an explicit [`WorkerContext`] owned by the caller, one
//! per worker thread. No thread-local or global timing state exists, so no
//! synchronization between workers is needed.
mod sleeper;


pub use sleeper::{CancelToken, ChunkedSleeper};

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use rand::Rng as _;
use tracing::{error, info};

use crate::error::PacingError;
use crate::vars::{VariableStore, keys};

/// Fallback when a pacing spec fails to parse.
pub const DEFAULT_PACING_SECS: u64 = 60;

/// Parsed form of one pacing configuration string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacingSpec {
    Fixed(u64),
    /// Inclusive range; normalized so min <= max.
    Range(u64, u64),
}

impl PacingSpec {
    /// Parses `"<seconds>"` or `"<min>,<max>"`. Blank input means "no change
    /// to pacing" and parses to `None`.
    ///
    /// # Errors
    ///
    /// Returns a message when either value is not a positive integer.
    pub fn parse(spec: &str) -> Result<Option<Self>, String> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Ok(None);
        }
        if let Some((left, right)) = spec.split_once(',') {
            let min: u64 = left
                .trim()
                .parse()
                .map_err(|err| format!("Invalid pacing minimum '{}': {}", left.trim(), err))?;
            let max: u64 = right
                .trim()
                .parse()
                .map_err(|err| format!("Invalid pacing maximum '{}': {}", right.trim(), err))?;
            // Reversed bounds are swapped rather than rejected.
            if min > max {
                return Ok(Some(Self::Range(max, min)));
            }
            return Ok(Some(Self::Range(min, max)));
        }
        let secs: u64 = spec
            .parse()
            .map_err(|err| format!("Invalid pacing value '{}': {}", spec, err))?;
        Ok(Some(Self::Fixed(secs)))
    }

    /// Resolves the spec to a concrete duration, drawing uniformly for
    /// ranges.
    #[must_use]
    pub fn choose(&self) -> u64 {
        match *self {
            Self::Fixed(secs) => secs,
            Self::Range(min, max) => rand::thread_rng().gen_range(min..=max),
        }
    }
}

/// Timing record for the iteration whose wait has not yet been consumed.
/// At most one exists per worker at any time; it is overwritten every
/// iteration.
#[derive(Debug, Clone, Copy)]
pub struct IterationTiming {
    pub started_at: Instant,
    pub pacing: Option<Duration>,
}

/// Per-worker pacing state, created by the load-generation driver and
/// threaded through every [`begin_iteration`] call. Owned exclusively by the
/// worker it belongs to.
#[derive(Debug)]
pub struct WorkerContext {
    pub group: String,
    pub worker_index: u32,
    /// 1-based once the first iteration begins.
    pub iteration: u64,
    pub timing: Option<IterationTiming>,
    pub cancel: CancelToken,
}

impl WorkerContext {
    #[must_use]
    pub fn new(group: impl Into<String>, worker_index: u32) -> Self {
        Self {
            group: group.into(),
            worker_index,
            iteration: 0,
            timing: None,
            cancel: CancelToken::new(),
        }
    }

    fn diagnostic_tag(&self) -> String {
        format!("TG:{}:T{}:I{}", self.group, self.worker_index, self.iteration)
    }
}

/// Settles the previous iteration's pacing wait, then records timing for the
/// iteration that is about to start.
///
/// The first call for a worker never waits. With `debug` set the wait is
/// skipped unconditionally, but timing is still recorded so pacing resumes
/// cleanly when debug is turned off. A blank `spec` leaves the previous
/// pacing in force; a malformed one falls back to [`DEFAULT_PACING_SECS`].
///
/// Writes `pacing`, `start_time`, and `debug_msg` into `vars` for UI/log
/// layers.
///
/// # Errors
///
/// Returns [`PacingError::Interrupted`] when the wait observes the worker's
/// cancellation flag; the enclosing loop must stop instead of starting
/// another iteration.
pub fn begin_iteration(
    ctx: &mut WorkerContext,
    vars: &mut dyn VariableStore,
    spec: &str,
    debug: bool,
    sleeper: &ChunkedSleeper,
) -> Result<(), PacingError> {
    ctx.iteration = ctx.iteration.saturating_add(1);

    match ctx.timing {
        None => {
            info!(
                "{} first iteration for worker - no pacing wait applied",
                ctx.diagnostic_tag()
            );
        }
        Some(_) if debug => {
            info!("{} debug mode on - skipping pacing wait", ctx.diagnostic_tag());
        }
        Some(timing) => wait_for_previous(ctx, &timing, sleeper)?,
    }

    let previous = ctx.timing.and_then(|timing| timing.pacing);
    let pacing = resolve_pacing(spec, previous);
    ctx.timing = Some(IterationTiming {
        started_at: Instant::now(),
        pacing,
    });

    if let Some(pacing) = pacing {
        vars.put(keys::PACING, &pacing.as_secs().to_string());
        info!(
            "{} pacing set to {}s",
            ctx.diagnostic_tag(),
            pacing.as_secs()
        );
    }
    vars.put(keys::START_TIME, &epoch_millis().to_string());
    vars.put(keys::DEBUG_MSG, &ctx.diagnostic_tag());

    Ok(())
}

fn wait_for_previous(
    ctx: &WorkerContext,
    timing: &IterationTiming,
    sleeper: &ChunkedSleeper,
) -> Result<(), PacingError> {
    let Some(pacing) = timing.pacing else {
        // No spec has been seen yet; nothing to pace against.
        return Ok(());
    };
    let elapsed = timing.started_at.elapsed();
    let remaining = pacing.saturating_sub(elapsed);
    if remaining.is_zero() {
        info!(
            "{} no wait needed (elapsed {}ms, pacing {}ms)",
            ctx.diagnostic_tag(),
            elapsed.as_millis(),
            pacing.as_millis()
        );
        return Ok(());
    }

    info!(
        "{} waiting {}ms (elapsed {}ms, pacing {}ms)",
        ctx.diagnostic_tag(),
        remaining.as_millis(),
        elapsed.as_millis(),
        pacing.as_millis()
    );
    sleeper.sleep(remaining, &ctx.cancel).inspect_err(|_| {
        tracing::warn!(
            "{} pacing wait interrupted - run is stopping",
            ctx.diagnostic_tag()
        );
    })
}

fn resolve_pacing(spec: &str, previous: Option<Duration>) -> Option<Duration> {
    match PacingSpec::parse(spec) {
        Ok(Some(parsed)) => Some(Duration::from_secs(parsed.choose())),
        Ok(None) => previous,
        Err(message) => {
            error!("{} - falling back to {}s", message, DEFAULT_PACING_SECS);
            Some(Duration::from_secs(DEFAULT_PACING_SECS))
        }
    }
}

fn epoch_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or(0)
}

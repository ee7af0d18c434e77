//! Client protocol for the remote shared-state broker (Simple Table Server).
//!
//! The broker manages tabular test-data files shared by every concurrent
//! worker, test-run process, and machine pointed at the same host; files
//! behave as FIFO queues. The broker itself arbitrates record removal - the
//! client's job is solely to surface whatever the broker decided.
mod client;
mod command;
pub mod filename;
mod response;


pub use client::BrokerClient;
pub use command::{BrokerAction, BrokerCommand, CommandError};

use crate::vars::VariableStore;

/// Classification of one broker exchange, observed by callers to branch on
/// outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Ok,
    /// Non-2xx HTTP status from the broker.
    HttpError(u16),
    /// The file has no more records; a normal end-of-data condition, not a
    /// fault.
    EmptyQueue,
    /// 2xx response whose body did not carry the expected wrapper or marker.
    ParseError,
    /// Transport/IO failure before a usable response.
    Network,
    /// Caller input rejected before any network call was attempted.
    InvalidCommand,
}

/// Result of one broker command, produced fresh per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerOutcome {
    pub success: bool,
    pub kind: OutcomeKind,
    /// Variable name -> column value, populated for successful reads only.
    pub values: Vec<(String, String)>,
}

impl BrokerOutcome {
    #[must_use]
    pub fn ok(values: Vec<(String, String)>) -> Self {
        Self {
            success: true,
            kind: OutcomeKind::Ok,
            values,
        }
    }

    #[must_use]
    pub fn failure(kind: OutcomeKind) -> Self {
        Self {
            success: false,
            kind,
            values: Vec::new(),
        }
    }
}

/// Seam between command execution and the transport, so batch dispatch can
/// be exercised without a live broker.
pub trait CommandExecutor {
    fn execute(&self, vars: &mut dyn VariableStore, command: &str) -> BrokerOutcome;
}

//! Core building blocks for load-test virtual users.
//!
//! Two subsystems carry the real logic: the pacing scheduler
//! ([`pacing`]), which enforces a target iteration duration per worker
//! thread, and the broker client ([`broker`]), which exchanges test data
//! with a remote Simple Table Server behaving as a shared FIFO. Around them
//! sit the batch dispatcher ([`dispatch`]), the per-worker variable
//! namespace ([`vars`]), run configuration ([`config`]), and the one-time
//! global setup ([`setup`]). GUI panels and test-plan plumbing are external
//! collaborators: they call these entry points and read results back out of
//! the variable store.
pub mod broker;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod logger;
pub mod pacing;
pub mod setup;
pub mod vars;

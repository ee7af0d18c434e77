//! Per-worker variable namespace shared with the hosting test runtime.
//!
//! Each virtual-user thread owns exactly one store; the pacing scheduler and
//! the broker client only read and write named keys in it. Cross-thread
//! access is not part of the contract.

use std::collections::HashMap;

/// Fixed key names written by the core so UI/script layers can branch on
/// outcomes without parsing log output.
pub mod keys {
    /// Pacing seconds chosen for the current iteration.
    pub const PACING: &str = "pacing";
    /// Epoch milliseconds at which the current iteration started.
    pub const START_TIME: &str = "start_time";
    /// Diagnostic tag: group, worker index, iteration index.
    pub const DEBUG_MSG: &str = "debug_msg";

    pub const STS_SUCCESS: &str = "STS_SUCCESS";
    pub const STS_STATUS: &str = "STS_STATUS";
    pub const STS_ERROR: &str = "STS_ERROR";
    pub const STS_ERROR_MESSAGE: &str = "STS_ERROR_MESSAGE";
    pub const STS_FILE_EMPTY: &str = "STS_FILE_EMPTY";
    pub const STS_FILE_EMPTY_NAME: &str = "STS_FILE_EMPTY_NAME";
    pub const STS_OPERATIONS_TOTAL: &str = "STS_OPERATIONS_TOTAL";
    pub const STS_OPERATIONS_SUCCESS: &str = "STS_OPERATIONS_SUCCESS";
    pub const STS_OPERATIONS_FAILED: &str = "STS_OPERATIONS_FAILED";
    pub const STS_LAST_COMMAND: &str = "STS_LAST_COMMAND";
}

/// Mutable key→string mapping owned by one worker thread.
///
/// The host runtime supplies its own implementation; [`ThreadVariables`] is
/// the in-memory default used by tests and standalone drivers.
pub trait VariableStore {
    fn get(&self, name: &str) -> Option<&str>;
    fn put(&mut self, name: &str, value: &str);
}

/// Plain in-memory [`VariableStore`].
#[derive(Debug, Default)]
pub struct ThreadVariables {
    entries: HashMap<String, String>,
}

impl ThreadVariables {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl VariableStore for ThreadVariables {
    fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    fn put(&mut self, name: &str, value: &str) {
        self.entries.insert(name.to_owned(), value.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_overwrites_previous_value() {
        let mut vars = ThreadVariables::new();
        vars.put("ID", "1");
        vars.put("ID", "2");
        assert_eq!(vars.get("ID"), Some("2"));
        assert_eq!(vars.len(), 1);
    }

    #[test]
    fn get_missing_is_none() {
        let vars = ThreadVariables::new();
        assert!(vars.get("absent").is_none());
        assert!(vars.is_empty());
    }
}

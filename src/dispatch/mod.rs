//! Batch dispatch of broker operations.
//!
//! A configuration string holds either one legacy `ACTION,FILENAME,field...`
//! command or a pipe-delimited list of `FILENAME;ACTION;fields[;comment]`
//! entries. Each operation becomes one [`CommandExecutor`] call; outcomes
//! are folded into a [`BatchResult`] and mirrored into the caller's
//! variable store under fixed keys.

#[cfg(test)]
mod tests;

use tracing::{debug, warn};

use crate::broker::{BrokerAction, CommandExecutor};
use crate::vars::{VariableStore, keys};

/// One operation parsed out of a batch string, still in raw string form;
/// validation happens when the assembled command reaches the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub filename: String,
    pub action: String,
    pub fields: String,
}

impl Operation {
    fn to_command(&self) -> String {
        format!("{},{},{}", self.action, self.filename, self.fields)
    }
}

/// Aggregate outcome of one batch, discarded after being copied into the
/// variable store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub total: u32,
    pub succeeded: u32,
    pub failed: u32,
    pub last_command: String,
}

impl BatchResult {
    /// True only when every operation succeeded and at least one ran.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.total > 0 && self.failed == 0
    }

    #[must_use]
    pub fn status(&self) -> &'static str {
        if self.total == 0 {
            "ERROR"
        } else if self.failed == 0 {
            "ALL_SUCCESS"
        } else {
            "SOME_FAILED"
        }
    }
}

/// Splits a configuration string into discrete operations.
///
/// A string without pipes or semicolons whose first token is a known action
/// is treated as a single legacy `ACTION,FILENAME,fields` command. Batch
/// entries use semicolons (so field lists may contain commas) or, for
/// backward compatibility, commas when no semicolon is present; a fourth
/// part is a comment and is ignored. Blank or incomplete entries are
/// skipped with a warning.
#[must_use]
pub fn parse_operations(input: &str) -> Vec<Operation> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    if !trimmed.contains('|')
        && !trimmed.contains(';')
        && let Some((first, _)) = trimmed.split_once(',')
        && BrokerAction::parse(first).is_some()
    {
        return parse_legacy(trimmed).into_iter().collect();
    }

    let mut operations = Vec::new();
    for entry in trimmed.split('|') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let parts: Vec<&str> = if entry.contains(';') {
            entry.splitn(4, ';').collect()
        } else {
            entry.splitn(4, ',').collect()
        };
        if parts.len() < 3 {
            warn!("Skipping incomplete batch entry: {entry}");
            continue;
        }
        let filename = parts[0].trim();
        let action = parts[1].trim();
        let fields = parts[2].trim();
        if filename.is_empty() || fields.is_empty() {
            warn!("Skipping batch entry with blank filename or fields: {entry}");
            continue;
        }
        operations.push(Operation {
            filename: filename.to_owned(),
            action: action.to_owned(),
            fields: fields.to_owned(),
        });
    }
    operations
}

fn parse_legacy(command: &str) -> Option<Operation> {
    let tokens: Vec<&str> = command.splitn(3, ',').collect();
    let [action, filename, fields] = tokens[..] else {
        warn!("Skipping incomplete legacy command: {command}");
        return None;
    };
    Some(Operation {
        filename: filename.trim().to_owned(),
        action: action.trim().to_owned(),
        fields: fields.trim().to_owned(),
    })
}

/// Replaces `${name}` placeholders with values from `vars`. Unresolved
/// placeholders stay verbatim; substitution failure is never fatal.
#[must_use]
pub fn substitute(input: &str, vars: &dyn VariableStore) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            // Unterminated placeholder; keep the tail verbatim.
            result.push_str(&rest[start..]);
            return result;
        };
        let name = &after[..end];
        match vars.get(name) {
            Some(value) => result.push_str(value),
            None => {
                warn!("Variable {name} not found, keeping ${{{name}}} as-is");
                result.push_str("${");
                result.push_str(name);
                result.push('}');
            }
        }
        rest = &after[end + 1..];
    }
    result.push_str(rest);
    result
}

/// Parses `operations`, runs each through `executor`, and writes the batch
/// summary keys (`STS_SUCCESS`, `STS_STATUS`, operation counters, last
/// command) into `vars`.
pub fn run_batch(
    executor: &dyn CommandExecutor,
    vars: &mut dyn VariableStore,
    operations: &str,
) -> BatchResult {
    let mut result = BatchResult::default();
    for operation in parse_operations(operations) {
        let fields = substitute(&operation.fields, &*vars);
        let command = Operation {
            fields,
            ..operation
        }
        .to_command();
        result.last_command.clone_from(&command);

        let outcome = executor.execute(vars, &command);
        result.total += 1;
        if outcome.success {
            result.succeeded += 1;
        } else {
            result.failed += 1;
        }
        debug!(
            "Batch operation '{command}' -> {:?} (success={})",
            outcome.kind, outcome.success
        );
    }

    write_summary(vars, &result);
    result
}

fn write_summary(vars: &mut dyn VariableStore, result: &BatchResult) {
    let success = if result.all_succeeded() { "true" } else { "false" };
    vars.put(keys::STS_SUCCESS, success);
    vars.put(keys::STS_OPERATIONS_TOTAL, &result.total.to_string());
    vars.put(keys::STS_OPERATIONS_SUCCESS, &result.succeeded.to_string());
    vars.put(keys::STS_OPERATIONS_FAILED, &result.failed.to_string());
    vars.put(keys::STS_STATUS, result.status());
    vars.put(keys::STS_LAST_COMMAND, &result.last_command);
}

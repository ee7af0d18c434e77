use std::cell::RefCell;

use super::*;
use crate::broker::{BrokerOutcome, OutcomeKind};
use crate::vars::{ThreadVariables, VariableStore as _};

/// Records every command instead of touching the network; commands listed
/// in `fail` come back unsuccessful.
#[derive(Default)]
struct StubExecutor {
    calls: RefCell<Vec<String>>,
    fail: Vec<String>,
}

impl StubExecutor {
    fn failing_on(fail: &[&str]) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            fail: fail.iter().map(|&command| command.to_owned()).collect(),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl CommandExecutor for StubExecutor {
    fn execute(&self, _vars: &mut dyn crate::vars::VariableStore, command: &str) -> BrokerOutcome {
        self.calls.borrow_mut().push(command.to_owned());
        if self.fail.iter().any(|entry| entry == command) {
            BrokerOutcome::failure(OutcomeKind::EmptyQueue)
        } else {
            BrokerOutcome::ok(Vec::new())
        }
    }
}

#[test]
fn legacy_single_command_is_one_operation() {
    let operations = parse_operations("KEEP,accounts.csv,ID,NAME");
    assert_eq!(
        operations,
        vec![Operation {
            filename: "accounts.csv".to_owned(),
            action: "KEEP".to_owned(),
            fields: "ID,NAME".to_owned(),
        }]
    );
}

#[test]
fn semicolon_entries_allow_commas_in_fields_and_ignore_comments() {
    let operations =
        parse_operations("accounts.csv;KEEP;ID,NAME;seed data|audit.csv;ADDLAST;${ID},done");
    assert_eq!(operations.len(), 2);
    assert_eq!(operations[0].fields, "ID,NAME");
    assert_eq!(operations[1].action, "ADDLAST");
    assert_eq!(operations[1].fields, "${ID},done");
}

#[test]
fn comma_entries_are_accepted_for_backward_compatibility() {
    // In the comma form the fourth token is the comment, so only one field
    // survives per entry.
    let operations = parse_operations("accounts.csv,KEEP,ID,legacy comment|audit.csv,DEL,REF");
    assert_eq!(operations.len(), 2);
    assert_eq!(operations[0].fields, "ID");
    assert_eq!(operations[1].filename, "audit.csv");
}

#[test]
fn blank_and_incomplete_entries_are_skipped() {
    let operations = parse_operations("||accounts.csv;KEEP|;;|accounts.csv;DEL;ID|");
    assert_eq!(operations.len(), 1);
    assert_eq!(operations[0].action, "DEL");
}

#[test]
fn empty_string_parses_to_no_operations() {
    assert!(parse_operations("").is_empty());
    assert!(parse_operations("   ").is_empty());
}

#[test]
fn substitute_resolves_known_placeholders() {
    let mut vars = ThreadVariables::new();
    vars.put("ID", "42");
    vars.put("NAME", "Alice");
    assert_eq!(substitute("${ID},${NAME},done", &vars), "42,Alice,done");
}

#[test]
fn substitute_keeps_unresolved_placeholders_verbatim() {
    let vars = ThreadVariables::new();
    assert_eq!(substitute("${MISSING},x", &vars), "${MISSING},x");
    assert_eq!(substitute("${unterminated", &vars), "${unterminated");
}

#[test]
fn batch_counts_successes_and_failures() {
    let executor = StubExecutor::failing_on(&["DEL,b.csv,REF"]);
    let mut vars = ThreadVariables::new();

    let result = run_batch(
        &executor,
        &mut vars,
        "a.csv;KEEP;ID|b.csv;DEL;REF|c.csv;ADDLAST;1,2",
    );
    assert_eq!(result.total, 3);
    assert_eq!(result.succeeded, 2);
    assert_eq!(result.failed, 1);
    assert!(!result.all_succeeded());
    assert_eq!(result.status(), "SOME_FAILED");
    assert_eq!(result.last_command, "ADDLAST,c.csv,1,2");

    assert_eq!(vars.get("STS_SUCCESS"), Some("false"));
    assert_eq!(vars.get("STS_OPERATIONS_TOTAL"), Some("3"));
    assert_eq!(vars.get("STS_OPERATIONS_SUCCESS"), Some("2"));
    assert_eq!(vars.get("STS_OPERATIONS_FAILED"), Some("1"));
    assert_eq!(vars.get("STS_STATUS"), Some("SOME_FAILED"));
    assert_eq!(vars.get("STS_LAST_COMMAND"), Some("ADDLAST,c.csv,1,2"));
}

#[test]
fn all_successful_batch_reports_all_success() {
    let executor = StubExecutor::default();
    let mut vars = ThreadVariables::new();

    let result = run_batch(&executor, &mut vars, "a.csv;KEEP;ID|b.csv;ADDFIRST;x");
    assert!(result.all_succeeded());
    assert_eq!(vars.get("STS_SUCCESS"), Some("true"));
    assert_eq!(vars.get("STS_STATUS"), Some("ALL_SUCCESS"));
}

#[test]
fn empty_batch_reports_error_status() {
    let executor = StubExecutor::default();
    let mut vars = ThreadVariables::new();

    let result = run_batch(&executor, &mut vars, " ");
    assert_eq!(result.total, 0);
    assert!(!result.all_succeeded());
    assert!(executor.calls().is_empty());
    assert_eq!(vars.get("STS_SUCCESS"), Some("false"));
    assert_eq!(vars.get("STS_STATUS"), Some("ERROR"));
    assert_eq!(vars.get("STS_LAST_COMMAND"), Some(""));
}

#[test]
fn placeholders_are_substituted_before_dispatch() {
    let executor = StubExecutor::default();
    let mut vars = ThreadVariables::new();
    vars.put("ACCOUNT", "42");

    run_batch(&executor, &mut vars, "audit.csv;ADDLAST;${ACCOUNT},checked");
    assert_eq!(executor.calls(), vec!["ADDLAST,audit.csv,42,checked"]);
}

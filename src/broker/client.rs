use reqwest::Url;
use reqwest::blocking::Client;
use tracing::{debug, error, info, warn};

use crate::config::RunConfig;
use crate::error::BrokerError;
use crate::vars::{VariableStore, keys};

use super::command::{BrokerAction, BrokerCommand};
use super::response::{ReadBody, classify_read_body, is_add_ok};
use super::{BrokerOutcome, CommandExecutor, OutcomeKind, filename};

/// Exception sentinels embed at most this many characters of the transport
/// error message.
const EXCEPTION_MESSAGE_CHARS: usize = 50;

/// Stateless protocol engine for the Simple Table Server.
///
/// One instance can be shared by reference across worker threads; every call
/// performs a single blocking HTTP round trip and classifies the response.
/// The client never retries - retry policy belongs to the caller.
pub struct BrokerClient {
    http: Client,
    read_url: Url,
    add_url: Url,
    repo_name: Option<String>,
}

impl BrokerClient {
    /// Builds a client for the configured broker host.
    ///
    /// # Errors
    ///
    /// Fails when no host is configured, the host does not form a valid URL,
    /// or the underlying HTTP client cannot be built.
    pub fn new(config: &RunConfig) -> Result<Self, BrokerError> {
        let host = config
            .broker_host
            .as_deref()
            .map(str::trim)
            .filter(|host| !host.is_empty())
            .ok_or(BrokerError::MissingHost)?;
        let scheme = if config.use_https { "https" } else { "http" };
        let parse = |path: &str| {
            Url::parse(&format!("{scheme}://{host}/{path}")).map_err(|err| {
                BrokerError::InvalidHostUrl {
                    host: host.to_owned(),
                    source: err,
                }
            })
        };
        let read_url = parse("sts/READ")?;
        let add_url = parse("sts/ADD")?;

        let mut builder = Client::builder();
        if config.trust_all_certs {
            // Broker hosts routinely present self-signed certificates.
            builder = builder.danger_accept_invalid_certs(true);
        }
        if !config.verify_hostname {
            builder = builder.danger_accept_invalid_hostnames(true);
        }
        let http = builder
            .build()
            .map_err(|err| BrokerError::BuildClientFailed { source: err })?;

        Ok(Self {
            http,
            read_url,
            add_url,
            repo_name: config.repo_name.clone(),
        })
    }

    /// Runs one `ACTION,FILENAME,FIELD[,FIELD...]` command.
    ///
    /// Never fails the caller: every condition degrades to a classified
    /// [`BrokerOutcome`], with sentinel values written into `vars` for read
    /// operations.
    pub fn execute(&self, vars: &mut dyn VariableStore, command: &str) -> BrokerOutcome {
        let parsed = match BrokerCommand::parse(command) {
            Ok(parsed) => parsed,
            Err(err) => {
                error!("Broker command rejected ({err}): {command}");
                return BrokerOutcome::failure(OutcomeKind::InvalidCommand);
            }
        };
        let filename = filename::normalize(&parsed.filename, self.repo_name.as_deref());
        match parsed.action {
            BrokerAction::Keep => self.read(vars, &filename, true, &parsed.fields),
            BrokerAction::Del => self.read(vars, &filename, false, &parsed.fields),
            BrokerAction::AddFirst => self.add(&filename, "FIRST", &parsed.fields),
            BrokerAction::AddLast => self.add(&filename, "LAST", &parsed.fields),
        }
    }

    fn read(
        &self,
        vars: &mut dyn VariableStore,
        filename: &str,
        keep: bool,
        names: &[String],
    ) -> BrokerOutcome {
        let keep_value = if keep { "TRUE" } else { "FALSE" };
        debug!("Broker READ: KEEP={keep_value} FILENAME={filename}");

        let sent = self
            .http
            .get(self.read_url.clone())
            .query(&[
                ("READ_MODE", "FIRST"),
                ("KEEP", keep_value),
                ("FILENAME", filename),
            ])
            .send();
        let response = match sent {
            Ok(response) => response,
            Err(err) => return self.read_exception(vars, filename, names, &err),
        };
        let status = response.status();
        let body = match response.text() {
            Ok(body) => body,
            Err(err) => return self.read_exception(vars, filename, names, &err),
        };
        debug!("Broker READ response: status={status} body={body}");

        if !status.is_success() {
            error!("Broker read of '{filename}' failed with status {status}");
            let sentinel = format!("{filename}-HTTP_ERROR_{}", status.as_u16());
            set_all(vars, names, &sentinel);
            return BrokerOutcome::failure(OutcomeKind::HttpError(status.as_u16()));
        }

        match classify_read_body(&body) {
            ReadBody::Empty => {
                warn!("No more data available in file: {filename}");
                let sentinel = format!("{filename}-EMPTY_FILE_ERROR");
                set_all(vars, names, &sentinel);
                vars.put(keys::STS_FILE_EMPTY, "true");
                vars.put(keys::STS_FILE_EMPTY_NAME, filename);
                BrokerOutcome::failure(OutcomeKind::EmptyQueue)
            }
            ReadBody::Unrecognized => {
                error!("Could not extract a record from the broker response for '{filename}'");
                let sentinel = format!("{filename}-PARSE_ERROR");
                set_all(vars, names, &sentinel);
                BrokerOutcome::failure(OutcomeKind::ParseError)
            }
            ReadBody::Record(columns) => {
                info!("Broker read from '{filename}': {} column(s)", columns.len());
                // Positional assignment, truncated at the shorter side.
                let values: Vec<(String, String)> = names
                    .iter()
                    .zip(columns)
                    .map(|(name, column)| {
                        vars.put(name, &column);
                        (name.clone(), column)
                    })
                    .collect();
                vars.put(keys::STS_FILE_EMPTY, "false");
                BrokerOutcome::ok(values)
            }
        }
    }

    fn read_exception(
        &self,
        vars: &mut dyn VariableStore,
        filename: &str,
        names: &[String],
        err: &reqwest::Error,
    ) -> BrokerOutcome {
        let message = err.to_string();
        error!("Error reading '{filename}' from broker: {message}");
        let sentinel = format!(
            "{filename}-EXCEPTION_ERROR: {}",
            truncate_chars(&message, EXCEPTION_MESSAGE_CHARS)
        );
        set_all(vars, names, &sentinel);
        vars.put(keys::STS_ERROR, "true");
        vars.put(keys::STS_ERROR_MESSAGE, &message);
        BrokerOutcome::failure(OutcomeKind::Network)
    }

    fn add(&self, filename: &str, add_mode: &str, values: &[String]) -> BrokerOutcome {
        let line = values.join(",");
        debug!("Broker ADD: ADD_MODE={add_mode} FILENAME={filename} LINE={line}");

        let sent = self
            .http
            .post(self.add_url.clone())
            .form(&[
                ("ADD_MODE", add_mode),
                ("FILENAME", filename),
                ("LINE", line.as_str()),
            ])
            .send();
        let response = match sent {
            Ok(response) => response,
            Err(err) => {
                error!("Error adding to '{filename}' on broker: {err}");
                return BrokerOutcome::failure(OutcomeKind::Network);
            }
        };
        let status = response.status();
        let body = match response.text() {
            Ok(body) => body,
            Err(err) => {
                error!("Error reading add response for '{filename}': {err}");
                return BrokerOutcome::failure(OutcomeKind::Network);
            }
        };
        debug!("Broker ADD response: status={status} body={body}");

        if !status.is_success() {
            error!("Broker add to '{filename}' failed with status {status}");
            return BrokerOutcome::failure(OutcomeKind::HttpError(status.as_u16()));
        }
        if is_add_ok(&body) {
            info!("Broker add to '{filename}' succeeded");
            BrokerOutcome::ok(Vec::new())
        } else {
            error!("Broker add to '{filename}' did not return OK");
            BrokerOutcome::failure(OutcomeKind::ParseError)
        }
    }
}

impl CommandExecutor for BrokerClient {
    fn execute(&self, vars: &mut dyn VariableStore, command: &str) -> BrokerOutcome {
        Self::execute(self, vars, command)
    }
}

fn set_all(vars: &mut dyn VariableStore, names: &[String], value: &str) {
    for name in names {
        vars.put(name, value);
        info!("Set sentinel for variable {name}: {value}");
    }
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s.get(..idx).unwrap_or(s),
        None => s,
    }
}

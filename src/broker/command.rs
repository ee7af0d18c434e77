use thiserror::Error;

/// Broker operation selector, case-insensitive in command strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerAction {
    /// Read the first record, leaving it in place (idempotent peek).
    Keep,
    /// Read and remove the first record (exactly-once pop).
    Del,
    /// Push a record to the front of the file.
    AddFirst,
    /// Push a record to the back of the file.
    AddLast,
}

impl BrokerAction {
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_uppercase().as_str() {
            "KEEP" => Some(Self::Keep),
            "DEL" => Some(Self::Del),
            "ADDFIRST" => Some(Self::AddFirst),
            "ADDLAST" => Some(Self::AddLast),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Keep => "KEEP",
            Self::Del => "DEL",
            Self::AddFirst => "ADDFIRST",
            Self::AddLast => "ADDLAST",
        }
    }

    /// KEEP/DEL read records; ADDFIRST/ADDLAST write them.
    #[must_use]
    pub fn is_read(self) -> bool {
        matches!(self, Self::Keep | Self::Del)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("not enough parameters; expected ACTION,FILENAME,FIELD[,FIELD...]")]
    TooFewTokens,
    #[error("unknown action '{0}'")]
    UnknownAction(String),
    #[error("filename is blank")]
    BlankFilename,
}

/// One parsed broker command.
///
/// For reads, `fields` are variable names to populate; for writes they are
/// literal values. The grammar guarantees at least one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerCommand {
    pub action: BrokerAction,
    pub filename: String,
    pub fields: Vec<String>,
}

impl BrokerCommand {
    /// Parses `ACTION,FILENAME,FIELD[,FIELD...]`.
    ///
    /// # Errors
    ///
    /// Rejects commands with fewer than three tokens, an unknown action, or
    /// a blank filename. Rejection happens before any network activity.
    pub fn parse(command: &str) -> Result<Self, CommandError> {
        let tokens: Vec<&str> = command.split(',').collect();
        if tokens.len() < 3 {
            return Err(CommandError::TooFewTokens);
        }
        let action_token = tokens[0].trim();
        let action = BrokerAction::parse(action_token)
            .ok_or_else(|| CommandError::UnknownAction(action_token.to_owned()))?;
        let filename = tokens[1].trim();
        if filename.is_empty() {
            return Err(CommandError::BlankFilename);
        }
        let fields = tokens[2..]
            .iter()
            .map(|token| token.trim().to_owned())
            .collect();
        Ok(Self {
            action,
            filename: filename.to_owned(),
            fields,
        })
    }
}

//! Command guard - the denylist gate in front of command execution
//!
//! A command is forbidden when any denylist entry occurs anywhere in its
//! text. Matching is a literal, case-sensitive substring search: it rejects
//! innocent text such as `echo touchdown` and does not see through
//! `/bin/RM`, aliases or chained commands. Callers rely on exactly this
//! behaviour, so tightening it is a feature change.

use crate::types::{CommandDecision, PolicyConfig};

/// Immutable denylist shared by every connection handler
#[derive(Debug, Clone)]
pub struct CommandPolicy {
    denylist: Vec<String>,
}

impl CommandPolicy {
    /// Create a new policy from config
    ///
    /// Empty entries would match every command and are dropped, as are
    /// duplicates.
    pub fn new(config: &PolicyConfig) -> Self {
        Self::from_entries(config.denylist.iter().map(String::as_str))
    }

    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a str>) -> Self {
        let mut denylist: Vec<String> = Vec::new();
        for entry in entries {
            if entry.is_empty() {
                tracing::warn!("Ignoring empty denylist entry");
                continue;
            }
            if !denylist.iter().any(|d| d == entry) {
                denylist.push(entry.to_string());
            }
        }
        Self { denylist }
    }

    /// Check whether any denylist entry appears in the command
    pub fn is_forbidden(&self, command: &str) -> bool {
        self.matched_entry(command).is_some()
    }

    pub fn decide(&self, command: &str) -> CommandDecision {
        match self.matched_entry(command) {
            Some(entry) => {
                tracing::debug!(entry, "Command matches denylist entry");
                CommandDecision::Forbidden
            }
            None => CommandDecision::Allowed,
        }
    }

    /// The first denylist entry found in the command, if any
    pub fn matched_entry(&self, command: &str) -> Option<&str> {
        self.denylist
            .iter()
            .find(|entry| command.contains(entry.as_str()))
            .map(String::as_str)
    }

    pub fn entries(&self) -> &[String] {
        &self.denylist
    }
}

impl Default for CommandPolicy {
    fn default() -> Self {
        Self::new(&PolicyConfig::default())
    }
}

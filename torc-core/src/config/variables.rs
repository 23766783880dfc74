//! Placeholder substitution
//!
//! Config values may reference deployment-specific values as `$NAME` or
//! `${NAME}` (for example `$MASTER_IP`). A [`Variables`] map supplies the
//! values used to expand them. `$$` stands for a literal `$`, so `$$PORT`
//! reaches the container as `$PORT`.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Variable holding the master node address
pub const MASTER_IP: &str = "MASTER_IP";

/// Variable holding the address of the controller's own host
pub const MY_IP: &str = "MY_IP";

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\$|\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)")
        .expect("placeholder pattern is a valid regex")
});

/// Named values available for placeholder expansion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables {
    values: BTreeMap<String, String>,
}

impl Variables {
    /// Creates an empty variable set
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a variable
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Sets `MASTER_IP`
    pub fn with_master_ip(self, ip: impl Into<String>) -> Self {
        self.with(MASTER_IP, ip)
    }

    /// Sets `MY_IP`
    pub fn with_my_ip(self, ip: impl Into<String>) -> Self {
        self.with(MY_IP, ip)
    }

    /// Adds the process environment without overriding explicit entries
    pub fn with_process_env(mut self) -> Self {
        for (name, value) in std::env::vars() {
            self.values.entry(name).or_insert(value);
        }
        self
    }

    /// Looks up a variable
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Expands every placeholder in `input`
    ///
    /// Unknown names are left untouched in the output and recorded in `missing`.
    /// Escaped dollars are unescaped.
    pub fn expand(&self, input: &str, missing: &mut BTreeSet<String>) -> String {
        PLACEHOLDER
            .replace_all(input, |caps: &Captures| {
                let Some(name) = placeholder_name(caps) else {
                    return "$".to_string();
                };
                match self.get(name) {
                    Some(value) => value.to_string(),
                    None => {
                        missing.insert(name.to_string());
                        caps[0].to_string()
                    }
                }
            })
            .into_owned()
    }
}

/// Returns true if `input` references at least one placeholder
pub fn has_placeholders(input: &str) -> bool {
    PLACEHOLDER
        .captures_iter(input)
        .any(|caps| placeholder_name(&caps).is_some())
}

/// Collects the placeholder names referenced by `input`
pub fn placeholders_in(input: &str, names: &mut BTreeSet<String>) {
    for caps in PLACEHOLDER.captures_iter(input) {
        if let Some(name) = placeholder_name(&caps) {
            names.insert(name.to_string());
        }
    }
}

/// Name referenced by a match, `None` for an escaped `$$`
fn placeholder_name<'a>(caps: &Captures<'a>) -> Option<&'a str> {
    caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str())
}

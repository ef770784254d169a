//! Environment lookup that tests can replace.
//!
//! The server reads its settings from the process environment. Tests build an
//! [`Env`] from a map instead, so they never touch `std::env::set_var`.

use std::collections::HashMap;

/// Environment variable reader.
#[derive(Clone, Debug, Default)]
pub struct Env {
    overrides: Option<HashMap<String, String>>,
}

impl Env {
    /// Reads from the real process environment.
    pub fn real() -> Self {
        Self { overrides: None }
    }

    /// Reads only from the given key-value pairs.
    pub fn from_pairs<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            overrides: Some(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
        }
    }

    /// Returns the value of `name`, treating empty values as unset.
    pub fn get(&self, name: &str) -> Option<String> {
        let value = match &self.overrides {
            Some(map) => map.get(name).cloned(),
            None => std::env::var(name).ok(),
        };
        value.filter(|v| !v.trim().is_empty())
    }
}

use std::collections::HashMap;
use std::fmt;

use anyhow::{anyhow, Result};
use subtle::ConstantTimeEq;

/// Username/password lookup table consulted at login.
#[derive(Clone, Default)]
pub struct CredentialStore {
    users: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.users.insert(username.into(), password.into());
        self
    }

    /// Parse `user:password` entries separated by `,` or `;`.
    pub fn parse(value: &str) -> Result<Self> {
        let mut store = Self::new();
        for entry in value.split([',', ';']) {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let (username, password) = entry
                .split_once(':')
                .ok_or_else(|| anyhow!("credential entry must be 'user:password'"))?;
            let username = username.trim();
            if username.is_empty() || password.is_empty() {
                return Err(anyhow!("credential entry has an empty username or password"));
            }
            store.users.insert(username.to_string(), password.to_string());
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn verify(&self, username: &str, password: &str) -> bool {
        match self.users.get(username) {
            Some(expected) => bool::from(expected.as_bytes().ct_eq(password.as_bytes())),
            None => false,
        }
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut usernames = self.users.keys().collect::<Vec<_>>();
        usernames.sort();
        f.debug_struct("CredentialStore")
            .field("users", &usernames)
            .finish()
    }
}

// Effective configuration for one command invocation.
//
// Precedence, highest first: explicit argument, persisted config, process
// environment (address only), built-in default (address only). Empty strings
// count as "not supplied" at every level.

use std::time::Duration;

use crate::config::StoredConfig;

/// Address used when nothing else supplies one.
pub const DEFAULT_ADDRESS: &str = "http://localhost:3000";

/// Environment variable consulted once at startup for the address.
pub const ADDRESS_ENV: &str = "BOXEE_ADDRESS";

/// Process environment captured once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    pub address: Option<String>,
}

impl Environment {
    pub fn capture() -> Self {
        Environment {
            address: std::env::var(ADDRESS_ENV).ok().filter(|a| !a.trim().is_empty()),
        }
    }
}

/// Values supplied explicitly on the command line for this invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub email: Option<String>,
    pub address: Option<String>,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveConfig {
    pub email: String,
    /// Never empty.
    pub address: String,
    /// Empty before the first successful login.
    pub session_token: String,
    /// `None` means requests never time out.
    pub timeout: Option<Duration>,
}

impl EffectiveConfig {
    pub fn is_authenticated(&self) -> bool {
        !self.session_token.trim().is_empty()
    }
}

/// Merge the sources into an [`EffectiveConfig`]. Never fails; unset optional
/// fields come back as empty strings.
pub fn resolve(
    overrides: &Overrides,
    persisted: Option<&StoredConfig>,
    env: &Environment,
) -> EffectiveConfig {
    let empty = StoredConfig::default();
    let stored = persisted.unwrap_or(&empty);

    let email = first_of([
        overrides.email.as_deref().and_then(non_empty),
        non_empty(&stored.email),
    ]);
    let address = first_of([
        overrides.address.as_deref().and_then(non_empty),
        non_empty(&stored.address),
        env.address.as_deref().and_then(non_empty),
        Some(DEFAULT_ADDRESS),
    ]);
    let session_token = first_of([non_empty(&stored.session_token)]);

    EffectiveConfig {
        email: email.to_owned(),
        address: address.to_owned(),
        session_token: session_token.to_owned(),
        timeout: overrides.timeout,
    }
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.trim().is_empty()).then_some(value)
}

fn first_of<'a, const N: usize>(candidates: [Option<&'a str>; N]) -> &'a str {
    candidates.into_iter().flatten().next().unwrap_or("")
}

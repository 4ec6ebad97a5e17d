//! Configuration for an [`IlpBinding`](crate::IlpBinding).
//!
//! The secret is the only value that affects commitments. The account is the
//! placeholder destination written into every packet; it is never routed.
//!
//! # Environment Variables
//!
//! - `ILP_SECRET` - HMAC key used to derive fulfillments (required)
//! - `ILP_ACCOUNT` - Override the packet account (default: `g.placeholder.payee`)

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::IlpError;

/// Packet account used when none is configured.
pub const DEFAULT_ACCOUNT: &str = "g.placeholder.payee";

/// Environment variable holding the secret.
pub const SECRET_ENV: &str = "ILP_SECRET";

/// Environment variable overriding the packet account.
pub const ACCOUNT_ENV: &str = "ILP_ACCOUNT";

/// Settings for commitment generation.
///
/// # Example
///
/// ```rust
/// use ilp_binding::config::IlpConfig;
///
/// let config: IlpConfig = serde_json::from_value(serde_json::json!({
///     "secret": "s3cr3t"
/// }))
/// .unwrap();
/// assert_eq!(config.account, "g.placeholder.payee");
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IlpConfig {
    /// HMAC key for fulfillment derivation.
    pub secret: String,

    /// Account written into generated packets.
    #[serde(default = "default_account")]
    pub account: String,
}

fn default_account() -> String {
    DEFAULT_ACCOUNT.to_owned()
}

impl fmt::Debug for IlpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IlpConfig")
            .field("secret", &"<redacted>")
            .field("account", &self.account)
            .finish()
    }
}

impl IlpConfig {
    /// Creates a configuration with the default account.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            account: default_account(),
        }
    }

    /// Sets the packet account.
    #[must_use]
    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = account.into();
        self
    }

    /// Loads the configuration from `ILP_SECRET` and `ILP_ACCOUNT`.
    ///
    /// # Errors
    ///
    /// Returns [`IlpError::MissingSecret`] if `ILP_SECRET` is unset or empty.
    pub fn from_env() -> Result<Self, IlpError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, IlpError> {
        let secret = lookup(SECRET_ENV)
            .filter(|s| !s.is_empty())
            .ok_or(IlpError::MissingSecret)?;
        let mut config = Self::new(secret);
        if let Some(account) = lookup(ACCOUNT_ENV).filter(|a| !a.trim().is_empty()) {
            config.account = account.trim().to_owned();
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_requires_secret() {
        assert!(matches!(
            IlpConfig::from_lookup(lookup(&[])).unwrap_err(),
            IlpError::MissingSecret
        ));
        assert!(matches!(
            IlpConfig::from_lookup(lookup(&[(SECRET_ENV, "")])).unwrap_err(),
            IlpError::MissingSecret
        ));
    }

    #[test]
    fn test_from_lookup_defaults_account() {
        let config = IlpConfig::from_lookup(lookup(&[(SECRET_ENV, "abc")])).unwrap();
        assert_eq!(config.secret, "abc");
        assert_eq!(config.account, DEFAULT_ACCOUNT);
    }

    #[test]
    fn test_from_lookup_account_override() {
        let config = IlpConfig::from_lookup(lookup(&[
            (SECRET_ENV, "abc"),
            (ACCOUNT_ENV, " g.switch.payee "),
        ]))
        .unwrap();
        assert_eq!(config.account, "g.switch.payee");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = IlpConfig::new("hunter2");
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}

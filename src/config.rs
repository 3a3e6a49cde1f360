//! Configuration capability for the gateway client.
//!
//! Merchant credentials live in whatever the host application uses for
//! settings — an environment file, a key-value table, a secrets
//! manager. The client only needs a [`ConfigProvider`]: a single-method
//! lookup capability, so the signature and payload code stays pure and
//! testable without any storage behind it.

use std::collections::HashMap;

use secrecy::SecretString;

use crate::error::{DuitkuError, Result};

/// Settings key for the merchant code.
pub const MERCHANT_CODE_KEY: &str = "duitku.merchant_code";
/// Settings key for the merchant API key.
pub const API_KEY_KEY: &str = "duitku.api_key";
/// Settings key for the sandbox flag ("1"/"true" enables sandbox).
pub const SANDBOX_KEY: &str = "duitku.sandbox";

/// A read-only string-keyed settings lookup.
pub trait ConfigProvider {
    /// Returns the value stored under `key`, or `None` if absent.
    fn get(&self, key: &str) -> Option<String>;
}

impl ConfigProvider for HashMap<String, String> {
    #[inline]
    fn get(&self, key: &str) -> Option<String> {
        Self::get(self, key).cloned()
    }
}

/// [`ConfigProvider`] backed by process environment variables.
///
/// Settings keys map to environment names by upper-casing and replacing
/// dots with underscores: `duitku.merchant_code` reads
/// `DUITKU_MERCHANT_CODE`. Empty variables count as absent.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvProvider;

impl EnvProvider {
    /// Creates the provider.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Maps a settings key to its environment variable name.
    fn env_name(key: &str) -> String {
        key.to_ascii_uppercase().replace('.', "_")
    }
}

impl ConfigProvider for EnvProvider {
    #[inline]
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(Self::env_name(key))
            .ok()
            .filter(|value| !value.is_empty())
    }
}

/// Resolved gateway credentials.
#[derive(Debug)]
pub struct DuitkuConfig {
    /// Merchant code issued by the gateway.
    pub merchant_code: String,
    /// Merchant API key; never logged or echoed.
    pub api_key: SecretString,
    /// Whether to target the sandbox environment.
    pub sandbox: bool,
}

impl DuitkuConfig {
    /// Resolves the configuration from a provider.
    ///
    /// The sandbox flag defaults to `true` when unset — pointing a
    /// misconfigured deployment at the sandbox is recoverable, pointing
    /// it at production is not.
    ///
    /// # Errors
    ///
    /// Returns [`DuitkuError::ConfigurationMissing`] if the merchant
    /// code or API key is absent.
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        let merchant_code = provider
            .get(MERCHANT_CODE_KEY)
            .ok_or_else(|| DuitkuError::ConfigurationMissing(MERCHANT_CODE_KEY.to_owned()))?;
        let api_key = provider
            .get(API_KEY_KEY)
            .map(SecretString::from)
            .ok_or_else(|| DuitkuError::ConfigurationMissing(API_KEY_KEY.to_owned()))?;
        let sandbox = provider
            .get(SANDBOX_KEY)
            .is_none_or(|flag| matches!(flag.as_str(), "1" | "true" | "yes"));
        Ok(Self {
            merchant_code,
            api_key,
            sandbox,
        })
    }
}

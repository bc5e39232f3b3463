//! Credentials held in configuration
//!
//! The commerce client secret, the static commerce access token and the GCS
//! bearer token are stored as [`SecretString`]. They are redacted from
//! `Debug` output (so a logged `OrderSyncConfig` never shows them) and
//! zeroized when the configuration is dropped. Code that needs the raw value
//! calls `expose_secret()` at the point of use, right before it goes into an
//! `Authorization` header.
//!
//! ```rust
//! use ordersync::config::{secret_string, CommerceConfig};
//!
//! let config = CommerceConfig {
//!     project_key: "shop".to_string(),
//!     client_id: Some("client".to_string()),
//!     client_secret: Some(secret_string("s3cr3t".to_string())),
//!     ..Default::default()
//! };
//!
//! assert!(!format!("{config:?}").contains("s3cr3t"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, ExposeSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// Raw credential text, zeroized on drop
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl SecretValue {
    /// True if the credential is empty or whitespace only
    ///
    /// A `${VAR}` placeholder whose variable is unset substitutes to an
    /// empty string, so blank credentials are treated as missing.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// A credential from `ordersync.toml` or an `ORDERSYNC_*` override
pub type SecretString = Secret<SecretValue>;

/// Wraps a credential read from the environment or a test fixture
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

/// True if an optional credential is configured and not blank
pub fn credential_present(secret: Option<&SecretString>) -> bool {
    secret.map(|s| !s.expose_secret().is_blank()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CommerceConfig, GcsStorageConfig};

    #[test]
    fn test_commerce_credentials_redacted_in_debug() {
        let config = CommerceConfig {
            project_key: "shop".to_string(),
            client_id: Some("client".to_string()),
            client_secret: Some(secret_string("client-secret-value".to_string())),
            access_token: Some(secret_string("static-token-value".to_string())),
            ..Default::default()
        };

        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("client-secret-value"));
        assert!(!debug_output.contains("static-token-value"));
        assert!(debug_output.contains("shop"));
    }

    #[test]
    fn test_gcs_token_parsed_from_toml() {
        let gcs: GcsStorageConfig =
            toml::from_str("bucket = \"order-exports\"\naccess_token = \"ya29.token\"").unwrap();

        assert_eq!(gcs.access_token.expose_secret(), "ya29.token");
        assert!(!format!("{gcs:?}").contains("ya29.token"));
    }

    #[test]
    fn test_credential_present() {
        assert!(credential_present(Some(&secret_string("token".to_string()))));
        assert!(!credential_present(Some(&secret_string("   ".to_string()))));
        assert!(!credential_present(Some(&secret_string(String::new()))));
        assert!(!credential_present(None));
    }
}

//! Domain identifier types with validation
//!
//! Newtype wrappers that keep business-facing order numbers apart from the
//! stable keys used to look up remote reference entities (channels, states).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order number newtype wrapper
///
/// The human/business-facing order identifier, distinct from the remote
/// system's internal order id.
///
/// # Examples
///
/// ```
/// use ordersync::domain::ids::OrderNumber;
/// use std::str::FromStr;
///
/// let number = OrderNumber::from_str("1001").unwrap();
/// assert_eq!(number.as_str(), "1001");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Creates a new OrderNumber from a string
    ///
    /// # Returns
    ///
    /// Returns `Ok(OrderNumber)` if the value is non-blank, `Err` otherwise
    pub fn new(number: impl Into<String>) -> Result<Self, String> {
        let number = number.into();
        if number.trim().is_empty() {
            return Err("Order number cannot be empty".to_string());
        }
        Ok(Self(number))
    }

    /// Returns the order number as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OrderNumber {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for OrderNumber {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OrderNumber> for String {
    fn from(number: OrderNumber) -> Self {
        number.0
    }
}

impl AsRef<str> for OrderNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Stable key of a remote reference entity
///
/// Channels and states are addressed by a human-chosen `key`
/// (e.g. `OrderXmlFileExport`, `exported`) and resolved once per run to the
/// opaque id the update API expects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceKey(String);

impl ResourceKey {
    /// Creates a new ResourceKey; keys may not be blank or contain a double quote
    pub fn new(key: impl Into<String>) -> Result<Self, String> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err("Resource key cannot be empty".to_string());
        }
        if key.contains('"') {
            return Err(format!("Resource key '{key}' cannot contain '\"'"));
        }
        Ok(Self(key))
    }

    /// Returns the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ResourceKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ResourceKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ResourceKey> for String {
    fn from(key: ResourceKey) -> Self {
        key.0
    }
}

impl AsRef<str> for ResourceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

//! Commerce API integration
//!
//! - [`directory`] - the `OrderDirectory` lookup/update trait
//! - [`client`] - reqwest-based client with OAuth2 client credentials
//! - [`render`] - CSV and XML rendering of orders
//! - [`export`] - the `ExportSource` trait and its commerce implementation

pub mod client;
pub mod directory;
pub mod export;
pub mod render;

pub use client::CommerceClient;
pub use directory::{OrderDirectory, QueryPage, ResourceKind, UpdateResponse};
pub use export::{
    CommerceExportSource, ExportData, ExportPayload, ExportSource, XmlDocument,
};
pub use render::{CsvColumn, CsvLayout};

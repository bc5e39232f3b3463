//! Blob stores for export files and sync artifacts
//!
//! - [`traits`] - the `BlobStore` trait and CSV row parsing
//! - [`local`] - local directory
//! - [`gcs`] - Google Cloud Storage bucket
//! - [`memory`] - in-memory store for dry runs and tests
//! - [`factory`] - store selection from configuration

pub mod factory;
pub mod gcs;
pub mod local;
pub mod memory;
pub mod traits;

pub use factory::create_blob_store;
pub use gcs::GcsBlobStore;
pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;
pub use traits::{read_rows, BlobStore};

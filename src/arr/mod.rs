mod client;
mod types;

pub use client::{create_client, CatalogClient, CatalogError, CatalogResult};
pub use types::*;

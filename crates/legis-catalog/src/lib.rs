//! # legis-catalog
//!
//! Entity catalogs for the Câmara dos Deputados and Senado Federal open-data
//! APIs.
//!
//! This crate provides:
//! - The catalog of browsable entity types and how each is fetched
//! - Paginated and nested-path loading with a page safety cap
//! - Projection of raw records to `{id, name}` suggestions
//! - Locale-aware ordering and live substring search
//! - Picker session state with stale-load protection
//! - Parsing and rendering of structured question answers
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use legis_catalog::{Catalog, CatalogConfig, EntityType, HttpSource};
//!
//! #[tokio::main]
//! async fn main() -> legis_catalog::Result<()> {
//!     let config = CatalogConfig::from_env();
//!     let catalog = Catalog::with_config(
//!         Arc::new(HttpSource::new(&config)?),
//!         config.loader_config(),
//!     );
//!     let report = catalog
//!         .load(EntityType::Partidos, &config.camara_base_url)
//!         .await?;
//!     for s in &report.suggestions {
//!         println!("{}\t{}", s.id, s.name);
//!     }
//!     Ok(())
//! }
//! ```

pub mod collation;
pub mod config;
pub mod entity;
pub mod filter;
pub mod http;
pub mod loader;
pub mod path;
pub mod projection;
pub mod selector;
pub mod structured;

// Scripted source for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use legis_core::*;

pub use collation::{locale_cmp, sort_suggestions};
pub use config::CatalogConfig;
pub use entity::{EntitySpec, EntityType, FetchStrategy};
pub use filter::filter_suggestions;
pub use http::HttpSource;
pub use loader::{Catalog, LoadDiagnostic, LoadReport, LoaderConfig};
pub use path::{Extraction, ValuePath};
pub use selector::{LoadTicket, SelectorSession};
pub use structured::{
    parse_structured_response, read_structured_response, Answer, DataType, QueryResult,
};

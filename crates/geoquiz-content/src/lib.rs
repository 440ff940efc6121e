//! geoquiz-content: content backend integrations.
//!
//! Implements the `ContentSource` trait for the Contentful Delivery API and
//! provides configuration loading plus an in-memory mock source.

pub mod config;
pub mod contentful;
pub mod mock;

pub use config::{create_source, load_config, ContentfulConfig, GeoquizConfig};
pub use contentful::ContentfulSource;
pub use geoquiz_core::error::ContentError;
pub use mock::MockSource;

//! URL handling module for Sumi-Scope
//!
//! This module provides root-URL fixing, link resolution and defragmenting,
//! host extraction, the approximate host-matching rules, and the crawl scope
//! that combines them.

mod domain;
mod matcher;
mod normalize;
mod scope;

// Re-export main functions
pub use domain::{extract_host, is_numeric_host};
pub use matcher::{lenient_host, toggle_www};
pub use normalize::{fix_url, Link};
pub use scope::CrawlScope;

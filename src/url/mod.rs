//! URL handling module for Trust-Lens
//!
//! This module provides the canonical form used by the visited set, scan-URL
//! validation for the CLI and HTTP boundaries, and link scoping relative to
//! the scan's start URL.

mod normalize;
mod scope;

// Re-export main functions
pub use normalize::{canonical_url, ensure_scheme, validate_scan_url};
pub use scope::{is_same_origin, path_label, resolve_in_scope};

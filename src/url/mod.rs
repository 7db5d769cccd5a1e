//! URL handling module for Siteseeker
//!
//! Domain normalization is the identity used throughout the frontier: two links
//! belong to the same community site iff their normalized domains are equal.

mod domain;
mod matcher;

pub use domain::{leading_label, normalize_domain, parse_lenient};
pub use matcher::{matches_any, matches_wildcard};

//! Bundle object model for opine.
//!
//! A bundle is a versioned collection of typed intelligence objects
//! (identities, indicators, opinions) exchanged as a single JSON document.
//! This crate owns the wire representation, the append-only mutation
//! surface, and the read-side query index. It performs no UI work and no
//! schema validation beyond the top-level bundle check.

pub mod bundle;
pub mod error;
pub mod index;
pub mod types;

pub use bundle::Bundle;
pub use error::{ModelError, Result};
pub use index::QueryIndex;
pub use types::{Identity, Indicator, Object, Opinion, OPINION_VALUES};

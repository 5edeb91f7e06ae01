//! Read-side query index over a bundle.
//!
//! The index borrows the bundle and must be rebuilt after any append; it
//! owns nothing and is cheap to construct.

use crate::bundle::Bundle;
use crate::error::{ModelError, Result};
use crate::types::{Identity, Indicator, Object, Opinion};

/// Derived, non-owning lookup structure supporting type- and
/// relationship-based filters.
pub struct QueryIndex<'a> {
    bundle: &'a Bundle,
}

impl<'a> QueryIndex<'a> {
    pub fn new(bundle: &'a Bundle) -> Self {
        Self { bundle }
    }

    /// All identity objects, in bundle order.
    pub fn identities(&self) -> Vec<&'a Identity> {
        self.bundle
            .objects
            .iter()
            .filter_map(|object| match object {
                Object::Identity(identity) => Some(identity),
                _ => None,
            })
            .collect()
    }

    /// All indicator objects, in bundle order.
    pub fn indicators(&self) -> Vec<&'a Indicator> {
        self.bundle
            .objects
            .iter()
            .filter_map(|object| match object {
                Object::Indicator(indicator) => Some(indicator),
                _ => None,
            })
            .collect()
    }

    /// Look up one identity by id.
    pub fn identity(&self, id: &str) -> Option<&'a Identity> {
        self.identities().into_iter().find(|i| i.id == id)
    }

    /// Every opinion whose reference set contains `indicator_id`, most
    /// recent first. Ties keep bundle insertion order (stable sort).
    pub fn opinions_for(&self, indicator_id: &str) -> Vec<&'a Opinion> {
        let mut opinions: Vec<&Opinion> = self
            .bundle
            .objects
            .iter()
            .filter_map(|object| match object {
                Object::Opinion(opinion) if opinion.references(indicator_id) => Some(opinion),
                _ => None,
            })
            .collect();
        opinions.sort_by(|a, b| b.created.cmp(&a.created));
        opinions
    }

    /// Resolve the identity an opinion was created by.
    ///
    /// An unresolvable creator means the bundle is inconsistent; opinion
    /// attribution is core to the report's meaning, so this is fatal for
    /// the bundle rather than recoverable per-opinion.
    pub fn creator_of(&self, opinion: &Opinion) -> Result<&'a Identity> {
        let identity_ref =
            opinion
                .created_by_ref
                .as_deref()
                .ok_or_else(|| ModelError::UnknownCreator {
                    opinion_id: opinion.id.clone(),
                    identity_ref: "(none)".to_string(),
                })?;
        self.identity(identity_ref)
            .ok_or_else(|| ModelError::UnknownCreator {
                opinion_id: opinion.id.clone(),
                identity_ref: identity_ref.to_string(),
            })
    }
}

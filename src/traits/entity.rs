//! Projection of raw API objects onto entity types.

use crate::error::Result;
use crate::fields::Fields;

/// An entity backed by a raw field mapping.
///
/// Typed accessors on implementors are pure reads of [`Entity::fields`];
/// fields the type does not recognise stay reachable through the mapping.
pub trait Entity: Sized {
    /// Human-readable entity kind, used in errors and logs.
    const ENTITY_TYPE: &'static str;

    /// Build the entity from its fields.
    ///
    /// # Errors
    ///
    /// Returns a protocol error if the identity field is missing.
    fn from_fields(fields: Fields) -> Result<Self>;

    /// The raw field mapping.
    fn fields(&self) -> &Fields;
}

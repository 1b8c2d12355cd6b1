//! Tag and ingredient catalogue read models.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Recipe tag with a unique slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Tag {
    /// Stable identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Unique URL-safe slug used for filtering.
    pub slug: String,
}

/// Ingredient with its unit of measure.
///
/// Uniqueness is on the `(name, measurement_unit)` pair: "sugar, g" and
/// "sugar, tbsp" are distinct rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Ingredient {
    /// Stable identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Unit the amount is measured in, e.g. "g" or "ml".
    pub measurement_unit: String,
}

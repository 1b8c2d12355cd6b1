//! Recipe read models and the creation/update draft with its validation.
//!
//! Draft validation is the gate for every write: a recipe must carry at
//! least one tag and at least one ingredient, every amount must be positive,
//! and the ingredient list must not name the same ingredient twice. Unknown
//! tag or ingredient ids are caught later, when the persistence adapter
//! resolves them inside the write transaction.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::catalogue::Tag;
use super::user::UserProfile;

/// Maximum length of a recipe name.
pub const RECIPE_NAME_MAX: usize = 256;

/// Validation errors raised by [`RecipeDraft::validate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecipeValidationError {
    /// The draft carries no tags.
    #[error("at least one tag is required")]
    NoTags,
    /// The draft carries no ingredients.
    #[error("at least one ingredient is required")]
    NoIngredients,
    /// An ingredient amount is zero or negative.
    #[error("ingredient amount must be greater than zero")]
    NonPositiveAmount {
        /// Ingredient id carrying the offending amount.
        ingredient_id: Uuid,
    },
    /// The same ingredient id appears more than once.
    #[error("ingredient listed more than once")]
    DuplicateIngredient {
        /// The repeated ingredient id.
        ingredient_id: Uuid,
    },
    /// The same tag id appears more than once.
    #[error("tag listed more than once")]
    DuplicateTag {
        /// The repeated tag id.
        tag_id: Uuid,
    },
    /// The recipe name is empty or too long.
    #[error("name must be between 1 and {RECIPE_NAME_MAX} characters")]
    InvalidName,
    /// The cooking time is zero or negative.
    #[error("cooking time must be greater than zero")]
    NonPositiveCookingTime,
}

impl From<RecipeValidationError> for super::Error {
    fn from(err: RecipeValidationError) -> Self {
        Self::invalid_request(err.to_string())
    }
}

/// One `{id, amount}` entry of a draft's ingredient list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IngredientAmount {
    /// Ingredient identifier to resolve against the catalogue.
    pub id: Uuid,
    /// Required amount in the ingredient's measurement unit.
    pub amount: i32,
}

/// Unvalidated recipe payload as submitted by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDraft {
    /// Recipe title.
    pub name: String,
    /// Free-text preparation instructions.
    pub body: String,
    /// Cooking time in minutes.
    pub cooking_time_minutes: i32,
    /// Reference to an already-hosted image.
    pub image_url: String,
    /// Tag ids to attach.
    pub tag_ids: Vec<Uuid>,
    /// Ingredient entries to attach.
    pub ingredients: Vec<IngredientAmount>,
}

impl RecipeDraft {
    /// Validate the draft, returning a witness type accepted by repositories.
    pub fn validate(self) -> Result<ValidRecipeDraft, RecipeValidationError> {
        if self.name.trim().is_empty() || self.name.len() > RECIPE_NAME_MAX {
            return Err(RecipeValidationError::InvalidName);
        }
        if self.cooking_time_minutes <= 0 {
            return Err(RecipeValidationError::NonPositiveCookingTime);
        }
        if self.tag_ids.is_empty() {
            return Err(RecipeValidationError::NoTags);
        }
        if self.ingredients.is_empty() {
            return Err(RecipeValidationError::NoIngredients);
        }

        let mut seen_tags = HashSet::new();
        for tag_id in &self.tag_ids {
            if !seen_tags.insert(*tag_id) {
                return Err(RecipeValidationError::DuplicateTag { tag_id: *tag_id });
            }
        }

        let mut seen = HashSet::new();
        for entry in &self.ingredients {
            if entry.amount <= 0 {
                return Err(RecipeValidationError::NonPositiveAmount {
                    ingredient_id: entry.id,
                });
            }
            if !seen.insert(entry.id) {
                return Err(RecipeValidationError::DuplicateIngredient {
                    ingredient_id: entry.id,
                });
            }
        }

        Ok(ValidRecipeDraft { inner: self })
    }
}

/// A [`RecipeDraft`] that passed validation.
///
/// Repositories only accept this type, so the tag/ingredient invariants are
/// established before any row is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRecipeDraft {
    inner: RecipeDraft,
}

impl ValidRecipeDraft {
    /// Access the validated draft fields.
    pub fn draft(&self) -> &RecipeDraft {
        &self.inner
    }
}

/// Ingredient line of a persisted recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RecipeIngredient {
    /// Catalogue ingredient id.
    pub id: Uuid,
    /// Ingredient name.
    pub name: String,
    /// Unit the amount is measured in.
    pub measurement_unit: String,
    /// Amount required by this recipe.
    pub amount: i32,
}

/// Full recipe representation returned by detail and list reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RecipeDetail {
    /// Stable identifier.
    pub id: Uuid,
    /// Owning author with viewer-dependent subscription flag.
    pub author: UserProfile,
    /// Recipe title.
    pub name: String,
    /// Free-text preparation instructions.
    pub body: String,
    /// Cooking time in minutes.
    pub cooking_time_minutes: i32,
    /// Reference to an already-hosted image.
    pub image_url: String,
    /// Attached tags.
    pub tags: Vec<Tag>,
    /// Ingredient lines with amounts.
    pub ingredients: Vec<RecipeIngredient>,
    /// Whether the requesting user favourited this recipe.
    pub is_favorited: bool,
    /// Whether this recipe is in the requesting user's shopping cart.
    pub is_in_shopping_cart: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Compact recipe representation used by favourite/cart responses and
/// subscription previews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RecipePreview {
    /// Stable identifier.
    pub id: Uuid,
    /// Recipe title.
    pub name: String,
    /// Reference to an already-hosted image.
    pub image_url: String,
    /// Cooking time in minutes.
    pub cooking_time_minutes: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn draft() -> RecipeDraft {
        RecipeDraft {
            name: "Borscht".into(),
            body: "Simmer until ruby red.".into(),
            cooking_time_minutes: 90,
            image_url: "https://img.example/borscht.png".into(),
            tag_ids: vec![Uuid::new_v4()],
            ingredients: vec![IngredientAmount {
                id: Uuid::new_v4(),
                amount: 300,
            }],
        }
    }

    #[rstest]
    fn valid_draft_passes() {
        assert!(draft().validate().is_ok());
    }

    #[rstest]
    fn empty_tags_are_rejected() {
        let mut d = draft();
        d.tag_ids.clear();
        assert_eq!(d.validate(), Err(RecipeValidationError::NoTags));
    }

    #[rstest]
    fn empty_ingredients_are_rejected() {
        let mut d = draft();
        d.ingredients.clear();
        assert_eq!(d.validate(), Err(RecipeValidationError::NoIngredients));
    }

    #[rstest]
    #[case(0)]
    #[case(-5)]
    fn non_positive_amounts_are_rejected(#[case] amount: i32) {
        let mut d = draft();
        let id = Uuid::new_v4();
        d.ingredients = vec![IngredientAmount { id, amount }];
        assert_eq!(
            d.validate(),
            Err(RecipeValidationError::NonPositiveAmount { ingredient_id: id })
        );
    }

    #[rstest]
    fn duplicate_ingredient_ids_are_rejected() {
        let mut d = draft();
        let id = Uuid::new_v4();
        d.ingredients = vec![
            IngredientAmount { id, amount: 10 },
            IngredientAmount { id, amount: 20 },
        ];
        assert_eq!(
            d.validate(),
            Err(RecipeValidationError::DuplicateIngredient { ingredient_id: id })
        );
    }

    #[rstest]
    fn duplicate_tag_ids_are_rejected() {
        let mut d = draft();
        let tag = Uuid::new_v4();
        d.tag_ids = vec![tag, tag];
        assert_eq!(
            d.validate(),
            Err(RecipeValidationError::DuplicateTag { tag_id: tag })
        );
    }

    #[rstest]
    fn blank_name_is_rejected() {
        let mut d = draft();
        d.name = "   ".into();
        assert_eq!(d.validate(), Err(RecipeValidationError::InvalidName));
    }

    #[rstest]
    fn zero_cooking_time_is_rejected() {
        let mut d = draft();
        d.cooking_time_minutes = 0;
        assert_eq!(
            d.validate(),
            Err(RecipeValidationError::NonPositiveCookingTime)
        );
    }
}

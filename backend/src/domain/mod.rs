//! Domain types, validation, and the outbound ports they depend on.

mod catalogue;
mod error;
mod password;
mod recipe;
mod shopping_list;
mod subscription;
mod user;

pub mod ports;

pub use catalogue::{Ingredient, Tag};
pub use error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use password::{hash_password, verify_password};
pub use recipe::{
    IngredientAmount, RECIPE_NAME_MAX, RecipeDetail, RecipeDraft, RecipeIngredient, RecipePreview,
    RecipeValidationError, ValidRecipeDraft,
};
pub use shopping_list::{ShoppingListLine, render_report, report_filename};
pub use subscription::SubscriptionOverview;
pub use user::{
    NAME_MAX, UserId, UserProfile, UserValidationError, validate_email, validate_name,
    validate_username,
};

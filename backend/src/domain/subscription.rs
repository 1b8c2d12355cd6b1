//! Subscription listing read model.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::recipe::RecipePreview;
use super::user::UserProfile;

/// One followed author, annotated with a capped recipe preview and the
/// author's total recipe count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionOverview {
    /// Followed author; `is_subscribed` is always true in this context.
    #[serde(flatten)]
    pub author: UserProfile,
    /// Most recent recipes, capped by the optional `recipes_limit` query.
    pub recipes: Vec<RecipePreview>,
    /// Total number of recipes the author has published.
    pub recipes_count: i64,
}

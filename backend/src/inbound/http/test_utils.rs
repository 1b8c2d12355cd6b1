//! Test doubles for inbound HTTP components.
//!
//! `StubState` is an in-memory implementation of every outbound port so
//! handler tests can exercise full request/response cycles without a
//! database. One `Arc<StubState>` backs all port slots of the shared
//! [`HttpState`].

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::web;
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::ports::{
    CataloguePersistenceError, CatalogueRepository, CredentialsRecord, MembershipKind,
    MembershipPersistenceError, MembershipRepository, NewIngredient, NewTag, NewUserRecord,
    RecipePersistenceError, RecipeQueryFilter, RecipeRepository, ShoppingListQuery,
    ShoppingListQueryError, SubscriptionPersistenceError, SubscriptionRepository,
    UserPersistenceError, UserRecord, UserRepository,
};
use crate::domain::{
    Ingredient, RecipeDetail, RecipeIngredient, RecipePreview, ShoppingListLine, Tag, UserId,
    ValidRecipeDraft, hash_password,
};
use crate::inbound::http::state::HttpState;

/// Build a session middleware configured for tests.
///
/// Generates a fresh signing key per invocation, names the cookie `session`,
/// and disables the `Secure` flag for plain-HTTP test requests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Log in through the real handler and return the session cookie.
pub async fn login_cookie<S, B>(app: &S, email: &str, password: &str) -> actix_web::cookie::Cookie<'static>
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse<B>,
            Error = actix_web::Error,
        >,
    B: actix_web::body::MessageBody,
{
    let req = actix_web::test::TestRequest::post()
        .uri("/api/auth/login/")
        .set_json(serde_json::json!({"email": email, "password": password}))
        .to_request();
    let res = actix_web::test::call_service(app, req).await;
    assert!(res.status().is_success(), "login failed: {}", res.status());
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}

struct StoredUser {
    record: UserRecord,
    password_hash: String,
}

/// In-memory backing store implementing every outbound port.
#[derive(Default)]
pub struct StubState {
    users: Mutex<Vec<StoredUser>>,
    tags: Mutex<Vec<Tag>>,
    ingredients: Mutex<Vec<Ingredient>>,
    recipes: Mutex<Vec<RecipeDetail>>,
    favorites: Mutex<HashSet<(Uuid, Uuid)>>,
    cart: Mutex<HashSet<(Uuid, Uuid)>>,
    subscriptions: Mutex<HashSet<(Uuid, Uuid)>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().expect("stub state mutex poisoned")
}

impl StubState {
    /// Bundle one shared stub behind every port slot.
    pub fn http_state(self: &Arc<Self>) -> web::Data<HttpState> {
        web::Data::new(HttpState {
            users: Arc::clone(self) as Arc<dyn UserRepository>,
            catalogue: Arc::clone(self) as Arc<dyn CatalogueRepository>,
            recipes: Arc::clone(self) as Arc<dyn RecipeRepository>,
            memberships: Arc::clone(self) as Arc<dyn MembershipRepository>,
            subscriptions: Arc::clone(self) as Arc<dyn SubscriptionRepository>,
            shopping_list: Arc::clone(self) as Arc<dyn ShoppingListQuery>,
        })
    }

    /// Insert a user with a real argon2 hash and return the new id.
    pub fn seed_user(&self, email: &str, username: &str, password: &str) -> UserId {
        let id = UserId::random();
        lock(&self.users).push(StoredUser {
            record: UserRecord {
                id,
                email: email.to_owned(),
                username: username.to_owned(),
                first_name: "Test".to_owned(),
                last_name: "User".to_owned(),
                avatar_url: None,
            },
            password_hash: hash_password(password).expect("hash seed password"),
        });
        id
    }

    /// Insert a tag and return its id.
    pub fn seed_tag(&self, name: &str, slug: &str) -> Uuid {
        let id = Uuid::new_v4();
        lock(&self.tags).push(Tag {
            id,
            name: name.to_owned(),
            slug: slug.to_owned(),
        });
        id
    }

    /// Insert an ingredient and return its id.
    pub fn seed_ingredient(&self, name: &str, measurement_unit: &str) -> Uuid {
        let id = Uuid::new_v4();
        lock(&self.ingredients).push(Ingredient {
            id,
            name: name.to_owned(),
            measurement_unit: measurement_unit.to_owned(),
        });
        id
    }

    fn collection(&self, kind: MembershipKind) -> &Mutex<HashSet<(Uuid, Uuid)>> {
        match kind {
            MembershipKind::Favorite => &self.favorites,
            MembershipKind::ShoppingCart => &self.cart,
        }
    }

    fn annotate(&self, mut detail: RecipeDetail, viewer: Option<&UserId>) -> RecipeDetail {
        if let Some(viewer) = viewer {
            let key = (*viewer.as_uuid(), detail.id);
            detail.is_favorited = lock(&self.favorites).contains(&key);
            detail.is_in_shopping_cart = lock(&self.cart).contains(&key);
            detail.author.is_subscribed = lock(&self.subscriptions)
                .contains(&(*viewer.as_uuid(), *detail.author.id.as_uuid()));
        } else {
            detail.is_favorited = false;
            detail.is_in_shopping_cart = false;
            detail.author.is_subscribed = false;
        }
        detail
    }

    fn resolve_links(
        &self,
        draft: &ValidRecipeDraft,
    ) -> Result<(Vec<Tag>, Vec<RecipeIngredient>), RecipePersistenceError> {
        let draft = draft.draft();
        let tags = lock(&self.tags);
        let mut resolved_tags = Vec::with_capacity(draft.tag_ids.len());
        for tag_id in &draft.tag_ids {
            let tag = tags
                .iter()
                .find(|tag| tag.id == *tag_id)
                .cloned()
                .ok_or(RecipePersistenceError::UnknownTag { tag_id: *tag_id })?;
            resolved_tags.push(tag);
        }

        let ingredients = lock(&self.ingredients);
        let mut resolved = Vec::with_capacity(draft.ingredients.len());
        for entry in &draft.ingredients {
            let ingredient = ingredients
                .iter()
                .find(|ingredient| ingredient.id == entry.id)
                .ok_or(RecipePersistenceError::UnknownIngredient {
                    ingredient_id: entry.id,
                })?;
            resolved.push(RecipeIngredient {
                id: ingredient.id,
                name: ingredient.name.clone(),
                measurement_unit: ingredient.measurement_unit.clone(),
                amount: entry.amount,
            });
        }
        Ok((resolved_tags, resolved))
    }
}

#[async_trait]
impl UserRepository for StubState {
    async fn create(&self, user: &NewUserRecord) -> Result<UserRecord, UserPersistenceError> {
        let mut users = lock(&self.users);
        if users.iter().any(|stored| stored.record.email == user.email) {
            return Err(UserPersistenceError::EmailTaken);
        }
        if users
            .iter()
            .any(|stored| stored.record.username == user.username)
        {
            return Err(UserPersistenceError::UsernameTaken);
        }
        let record = UserRecord {
            id: UserId::random(),
            email: user.email.clone(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            avatar_url: None,
        };
        users.push(StoredUser {
            record: record.clone(),
            password_hash: user.password_hash.clone(),
        });
        Ok(record)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRecord>, UserPersistenceError> {
        Ok(lock(&self.users)
            .iter()
            .find(|stored| stored.record.id == *id)
            .map(|stored| stored.record.clone()))
    }

    async fn credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<CredentialsRecord>, UserPersistenceError> {
        Ok(lock(&self.users)
            .iter()
            .find(|stored| stored.record.email == email)
            .map(|stored| CredentialsRecord {
                user_id: stored.record.id,
                password_hash: stored.password_hash.clone(),
            }))
    }

    async fn set_avatar(
        &self,
        id: &UserId,
        avatar_url: &str,
    ) -> Result<(), UserPersistenceError> {
        let mut users = lock(&self.users);
        let stored = users
            .iter_mut()
            .find(|stored| stored.record.id == *id)
            .ok_or(UserPersistenceError::NotFound)?;
        stored.record.avatar_url = Some(avatar_url.to_owned());
        Ok(())
    }

    async fn clear_avatar(&self, id: &UserId) -> Result<(), UserPersistenceError> {
        let mut users = lock(&self.users);
        let stored = users
            .iter_mut()
            .find(|stored| stored.record.id == *id)
            .ok_or(UserPersistenceError::NotFound)?;
        stored.record.avatar_url = None;
        Ok(())
    }
}

#[async_trait]
impl CatalogueRepository for StubState {
    async fn list_tags(&self) -> Result<Vec<Tag>, CataloguePersistenceError> {
        Ok(lock(&self.tags).clone())
    }

    async fn tag_by_id(&self, id: &Uuid) -> Result<Option<Tag>, CataloguePersistenceError> {
        Ok(lock(&self.tags).iter().find(|tag| tag.id == *id).cloned())
    }

    async fn list_ingredients(
        &self,
        name_prefix: Option<&str>,
    ) -> Result<Vec<Ingredient>, CataloguePersistenceError> {
        let ingredients = lock(&self.ingredients);
        Ok(match name_prefix {
            Some(prefix) => {
                let prefix = prefix.to_lowercase();
                ingredients
                    .iter()
                    .filter(|ingredient| ingredient.name.to_lowercase().starts_with(&prefix))
                    .cloned()
                    .collect()
            }
            None => ingredients.clone(),
        })
    }

    async fn ingredient_by_id(
        &self,
        id: &Uuid,
    ) -> Result<Option<Ingredient>, CataloguePersistenceError> {
        Ok(lock(&self.ingredients)
            .iter()
            .find(|ingredient| ingredient.id == *id)
            .cloned())
    }

    async fn import_tags(&self, rows: &[NewTag]) -> Result<usize, CataloguePersistenceError> {
        let mut tags = lock(&self.tags);
        for row in rows {
            if tags.iter().any(|tag| tag.slug == row.slug) {
                return Err(CataloguePersistenceError::duplicate(format!(
                    "tag slug {} already exists",
                    row.slug
                )));
            }
            tags.push(Tag {
                id: Uuid::new_v4(),
                name: row.name.clone(),
                slug: row.slug.clone(),
            });
        }
        Ok(rows.len())
    }

    async fn import_ingredients(
        &self,
        rows: &[NewIngredient],
    ) -> Result<usize, CataloguePersistenceError> {
        let mut ingredients = lock(&self.ingredients);
        for row in rows {
            ingredients.push(Ingredient {
                id: Uuid::new_v4(),
                name: row.name.clone(),
                measurement_unit: row.measurement_unit.clone(),
            });
        }
        Ok(rows.len())
    }
}

#[async_trait]
impl RecipeRepository for StubState {
    async fn create(
        &self,
        author: &UserId,
        draft: &ValidRecipeDraft,
    ) -> Result<RecipeDetail, RecipePersistenceError> {
        let (tags, ingredients) = self.resolve_links(draft)?;
        let author_record = lock(&self.users)
            .iter()
            .find(|stored| stored.record.id == *author)
            .map(|stored| stored.record.clone())
            .ok_or_else(|| RecipePersistenceError::query("recipe author missing"))?;
        let fields = draft.draft();
        let detail = RecipeDetail {
            id: Uuid::new_v4(),
            author: author_record.into_profile(false),
            name: fields.name.clone(),
            body: fields.body.clone(),
            cooking_time_minutes: fields.cooking_time_minutes,
            image_url: fields.image_url.clone(),
            tags,
            ingredients,
            is_favorited: false,
            is_in_shopping_cart: false,
            created_at: Utc::now(),
        };
        lock(&self.recipes).insert(0, detail.clone());
        Ok(detail)
    }

    async fn update(
        &self,
        id: &Uuid,
        draft: &ValidRecipeDraft,
    ) -> Result<RecipeDetail, RecipePersistenceError> {
        let (tags, ingredients) = self.resolve_links(draft)?;
        let mut recipes = lock(&self.recipes);
        let detail = recipes
            .iter_mut()
            .find(|detail| detail.id == *id)
            .ok_or(RecipePersistenceError::NotFound)?;
        let fields = draft.draft();
        detail.name = fields.name.clone();
        detail.body = fields.body.clone();
        detail.cooking_time_minutes = fields.cooking_time_minutes;
        detail.image_url = fields.image_url.clone();
        detail.tags = tags;
        detail.ingredients = ingredients;
        Ok(detail.clone())
    }

    async fn delete(&self, id: &Uuid) -> Result<(), RecipePersistenceError> {
        let mut recipes = lock(&self.recipes);
        let before = recipes.len();
        recipes.retain(|detail| detail.id != *id);
        if recipes.len() == before {
            return Err(RecipePersistenceError::NotFound);
        }
        lock(&self.favorites).retain(|(_, recipe)| recipe != id);
        lock(&self.cart).retain(|(_, recipe)| recipe != id);
        Ok(())
    }

    async fn fetch(
        &self,
        id: &Uuid,
        viewer: Option<&UserId>,
    ) -> Result<Option<RecipeDetail>, RecipePersistenceError> {
        let detail = lock(&self.recipes)
            .iter()
            .find(|detail| detail.id == *id)
            .cloned();
        Ok(detail.map(|detail| self.annotate(detail, viewer)))
    }

    async fn list(
        &self,
        filter: &RecipeQueryFilter,
        viewer: Option<&UserId>,
    ) -> Result<Vec<RecipeDetail>, RecipePersistenceError> {
        let recipes = lock(&self.recipes).clone();
        let mut out = Vec::new();
        for detail in recipes {
            if let Some(author) = &filter.author {
                if detail.author.id != *author {
                    continue;
                }
            }
            if !filter.tag_slugs.is_empty()
                && !detail
                    .tags
                    .iter()
                    .any(|tag| filter.tag_slugs.contains(&tag.slug))
            {
                continue;
            }
            let annotated = self.annotate(detail, viewer);
            if viewer.is_some() {
                if filter.is_favorited && !annotated.is_favorited {
                    continue;
                }
                if filter.is_in_shopping_cart && !annotated.is_in_shopping_cart {
                    continue;
                }
            }
            out.push(annotated);
        }
        Ok(out)
    }

    async fn author_id(&self, id: &Uuid) -> Result<Option<UserId>, RecipePersistenceError> {
        Ok(lock(&self.recipes)
            .iter()
            .find(|detail| detail.id == *id)
            .map(|detail| detail.author.id))
    }

    async fn previews_for_author(
        &self,
        author: &UserId,
        limit: Option<i64>,
    ) -> Result<(Vec<RecipePreview>, i64), RecipePersistenceError> {
        let recipes = lock(&self.recipes);
        let mut previews: Vec<RecipePreview> = recipes
            .iter()
            .filter(|detail| detail.author.id == *author)
            .map(|detail| RecipePreview {
                id: detail.id,
                name: detail.name.clone(),
                image_url: detail.image_url.clone(),
                cooking_time_minutes: detail.cooking_time_minutes,
            })
            .collect();
        let total = previews.len() as i64;
        if let Some(limit) = limit {
            previews.truncate(usize::try_from(limit.max(0)).unwrap_or(0));
        }
        Ok((previews, total))
    }
}

#[async_trait]
impl MembershipRepository for StubState {
    async fn add(
        &self,
        kind: MembershipKind,
        user: &UserId,
        recipe_id: &Uuid,
    ) -> Result<RecipePreview, MembershipPersistenceError> {
        let preview = lock(&self.recipes)
            .iter()
            .find(|detail| detail.id == *recipe_id)
            .map(|detail| RecipePreview {
                id: detail.id,
                name: detail.name.clone(),
                image_url: detail.image_url.clone(),
                cooking_time_minutes: detail.cooking_time_minutes,
            })
            .ok_or(MembershipPersistenceError::RecipeNotFound)?;
        if !lock(self.collection(kind)).insert((*user.as_uuid(), *recipe_id)) {
            return Err(MembershipPersistenceError::AlreadyPresent);
        }
        Ok(preview)
    }

    async fn remove(
        &self,
        kind: MembershipKind,
        user: &UserId,
        recipe_id: &Uuid,
    ) -> Result<(), MembershipPersistenceError> {
        if lock(self.collection(kind)).remove(&(*user.as_uuid(), *recipe_id)) {
            Ok(())
        } else {
            Err(MembershipPersistenceError::NotPresent)
        }
    }
}

#[async_trait]
impl SubscriptionRepository for StubState {
    async fn subscribe(
        &self,
        subscriber: &UserId,
        author: &UserId,
    ) -> Result<(), SubscriptionPersistenceError> {
        if subscriber == author {
            return Err(SubscriptionPersistenceError::SelfSubscription);
        }
        if !lock(&self.users)
            .iter()
            .any(|stored| stored.record.id == *author)
        {
            return Err(SubscriptionPersistenceError::AuthorNotFound);
        }
        if !lock(&self.subscriptions).insert((*subscriber.as_uuid(), *author.as_uuid())) {
            return Err(SubscriptionPersistenceError::AlreadySubscribed);
        }
        Ok(())
    }

    async fn unsubscribe(
        &self,
        subscriber: &UserId,
        author: &UserId,
    ) -> Result<(), SubscriptionPersistenceError> {
        if lock(&self.subscriptions).remove(&(*subscriber.as_uuid(), *author.as_uuid())) {
            Ok(())
        } else {
            Err(SubscriptionPersistenceError::NotSubscribed)
        }
    }

    async fn is_subscribed(
        &self,
        subscriber: &UserId,
        author: &UserId,
    ) -> Result<bool, SubscriptionPersistenceError> {
        Ok(lock(&self.subscriptions).contains(&(*subscriber.as_uuid(), *author.as_uuid())))
    }

    async fn followed_authors(
        &self,
        subscriber: &UserId,
    ) -> Result<Vec<UserRecord>, SubscriptionPersistenceError> {
        let subscriptions = lock(&self.subscriptions);
        let mut authors: Vec<UserRecord> = lock(&self.users)
            .iter()
            .filter(|stored| {
                subscriptions.contains(&(*subscriber.as_uuid(), *stored.record.id.as_uuid()))
            })
            .map(|stored| stored.record.clone())
            .collect();
        authors.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(authors)
    }
}

#[async_trait]
impl ShoppingListQuery for StubState {
    async fn aggregate(
        &self,
        user: &UserId,
    ) -> Result<Vec<ShoppingListLine>, ShoppingListQueryError> {
        let cart = lock(&self.cart);
        let recipes = lock(&self.recipes);
        let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();
        for detail in recipes.iter() {
            if !cart.contains(&(*user.as_uuid(), detail.id)) {
                continue;
            }
            for ingredient in &detail.ingredients {
                *totals
                    .entry((ingredient.name.clone(), ingredient.measurement_unit.clone()))
                    .or_insert(0) += i64::from(ingredient.amount);
            }
        }
        Ok(totals
            .into_iter()
            .map(|((name, measurement_unit), total_amount)| ShoppingListLine {
                name,
                measurement_unit,
                total_amount,
            })
            .collect())
    }
}

//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use potluck::Trace;
use potluck::inbound::http::health::{HealthState, live, ready};
use potluck::inbound::http::state::HttpState;
use potluck::inbound::http::{auth, ingredients, recipes, tags, users};
use potluck::outbound::persistence::{
    DbPool, DieselCatalogueRepository, DieselMembershipRepository, DieselRecipeRepository,
    DieselShoppingListQuery, DieselSubscriptionRepository, DieselUserRepository,
};

/// Wire every port to its Diesel adapter over the shared pool.
fn build_http_state(pool: &DbPool) -> web::Data<HttpState> {
    web::Data::new(HttpState {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        catalogue: Arc::new(DieselCatalogueRepository::new(pool.clone())),
        recipes: Arc::new(DieselRecipeRepository::new(pool.clone())),
        memberships: Arc::new(DieselMembershipRepository::new(pool.clone())),
        subscriptions: Arc::new(DieselSubscriptionRepository::new(pool.clone())),
        shopping_list: Arc::new(DieselShoppingListQuery::new(pool.clone())),
    })
}

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(24)),
        )
        .build();

    // download_shopping_cart is registered before the parameterised recipe
    // routes so its literal path segment wins.
    let api = web::scope("/api")
        .wrap(session)
        .service(auth::login)
        .service(auth::logout)
        .service(users::register)
        .service(users::me)
        .service(users::get_avatar)
        .service(users::set_avatar)
        .service(users::clear_avatar)
        .service(users::list_subscriptions)
        .service(users::subscribe)
        .service(users::unsubscribe)
        .service(tags::list_tags)
        .service(tags::get_tag)
        .service(ingredients::list_ingredients)
        .service(ingredients::get_ingredient)
        .service(recipes::list_recipes)
        .service(recipes::create_recipe)
        .service(recipes::download_shopping_cart)
        .service(recipes::get_recipe)
        .service(recipes::update_recipe)
        .service(recipes::delete_recipe)
        .service(recipes::add_favorite)
        .service(recipes::remove_favorite)
        .service(recipes::add_to_cart)
        .service(recipes::remove_from_cart)
        .service(recipes::get_link);

    App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(recipes::resolve_short_link)
        .service(ready)
        .service(live)
}

/// Construct an Actix HTTP server using the provided health state and
/// configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        db_pool,
    } = config;
    let http_state = build_http_state(&db_pool);

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

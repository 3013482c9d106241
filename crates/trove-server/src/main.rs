use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use trove_api::middleware::{optional_auth, require_auth};
use trove_api::{
    AppState, AppStateInner, auth, cart, chat, messages, notifications, offers, products,
    profiles, reviews, uploads, wishlist,
};
use trove_assistant::Assistant;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trove=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("TROVE_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("TROVE_DB_PATH").unwrap_or_else(|_| "trove.db".into());
    let upload_dir =
        PathBuf::from(std::env::var("TROVE_UPLOAD_DIR").unwrap_or_else(|_| "uploads".into()));
    let host = std::env::var("TROVE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("TROVE_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // Init database and upload storage
    let db = trove_db::Database::open(&PathBuf::from(&db_path))?;
    tokio::fs::create_dir_all(&upload_dir).await?;

    // Shared state
    let state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret,
        assistant: Assistant::from_env(),
        upload_dir,
    });

    // Routes
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/products", get(products::list_products))
        .route("/products/{product_id}/reviews", get(reviews::reviews_for_product))
        .route("/profiles/{username}", get(profiles::user_profile))
        .route("/api/ai_chat", post(chat::ai_chat))
        .route("/api/quick_help/{topic}", get(chat::quick_help))
        .with_state(state.clone());

    // Product detail is public but shows wishlist/offer context to
    // signed-in callers.
    let detail_route = Router::new()
        .route("/products/{product_id}", get(products::product_detail))
        .layer(middleware::from_fn_with_state(state.clone(), optional_auth))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/profile", put(auth::update_profile))
        .route("/auth/password", put(auth::change_password))
        .route("/auth/account", delete(auth::delete_account))
        .route("/products", post(products::create_product))
        .route("/products/{product_id}", put(products::update_product))
        .route("/products/{product_id}", delete(products::delete_product))
        .route("/products/{product_id}/offers", post(offers::make_offer))
        .route("/products/{product_id}/offers", get(offers::offers_for_product))
        .route("/products/{product_id}/reviews", post(reviews::add_review))
        .route("/offers/{offer_id}/{action}", post(offers::act_on_offer))
        .route("/cart", get(cart::view_cart))
        .route("/cart/{product_id}", post(cart::add_to_cart))
        .route("/cart/{product_id}", delete(cart::remove_from_cart))
        .route("/checkout", post(cart::checkout))
        .route("/purchases", get(cart::purchase_history))
        .route("/wishlist", get(wishlist::view_wishlist))
        .route("/wishlist/{product_id}", post(wishlist::add_to_wishlist))
        .route("/wishlist/{product_id}", delete(wishlist::remove_from_wishlist))
        .route("/messages", get(messages::mailbox))
        .route("/messages", post(messages::send_message))
        .route("/messages/{message_id}/read", post(messages::mark_message_read))
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/read_all", post(notifications::mark_all_read))
        .route("/notifications/{notification_id}/read", post(notifications::mark_notification_read))
        .route("/my/listings", get(products::my_listings))
        .route("/my/analytics", get(profiles::analytics))
        .route("/uploads", post(uploads::upload_image))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    let app = Router::new()
        .merge(public_routes)
        .merge(detail_route)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Trove server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

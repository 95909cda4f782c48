use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    middleware::from_fn_with_state,
    response::Response,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::handlers::{protected, public};
use crate::middleware::require_auth;
use crate::state::AppState;

/// Full router: public routes, the gated `/api/go` tree, and global layers
pub fn app(state: AppState) -> Router {
    let router = Router::new()
        // Public
        .route("/health", get(public::health_get))
        .merge(auth_public_routes(&state))
        // Protected API
        .nest("/api/go", protected_routes(&state))
        // Global middleware
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CONTENT_TYPE,
            default_content_type,
        ))
        .layer(cors_layer());

    let router = if state.config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(state)
}

/// JSON unless the handler chose otherwise; 204s stay bare
fn default_content_type(response: &Response) -> Option<HeaderValue> {
    (response.status() != StatusCode::NO_CONTENT)
        .then(|| HeaderValue::from_static("application/json"))
}

/// Any origin; preflight requests are answered by the layer itself
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

fn auth_public_routes(state: &AppState) -> Router<AppState> {
    use public::auth;

    let router = Router::new()
        .route("/login", post(auth::login_post))
        .route("/sign-up", post(auth::signup_post))
        .route("/verify-token", post(auth::verify_token_post));

    if state.config.api.enable_legacy_avatar_patch {
        router.route("/users/:id", put(public::avatar_put))
    } else {
        router
    }
}

fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(user_routes(state))
        .merge(post_routes(state))
        .merge(comment_routes())
        .merge(like_routes())
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}

fn user_routes(state: &AppState) -> Router<AppState> {
    use protected::users;

    Router::new()
        .route("/users/search", get(users::search_get))
        .route("/users", get(users::users_get).post(users::users_post))
        .route(
            "/users/:id",
            get(users::record_get)
                .put(users::record_put)
                .delete(users::record_delete),
        )
        .route(
            "/users/avatar",
            post(users::avatar_post)
                .layer(DefaultBodyLimit::max(state.config.api.max_avatar_bytes)),
        )
}

fn post_routes(state: &AppState) -> Router<AppState> {
    use protected::posts;

    Router::new()
        .route("/posts/search", post(posts::search_post))
        .route("/posts", post(posts::posts_post))
        .route(
            "/posts/:id",
            get(posts::record_get)
                .put(posts::record_put)
                .delete(posts::record_delete),
        )
        .route(
            "/posts/images/upload",
            post(posts::images_post)
                .layer(DefaultBodyLimit::max(state.config.api.max_upload_bytes)),
        )
}

fn comment_routes() -> Router<AppState> {
    use protected::comments;

    Router::new()
        .route(
            "/posts/:id/comments",
            get(comments::comments_get).post(comments::comments_post),
        )
        .route(
            "/comments/:id",
            put(comments::comment_put).delete(comments::comment_delete),
        )
}

fn like_routes() -> Router<AppState> {
    use protected::likes;

    Router::new().route(
        "/posts/:id/likes",
        get(likes::likes_get)
            .post(likes::likes_post)
            .delete(likes::likes_delete),
    )
}

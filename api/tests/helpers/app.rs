use axum::{
    Router,
    body::Body,
    http::{Request, header},
    response::Response,
};
use common::state::AppState;
use db::models::module::{self, ModuleChanges, ModuleVisibility};
use db::models::user;
use sea_orm::DatabaseConnection;
use serde_json::Value;

use api::auth::generate_jwt;
use api::routes::routes;

/// Builds the full application router on a fresh in-memory database.
///
/// The connection is returned alongside the router so tests can seed data
/// directly through the model layer.
pub async fn make_test_app() -> (Router, DatabaseConnection) {
    let db = db::test_utils::setup_test_db().await;
    let app_state = AppState::new(db.clone());
    let app = Router::new().nest("/api", routes(app_state));
    (app, db)
}

/// Creates an account the way a Google login would and returns it with a
/// ready-to-use bearer token.
pub async fn create_user(
    db: &DatabaseConnection,
    email: &str,
    admin: bool,
) -> (user::Model, String) {
    let google_id = format!("gid-{email}");
    let name = email.split('@').next().unwrap_or("user");
    let user = user::Model::upsert_from_identity(db, &google_id, email, name, None, admin)
        .await
        .expect("failed to create test user");
    let (token, _) = generate_jwt(user.id, user.is_admin());
    (user, token)
}

/// Creates a module and moves it into the given visibility state.
pub async fn create_module(
    db: &DatabaseConnection,
    title: &str,
    capacity: i32,
    visibility: ModuleVisibility,
) -> module::Model {
    let module = module::Model::create(db, title, 1, None, None, capacity, None, false, None, 100)
        .await
        .expect("failed to create test module");
    if visibility == ModuleVisibility::Draft {
        return module;
    }
    module::Model::edit(
        db,
        module.id,
        ModuleChanges {
            visibility: Some(visibility),
            ..Default::default()
        },
    )
    .await
    .expect("failed to set module visibility")
}

/// Builds a request with an optional bearer token and optional JSON body.
pub fn build_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Collects a response body into JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /test-litellm                 completion endpoint check (GET)
/// /migrate-dre-rule             rule set to saved flows (POST)
/// /deploy-flow                  deploy one flow file (GET, POST)
/// /translate-dre-rule           criteria of the input rule set (GET)
/// /translate-dre-results        results of the input rule set (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/test-litellm", get(handlers::llm::test_litellm))
        .route(
            "/migrate-dre-rule",
            post(handlers::migration::migrate_dre_rule),
        )
        .route(
            "/deploy-flow",
            get(handlers::deployment::deploy_flow).post(handlers::deployment::deploy_flow),
        )
        .route(
            "/translate-dre-rule",
            get(handlers::translation::translate_dre_rule),
        )
        .route(
            "/translate-dre-results",
            get(handlers::translation::translate_dre_results),
        )
}

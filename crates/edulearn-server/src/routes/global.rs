use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_derive::Serialize;
use utoipa::ToSchema;

pub fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/version", get(server_version)).with_state(())
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct Version {
    #[schema(example = "0.1.0")]
    version: &'static str,
}

#[utoipa::path(
    get,
    path = "/version",
    responses(
        (status = OK, body = Version, description = "returns the version of the running server")
    ),
    tag = "util"
)]
pub(crate) async fn server_version() -> impl IntoResponse {
    Json(Version {
        version: env!("CARGO_PKG_VERSION"),
    })
}

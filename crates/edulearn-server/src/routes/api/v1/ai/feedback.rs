use crate::permissions::Permission;
use crate::routes::api::v1::ai::error::AiError;
use crate::user::ExtractUser;
use axum::extract::Path;
use axum::response::IntoResponse;
use axum::routing::{Router, get};
use axum::{Extension, Json};
use edulearn_db::ai::feedback;
use edulearn_db::sea_orm::DatabaseConnection;
use edulearn_model::recommendation::AiFeedback;
use edulearn_model_tools::convert::FromDbModel;
use protect_axum::protect;
use uuid::Uuid;

pub(crate) fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list_feedback))
        .route("/{id}", get(get_feedback))
}

#[utoipa::path(
    get,
    path = "/api/v1/ai/feedback",
    responses(
        (status = OK, description = "AI feedback given to the caller, newest first", body = [AiFeedback]),
    ),
    tag = "v1/ai",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn list_feedback(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
) -> Result<impl IntoResponse, AiError> {
    let listed: Vec<AiFeedback> = feedback::Query::list_for_user(&conn, user.id)
        .await?
        .into_iter()
        .map(AiFeedback::from_db_model)
        .collect();
    Ok(Json(listed))
}

#[utoipa::path(
    get,
    path = "/api/v1/ai/feedback/{id}",
    params(("id" = Uuid, Path, description = "feedback id")),
    responses(
        (status = OK, description = "A single feedback record", body = AiFeedback),
        (status = NOT_FOUND, description = "Unknown feedback or given to someone else"),
    ),
    tag = "v1/ai",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn get_feedback(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AiError> {
    let found = feedback::Query::find_for_user(&conn, id, user.id)
        .await?
        .ok_or(AiError::NotFound)?;
    Ok(Json(AiFeedback::from_db_model(found)))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{TestApp, bearer};
    use edulearn_db::ai::feedback;
    use edulearn_test_helpers::fixtures::create_user;
    use http::{Method, StatusCode};
    use test_log::test;

    #[test(tokio::test)]
    async fn test_feedback_is_private() {
        let app = TestApp::new().await;
        let user = create_user(&app.conn, "writer").await.unwrap();
        let other = create_user(&app.conn, "reader").await.unwrap();
        let stored = feedback::Mutation::create(&app.conn, user.id, "essay", None, "Clear argument.".to_owned(), Some(8.0))
            .await
            .unwrap();

        let (status, listed) = app
            .request(Method::GET, "/api/v1/ai/feedback", Some(&bearer(&app, user.id)), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed[0]["content_type"], "essay");
        assert_eq!(listed[0]["score"], 8.0);

        let uri = format!("/api/v1/ai/feedback/{}", stored.id);
        let (status, _) = app.request(Method::GET, &uri, Some(&bearer(&app, user.id)), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = app.request(Method::GET, &uri, Some(&bearer(&app, other.id)), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

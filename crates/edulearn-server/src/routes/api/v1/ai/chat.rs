use crate::AppConfig;
use crate::permissions::Permission;
use crate::routes::api::v1::ai::error::AiError;
use crate::routes::error::ValidationErrors;
use crate::user::ExtractUser;
use axum::extract::Path;
use axum::response::IntoResponse;
use axum::routing::{Router, get, post};
use axum::{Extension, Json};
use edulearn_core::ai::chat::send_message as ask_tutor;
use edulearn_db::ai::{chat_message, chat_session};
use edulearn_db::sea_orm::DatabaseConnection;
use edulearn_entity::ai::chat_session::Model as SessionModel;
use edulearn_model::chat::{ChatExchange, ChatSession, NewChatMessage, NewChatSession};
use edulearn_model_tools::convert::FromDbModel;
use http::StatusCode;
use protect_axum::protect;
use uuid::Uuid;

pub(crate) fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list_sessions).post(create_session))
        .route(
            "/{id}",
            get(get_session)
                .put(update_session)
                .patch(update_session)
                .delete(delete_session),
        )
        .route("/{id}/send_message", post(send_message))
}

async fn find_own(conn: &DatabaseConnection, id: Uuid, user_id: Uuid) -> Result<SessionModel, AiError> {
    chat_session::Query::find_for_user(conn, id, user_id)
        .await?
        .ok_or(AiError::NotFound)
}

async fn with_messages(conn: &DatabaseConnection, session: SessionModel) -> Result<ChatSession, AiError> {
    let messages = chat_message::Query::list_for_session(conn, session.id).await?;
    Ok(ChatSession::from_db_model((session, messages)))
}

#[utoipa::path(
    get,
    path = "/api/v1/ai/chat",
    responses(
        (status = OK, description = "Chat sessions of the caller, most recently updated first", body = [ChatSession]),
    ),
    tag = "v1/ai",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn list_sessions(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
) -> Result<impl IntoResponse, AiError> {
    let mut sessions = Vec::new();
    for session in chat_session::Query::list_for_user(&conn, user.id).await? {
        sessions.push(with_messages(&conn, session).await?);
    }
    Ok(Json(sessions))
}

#[utoipa::path(
    post,
    path = "/api/v1/ai/chat",
    request_body = NewChatSession,
    responses(
        (status = CREATED, description = "Empty chat session", body = ChatSession),
    ),
    tag = "v1/ai",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn create_session(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Json(new_session): Json<NewChatSession>,
) -> Result<impl IntoResponse, AiError> {
    let created = chat_session::Mutation::create(&conn, user.id, new_session.title.trim().to_owned()).await?;
    Ok((StatusCode::CREATED, Json(ChatSession::from_db_model((created, vec![])))))
}

#[utoipa::path(
    get,
    path = "/api/v1/ai/chat/{id}",
    params(("id" = Uuid, Path, description = "chat session id")),
    responses(
        (status = OK, description = "Chat session with its messages, oldest first", body = ChatSession),
        (status = NOT_FOUND, description = "Unknown session or owned by someone else"),
    ),
    tag = "v1/ai",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn get_session(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AiError> {
    let session = find_own(&conn, id, user.id).await?;
    Ok(Json(with_messages(&conn, session).await?))
}

#[utoipa::path(
    method(put, patch),
    path = "/api/v1/ai/chat/{id}",
    params(("id" = Uuid, Path, description = "chat session id")),
    request_body = NewChatSession,
    responses(
        (status = OK, description = "Renamed chat session", body = ChatSession),
        (status = NOT_FOUND, description = "Unknown session or owned by someone else"),
    ),
    tag = "v1/ai",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn update_session(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path(id): Path<Uuid>,
    Json(changes): Json<NewChatSession>,
) -> Result<impl IntoResponse, AiError> {
    let session = find_own(&conn, id, user.id).await?;
    let renamed = chat_session::Mutation::rename(&conn, session.id, changes.title.trim().to_owned()).await?;
    Ok(Json(with_messages(&conn, renamed).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/ai/chat/{id}",
    params(("id" = Uuid, Path, description = "chat session id")),
    responses(
        (status = NO_CONTENT, description = "Chat session deleted with its messages"),
        (status = NOT_FOUND, description = "Unknown session or owned by someone else"),
    ),
    tag = "v1/ai",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn delete_session(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AiError> {
    let session = find_own(&conn, id, user.id).await?;
    chat_session::Mutation::delete(&conn, session.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/ai/chat/{id}/send_message",
    params(("id" = Uuid, Path, description = "chat session id")),
    request_body = NewChatMessage,
    responses(
        (status = OK, description = "The stored question and the tutor's answer", body = ChatExchange),
        (status = BAD_REQUEST, description = "Blank message"),
        (status = NOT_FOUND, description = "Unknown session or owned by someone else"),
    ),
    tag = "v1/ai",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn send_message(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Extension(app_config): Extension<AppConfig>,
    Path(id): Path<Uuid>,
    Json(message): Json<NewChatMessage>,
) -> Result<impl IntoResponse, AiError> {
    if message.content.trim().is_empty() {
        return Err(ValidationErrors::field("content", "This field may not be blank.").into());
    }
    let session = find_own(&conn, id, user.id).await?;
    let exchange = ask_tutor(&conn, app_config.llm_config(), &user, &session, message.content).await?;
    Ok(Json(exchange))
}

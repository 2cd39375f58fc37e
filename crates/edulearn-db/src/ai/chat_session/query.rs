use edulearn_entity::ai::chat_session::{self, Entity as ChatSession, Model as ChatSessionModel};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use std::error::Error;
use uuid::Uuid;

pub struct Query;

impl Query {
    /// Most recently updated first.
    pub async fn list_for_user<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> Result<Vec<ChatSessionModel>, DbErr> {
        ChatSession::find()
            .filter(chat_session::Column::UserId.eq(user_id))
            .order_by_desc(chat_session::Column::UpdatedAt)
            .all(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to list chat sessions"))
    }

    pub async fn find_for_user<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ChatSessionModel>, DbErr> {
        ChatSession::find_by_id(id)
            .filter(chat_session::Column::UserId.eq(user_id))
            .one(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to load chat session"))
    }

    pub async fn find_by_title<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
        title: &str,
    ) -> Result<Option<ChatSessionModel>, DbErr> {
        ChatSession::find()
            .filter(chat_session::Column::UserId.eq(user_id))
            .filter(chat_session::Column::Title.eq(title))
            .order_by_asc(chat_session::Column::CreatedAt)
            .one(conn)
            .await
    }
}

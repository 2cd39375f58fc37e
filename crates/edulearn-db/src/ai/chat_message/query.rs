use edulearn_entity::ai::chat_message::{self, Entity as ChatMessage, Model as ChatMessageModel};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use std::error::Error;
use uuid::Uuid;

pub struct Query;

impl Query {
    /// Oldest first.
    pub async fn list_for_session<C: ConnectionTrait>(
        conn: &C,
        session_id: Uuid,
    ) -> Result<Vec<ChatMessageModel>, DbErr> {
        ChatMessage::find()
            .filter(chat_message::Column::SessionId.eq(session_id))
            .order_by_asc(chat_message::Column::CreatedAt)
            .all(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to load chat messages"))
    }

    /// The last `count` messages of a session, oldest first.
    pub async fn last_messages<C: ConnectionTrait>(
        conn: &C,
        session_id: Uuid,
        count: u64,
    ) -> Result<Vec<ChatMessageModel>, DbErr> {
        let mut messages = ChatMessage::find()
            .filter(chat_message::Column::SessionId.eq(session_id))
            .order_by_desc(chat_message::Column::CreatedAt)
            .limit(count)
            .all(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to load recent chat messages"))?;
        messages.reverse();
        Ok(messages)
    }
}

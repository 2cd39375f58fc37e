use edulearn_entity::ai::feedback::{self, Entity as Feedback, Model as FeedbackModel};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

pub struct Query;

impl Query {
    /// Newest first.
    pub async fn list_for_user<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> Result<Vec<FeedbackModel>, DbErr> {
        Feedback::find()
            .filter(feedback::Column::UserId.eq(user_id))
            .order_by_desc(feedback::Column::CreatedAt)
            .all(conn)
            .await
    }

    pub async fn find_for_user<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<FeedbackModel>, DbErr> {
        Feedback::find_by_id(id)
            .filter(feedback::Column::UserId.eq(user_id))
            .one(conn)
            .await
    }
}

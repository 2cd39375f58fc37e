use edulearn_entity::learning_activity::{self, Entity as Activity, Model as ActivityModel};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use std::error::Error;
use uuid::Uuid;

pub struct Query;

impl Query {
    /// Newest first.
    pub async fn list_for_user<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
        limit: Option<u64>,
    ) -> Result<Vec<ActivityModel>, DbErr> {
        Activity::find()
            .filter(learning_activity::Column::UserId.eq(user_id))
            .order_by_desc(learning_activity::Column::Timestamp)
            .limit(limit)
            .all(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to list activities"))
    }

    pub async fn find_for_user<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ActivityModel>, DbErr> {
        Activity::find_by_id(id)
            .filter(learning_activity::Column::UserId.eq(user_id))
            .one(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to load activity"))
    }

    pub async fn count_for_user<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> Result<u64, DbErr> {
        Activity::find()
            .filter(learning_activity::Column::UserId.eq(user_id))
            .count(conn)
            .await
    }

    pub async fn distinct_types_for_user<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> Result<Vec<String>, DbErr> {
        Activity::find()
            .select_only()
            .column(learning_activity::Column::ActivityType)
            .distinct()
            .filter(learning_activity::Column::UserId.eq(user_id))
            .order_by_asc(learning_activity::Column::ActivityType)
            .into_tuple()
            .all(conn)
            .await
    }
}

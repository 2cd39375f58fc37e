use edulearn_entity::user_preference::{self, Entity as Preference, Model as PreferenceModel};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};
use std::error::Error;
use uuid::Uuid;

pub struct Query;

impl Query {
    pub async fn find_by_user<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> Result<Option<PreferenceModel>, DbErr> {
        Preference::find()
            .filter(user_preference::Column::UserId.eq(user_id))
            .one(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to load preferences"))
    }

    pub async fn find_for_user<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<PreferenceModel>, DbErr> {
        Preference::find_by_id(id)
            .filter(user_preference::Column::UserId.eq(user_id))
            .one(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to load preference"))
    }
}

use edulearn_entity::user::{self, Entity as User, Model as UserModel};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use std::error::Error;
use uuid::Uuid;

pub struct Query;

impl Query {
    pub async fn find_user_by_id<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<Option<UserModel>, DbErr> {
        User::find_by_id(id).one(conn).await.inspect_err(|error| {
            tracing::error!(error = error as &dyn Error, %id, "failed to load user");
        })
    }

    pub async fn find_users_by_ids<C: ConnectionTrait>(conn: &C, ids: Vec<Uuid>) -> Result<Vec<UserModel>, DbErr> {
        User::find().filter(user::Column::Id.is_in(ids)).all(conn).await
    }

    pub async fn find_user_by_email<C: ConnectionTrait>(conn: &C, email: &str) -> Result<Option<UserModel>, DbErr> {
        User::find()
            .filter(user::Column::Email.eq(email.trim().to_lowercase()))
            .one(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to load user by email");
            })
    }

    pub async fn find_user_by_username<C: ConnectionTrait>(
        conn: &C,
        username: &str,
    ) -> Result<Option<UserModel>, DbErr> {
        User::find()
            .filter(user::Column::Username.eq(username))
            .one(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to load user by username");
            })
    }

    pub async fn list_users<C: ConnectionTrait>(conn: &C) -> Result<Vec<UserModel>, DbErr> {
        User::find()
            .order_by_asc(user::Column::Username)
            .all(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to list users");
            })
    }

    pub async fn list_active_user_ids<C: ConnectionTrait>(conn: &C) -> Result<Vec<Uuid>, DbErr> {
        let users = User::find().filter(user::Column::IsActive.eq(true)).all(conn).await?;
        Ok(users.into_iter().map(|user| user.id).collect())
    }
}

use chrono::Utc;
use edulearn_entity::user::{ActiveModel, Entity, Model};
use paste::paste;
use sea_orm::ActiveValue::{NotSet, Set, Unchanged};
use sea_orm::{ActiveModelTrait, ActiveValue, ConnectionTrait, DbErr, EntityTrait};
use std::error::Error;
use uuid::Uuid;

pub struct Mutation;

macro_rules! update_user_field {
    ($i:ident, $t:ty) => {
        paste! {
            pub async fn [<update_user_ $i>]<C: ConnectionTrait>(conn: &C, user_id: Uuid, $i: $t) -> Result<Model, DbErr> {
                let user = ActiveModel {
                    id: ActiveValue::Unchanged(user_id),
                    $i: ActiveValue::Set($i),
                    updated_at: ActiveValue::Set(Utc::now().naive_utc()),
                    ..<ActiveModel as std::default::Default>::default()
                };
                user.update(conn).await
            }
        }
    };
}

impl Mutation {
    /// Inserts a new user. Id and timestamps are always generated here.
    pub async fn create_user<C: ConnectionTrait>(conn: &C, user: ActiveModel) -> Result<Model, DbErr> {
        let now = Utc::now().naive_utc();
        let user = ActiveModel {
            id: Set(Uuid::new_v4()),
            created_at: Set(now),
            updated_at: Set(now),
            ..user
        };
        let user = ActiveModel {
            email: match user.email {
                Set(email) => Set(email.trim().to_lowercase()),
                other => other,
            },
            ..user
        };

        Entity::insert(user)
            .exec_with_returning(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to create user"))
    }

    pub async fn update_user<C: ConnectionTrait>(conn: &C, user: ActiveModel) -> Result<Model, DbErr> {
        let user = ActiveModel {
            updated_at: Set(Utc::now().naive_utc()),
            created_at: NotSet,
            ..user
        };
        user.update(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to update user"))
    }

    update_user_field!(password_hash, String);
    update_user_field!(is_staff, bool);

    pub async fn delete<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> Result<(), DbErr> {
        let res = Entity::delete_by_id(user_id).exec(conn).await;
        if let Err(error) = res {
            tracing::error!(error = &error as &dyn Error, "failed to delete user");
            return Err(error);
        }
        Ok(())
    }

    #[must_use]
    pub fn changes(user_id: Uuid) -> ActiveModel {
        ActiveModel {
            id: Unchanged(user_id),
            ..Default::default()
        }
    }
}

use chrono::Utc;
use edulearn_entity::ai::{course_embedding, user_embedding};
use sea_orm::ActiveValue::{Set, Unchanged};
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait};
use std::error::Error;
use uuid::Uuid;

use super::Query;

pub struct Mutation;

impl Mutation {
    pub async fn upsert_user_embedding<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
        vector: Vec<u8>,
    ) -> Result<user_embedding::Model, DbErr> {
        let now = Utc::now().naive_utc();
        let res = match Query::find_user_embedding(conn, user_id).await? {
            Some(existing) => {
                user_embedding::ActiveModel {
                    id: Unchanged(existing.id),
                    vector: Set(vector),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .update(conn)
                .await
            }
            None => {
                user_embedding::Entity::insert(user_embedding::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(user_id),
                    vector: Set(vector),
                    updated_at: Set(now),
                })
                .exec_with_returning(conn)
                .await
            }
        };
        res.inspect_err(|error| tracing::error!(error = error as &dyn Error, %user_id, "failed to store user embedding"))
    }

    pub async fn upsert_course_embedding<C: ConnectionTrait>(
        conn: &C,
        course_id: Uuid,
        vector: Vec<u8>,
    ) -> Result<course_embedding::Model, DbErr> {
        let now = Utc::now().naive_utc();
        let res = match Query::find_course_embedding(conn, course_id).await? {
            Some(existing) => {
                course_embedding::ActiveModel {
                    id: Unchanged(existing.id),
                    vector: Set(vector),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .update(conn)
                .await
            }
            None => {
                course_embedding::Entity::insert(course_embedding::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    course_id: Set(course_id),
                    vector: Set(vector),
                    updated_at: Set(now),
                })
                .exec_with_returning(conn)
                .await
            }
        };
        res.inspect_err(|error| tracing::error!(error = error as &dyn Error, %course_id, "failed to store course embedding"))
    }
}

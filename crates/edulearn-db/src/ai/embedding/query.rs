use edulearn_entity::ai::course_embedding::{self, Model as CourseEmbeddingModel};
use edulearn_entity::ai::user_embedding::{self, Model as UserEmbeddingModel};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};
use uuid::Uuid;

pub struct Query;

impl Query {
    pub async fn find_user_embedding<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
    ) -> Result<Option<UserEmbeddingModel>, DbErr> {
        user_embedding::Entity::find()
            .filter(user_embedding::Column::UserId.eq(user_id))
            .one(conn)
            .await
    }

    pub async fn find_course_embedding<C: ConnectionTrait>(
        conn: &C,
        course_id: Uuid,
    ) -> Result<Option<CourseEmbeddingModel>, DbErr> {
        course_embedding::Entity::find()
            .filter(course_embedding::Column::CourseId.eq(course_id))
            .one(conn)
            .await
    }

    pub async fn list_course_embeddings<C: ConnectionTrait>(conn: &C) -> Result<Vec<CourseEmbeddingModel>, DbErr> {
        course_embedding::Entity::find().all(conn).await
    }
}

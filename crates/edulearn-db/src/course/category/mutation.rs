use edulearn_entity::course::category::{ActiveModel, Entity, Model};
use sea_orm::ActiveValue::Set;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait};
use uuid::Uuid;

pub struct Mutation;

impl Mutation {
    pub async fn create<C: ConnectionTrait>(
        conn: &C,
        name: String,
        slug: String,
        description: String,
        parent_id: Option<Uuid>,
    ) -> Result<Model, DbErr> {
        let category = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            slug: Set(slug),
            description: Set(description),
            parent_id: Set(parent_id),
            icon: Set(String::new()),
        };
        Entity::insert(category).exec_with_returning(conn).await
    }
}

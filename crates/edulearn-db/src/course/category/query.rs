use edulearn_entity::course::category::{self, Entity as Category, Model as CategoryModel};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use std::error::Error;
use uuid::Uuid;

pub struct Query;

impl Query {
    pub async fn list<C: ConnectionTrait>(conn: &C) -> Result<Vec<CategoryModel>, DbErr> {
        Category::find()
            .order_by_asc(category::Column::Name)
            .all(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to list categories"))
    }

    pub async fn find_by_slug<C: ConnectionTrait>(conn: &C, slug: &str) -> Result<Option<CategoryModel>, DbErr> {
        Category::find()
            .filter(category::Column::Slug.eq(slug))
            .one(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, slug, "failed to load category"))
    }

    pub async fn find_by_id<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<Option<CategoryModel>, DbErr> {
        Category::find_by_id(id).one(conn).await
    }
}

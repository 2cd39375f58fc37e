use edulearn_entity::quiz::attempt;
use edulearn_entity::quiz::response::{self, Entity as Response, Model as ResponseModel};
use edulearn_entity::quiz::response_answer;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use std::collections::HashMap;
use uuid::Uuid;

pub struct Query;

impl Query {
    pub async fn find_by_id<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<Option<ResponseModel>, DbErr> {
        Response::find_by_id(id).one(conn).await
    }

    pub async fn list_for_attempt<C: ConnectionTrait>(conn: &C, attempt_id: Uuid) -> Result<Vec<ResponseModel>, DbErr> {
        Response::find()
            .filter(response::Column::AttemptId.eq(attempt_id))
            .all(conn)
            .await
    }

    pub async fn list_for_attempts<C: ConnectionTrait>(
        conn: &C,
        attempt_ids: Vec<Uuid>,
    ) -> Result<Vec<ResponseModel>, DbErr> {
        Response::find()
            .filter(response::Column::AttemptId.is_in(attempt_ids))
            .all(conn)
            .await
    }

    /// Responses of an attempt with the ids of the selected answers.
    pub async fn list_with_selected<C: ConnectionTrait>(
        conn: &C,
        attempt_id: Uuid,
    ) -> Result<Vec<(ResponseModel, Vec<Uuid>)>, DbErr> {
        let responses = Self::list_for_attempt(conn, attempt_id).await?;
        let ids: Vec<_> = responses.iter().map(|response| response.id).collect();
        let selected = response_answer::Entity::find()
            .filter(response_answer::Column::ResponseId.is_in(ids))
            .all(conn)
            .await?;

        let mut by_response: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for row in selected {
            by_response.entry(row.response_id).or_default().push(row.answer_id);
        }
        Ok(responses
            .into_iter()
            .map(|response| {
                let answers = by_response.remove(&response.id).unwrap_or_default();
                (response, answers)
            })
            .collect())
    }

    /// Responses from the completed attempts of a user, newest attempt first.
    pub async fn list_for_user<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
        only_incorrect: bool,
    ) -> Result<Vec<ResponseModel>, DbErr> {
        let mut query = Response::find()
            .inner_join(attempt::Entity)
            .filter(attempt::Column::UserId.eq(user_id))
            .filter(attempt::Column::IsCompleted.eq(true));
        if only_incorrect {
            query = query.filter(response::Column::IsCorrect.eq(false));
        }
        query.order_by_desc(attempt::Column::StartedAt).all(conn).await
    }
}

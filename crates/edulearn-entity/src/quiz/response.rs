use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "quiz_responses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub attempt_id: Uuid,
    pub question_id: Uuid,
    pub text_response: String,
    /// Points awarded, at most the question's points.
    pub score: f64,
    pub is_correct: bool,
    pub feedback: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::attempt::Entity",
        from = "Column::AttemptId",
        to = "super::attempt::Column::Id",
        on_delete = "Cascade"
    )]
    Attempt,
    #[sea_orm(
        belongs_to = "super::question::Entity",
        from = "Column::QuestionId",
        to = "super::question::Column::Id",
        on_delete = "Cascade"
    )]
    Question,
    #[sea_orm(has_many = "super::response_answer::Entity")]
    SelectedAnswer,
}

impl Related<super::attempt::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attempt.def()
    }
}

impl Related<super::question::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Question.def()
    }
}

impl Related<super::response_answer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SelectedAnswer.def()
    }
}

impl Related<super::answer::Entity> for Entity {
    fn to() -> RelationDef {
        super::response_answer::Relation::Answer.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::response_answer::Relation::Response.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

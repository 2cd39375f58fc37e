use chrono::NaiveDate;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(unique)]
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub date_of_birth: Option<NaiveDate>,
    pub profile_picture: Option<String>,
    /// JSON list of interest keywords.
    pub interests: Json,
    pub learning_style: String,
    pub is_staff: bool,
    pub is_active: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Model {
    #[must_use]
    pub fn full_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.username.clone()
        } else {
            name.to_owned()
        }
    }

    #[must_use]
    pub fn interest_list(&self) -> Vec<String> {
        match &self.interests {
            Json::Array(values) => values
                .iter()
                .filter_map(|value| value.as_str().map(ToOwned::to_owned))
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::user_preference::Entity")]
    Preference,
    #[sea_orm(has_many = "super::learning_activity::Entity")]
    LearningActivity,
    #[sea_orm(has_many = "super::course::enrollment::Entity")]
    Enrollment,
    #[sea_orm(has_many = "super::course::course::Entity")]
    TaughtCourse,
    #[sea_orm(has_many = "super::quiz::attempt::Entity")]
    QuizAttempt,
    #[sea_orm(has_many = "super::ai::chat_session::Entity")]
    ChatSession,
    #[sea_orm(has_one = "super::ai::user_embedding::Entity")]
    Embedding,
    #[sea_orm(has_many = "super::ai::feedback::Entity")]
    Feedback,
}

impl Related<super::user_preference::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Preference.def()
    }
}

impl Related<super::learning_activity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LearningActivity.def()
    }
}

impl Related<super::course::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollment.def()
    }
}

impl Related<super::quiz::attempt::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QuizAttempt.def()
    }
}

impl Related<super::ai::chat_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChatSession.def()
    }
}

impl Related<super::ai::user_embedding::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Embedding.def()
    }
}

impl Related<super::ai::feedback::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Feedback.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

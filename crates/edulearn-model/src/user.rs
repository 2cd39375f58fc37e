use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    #[schema(example = "student@example.com")]
    pub email: String,
    #[schema(example = "student")]
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    pub interests: Vec<String>,
    pub learning_style: String,
    pub is_staff: bool,
    pub created_at: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<UserPreference>,
}

/// Registration payload.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password: String,
    pub password_confirm: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub learning_style: String,
}

/// Profile update, absent fields stay unchanged.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UserChanges {
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub profile_picture: Option<String>,
    pub interests: Option<Vec<String>>,
    pub learning_style: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserPreference {
    pub id: Uuid,
    pub preferred_categories: Vec<String>,
    pub difficulty_preference: String,
    pub learning_pace: String,
    pub notification_settings: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PreferenceChanges {
    pub preferred_categories: Option<Vec<String>>,
    pub difficulty_preference: Option<String>,
    pub learning_pace: Option<String>,
    pub notification_settings: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LearningActivity {
    pub id: Uuid,
    #[schema(example = "lesson_complete")]
    pub activity_type: String,
    #[schema(example = "lesson")]
    pub content_type: String,
    pub content_id: Option<Uuid>,
    pub metadata: Map<String, Value>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewLearningActivity {
    pub activity_type: String,
    pub content_type: String,
    #[serde(default)]
    pub content_id: Option<Uuid>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ActivityStats {
    pub total_activities: u64,
    pub activity_types: Vec<String>,
    pub recent_activities: Vec<LearningActivity>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_user_defaults() {
        let user: NewUser = serde_json::from_value(json!({
            "email": "a@example.com",
            "username": "a",
            "password": "secret123",
            "password_confirm": "secret123",
        }))
        .unwrap();
        assert!(user.interests.is_empty());
        assert_eq!(user.first_name, "");
        assert!(user.date_of_birth.is_none());
    }

    #[test]
    fn test_user_skips_missing_optionals() {
        let user = User {
            id: Uuid::nil(),
            email: "a@example.com".to_owned(),
            username: "a".to_owned(),
            first_name: String::new(),
            last_name: String::new(),
            bio: String::new(),
            date_of_birth: None,
            profile_picture: None,
            interests: vec![],
            learning_style: String::new(),
            is_staff: false,
            created_at: NaiveDateTime::default(),
            preferences: None,
        };
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("date_of_birth").is_none());
        assert!(value.get("preferences").is_none());
        assert_eq!(value["username"], "a");
    }
}

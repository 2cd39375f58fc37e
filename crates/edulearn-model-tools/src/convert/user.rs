use crate::convert::{FromDbModel, TryFromDbModel, object, string_list};
use crate::error::Error;
use edulearn_entity::learning_activity::Model as ActivityModel;
use edulearn_entity::user::Model as UserModel;
use edulearn_entity::user_preference::Model as PreferenceModel;
use edulearn_model::user::{LearningActivity, User, UserPreference};

impl TryFromDbModel<PreferenceModel> for UserPreference {
    type Error = Error;

    fn try_from_db_model(model: PreferenceModel) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            preferred_categories: serde_json::from_value(model.preferred_categories)?,
            difficulty_preference: model.difficulty_preference,
            learning_pace: model.learning_pace,
            notification_settings: object(model.notification_settings),
        })
    }
}

impl FromDbModel<UserModel> for User {
    fn from_db_model(model: UserModel) -> Self {
        Self {
            id: model.id,
            interests: string_list(&model.interests),
            email: model.email,
            username: model.username,
            first_name: model.first_name,
            last_name: model.last_name,
            bio: model.bio,
            date_of_birth: model.date_of_birth,
            profile_picture: model.profile_picture,
            learning_style: model.learning_style,
            is_staff: model.is_staff,
            created_at: model.created_at,
            preferences: None,
        }
    }
}

impl TryFromDbModel<(UserModel, Option<PreferenceModel>)> for User {
    type Error = Error;

    fn try_from_db_model((model, preference): (UserModel, Option<PreferenceModel>)) -> Result<Self, Self::Error> {
        let mut user = User::from_db_model(model);
        user.preferences = preference.map(UserPreference::try_from_db_model).transpose()?;
        Ok(user)
    }
}

impl FromDbModel<ActivityModel> for LearningActivity {
    fn from_db_model(model: ActivityModel) -> Self {
        Self {
            id: model.id,
            activity_type: model.activity_type,
            content_type: model.content_type,
            content_id: model.content_id,
            metadata: object(model.metadata),
            created_at: model.timestamp,
        }
    }
}

use crate::convert::{FromDbModel, FromModel};
use edulearn_entity::ai::chat_message::{Model as MessageModel, Role as RoleModel};
use edulearn_entity::ai::chat_session::Model as SessionModel;
use edulearn_entity::ai::feedback::Model as FeedbackModel;
use edulearn_model::chat::{ChatMessage, ChatSession, Role};
use edulearn_model::recommendation::AiFeedback;

impl FromDbModel<RoleModel> for Role {
    fn from_db_model(model: RoleModel) -> Self {
        match model {
            RoleModel::User => Self::User,
            RoleModel::Assistant => Self::Assistant,
            RoleModel::System => Self::System,
        }
    }
}

impl FromModel<Role> for RoleModel {
    fn from_model(model: Role) -> Self {
        match model {
            Role::User => Self::User,
            Role::Assistant => Self::Assistant,
            Role::System => Self::System,
        }
    }
}

impl FromDbModel<MessageModel> for ChatMessage {
    fn from_db_model(model: MessageModel) -> Self {
        Self {
            id: model.id,
            role: Role::from_db_model(model.role),
            content: model.content,
            created_at: model.created_at,
        }
    }
}

impl FromDbModel<(SessionModel, Vec<MessageModel>)> for ChatSession {
    fn from_db_model((model, messages): (SessionModel, Vec<MessageModel>)) -> Self {
        Self {
            id: model.id,
            title: model.title,
            created_at: model.created_at,
            updated_at: model.updated_at,
            messages: messages.into_iter().map(ChatMessage::from_db_model).collect(),
        }
    }
}

impl FromDbModel<FeedbackModel> for AiFeedback {
    fn from_db_model(model: FeedbackModel) -> Self {
        Self {
            id: model.id,
            content_type: model.content_type,
            content_id: model.content_id,
            feedback: model.feedback,
            score: model.score,
            created_at: model.created_at,
        }
    }
}

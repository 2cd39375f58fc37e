use crate::llm_config::LlmConfig;
use crate::openai::{CallConfig, Sampling, assistant_message, chat_completion, system_message, user_message};
use async_openai::types::ChatCompletionRequestMessage;
use edulearn_db::ai::{chat_message, chat_session};
use edulearn_entity::ai::chat_message::{Model as MessageModel, Role};
use edulearn_entity::ai::chat_session::Model as SessionModel;
use edulearn_entity::user::Model as UserModel;
use edulearn_model::chat::ChatExchange;
use edulearn_model_tools::convert::IntoModel;
use sea_orm::{ConnectionTrait, DbErr};
use std::error::Error;
use tracing::instrument;

pub const VOICE_SESSION_TITLE: &str = "Voice Assistant Session";
pub const FALLBACK_REPLY: &str =
    "I'm sorry, I'm having trouble processing your request right now. Please try again later.";
const HISTORY_LENGTH: u64 = 10;
const SAMPLING: Sampling = Sampling::new(0.7, 1000);
const NOT_SPECIFIED: &str = "Not specified";

#[must_use]
pub fn system_prompt(user: &UserModel) -> String {
    let interests = user.interest_list();
    let interests = if interests.is_empty() {
        NOT_SPECIFIED.to_owned()
    } else {
        interests.join(", ")
    };
    let learning_style = if user.learning_style.is_empty() {
        NOT_SPECIFIED
    } else {
        user.learning_style.as_str()
    };

    format!(
        "You are an AI learning assistant for the EduLearn platform. \
         Your goal is to help users learn and understand course materials.\n\n\
         User information:\n\
         - Name: {}\n\
         - Learning interests: {interests}\n\
         - Learning style: {learning_style}\n\n\
         Respond in a helpful, educational manner. If asked about course content you're not familiar with, \
         suggest the user check the course materials or contact their instructor.",
        user.full_name()
    )
}

/// System prompt, then the stored history in order, then the new message.
#[must_use]
pub fn build_context(user: &UserModel, history: &[MessageModel], content: &str) -> Vec<ChatCompletionRequestMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(system_message(system_prompt(user)));
    messages.extend(history.iter().map(|message| match message.role {
        Role::User => user_message(message.content.clone()),
        Role::Assistant => assistant_message(message.content.clone()),
        Role::System => system_message(message.content.clone()),
    }));
    messages.push(user_message(content));
    messages
}

async fn reply(llm_config: &LlmConfig, messages: Vec<ChatCompletionRequestMessage>) -> String {
    chat_completion(
        llm_config,
        &CallConfig::default(),
        llm_config.get_chat_model(),
        messages,
        SAMPLING,
    )
    .await
    .unwrap_or_else(|error| {
        tracing::warn!(error = &error as &dyn Error, "chat completion failed, using fallback reply");
        FALLBACK_REPLY.to_owned()
    })
}

/// Stores the user's message and the tutor's answer in `session`.
#[instrument(skip(conn, llm_config, user, content), fields(session = %session.id))]
pub async fn send_message<C: ConnectionTrait>(
    conn: &C,
    llm_config: &LlmConfig,
    user: &UserModel,
    session: &SessionModel,
    content: String,
) -> Result<ChatExchange, DbErr> {
    let history = chat_message::Query::last_messages(conn, session.id, HISTORY_LENGTH).await?;
    let messages = build_context(user, &history, &content);

    let asked = chat_message::Mutation::create(conn, session.id, Role::User, content).await?;
    let answer = reply(llm_config, messages).await;
    let answered = chat_message::Mutation::create(conn, session.id, Role::Assistant, answer).await?;
    chat_session::Mutation::touch(conn, session.id).await?;

    Ok(ChatExchange {
        user_message: asked.into_model(),
        assistant_message: answered.into_model(),
    })
}

/// Answers a question inside the user's voice assistant session.
pub async fn ask<C: ConnectionTrait>(
    conn: &C,
    llm_config: &LlmConfig,
    user: &UserModel,
    question: String,
) -> Result<String, DbErr> {
    let session = chat_session::Mutation::get_or_create(conn, user.id, VOICE_SESSION_TITLE).await?;
    let exchange = send_message(conn, llm_config, user, &session, question).await?;
    Ok(exchange.assistant_message.content)
}

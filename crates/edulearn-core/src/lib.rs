pub mod ai;
pub mod course;
pub mod llm_config;
pub mod openai;
pub mod password;
pub mod slug;
pub mod status;
pub mod tts;

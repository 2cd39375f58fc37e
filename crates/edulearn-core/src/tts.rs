use crate::tts::config::TTSConfig;
use crate::tts::error::TTSError;
use edulearn_utils::media::MediaStore;
use elevenlabs_rs::ElevenLabsClient;
use elevenlabs_rs::endpoints::genai::tts::{TextToSpeechBody, TextToSpeechStream};
use futures::StreamExt;
use regex::Regex;
use std::sync::LazyLock;
use tracing::instrument;

pub mod config;
pub mod error;

pub const AUDIO_DIRECTORY: &str = "tts_audio";

static EMOJI: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(concat!(
        "[",
        "\u{01F600}-\u{01F64F}",
        "\u{01F300}-\u{01F5FF}",
        "\u{01F680}-\u{01F6FF}",
        "\u{01F1E0}-\u{01F1FF}",
        "\u{002702}-\u{0027B0}",
        "\u{0024C2}-\u{01F251}",
        "]+",
    ))
});

static HTML_TAG: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| Regex::new(r"<[^>]*>"));

fn build_client(config: &TTSConfig) -> (ElevenLabsClient, String, String) {
    let client = ElevenLabsClient::new(&config.api_key);
    (client, config.model.clone(), config.voice.clone())
}

/// Synthesizes `text` and returns the complete mp3 audio.
#[instrument(skip(config, text))]
pub async fn text_to_speech(config: &TTSConfig, text: &str) -> Result<Vec<u8>, TTSError> {
    let text = demoji(text);
    if text.trim().is_empty() {
        return Err(TTSError::EmptyText);
    }

    let (client, model_id, voice_id) = build_client(config);
    let body = TextToSpeechBody::new(&text).with_model_id(model_id);
    let request = TextToSpeechStream::new(voice_id, body);
    tracing::debug!("Sending request to elevenlabs");
    let mut audio = client.hit(request).await?;

    let mut complete_audio: Vec<u8> = vec![];
    while let Some(data) = audio.next().await {
        complete_audio.extend(data?.to_vec());
    }
    tracing::debug!(bytes = complete_audio.len(), "received audio");
    Ok(complete_audio)
}

/// Synthesizes `text` into the media store and returns its public url.
pub async fn synthesize_to_media(config: &TTSConfig, media: &MediaStore, text: &str) -> Result<String, TTSError> {
    let audio = text_to_speech(config, text).await?;
    Ok(media.store_generated(AUDIO_DIRECTORY, "mp3", &audio).await?)
}

/// Removes emoji and decodes html entities.
#[must_use]
pub fn demoji(string: &str) -> String {
    let string = match EMOJI.as_ref() {
        Ok(regex) => regex.replace_all(string, "").to_string(),
        Err(_) => string.to_owned(),
    };
    html_escape::decode_html_entities(&string).to_string()
}

/// Drops markup from lesson content, keeping the text.
#[must_use]
pub fn strip_html(html: &str) -> String {
    let text = match HTML_TAG.as_ref() {
        Ok(regex) => regex.replace_all(html, " ").to_string(),
        Err(_) => html.to_owned(),
    };
    let text = html_escape::decode_html_entities(&text);
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The text read out for a lesson.
#[must_use]
pub fn lesson_speech_text(title: &str, content: &str) -> String {
    format!("{title}. {}", strip_html(content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demoji() {
        assert_eq!(demoji("Great job 🎉🚀!"), "Great job !");
        assert_eq!(demoji("Fish &amp; chips"), "Fish & chips");
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(
            strip_html("<h1>Intro</h1>\n<p>Rust has <b>ownership</b> &amp; borrowing.</p>"),
            "Intro Rust has ownership & borrowing."
        );
        assert_eq!(lesson_speech_text("Lesson 1", "<p>Hello</p>"), "Lesson 1. Hello");
    }

    #[tokio::test]
    async fn test_empty_text_is_rejected() {
        let config = TTSConfig {
            api_key: "key".to_owned(),
            model: "model".to_owned(),
            voice: "voice".to_owned(),
        };
        let result = text_to_speech(&config, "🎉").await;
        assert!(matches!(result, Err(TTSError::EmptyText)));
    }
}

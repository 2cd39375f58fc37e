use crate::ai::error::AiError;
use crate::course::grading::recompute_attempt_score;
use crate::llm_config::LlmConfig;
use crate::openai::{CallConfig, Sampling, chat_completion, system_message, user_message};
use edulearn_db::ai::feedback;
use edulearn_db::quiz::{attempt, question, response};
use edulearn_entity::ai::feedback::{CONTENT_TYPE_ESSAY, CONTENT_TYPE_QUIZ_RESPONSE};
use edulearn_entity::quiz::response::Model as ResponseModel;
use edulearn_model::recommendation::{EssayGrade, EssayGradingRequest};
use regex::Regex;
use sea_orm::{DatabaseConnection, DbErr};
use std::error::Error;
use std::sync::LazyLock;
use tracing::instrument;
use uuid::Uuid;

const SYSTEM_PROMPT: &str = "You are an expert educator who grades essays fairly and provides constructive feedback.";
const SAMPLING: Sampling = Sampling::new(0.3, 1000);
pub const ERROR_FEEDBACK: &str = "Error processing essay. Please try again later.";
/// Share of the points an essay needs to count as correct.
const CORRECT_THRESHOLD: f64 = 0.7;

static NUMBER: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| Regex::new(r"\d+(\.\d+)?"));

#[must_use]
pub fn essay_prompt(essay_text: &str, rubric: Option<&str>, max_score: f64) -> String {
    let criteria = match rubric.map(str::trim).filter(|rubric| !rubric.is_empty()) {
        Some(rubric) => format!("Please grade the following essay according to this rubric:\n\n{rubric}\n\nThe maximum score is {max_score}."),
        None => format!(
            "Please grade the following essay on a scale of 0 to {max_score}.\n\
             Consider factors such as:\n\
             - Content and understanding of the topic\n\
             - Organization and structure\n\
             - Clarity and expression\n\
             - Use of evidence and support\n\
             - Grammar and mechanics"
        ),
    };
    format!(
        "{criteria}\n\nEssay:\n{essay_text}\n\n\
         Provide a detailed assessment with specific feedback on strengths and areas for improvement.\n\
         Format your response as:\n\n\
         Score: [numerical score out of {max_score}]\n\n\
         Feedback:\n[detailed feedback]"
    )
}

/// Reads the score and feedback out of a grading answer.
#[must_use]
pub fn parse_grading(response_text: &str, max_score: f64) -> (f64, String) {
    let score = response_text
        .lines()
        .map(|line| line.trim().trim_start_matches(['*', '#', ' ']))
        .find(|line| line.to_lowercase().starts_with("score:"))
        .and_then(|line| line.split_once(':').map(|(_, rest)| rest.to_owned()))
        .and_then(|rest| {
            let number = NUMBER.as_ref().ok()?.find(&rest)?;
            number.as_str().parse::<f64>().ok()
        })
        .map_or(max_score / 2.0, |score| score.clamp(0.0, max_score));

    let feedback = match response_text.split_once("Feedback:") {
        Some((_, feedback)) => feedback.trim().trim_start_matches('*').trim().to_owned(),
        None => response_text.trim().to_owned(),
    };
    (score, feedback)
}

/// Grades an essay, returning a zero score with an error note when the model is unavailable.
#[instrument(skip(llm_config, essay_text, rubric))]
pub async fn grade_essay(llm_config: &LlmConfig, essay_text: &str, rubric: Option<&str>, max_score: f64) -> EssayGrade {
    let messages = vec![
        system_message(SYSTEM_PROMPT),
        user_message(essay_prompt(essay_text, rubric, max_score)),
    ];
    match chat_completion(
        llm_config,
        &CallConfig::default(),
        llm_config.get_grading_model(),
        messages,
        SAMPLING,
    )
    .await
    {
        Ok(answer) => {
            let (score, feedback) = parse_grading(&answer, max_score);
            EssayGrade { score, feedback }
        }
        Err(error) => {
            tracing::warn!(error = &error as &dyn Error, "essay grading failed");
            EssayGrade {
                score: 0.0,
                feedback: ERROR_FEEDBACK.to_owned(),
            }
        }
    }
}

/// Grades a free standing essay and records the feedback for the user.
pub async fn grade_user_essay(
    conn: &DatabaseConnection,
    llm_config: &LlmConfig,
    user_id: Uuid,
    request: &EssayGradingRequest,
) -> Result<EssayGrade, DbErr> {
    let max_score = f64::from(request.max_score.max(1));
    let grade = grade_essay(llm_config, &request.essay_text, request.rubric.as_deref(), max_score).await;
    feedback::Mutation::create(
        conn,
        user_id,
        CONTENT_TYPE_ESSAY,
        None,
        grade.feedback.clone(),
        Some(grade.score),
    )
    .await?;
    Ok(grade)
}

/// Grades a stored essay response of a quiz attempt and updates the attempt score.
#[instrument(skip(conn, llm_config))]
pub async fn grade_essay_response(
    conn: &DatabaseConnection,
    llm_config: &LlmConfig,
    response_id: Uuid,
) -> Result<ResponseModel, AiError> {
    let stored = response::Query::find_by_id(conn, response_id)
        .await?
        .ok_or(AiError::NotFound("quiz response"))?;
    let question = question::Query::find_by_id(conn, stored.question_id)
        .await?
        .ok_or(AiError::NotFound("question"))?;
    let attempt = attempt::Query::find_by_id(conn, stored.attempt_id)
        .await?
        .ok_or(AiError::NotFound("quiz attempt"))?;

    let max_points = f64::from(question.points.max(1));
    let rubric = Some(question.answer_explanation.as_str());
    let grade = grade_essay(llm_config, &stored.text_response, rubric, max_points).await;
    let is_correct = grade.score >= max_points * CORRECT_THRESHOLD;

    let graded = response::Mutation::grade(conn, response_id, grade.score, is_correct, grade.feedback.clone()).await?;
    let attempt = recompute_attempt_score(conn, attempt.id).await?;
    feedback::Mutation::create(
        conn,
        attempt.user_id,
        CONTENT_TYPE_QUIZ_RESPONSE,
        Some(response_id),
        grade.feedback,
        Some(grade.score),
    )
    .await?;
    tracing::info!(score = grade.score, attempt_score = attempt.score, "graded essay response");
    Ok(graded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_grading() {
        let (score, feedback) = parse_grading("Score: 85/100\n\nFeedback:\nWell argued.", 100.0);
        assert_eq!(score, 85.0);
        assert_eq!(feedback, "Well argued.");
    }

    #[test]
    fn test_parse_grading_markdown_and_clamp() {
        let (score, feedback) = parse_grading("**Score:** 12.5\n\n**Feedback:** Too long.", 10.0);
        assert_eq!(score, 10.0);
        assert_eq!(feedback, "Too long.");
    }

    #[test]
    fn test_parse_grading_without_score() {
        let (score, feedback) = parse_grading("Nice essay overall.", 20.0);
        assert_eq!(score, 10.0);
        assert_eq!(feedback, "Nice essay overall.");

        let (score, _) = parse_grading("score: unknown", 20.0);
        assert_eq!(score, 10.0);
    }

    #[test]
    fn test_prompt_variants() {
        let with_rubric = essay_prompt("text", Some("Mention ownership"), 5.0);
        assert!(with_rubric.contains("according to this rubric:\n\nMention ownership"));
        assert!(with_rubric.contains("Score: [numerical score out of 5]"));

        let default = essay_prompt("text", Some("  "), 100.0);
        assert!(default.contains("on a scale of 0 to 100"));
        assert!(default.contains("Grammar and mechanics"));
    }
}

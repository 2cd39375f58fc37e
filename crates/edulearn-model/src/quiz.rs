use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum::Display;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
    Essay,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Answer {
    pub id: Uuid,
    pub answer_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Question {
    pub id: Uuid,
    pub question_text: String,
    pub question_type: QuestionType,
    pub points: i32,
    pub order: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_explanation: Option<String>,
    pub answers: Vec<Answer>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Quiz {
    pub id: Uuid,
    pub lesson: Uuid,
    pub title: String,
    pub description: String,
    /// Minutes, 0 means unlimited.
    pub time_limit: i32,
    pub passing_score: i32,
    pub questions: Vec<Question>,
}

impl Quiz {
    /// Removes everything that gives away the correct answers.
    pub fn hide_solutions(&mut self) {
        for question in &mut self.questions {
            question.answer_explanation = None;
            for answer in &mut question.answers {
                answer.is_correct = None;
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewQuiz {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub time_limit: i32,
    #[serde(default = "default_passing_score")]
    pub passing_score: i32,
}

fn default_passing_score() -> i32 {
    70
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct QuizChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub time_limit: Option<i32>,
    pub passing_score: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewAnswer {
    pub answer_text: String,
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewQuestion {
    pub question_text: String,
    pub question_type: QuestionType,
    #[serde(default = "default_points")]
    pub points: i32,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub answer_explanation: String,
    #[serde(default)]
    pub answers: Vec<NewAnswer>,
}

fn default_points() -> i32 {
    1
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SubmittedResponse {
    pub question_id: Uuid,
    #[serde(default)]
    pub answer_ids: Vec<Uuid>,
    #[serde(default)]
    pub text_response: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct QuizSubmission {
    /// Seconds.
    #[serde(default)]
    pub time_taken: i32,
    pub responses: Vec<SubmittedResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmissionResult {
    pub attempt_id: Uuid,
    pub score: f64,
    pub passed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuizResponse {
    pub id: Uuid,
    pub question: Uuid,
    pub selected_answers: Vec<Uuid>,
    pub text_response: String,
    pub score: f64,
    pub is_correct: bool,
    pub feedback: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuizAttempt {
    pub id: Uuid,
    pub quiz: Uuid,
    pub score: f64,
    pub time_taken: i32,
    pub is_completed: bool,
    pub started_at: NaiveDateTime,
    pub completed_at: Option<NaiveDateTime>,
    pub responses: Vec<QuizResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hide_solutions() {
        let mut quiz = Quiz {
            id: Uuid::nil(),
            lesson: Uuid::nil(),
            title: "Quiz".to_owned(),
            description: String::new(),
            time_limit: 0,
            passing_score: 70,
            questions: vec![Question {
                id: Uuid::nil(),
                question_text: "2 + 2?".to_owned(),
                question_type: QuestionType::MultipleChoice,
                points: 1,
                order: 0,
                answer_explanation: Some("4".to_owned()),
                answers: vec![Answer {
                    id: Uuid::nil(),
                    answer_text: "4".to_owned(),
                    is_correct: Some(true),
                }],
            }],
        };
        quiz.hide_solutions();

        let value = serde_json::to_value(&quiz).unwrap();
        assert!(value["questions"][0].get("answer_explanation").is_none());
        assert!(value["questions"][0]["answers"][0].get("is_correct").is_none());
    }

    #[test]
    fn test_new_question_defaults() {
        let question: NewQuestion = serde_json::from_value(json!({
            "question_text": "Explain ownership",
            "question_type": "essay",
        }))
        .unwrap();
        assert_eq!(question.points, 1);
        assert!(question.answers.is_empty());

        let quiz: NewQuiz = serde_json::from_value(json!({"title": "Checkpoint"})).unwrap();
        assert_eq!(quiz.passing_score, 70);
    }
}

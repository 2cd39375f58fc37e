use crate::course::error::CourseError;
use edulearn_db::quiz::{attempt, question, response};
use edulearn_entity::quiz::answer::Model as AnswerModel;
use edulearn_entity::quiz::attempt::Model as AttemptModel;
use edulearn_entity::quiz::question::{Model as QuestionModel, QuestionType};
use edulearn_entity::quiz::quiz::Model as QuizModel;
use edulearn_model::quiz::{QuizSubmission, SubmissionResult};
use sea_orm::{DatabaseConnection, DbErr, TransactionTrait};
use std::collections::{HashMap, HashSet};
use tracing::instrument;
use uuid::Uuid;

use edulearn_db::util::FlattenTransactionResultExt;

#[derive(Debug, Clone, PartialEq)]
pub struct GradedResponse {
    pub score: f64,
    pub is_correct: bool,
}

impl GradedResponse {
    fn full(points: i32) -> Self {
        Self {
            score: f64::from(points),
            is_correct: true,
        }
    }

    fn none() -> Self {
        Self {
            score: 0.0,
            is_correct: false,
        }
    }
}

/// Correct only when the selection is exactly the set of correct answers.
#[must_use]
pub fn grade_choice(question: &QuestionModel, answers: &[AnswerModel], selected: &[Uuid]) -> GradedResponse {
    let correct: HashSet<Uuid> = answers
        .iter()
        .filter(|answer| answer.is_correct)
        .map(|answer| answer.id)
        .collect();
    let selected: HashSet<Uuid> = selected.iter().copied().collect();
    if !correct.is_empty() && correct == selected {
        GradedResponse::full(question.points)
    } else {
        GradedResponse::none()
    }
}

#[must_use]
pub fn grade_short_answer(question: &QuestionModel, text: &str) -> GradedResponse {
    let expected = question.answer_explanation.trim();
    if !expected.is_empty() && expected.to_lowercase() == text.trim().to_lowercase() {
        GradedResponse::full(question.points)
    } else {
        GradedResponse::none()
    }
}

/// Percentage of `earned` over `total`, 0 when there is nothing to earn.
#[must_use]
pub fn percentage(earned: f64, total: f64) -> f64 {
    if total <= 0.0 { 0.0 } else { earned / total * 100.0 }
}

#[derive(Debug, Clone)]
pub struct GradedSubmission {
    pub attempt: AttemptModel,
    pub passed: bool,
    /// Essay responses that still need grading.
    pub pending_essays: Vec<Uuid>,
}

impl From<&GradedSubmission> for SubmissionResult {
    fn from(value: &GradedSubmission) -> Self {
        Self {
            attempt_id: value.attempt.id,
            score: value.attempt.score,
            passed: value.passed,
        }
    }
}

/// Stores an attempt with one graded response per submitted question.
/// Each question may be answered once and repeated answer ids count once.
#[instrument(skip(conn, submission), fields(quiz_id = %quiz.id))]
pub async fn submit_quiz(
    conn: &DatabaseConnection,
    user_id: Uuid,
    quiz: &QuizModel,
    mut submission: QuizSubmission,
) -> Result<GradedSubmission, CourseError> {
    let questions: HashMap<Uuid, (QuestionModel, Vec<AnswerModel>)> =
        question::Query::list_with_answers(conn, quiz.id)
            .await?
            .into_iter()
            .map(|(question, answers)| (question.id, (question, answers)))
            .collect();

    let mut answered = HashSet::new();
    for submitted in &mut submission.responses {
        let Some((_, answers)) = questions.get(&submitted.question_id) else {
            return Err(CourseError::UnknownQuestion(submitted.question_id));
        };
        if !answered.insert(submitted.question_id) {
            return Err(CourseError::DuplicateQuestion(submitted.question_id));
        }
        let mut selected = HashSet::new();
        submitted.answer_ids.retain(|answer_id| selected.insert(*answer_id));
        if let Some(unknown) = submitted
            .answer_ids
            .iter()
            .find(|answer_id| !answers.iter().any(|answer| answer.id == **answer_id))
        {
            return Err(CourseError::UnknownAnswer(*unknown));
        }
    }

    let total_points: f64 = questions.values().map(|(question, _)| f64::from(question.points)).sum();
    let quiz_id = quiz.id;
    let passing_score = f64::from(quiz.passing_score);

    conn.transaction::<_, GradedSubmission, CourseError>(|txn| {
        Box::pin(async move {
            let created = attempt::Mutation::create(txn, user_id, quiz_id, submission.time_taken).await?;
            let mut earned = 0.0;
            let mut pending_essays = vec![];

            for submitted in submission.responses {
                let Some((question, answers)) = questions.get(&submitted.question_id) else {
                    continue;
                };
                let graded = match question.question_type {
                    QuestionType::MultipleChoice | QuestionType::TrueFalse => {
                        grade_choice(question, answers, &submitted.answer_ids)
                    }
                    QuestionType::ShortAnswer => grade_short_answer(question, &submitted.text_response),
                    QuestionType::Essay => GradedResponse::none(),
                };
                earned += graded.score;

                let stored = response::Mutation::create(
                    txn,
                    created.id,
                    question.id,
                    submitted.text_response,
                    graded.score,
                    graded.is_correct,
                    &submitted.answer_ids,
                )
                .await?;
                if question.question_type == QuestionType::Essay {
                    pending_essays.push(stored.id);
                }
            }

            let score = percentage(earned, total_points);
            let attempt = attempt::Mutation::complete(txn, created.id, score).await?;
            tracing::info!(attempt_id = %attempt.id, score, "quiz submitted");
            Ok(GradedSubmission {
                passed: score >= passing_score,
                attempt,
                pending_essays,
            })
        })
    })
    .await
    .flatten_res()
}

/// Recomputes an attempt score from its stored response scores.
pub async fn recompute_attempt_score(conn: &DatabaseConnection, attempt_id: Uuid) -> Result<AttemptModel, DbErr> {
    let attempt = attempt::Query::find_by_id(conn, attempt_id)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("quiz attempt {attempt_id}")))?;
    let earned: f64 = response::Query::list_for_attempt(conn, attempt_id)
        .await?
        .iter()
        .map(|response| response.score)
        .sum();
    #[allow(clippy::cast_precision_loss)]
    let total = question::Query::total_points(conn, attempt.quiz_id).await? as f64;
    attempt::Mutation::update_score(conn, attempt_id, percentage(earned, total)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(question_type: QuestionType, points: i32, explanation: &str) -> QuestionModel {
        QuestionModel {
            id: Uuid::new_v4(),
            quiz_id: Uuid::new_v4(),
            question_text: "?".to_owned(),
            question_type,
            points,
            position: 0,
            answer_explanation: explanation.to_owned(),
        }
    }

    fn answer(question: &QuestionModel, is_correct: bool) -> AnswerModel {
        AnswerModel {
            id: Uuid::new_v4(),
            question_id: question.id,
            answer_text: String::new(),
            is_correct,
        }
    }

    #[test]
    fn test_choice_requires_exact_set() {
        let question = question(QuestionType::MultipleChoice, 3, "");
        let answers = vec![answer(&question, true), answer(&question, true), answer(&question, false)];

        let all_correct = grade_choice(&question, &answers, &[answers[0].id, answers[1].id]);
        assert_eq!(all_correct, GradedResponse::full(3));

        let missing_one = grade_choice(&question, &answers, &[answers[0].id]);
        assert!(!missing_one.is_correct);

        let with_wrong = grade_choice(&question, &answers, &[answers[0].id, answers[1].id, answers[2].id]);
        assert_eq!(with_wrong.score, 0.0);

        let nothing = grade_choice(&question, &answers, &[]);
        assert!(!nothing.is_correct);
    }

    #[test]
    fn test_choice_without_correct_answers() {
        let question = question(QuestionType::TrueFalse, 1, "");
        let answers = vec![answer(&question, false)];
        assert!(!grade_choice(&question, &answers, &[]).is_correct);
    }

    #[test]
    fn test_short_answer_ignores_case_and_whitespace() {
        let question = question(QuestionType::ShortAnswer, 2, "Ownership");
        assert_eq!(grade_short_answer(&question, "  ownership \n"), GradedResponse::full(2));
        assert!(!grade_short_answer(&question, "borrowing").is_correct);
        let empty = question_with_empty_explanation();
        assert!(!grade_short_answer(&empty, "").is_correct);
    }

    fn question_with_empty_explanation() -> QuestionModel {
        question(QuestionType::ShortAnswer, 1, "  ")
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(3.0, 4.0), 75.0);
        assert_eq!(percentage(0.0, 0.0), 0.0);
    }
}

use crate::convert::{FromDbModel, FromModel};
use edulearn_entity::quiz::answer::Model as AnswerModel;
use edulearn_entity::quiz::attempt::Model as AttemptModel;
use edulearn_entity::quiz::question::{Model as QuestionModel, QuestionType as QuestionTypeModel};
use edulearn_entity::quiz::quiz::Model as QuizModel;
use edulearn_entity::quiz::response::Model as ResponseModel;
use edulearn_model::quiz::{Answer, Question, QuestionType, Quiz, QuizAttempt, QuizResponse};
use uuid::Uuid;

impl FromDbModel<QuestionTypeModel> for QuestionType {
    fn from_db_model(model: QuestionTypeModel) -> Self {
        match model {
            QuestionTypeModel::MultipleChoice => Self::MultipleChoice,
            QuestionTypeModel::TrueFalse => Self::TrueFalse,
            QuestionTypeModel::ShortAnswer => Self::ShortAnswer,
            QuestionTypeModel::Essay => Self::Essay,
        }
    }
}

impl FromModel<QuestionType> for QuestionTypeModel {
    fn from_model(model: QuestionType) -> Self {
        match model {
            QuestionType::MultipleChoice => Self::MultipleChoice,
            QuestionType::TrueFalse => Self::TrueFalse,
            QuestionType::ShortAnswer => Self::ShortAnswer,
            QuestionType::Essay => Self::Essay,
        }
    }
}

impl FromDbModel<AnswerModel> for Answer {
    fn from_db_model(model: AnswerModel) -> Self {
        Self {
            id: model.id,
            answer_text: model.answer_text,
            is_correct: Some(model.is_correct),
        }
    }
}

impl FromDbModel<(QuestionModel, Vec<AnswerModel>)> for Question {
    fn from_db_model((model, answers): (QuestionModel, Vec<AnswerModel>)) -> Self {
        Self {
            id: model.id,
            question_text: model.question_text,
            question_type: QuestionType::from_db_model(model.question_type),
            points: model.points,
            order: model.position,
            answer_explanation: Some(model.answer_explanation).filter(|explanation| !explanation.is_empty()),
            answers: answers.into_iter().map(Answer::from_db_model).collect(),
        }
    }
}

impl FromDbModel<(QuizModel, Vec<(QuestionModel, Vec<AnswerModel>)>)> for Quiz {
    fn from_db_model((model, questions): (QuizModel, Vec<(QuestionModel, Vec<AnswerModel>)>)) -> Self {
        Self {
            id: model.id,
            lesson: model.lesson_id,
            title: model.title,
            description: model.description,
            time_limit: model.time_limit,
            passing_score: model.passing_score,
            questions: questions.into_iter().map(Question::from_db_model).collect(),
        }
    }
}

impl FromDbModel<(ResponseModel, Vec<Uuid>)> for QuizResponse {
    fn from_db_model((model, selected_answers): (ResponseModel, Vec<Uuid>)) -> Self {
        Self {
            id: model.id,
            question: model.question_id,
            selected_answers,
            text_response: model.text_response,
            score: model.score,
            is_correct: model.is_correct,
            feedback: model.feedback,
        }
    }
}

impl FromDbModel<(AttemptModel, Vec<QuizResponse>)> for QuizAttempt {
    fn from_db_model((model, responses): (AttemptModel, Vec<QuizResponse>)) -> Self {
        Self {
            id: model.id,
            quiz: model.quiz_id,
            score: model.score,
            time_taken: model.time_taken,
            is_completed: model.is_completed,
            started_at: model.started_at,
            completed_at: model.completed_at,
            responses,
        }
    }
}

use crate::AppConfig;
use crate::permissions::Permission;
use crate::routes::api::v1::courses::error::CourseError;
use crate::routes::api::v1::courses::is_visible;
use crate::routes::api::v1::courses::lessons::LessonAccess;
use crate::routes::error::ValidationErrors;
use crate::user::ExtractUser;
use axum::extract::Path;
use axum::response::IntoResponse;
use axum::routing::{Router, get, post};
use axum::{Extension, Json};
use edulearn_core::course::grading::submit_quiz;
use edulearn_db::course::{course, lesson};
use edulearn_db::quiz::{question, quiz};
use edulearn_db::sea_orm::ActiveValue::Set;
use edulearn_db::sea_orm::DatabaseConnection;
use edulearn_entity::course::course::Model as CourseModel;
use edulearn_entity::course::lesson::Model as LessonModel;
use edulearn_entity::quiz::question::ActiveModel as QuestionActiveModel;
use edulearn_entity::quiz::quiz::{ActiveModel as QuizActiveModel, Model as QuizModel};
use edulearn_entity::user::Model as UserModel;
use edulearn_model::quiz::{
    NewQuestion, NewQuiz, Question, QuestionType, Quiz, QuizChanges, QuizSubmission, SubmissionResult,
};
use edulearn_model_tools::convert::{FromDbModel, IntoDbModel};
use edulearn_worker::Task;
use http::StatusCode;
use protect_axum::protect;
use uuid::Uuid;

pub(crate) fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().nest(
        "/lessons/{lesson_id}/quizzes",
        Router::new()
            .route("/", get(list_quizzes).post(create_quiz))
            .route(
                "/{id}",
                get(get_quiz).put(update_quiz).patch(update_quiz).delete(delete_quiz),
            )
            .route("/{id}/submit", post(submit))
            .route("/{id}/questions", get(list_questions).post(create_question))
            .route(
                "/{id}/questions/{question_id}",
                get(get_question).delete(delete_question),
            ),
    )
}

/// The lesson a quiz hangs off, as seen by the caller.
struct LessonScope {
    course: CourseModel,
    lesson: LessonModel,
    access: LessonAccess,
}

impl LessonScope {
    async fn load(conn: &DatabaseConnection, lesson_id: Uuid, user: &UserModel) -> Result<Self, CourseError> {
        let lesson = lesson::Query::find_by_id(conn, lesson_id)
            .await?
            .ok_or(CourseError::NotFound)?;
        let course = course::Query::find_by_id(conn, lesson.course_id)
            .await?
            .filter(|found| is_visible(found, Some(user)))
            .ok_or(CourseError::NotFound)?;
        let access = LessonAccess::resolve(conn, &course, Some(user)).await?;
        if !access.can_view(&lesson) {
            return Err(CourseError::NotFound);
        }
        Ok(Self { course, lesson, access })
    }

    fn is_instructor(&self) -> bool {
        self.access == LessonAccess::Instructor
    }

    fn ensure_instructor(&self) -> Result<(), CourseError> {
        if self.is_instructor() {
            Ok(())
        } else {
            tracing::debug!(course = %self.course.id, "caller is not the instructor");
            Err(CourseError::Forbidden)
        }
    }

    async fn find_quiz(&self, conn: &DatabaseConnection, id: Uuid) -> Result<QuizModel, CourseError> {
        quiz::Query::find_for_lesson(conn, id, self.lesson.id)
            .await?
            .ok_or(CourseError::NotFound)
    }

    /// Quiz with questions, solutions removed unless the caller instructs the course.
    async fn render(&self, conn: &DatabaseConnection, found: QuizModel) -> Result<Quiz, CourseError> {
        let questions = question::Query::list_with_answers(conn, found.id).await?;
        let mut rendered = Quiz::from_db_model((found, questions));
        if !self.is_instructor() {
            rendered.hide_solutions();
        }
        Ok(rendered)
    }
}

fn check_quiz(errors: &mut ValidationErrors, title: Option<&str>, time_limit: Option<i32>, passing_score: Option<i32>) {
    if title.is_some_and(|title| title.trim().is_empty()) {
        errors.add("title", "This field may not be blank.");
    }
    if time_limit.is_some_and(|time_limit| time_limit < 0) {
        errors.add("time_limit", "Ensure this value is greater than or equal to 0.");
    }
    if passing_score.is_some_and(|score| !(0..=100).contains(&score)) {
        errors.add("passing_score", "Ensure this value is between 0 and 100.");
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/lessons/{lesson_id}/quizzes",
    params(("lesson_id" = Uuid, Path, description = "lesson id")),
    responses(
        (status = OK, description = "Quizzes of the lesson, solutions only for the instructor", body = [Quiz]),
        (status = NOT_FOUND, description = "Unknown lesson or not visible to the caller"),
    ),
    tag = "v1/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn list_quizzes(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path(lesson_id): Path<Uuid>,
) -> Result<impl IntoResponse, CourseError> {
    let scope = LessonScope::load(&conn, lesson_id, &user).await?;
    let mut quizzes = Vec::new();
    for found in quiz::Query::list_for_lesson(&conn, scope.lesson.id).await? {
        quizzes.push(scope.render(&conn, found).await?);
    }
    Ok(Json(quizzes))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/lessons/{lesson_id}/quizzes/{id}",
    params(
        ("lesson_id" = Uuid, Path, description = "lesson id"),
        ("id" = Uuid, Path, description = "quiz id"),
    ),
    responses(
        (status = OK, description = "A single quiz with its questions", body = Quiz),
        (status = NOT_FOUND, description = "Unknown quiz"),
    ),
    tag = "v1/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn get_quiz(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path((lesson_id, id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, CourseError> {
    let scope = LessonScope::load(&conn, lesson_id, &user).await?;
    let found = scope.find_quiz(&conn, id).await?;
    Ok(Json(scope.render(&conn, found).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/lessons/{lesson_id}/quizzes",
    params(("lesson_id" = Uuid, Path, description = "lesson id")),
    request_body = NewQuiz,
    responses(
        (status = CREATED, description = "Created quiz", body = Quiz),
        (status = FORBIDDEN, description = "Caller is not the instructor"),
    ),
    tag = "v1/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn create_quiz(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path(lesson_id): Path<Uuid>,
    Json(new_quiz): Json<NewQuiz>,
) -> Result<impl IntoResponse, CourseError> {
    let scope = LessonScope::load(&conn, lesson_id, &user).await?;
    scope.ensure_instructor()?;

    let mut errors = ValidationErrors::new();
    check_quiz(
        &mut errors,
        Some(&new_quiz.title),
        Some(new_quiz.time_limit),
        Some(new_quiz.passing_score),
    );
    errors.check()?;

    let created = quiz::Mutation::create(
        &conn,
        scope.lesson.id,
        QuizActiveModel {
            title: Set(new_quiz.title.trim().to_owned()),
            description: Set(new_quiz.description),
            time_limit: Set(new_quiz.time_limit),
            passing_score: Set(new_quiz.passing_score),
            ..Default::default()
        },
    )
    .await?;
    tracing::info!(lesson = %scope.lesson.id, quiz = %created.id, "created quiz");
    Ok((StatusCode::CREATED, Json(scope.render(&conn, created).await?)))
}

#[utoipa::path(
    method(put, patch),
    path = "/api/v1/courses/lessons/{lesson_id}/quizzes/{id}",
    params(
        ("lesson_id" = Uuid, Path, description = "lesson id"),
        ("id" = Uuid, Path, description = "quiz id"),
    ),
    request_body = QuizChanges,
    responses(
        (status = OK, description = "Updated quiz", body = Quiz),
        (status = FORBIDDEN, description = "Caller is not the instructor"),
    ),
    tag = "v1/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn update_quiz(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path((lesson_id, id)): Path<(Uuid, Uuid)>,
    Json(changes): Json<QuizChanges>,
) -> Result<impl IntoResponse, CourseError> {
    let scope = LessonScope::load(&conn, lesson_id, &user).await?;
    scope.ensure_instructor()?;
    let found = scope.find_quiz(&conn, id).await?;

    let mut errors = ValidationErrors::new();
    check_quiz(
        &mut errors,
        changes.title.as_deref(),
        changes.time_limit,
        changes.passing_score,
    );
    errors.check()?;

    let mut model: QuizActiveModel = found.into();
    if let Some(title) = changes.title {
        model.title = Set(title.trim().to_owned());
    }
    if let Some(description) = changes.description {
        model.description = Set(description);
    }
    if let Some(time_limit) = changes.time_limit {
        model.time_limit = Set(time_limit);
    }
    if let Some(passing_score) = changes.passing_score {
        model.passing_score = Set(passing_score);
    }
    let updated = quiz::Mutation::update(&conn, model).await?;
    Ok(Json(scope.render(&conn, updated).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/courses/lessons/{lesson_id}/quizzes/{id}",
    params(
        ("lesson_id" = Uuid, Path, description = "lesson id"),
        ("id" = Uuid, Path, description = "quiz id"),
    ),
    responses(
        (status = NO_CONTENT, description = "Quiz deleted with its questions and attempts"),
        (status = FORBIDDEN, description = "Caller is not the instructor"),
    ),
    tag = "v1/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn delete_quiz(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path((lesson_id, id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, CourseError> {
    let scope = LessonScope::load(&conn, lesson_id, &user).await?;
    scope.ensure_instructor()?;
    let found = scope.find_quiz(&conn, id).await?;
    quiz::Mutation::delete(&conn, found.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/lessons/{lesson_id}/quizzes/{id}/submit",
    params(
        ("lesson_id" = Uuid, Path, description = "lesson id"),
        ("id" = Uuid, Path, description = "quiz id"),
    ),
    request_body = QuizSubmission,
    responses(
        (status = OK, description = "Graded attempt, essays are graded in the background", body = SubmissionResult),
        (status = BAD_REQUEST, description = "Question or answer does not belong to the quiz"),
        (status = FORBIDDEN, description = "Caller is neither enrolled nor the instructor"),
    ),
    tag = "v1/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn submit(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Extension(app_config): Extension<AppConfig>,
    Path((lesson_id, id)): Path<(Uuid, Uuid)>,
    Json(submission): Json<QuizSubmission>,
) -> Result<impl IntoResponse, CourseError> {
    let scope = LessonScope::load(&conn, lesson_id, &user).await?;
    if scope.access == LessonAccess::Visitor {
        return Err(CourseError::Forbidden);
    }
    let found = scope.find_quiz(&conn, id).await?;

    let graded = submit_quiz(&conn, user.id, &found, submission).await?;
    for response_id in &graded.pending_essays {
        app_config.tasks().enqueue(Task::GradeEssayResponse(*response_id));
    }
    Ok(Json(SubmissionResult::from(&graded)))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/lessons/{lesson_id}/quizzes/{id}/questions",
    params(
        ("lesson_id" = Uuid, Path, description = "lesson id"),
        ("id" = Uuid, Path, description = "quiz id"),
    ),
    responses(
        (status = OK, description = "Questions with answers", body = [Question]),
    ),
    tag = "v1/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn list_questions(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path((lesson_id, id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, CourseError> {
    let scope = LessonScope::load(&conn, lesson_id, &user).await?;
    let found = scope.find_quiz(&conn, id).await?;
    Ok(Json(scope.render(&conn, found).await?.questions))
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/lessons/{lesson_id}/quizzes/{id}/questions",
    params(
        ("lesson_id" = Uuid, Path, description = "lesson id"),
        ("id" = Uuid, Path, description = "quiz id"),
    ),
    request_body = NewQuestion,
    responses(
        (status = CREATED, description = "Created question with its answers", body = Question),
        (status = BAD_REQUEST, description = "Blank question or choice question without a correct answer"),
        (status = FORBIDDEN, description = "Caller is not the instructor"),
    ),
    tag = "v1/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn create_question(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path((lesson_id, id)): Path<(Uuid, Uuid)>,
    Json(new_question): Json<NewQuestion>,
) -> Result<impl IntoResponse, CourseError> {
    let scope = LessonScope::load(&conn, lesson_id, &user).await?;
    scope.ensure_instructor()?;
    let found = scope.find_quiz(&conn, id).await?;

    let mut errors = ValidationErrors::new();
    if new_question.question_text.trim().is_empty() {
        errors.add("question_text", "This field may not be blank.");
    }
    if new_question.points < 0 {
        errors.add("points", "Ensure this value is greater than or equal to 0.");
    }
    let is_choice = matches!(
        new_question.question_type,
        QuestionType::MultipleChoice | QuestionType::TrueFalse
    );
    if is_choice && !new_question.answers.iter().any(|answer| answer.is_correct) {
        errors.add("answers", "Choice questions need at least one correct answer.");
    }
    errors.check()?;

    let answers = new_question
        .answers
        .into_iter()
        .map(|answer| (answer.answer_text, answer.is_correct))
        .collect();
    let created = question::Mutation::create_with_answers(
        &conn,
        found.id,
        QuestionActiveModel {
            question_text: Set(new_question.question_text),
            question_type: Set(new_question.question_type.into_db_model()),
            points: Set(new_question.points),
            position: Set(new_question.order),
            answer_explanation: Set(new_question.answer_explanation),
            ..Default::default()
        },
        answers,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(Question::from_db_model(created))))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/lessons/{lesson_id}/quizzes/{id}/questions/{question_id}",
    params(
        ("lesson_id" = Uuid, Path, description = "lesson id"),
        ("id" = Uuid, Path, description = "quiz id"),
        ("question_id" = Uuid, Path, description = "question id"),
    ),
    responses(
        (status = OK, description = "A single question", body = Question),
        (status = NOT_FOUND, description = "Unknown question"),
    ),
    tag = "v1/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn get_question(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path((lesson_id, id, question_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<impl IntoResponse, CourseError> {
    let scope = LessonScope::load(&conn, lesson_id, &user).await?;
    let found = scope.find_quiz(&conn, id).await?;
    let question = scope
        .render(&conn, found)
        .await?
        .questions
        .into_iter()
        .find(|question| question.id == question_id)
        .ok_or(CourseError::NotFound)?;
    Ok(Json(question))
}

#[utoipa::path(
    delete,
    path = "/api/v1/courses/lessons/{lesson_id}/quizzes/{id}/questions/{question_id}",
    params(
        ("lesson_id" = Uuid, Path, description = "lesson id"),
        ("id" = Uuid, Path, description = "quiz id"),
        ("question_id" = Uuid, Path, description = "question id"),
    ),
    responses(
        (status = NO_CONTENT, description = "Question deleted"),
        (status = FORBIDDEN, description = "Caller is not the instructor"),
    ),
    tag = "v1/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn delete_question(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path((lesson_id, id, question_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<impl IntoResponse, CourseError> {
    let scope = LessonScope::load(&conn, lesson_id, &user).await?;
    scope.ensure_instructor()?;
    let found = scope.find_quiz(&conn, id).await?;
    let question = question::Query::find_by_id(&conn, question_id)
        .await?
        .filter(|question| question.quiz_id == found.id)
        .ok_or(CourseError::NotFound)?;
    question::Mutation::delete(&conn, question.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

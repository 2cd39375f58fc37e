use crate::ai::error::AiError;
use crate::llm_config::LlmConfig;
use crate::openai::{CallConfig, Sampling, json_completion, system_message, user_message};
use chrono::NaiveDate;
use edulearn_db::course::{course, enrollment, lesson, progress};
use edulearn_db::quiz::{attempt, question, quiz, response};
use edulearn_entity::course::course::Model as CourseModel;
use edulearn_entity::course::enrollment::{Model as EnrollmentModel, Status as EnrollmentStatus};
use edulearn_entity::course::lesson::Model as LessonModel;
use edulearn_entity::course::lesson_progress::Status as ProgressStatusModel;
use edulearn_entity::quiz::attempt::Model as AttemptModel;
use edulearn_entity::quiz::question::Model as QuestionModel;
use edulearn_entity::quiz::response::Model as ResponseModel;
use edulearn_entity::user::Model as UserModel;
use edulearn_model::assessment::{
    AttemptSummary, CoursePerformance, CoursePlan, FeedbackReport, GapIssue, KnowledgeGap, PersonalizedFeedback,
    PlanActivity, PlanDay, PlanWeek, PlannedLesson, Priority, QuestionStatistics, QuizAnalysis, QuizStatistics,
    ResponseSummary, StudyPlan, StudyPlanRequest, StudySchedule,
};
use edulearn_model::course::ProgressStatus;
use edulearn_model::quiz::QuestionType;
use edulearn_model_tools::convert::FromDbModel;
use sea_orm::{ConnectionTrait, DbErr};
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::Write;
use tracing::instrument;
use uuid::Uuid;

const FEEDBACK_SYSTEM_PROMPT: &str = "You are an expert educational advisor who provides personalized learning feedback.";
const PLAN_SYSTEM_PROMPT: &str = "You are an expert educational advisor who creates personalized study plans.";
const FEEDBACK_SAMPLING: Sampling = Sampling::new(0.5, 1000);
const PLAN_SAMPLING: Sampling = Sampling::new(0.5, 2000);

const STRENGTH_THRESHOLD: f64 = 80.0;
const WEAKNESS_THRESHOLD: f64 = 60.0;
const MIN_GAP_ISSUES: usize = 2;
const PROMPT_LESSON_LIMIT: usize = 10;
const DEFAULT_PLAN_WEEKS: u32 = 1;
const MAX_PLAN_WEEKS: u32 = 52;
const WEEKDAYS: [&str; 5] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

pub const NO_COURSE_DATA: &str = "No course data available for analysis";
pub const NO_ACTIVE_COURSES: &str = "No active courses found for study plan";
pub const TARGET_DATE_IN_PAST: &str = "Target date must be in the future";

fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0_u32), |(sum, count), value| (sum + value, count + 1));
    (count > 0).then(|| sum / f64::from(count))
}

fn not_specified(value: String) -> String {
    if value.trim().is_empty() {
        "Not specified".to_owned()
    } else {
        value
    }
}

fn student_information(user: &UserModel) -> String {
    format!(
        "Student information:\n- Name: {}\n- Learning interests: {}\n- Learning style: {}\n",
        user.full_name(),
        not_specified(user.interest_list().join(", ")),
        not_specified(user.learning_style.clone()),
    )
}

// Quiz analysis

#[must_use]
pub fn quiz_statistics(attempts: &[AttemptModel]) -> QuizStatistics {
    QuizStatistics {
        avg_score: mean(attempts.iter().map(|attempt| attempt.score)),
        avg_time: mean(attempts.iter().map(|attempt| f64::from(attempt.time_taken))),
        attempt_count: attempts.len() as u64,
        max_score: attempts.iter().map(|attempt| attempt.score).reduce(f64::max),
        min_score: attempts.iter().map(|attempt| attempt.score).reduce(f64::min),
    }
}

#[must_use]
pub fn question_statistics(question: &QuestionModel, responses: &[&ResponseModel]) -> QuestionStatistics {
    let correct = responses.iter().filter(|response| response.is_correct).count();
    let correct_percentage = if responses.is_empty() {
        0.0
    } else {
        correct as f64 / responses.len() as f64 * 100.0
    };
    QuestionStatistics {
        question_id: question.id,
        question_text: question.question_text.clone(),
        question_type: QuestionType::from_db_model(question.question_type),
        correct_percentage,
        avg_score: mean(responses.iter().map(|response| response.score)).unwrap_or_default(),
        attempt_count: responses.len() as u64,
    }
}

async fn ensure_may_view<C: ConnectionTrait>(
    conn: &C,
    caller: &UserModel,
    lesson_id: Uuid,
    target_user: Uuid,
) -> Result<(), AiError> {
    if target_user == caller.id {
        return Ok(());
    }
    let lesson = lesson::Query::find_by_id(conn, lesson_id)
        .await?
        .ok_or(AiError::NotFound("lesson"))?;
    let course = course::Query::find_by_id(conn, lesson.course_id)
        .await?
        .ok_or(AiError::NotFound("course"))?;
    if course.instructor_id == caller.id {
        Ok(())
    } else {
        Err(AiError::Forbidden("Only the course instructor can view results of other users"))
    }
}

/// Statistics over every completed attempt of the quiz plus the latest attempt of the target user.
#[instrument(skip(conn, caller), fields(caller = %caller.id))]
pub async fn analyze_quiz<C: ConnectionTrait>(
    conn: &C,
    caller: &UserModel,
    quiz_id: Uuid,
    user_id: Option<Uuid>,
) -> Result<QuizAnalysis, AiError> {
    let quiz = quiz::Query::find_by_id(conn, quiz_id)
        .await?
        .ok_or(AiError::NotFound("quiz"))?;
    let target_user = user_id.unwrap_or(caller.id);
    ensure_may_view(conn, caller, quiz.lesson_id, target_user).await?;

    let attempts = attempt::Query::list_completed_for_quiz(conn, quiz.id).await?;
    let questions = question::Query::list_for_quiz(conn, quiz.id).await?;
    let responses =
        response::Query::list_for_attempts(conn, attempts.iter().map(|attempt| attempt.id).collect()).await?;

    let question_statistics = questions
        .iter()
        .map(|question| {
            let answered: Vec<_> = responses
                .iter()
                .filter(|response| response.question_id == question.id)
                .collect();
            question_statistics(question, &answered)
        })
        .collect();

    let user_attempt = match attempt::Query::latest_completed(conn, target_user, quiz.id).await? {
        Some(latest) => {
            let by_id: HashMap<Uuid, &QuestionModel> = questions.iter().map(|question| (question.id, question)).collect();
            let mut answered = response::Query::list_for_attempt(conn, latest.id).await?;
            answered.sort_by_key(|response| by_id.get(&response.question_id).map(|question| question.position));
            let responses = answered
                .into_iter()
                .map(|response| ResponseSummary {
                    question_id: response.question_id,
                    question_text: by_id
                        .get(&response.question_id)
                        .map(|question| question.question_text.clone())
                        .unwrap_or_default(),
                    is_correct: response.is_correct,
                    score: response.score,
                    feedback: response.feedback,
                })
                .collect();
            Some(AttemptSummary {
                attempt_id: latest.id,
                score: latest.score,
                time_taken: latest.time_taken,
                completed_at: latest.completed_at,
                responses,
            })
        }
        None => None,
    };

    Ok(QuizAnalysis {
        quiz_id: quiz.id,
        quiz_title: quiz.title,
        statistics: quiz_statistics(&attempts),
        question_statistics,
        user_attempt,
    })
}

// Personalized feedback

/// Splits question types into strengths and weaknesses by the share of points earned.
#[must_use]
pub fn classify_question_types(
    scores: impl IntoIterator<Item = (QuestionType, f64, i32)>,
) -> (Vec<QuestionType>, Vec<QuestionType>) {
    let mut totals: Vec<(QuestionType, f64, f64)> = Vec::new();
    for (question_type, score, points) in scores {
        match totals.iter_mut().find(|(known, _, _)| *known == question_type) {
            Some((_, earned, possible)) => {
                *earned += score;
                *possible += f64::from(points);
            }
            None => totals.push((question_type, score, f64::from(points))),
        }
    }

    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();
    for (question_type, earned, possible) in totals {
        let percentage = if possible > 0.0 { earned / possible * 100.0 } else { 0.0 };
        if percentage >= STRENGTH_THRESHOLD {
            strengths.push(question_type);
        } else if percentage <= WEAKNESS_THRESHOLD {
            weaknesses.push(question_type);
        }
    }
    (strengths, weaknesses)
}

async fn course_performance<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    enrollment: &EnrollmentModel,
    course: &CourseModel,
) -> Result<CoursePerformance, DbErr> {
    let completed_lessons = progress::Query::count_completed_published(conn, enrollment.id).await?;
    let total_lessons = lesson::Query::count_published(conn, course.id).await?;

    let lessons = lesson::Query::list_for_course(conn, course.id, false).await?;
    let quizzes = quiz::Query::list_for_lessons(conn, lessons.iter().map(|lesson| lesson.id).collect()).await?;
    let attempts =
        attempt::Query::list_completed_for_user_quizzes(conn, user_id, quizzes.iter().map(|quiz| quiz.id).collect())
            .await?;
    let responses =
        response::Query::list_for_attempts(conn, attempts.iter().map(|attempt| attempt.id).collect()).await?;

    let question_ids: HashSet<Uuid> = responses.iter().map(|response| response.question_id).collect();
    let questions: HashMap<Uuid, QuestionModel> = question::Query::find_by_ids(conn, question_ids.into_iter().collect())
        .await?
        .into_iter()
        .map(|question| (question.id, question))
        .collect();
    let (strengths, weaknesses) = classify_question_types(responses.iter().filter_map(|response| {
        questions.get(&response.question_id).map(|question| {
            (
                QuestionType::from_db_model(question.question_type),
                response.score,
                question.points,
            )
        })
    }));

    Ok(CoursePerformance {
        course_id: course.id,
        course_title: course.title.clone(),
        progress: enrollment.progress,
        completed_lessons,
        total_lessons,
        avg_quiz_score: mean(attempts.iter().map(|attempt| attempt.score)).unwrap_or_default(),
        strengths,
        weaknesses,
    })
}

fn type_list(types: &[QuestionType]) -> String {
    if types.is_empty() {
        "None identified".to_owned()
    } else {
        types.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    }
}

#[must_use]
pub fn feedback_prompt(user: &UserModel, course_data: &[CoursePerformance]) -> String {
    let mut prompt = format!(
        "I need to generate personalized learning feedback for a student based on their performance data.\n\n{}\nCourse performance data:\n",
        student_information(user)
    );
    for course in course_data {
        let _ = write!(
            prompt,
            "\nCourse: {}\n- Progress: {:.1}%\n- Completed lessons: {} of {}\n- Average quiz score: {:.1}%\n- Strengths: {}\n- Weaknesses: {}\n",
            course.course_title,
            course.progress,
            course.completed_lessons,
            course.total_lessons,
            course.avg_quiz_score,
            type_list(&course.strengths),
            type_list(&course.weaknesses),
        );
    }
    prompt.push_str(
        r#"
Please provide:
1. A personalized assessment of the student's performance
2. 3-5 specific recommendations for improvement
3. Suggested learning resources or activities based on their performance

Format your response as JSON with the following structure:
{
    "assessment": "Overall assessment of performance",
    "recommendations": ["Specific recommendation 1", "Specific recommendation 2"],
    "resources": [
        {"title": "Resource title", "description": "Brief description", "type": "article|video|exercise|quiz"}
    ]
}"#,
    );
    prompt
}

#[must_use]
pub fn fallback_feedback() -> FeedbackReport {
    FeedbackReport {
        assessment: "Unable to generate personalized assessment at this time.".to_owned(),
        recommendations: vec![
            "Continue working through your course materials".to_owned(),
            "Review any lessons where you scored below 70%".to_owned(),
            "Reach out to instructors if you need additional help".to_owned(),
        ],
        resources: Vec::new(),
    }
}

#[instrument(skip(conn, llm_config, user), fields(user = %user.id))]
pub async fn personalized_feedback<C: ConnectionTrait>(
    conn: &C,
    llm_config: &LlmConfig,
    user: &UserModel,
    course_id: Option<Uuid>,
) -> Result<PersonalizedFeedback, DbErr> {
    let enrollments = enrollment::Query::list_with_courses(conn, user.id, None, course_id).await?;
    if enrollments.is_empty() {
        return Ok(PersonalizedFeedback::Empty {
            user_id: user.id,
            message: NO_COURSE_DATA.to_owned(),
            recommendations: Vec::new(),
        });
    }

    let mut course_data = Vec::with_capacity(enrollments.len());
    for (enrollment, course) in &enrollments {
        course_data.push(course_performance(conn, user.id, enrollment, course).await?);
    }

    let messages = vec![
        system_message(FEEDBACK_SYSTEM_PROMPT),
        user_message(feedback_prompt(user, &course_data)),
    ];
    let feedback = json_completion::<FeedbackReport>(
        llm_config,
        &CallConfig::default(),
        llm_config.get_chat_model(),
        messages,
        FEEDBACK_SAMPLING,
    )
    .await
    .unwrap_or_else(|error| {
        tracing::warn!(error = &error as &dyn Error, "personalized feedback failed, using fallback");
        fallback_feedback()
    });

    Ok(PersonalizedFeedback::Report {
        user_id: user.id,
        course_data,
        feedback,
    })
}

// Knowledge gaps

/// Groups issues by lesson, keeping lessons with repeated mistakes, most issues first.
#[must_use]
pub fn group_gaps(
    issues: impl IntoIterator<Item = (Uuid, GapIssue)>,
    lessons: &HashMap<Uuid, LessonModel>,
    courses: &HashMap<Uuid, CourseModel>,
) -> Vec<KnowledgeGap> {
    let mut grouped: Vec<(Uuid, Vec<GapIssue>)> = Vec::new();
    for (lesson_id, issue) in issues {
        match grouped.iter_mut().find(|(known, _)| *known == lesson_id) {
            Some((_, lesson_issues)) => lesson_issues.push(issue),
            None => grouped.push((lesson_id, vec![issue])),
        }
    }

    let mut gaps: Vec<KnowledgeGap> = grouped
        .into_iter()
        .filter(|(_, issues)| issues.len() >= MIN_GAP_ISSUES)
        .filter_map(|(lesson_id, issues)| {
            let lesson = lessons.get(&lesson_id)?;
            let course = courses.get(&lesson.course_id)?;
            Some(KnowledgeGap {
                lesson_id,
                lesson_title: lesson.title.clone(),
                course_id: course.id,
                course_title: course.title.clone(),
                issue_count: issues.len(),
                issues,
            })
        })
        .collect();
    gaps.sort_by(|a, b| b.issue_count.cmp(&a.issue_count));
    gaps
}

#[instrument(skip(conn))]
pub async fn knowledge_gaps<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> Result<Vec<KnowledgeGap>, DbErr> {
    let incorrect = response::Query::list_for_user(conn, user_id, true).await?;
    if incorrect.is_empty() {
        return Ok(Vec::new());
    }

    let question_ids: HashSet<Uuid> = incorrect.iter().map(|response| response.question_id).collect();
    let questions: HashMap<Uuid, QuestionModel> = question::Query::find_by_ids(conn, question_ids.into_iter().collect())
        .await?
        .into_iter()
        .map(|question| (question.id, question))
        .collect();
    let quiz_ids: HashSet<Uuid> = questions.values().map(|question| question.quiz_id).collect();
    let quiz_lessons: HashMap<Uuid, Uuid> = quiz::Query::find_by_ids(conn, quiz_ids.into_iter().collect())
        .await?
        .into_iter()
        .map(|quiz| (quiz.id, quiz.lesson_id))
        .collect();
    let lesson_ids: HashSet<Uuid> = quiz_lessons.values().copied().collect();
    let lessons: HashMap<Uuid, LessonModel> = lesson::Query::find_by_ids(conn, lesson_ids.into_iter().collect())
        .await?
        .into_iter()
        .map(|lesson| (lesson.id, lesson))
        .collect();
    let course_ids: HashSet<Uuid> = lessons.values().map(|lesson| lesson.course_id).collect();
    let courses: HashMap<Uuid, CourseModel> = course::Query::find_by_ids(conn, course_ids.into_iter().collect())
        .await?
        .into_iter()
        .map(|course| (course.id, course))
        .collect();

    let issues = incorrect.into_iter().filter_map(|response| {
        let question = questions.get(&response.question_id)?;
        let lesson_id = quiz_lessons.get(&question.quiz_id)?;
        Some((
            *lesson_id,
            GapIssue {
                question_id: question.id,
                question_text: question.question_text.clone(),
                question_type: QuestionType::from_db_model(question.question_type),
                score: response.score,
                max_score: question.points,
            },
        ))
    });
    Ok(group_gaps(issues, &lessons, &courses))
}

// Study plan

/// Remaining lessons of a course, highest priority first and then in course order.
#[must_use]
pub fn prioritize_lessons(
    lessons: &[LessonModel],
    statuses: &HashMap<Uuid, ProgressStatusModel>,
    gap_lessons: &HashSet<Uuid>,
) -> Vec<PlannedLesson> {
    let mut planned: Vec<PlannedLesson> = lessons
        .iter()
        .filter_map(|lesson| {
            let status = statuses
                .get(&lesson.id)
                .copied()
                .unwrap_or(ProgressStatusModel::NotStarted);
            let priority = match status {
                ProgressStatusModel::Completed => return None,
                _ if gap_lessons.contains(&lesson.id) => Priority::High,
                ProgressStatusModel::InProgress => Priority::Medium,
                ProgressStatusModel::NotStarted => Priority::Normal,
            };
            Some(PlannedLesson {
                lesson_id: lesson.id,
                lesson_title: lesson.title.clone(),
                priority,
                status: ProgressStatus::from_db_model(status),
                duration: lesson.duration,
                order: lesson.position,
            })
        })
        .collect();
    planned.sort_by_key(|lesson| (lesson.priority, lesson.order));
    planned
}

fn activity(lesson: &str, duration: u32, kind: &str) -> PlanActivity {
    PlanActivity {
        course: "Your course".to_owned(),
        lesson: lesson.to_owned(),
        duration,
        kind: kind.to_owned(),
    }
}

/// A generic weekday schedule of at most a year.
#[must_use]
pub fn fallback_schedule(days_remaining: Option<i64>) -> StudySchedule {
    let weeks = days_remaining.map_or(DEFAULT_PLAN_WEEKS, |days| {
        let weeks = (days / 7).clamp(1, i64::from(MAX_PLAN_WEEKS));
        u32::try_from(weeks).unwrap_or(DEFAULT_PLAN_WEEKS)
    });
    let weekly_plan = (1..=weeks)
        .map(|week| PlanWeek {
            week,
            focus: "Complete high-priority lessons".to_owned(),
            days: WEEKDAYS
                .iter()
                .map(|day| PlanDay {
                    day: (*day).to_owned(),
                    activities: vec![
                        activity("Next priority lesson", 45, "lesson"),
                        activity("Review previous material", 15, "review"),
                    ],
                })
                .collect(),
        })
        .collect();

    StudySchedule {
        overview: "Basic study plan to help you complete your courses".to_owned(),
        recommendations: vec![
            "Focus on high-priority lessons first".to_owned(),
            "Spend at least 30 minutes per day on your courses".to_owned(),
            "Take breaks between study sessions".to_owned(),
            "Review material regularly to reinforce learning".to_owned(),
        ],
        weekly_plan,
    }
}

#[must_use]
pub fn plan_prompt(user: &UserModel, courses: &[CoursePlan], days_remaining: Option<i64>) -> String {
    let mut prompt = format!(
        "I need to generate a personalized study plan for a student based on their course data.\n\n{}",
        student_information(user)
    );
    if let Some(days) = days_remaining {
        let _ = write!(prompt, "\nThe student has {days} days to complete their courses.\n");
    }
    prompt.push_str("\nCourse data:\n");
    for course in courses {
        let _ = write!(
            prompt,
            "\nCourse: {}\n- Current progress: {:.1}%\n- Remaining lessons: {}\n\nLessons to complete:\n",
            course.course_title, course.progress, course.remaining_lessons
        );
        for lesson in course.lessons.iter().take(PROMPT_LESSON_LIMIT) {
            let _ = writeln!(
                prompt,
                "- {} (Priority: {}, Duration: {} minutes)",
                lesson.lesson_title, lesson.priority, lesson.duration
            );
        }
    }
    prompt.push_str(
        r#"
Please create a structured study plan that:
1. Distributes the workload evenly over the available time
2. Prioritizes high-priority lessons
3. Groups related topics together when possible
4. Includes time for review and practice
5. Accounts for the student's learning style

Format your response as JSON with the following structure:
{
    "overview": "Brief overview of the study plan",
    "recommendations": ["General recommendation 1", "General recommendation 2"],
    "weekly_plan": [
        {
            "week": 1,
            "focus": "Main focus for this week",
            "days": [
                {
                    "day": "Monday",
                    "activities": [
                        {"course": "Course title", "lesson": "Lesson title", "duration": 30, "type": "lesson|review|practice"}
                    ]
                }
            ]
        }
    ]
}"#,
    );
    prompt
}

async fn course_plan<C: ConnectionTrait>(
    conn: &C,
    enrollment: &EnrollmentModel,
    course: &CourseModel,
    gap_lessons: &HashSet<Uuid>,
) -> Result<CoursePlan, DbErr> {
    let lessons = lesson::Query::list_for_course(conn, course.id, true).await?;
    let statuses: HashMap<Uuid, ProgressStatusModel> = progress::Query::list_for_enrollment(conn, enrollment.id)
        .await?
        .into_iter()
        .map(|(progress, _)| (progress.lesson_id, progress.status))
        .collect();
    let lessons = prioritize_lessons(&lessons, &statuses, gap_lessons);
    Ok(CoursePlan {
        course_id: course.id,
        course_title: course.title.clone(),
        progress: enrollment.progress,
        remaining_lessons: lessons.len(),
        lessons,
    })
}

/// Builds a study plan for the active enrollments of `user`, counting days from `today`.
#[instrument(skip(conn, llm_config, user), fields(user = %user.id))]
pub async fn study_plan<C: ConnectionTrait>(
    conn: &C,
    llm_config: &LlmConfig,
    user: &UserModel,
    request: &StudyPlanRequest,
    today: NaiveDate,
) -> Result<StudyPlan, AiError> {
    let days_remaining = request.target_date.map(|target| (target - today).num_days());
    if days_remaining.is_some_and(|days| days <= 0) {
        return Err(AiError::Validation(TARGET_DATE_IN_PAST.to_owned()));
    }

    let enrollments =
        enrollment::Query::list_with_courses(conn, user.id, Some(EnrollmentStatus::Active), request.course_id).await?;
    if enrollments.is_empty() {
        return Ok(StudyPlan::Empty {
            user_id: user.id,
            message: NO_ACTIVE_COURSES.to_owned(),
            plan: Vec::new(),
        });
    }

    let gap_lessons: HashSet<Uuid> = knowledge_gaps(conn, user.id)
        .await?
        .into_iter()
        .map(|gap| gap.lesson_id)
        .collect();
    let mut courses = Vec::with_capacity(enrollments.len());
    for (enrollment, course) in &enrollments {
        let plan = course_plan(conn, enrollment, course, &gap_lessons).await?;
        if plan.remaining_lessons > 0 {
            courses.push(plan);
        }
    }

    let messages = vec![
        system_message(PLAN_SYSTEM_PROMPT),
        user_message(plan_prompt(user, &courses, days_remaining)),
    ];
    let study_plan = json_completion::<StudySchedule>(
        llm_config,
        &CallConfig::default(),
        llm_config.get_chat_model(),
        messages,
        PLAN_SAMPLING,
    )
    .await
    .unwrap_or_else(|error| {
        tracing::warn!(error = &error as &dyn Error, "study plan generation failed, using fallback");
        fallback_schedule(days_remaining)
    });

    Ok(StudyPlan::Plan {
        user_id: user.id,
        target_date: request.target_date,
        days_remaining,
        courses,
        study_plan,
    })
}

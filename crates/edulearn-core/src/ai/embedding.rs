use crate::llm_config::LlmConfig;
use crate::openai::{CallConfig, create_embedding};
use edulearn_db::activity;
use edulearn_db::ai::embedding;
use edulearn_db::course::{course, enrollment, lesson};
use edulearn_db::user;
use edulearn_entity::course::course::Model as CourseModel;
use edulearn_entity::course::lesson::Model as LessonModel;
use edulearn_entity::learning_activity::Model as ActivityModel;
use edulearn_entity::user::Model as UserModel;
use sea_orm::{ConnectionTrait, DbErr};
use std::error::Error;
use tracing::instrument;
use uuid::Uuid;

const ACTIVITY_LIMIT: u64 = 50;

#[must_use]
pub fn encode_vector(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|value| value.to_le_bytes()).collect()
}

/// Trailing bytes that do not form a full float are ignored.
#[must_use]
pub fn decode_vector(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Cosine similarity, 0 for vectors of different length or with a zero norm.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let (dot, norm_a, norm_b) = a.iter().zip(b).fold((0.0f64, 0.0f64, 0.0f64), |(dot, na, nb), (x, y)| {
        let (x, y) = (f64::from(*x), f64::from(*y));
        (dot + x * y, na + x * x, nb + y * y)
    });
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[must_use]
pub fn user_embedding_text(user: &UserModel, activities: &[ActivityModel], courses: &[CourseModel]) -> String {
    let interests = user.interest_list().join(", ");
    let activities = activities
        .iter()
        .map(|activity| format!("{} {}", activity.activity_type, activity.content_type))
        .collect::<Vec<_>>()
        .join(" ");
    let courses = courses
        .iter()
        .map(|course| format!("{} {}", course.title, course.description))
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "Interests: {interests}. Learning style: {}. Activities: {activities}. Courses: {courses}",
        user.learning_style
    )
}

#[must_use]
pub fn course_embedding_text(course: &CourseModel, lessons: &[LessonModel]) -> String {
    let lessons = lessons
        .iter()
        .map(|lesson| format!("{}. {}", lesson.title, lesson.description))
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "{}. {}. {}. Level: {}. {lessons}",
        course.title,
        course.description,
        course.short_description,
        course.level.to_string().to_lowercase()
    )
}

/// Embeds `text`, falling back to a zero vector of the configured dimension.
pub async fn embed_or_zero(llm_config: &LlmConfig, text: &str) -> Vec<f32> {
    match create_embedding(llm_config, &CallConfig::default(), text).await {
        Ok(vector) => vector,
        Err(error) => {
            tracing::warn!(error = &error as &dyn Error, "embedding failed, using zero vector");
            vec![0.0; llm_config.embedding_dimension]
        }
    }
}

#[instrument(skip(conn, llm_config))]
pub async fn update_user_embedding<C: ConnectionTrait>(
    conn: &C,
    llm_config: &LlmConfig,
    user_id: Uuid,
) -> Result<Vec<f32>, DbErr> {
    let user = user::Query::find_user_by_id(conn, user_id)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("user {user_id}")))?;
    let activities = activity::Query::list_for_user(conn, user_id, Some(ACTIVITY_LIMIT)).await?;
    let courses: Vec<CourseModel> = enrollment::Query::list_with_courses(conn, user_id, None, None)
        .await?
        .into_iter()
        .map(|(_, course)| course)
        .collect();

    let vector = embed_or_zero(llm_config, &user_embedding_text(&user, &activities, &courses)).await;
    embedding::Mutation::upsert_user_embedding(conn, user_id, encode_vector(&vector)).await?;
    tracing::debug!("updated user embedding");
    Ok(vector)
}

#[instrument(skip(conn, llm_config))]
pub async fn update_course_embedding<C: ConnectionTrait>(
    conn: &C,
    llm_config: &LlmConfig,
    course_id: Uuid,
) -> Result<Vec<f32>, DbErr> {
    let course = course::Query::find_by_id(conn, course_id)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("course {course_id}")))?;
    let lessons = lesson::Query::list_for_course(conn, course_id, false).await?;

    let vector = embed_or_zero(llm_config, &course_embedding_text(&course, &lessons)).await;
    embedding::Mutation::upsert_course_embedding(conn, course_id, encode_vector(&vector)).await?;
    tracing::debug!("updated course embedding");
    Ok(vector)
}

/// Refreshes every course and active user embedding. Single failures are logged and skipped.
#[instrument(skip_all)]
pub async fn update_all_embeddings<C: ConnectionTrait>(conn: &C, llm_config: &LlmConfig) -> Result<(usize, usize), DbErr> {
    let mut courses = 0;
    for course in course::Query::list_published(conn).await? {
        match update_course_embedding(conn, llm_config, course.id).await {
            Ok(_) => courses += 1,
            Err(error) => tracing::error!(error = &error as &dyn Error, course_id = %course.id, "course embedding failed"),
        }
    }
    let mut users = 0;
    for user_id in user::Query::list_active_user_ids(conn).await? {
        match update_user_embedding(conn, llm_config, user_id).await {
            Ok(_) => users += 1,
            Err(error) => tracing::error!(error = &error as &dyn Error, %user_id, "user embedding failed"),
        }
    }
    tracing::info!(courses, users, "refreshed embeddings");
    Ok((courses, users))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_bytes() {
        let vector = vec![0.5f32, -1.25, 3.0];
        let bytes = encode_vector(&vector);
        assert_eq!(bytes.len(), 12);
        assert_eq!(decode_vector(&bytes), vector);
        assert_eq!(decode_vector(&bytes[..7]), vec![0.5]);
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-9);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-9);
        assert!((cosine_similarity(&[1.0, 1.0], &[-1.0, -1.0]) + 1.0).abs() < 1e-9);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }
}

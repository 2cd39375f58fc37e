use crate::ai::embedding::{cosine_similarity, decode_vector, update_user_embedding};
use crate::llm_config::LlmConfig;
use edulearn_db::ai::embedding;
use edulearn_db::course::{course, enrollment};
use edulearn_entity::course::course::Model as CourseModel;
use edulearn_model::course::Level;
use edulearn_model::recommendation::{CourseRecommendation, RecommendationRequest};
use edulearn_model_tools::convert::FromDbModel;
use sea_orm::{ConnectionTrait, DbErr};
use std::collections::{HashMap, HashSet};
use std::error::Error;
use tracing::instrument;
use uuid::Uuid;

pub const MAX_RECOMMENDATIONS: usize = 20;

/// Course ids ordered by similarity to `user_vector`, best match first.
#[must_use]
pub fn rank_courses(
    user_vector: &[f32],
    course_vectors: impl IntoIterator<Item = (Uuid, Vec<f32>)>,
    exclude: &HashSet<Uuid>,
    count: usize,
) -> Vec<(Uuid, f64)> {
    let mut ranked: Vec<(Uuid, f64)> = course_vectors
        .into_iter()
        .filter(|(course_id, _)| !exclude.contains(course_id))
        .map(|(course_id, vector)| (course_id, cosine_similarity(user_vector, &vector)))
        .collect();
    ranked.sort_by(|(_, a), (_, b)| b.total_cmp(a));
    ranked.truncate(count);
    ranked
}

fn recommendation(course: CourseModel, similarity_score: f64) -> CourseRecommendation {
    CourseRecommendation {
        id: course.id,
        title: course.title,
        slug: course.slug,
        short_description: course.short_description,
        level: Level::from_db_model(course.level),
        similarity_score,
        thumbnail: course.thumbnail,
    }
}

#[derive(Debug)]
enum RankingError {
    Database(DbErr),
    NoSignal,
}

async fn rank_by_embedding<C: ConnectionTrait>(
    conn: &C,
    llm_config: &LlmConfig,
    user_id: Uuid,
    exclude: &HashSet<Uuid>,
    count: usize,
) -> Result<Vec<CourseRecommendation>, RankingError> {
    let user_vector = update_user_embedding(conn, llm_config, user_id)
        .await
        .map_err(RankingError::Database)?;
    if user_vector.iter().all(|value| *value == 0.0) {
        return Err(RankingError::NoSignal);
    }

    let mut published: HashMap<Uuid, CourseModel> = course::Query::list_published(conn)
        .await
        .map_err(RankingError::Database)?
        .into_iter()
        .map(|course| (course.id, course))
        .collect();
    let course_vectors: Vec<(Uuid, Vec<f32>)> = embedding::Query::list_course_embeddings(conn)
        .await
        .map_err(RankingError::Database)?
        .into_iter()
        .filter(|row| published.contains_key(&row.course_id))
        .map(|row| (row.course_id, decode_vector(&row.vector)))
        .collect();
    if course_vectors.is_empty() {
        return Err(RankingError::NoSignal);
    }

    Ok(rank_courses(&user_vector, course_vectors, exclude, count)
        .into_iter()
        .filter_map(|(course_id, score)| published.remove(&course_id).map(|course| recommendation(course, score)))
        .collect())
}

/// Recommends published courses by embedding similarity, falling back to the most enrolled ones.
#[instrument(skip(conn, llm_config))]
pub async fn recommend_courses<C: ConnectionTrait>(
    conn: &C,
    llm_config: &LlmConfig,
    user_id: Uuid,
    request: &RecommendationRequest,
) -> Result<Vec<CourseRecommendation>, DbErr> {
    let count = request.count.clamp(1, MAX_RECOMMENDATIONS);
    let exclude: HashSet<Uuid> = if request.include_enrolled {
        HashSet::new()
    } else {
        enrollment::Query::enrolled_course_ids(conn, user_id).await?.into_iter().collect()
    };

    match rank_by_embedding(conn, llm_config, user_id, &exclude, count).await {
        Ok(recommendations) => return Ok(recommendations),
        Err(RankingError::Database(error)) => {
            tracing::warn!(error = &error as &dyn Error, "similarity ranking failed, using popular courses");
        }
        Err(RankingError::NoSignal) => tracing::debug!("no embeddings to rank, using popular courses"),
    }

    let exclude: Vec<Uuid> = exclude.into_iter().collect();
    Ok(course::Query::most_enrolled_published(conn, &exclude, count)
        .await?
        .into_iter()
        .map(|course| recommendation(course, 0.0))
        .collect())
}

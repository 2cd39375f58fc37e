use edulearn_core::ai::embedding::{decode_vector, update_all_embeddings};
use edulearn_core::ai::recommendation::recommend_courses;
use edulearn_core::llm_config::{DEFAULT_EMBEDDING_DIMENSION, LlmConfig};
use edulearn_db::ai::embedding;
use edulearn_db::course::enrollment;
use edulearn_model::recommendation::RecommendationRequest;
use edulearn_test_helpers::fixtures::{create_course, create_user};
use edulearn_test_helpers::schema::memory_db;
use test_log::test;

#[test(tokio::test)]
async fn test_fallback_recommends_popular_unenrolled_courses() {
    let db = memory_db().await.unwrap();
    let instructor = create_user(&db, "instructor").await.unwrap();
    let student = create_user(&db, "student").await.unwrap();
    let mut fans = Vec::new();
    for name in ["fan0", "fan1", "fan2"] {
        fans.push(create_user(&db, name).await.unwrap());
    }

    let popular = create_course(&db, instructor.id, "Popular", true).await.unwrap();
    let niche = create_course(&db, instructor.id, "Niche", true).await.unwrap();
    let taken = create_course(&db, instructor.id, "Taken", true).await.unwrap();
    create_course(&db, instructor.id, "Draft", false).await.unwrap();

    for fan in &fans {
        enrollment::Mutation::enroll(&db, fan.id, popular.id).await.unwrap();
        enrollment::Mutation::enroll(&db, fan.id, taken.id).await.unwrap();
    }
    enrollment::Mutation::enroll(&db, fans[0].id, niche.id).await.unwrap();
    enrollment::Mutation::enroll(&db, student.id, taken.id).await.unwrap();

    let llm_config = LlmConfig::default();
    let recommendations = recommend_courses(&db, &llm_config, student.id, &RecommendationRequest::default())
        .await
        .unwrap();
    let titles: Vec<_> = recommendations.iter().map(|course| course.title.as_str()).collect();
    assert_eq!(titles, vec!["Popular", "Niche"]);
    assert!(recommendations.iter().all(|course| course.similarity_score == 0.0));

    let request = RecommendationRequest {
        count: 1,
        include_enrolled: true,
    };
    let top = recommend_courses(&db, &llm_config, student.id, &request).await.unwrap();
    assert_eq!(top.len(), 1);
    assert_ne!(top[0].title, "Draft");

    let stored = embedding::Query::find_user_embedding(&db, student.id).await.unwrap().unwrap();
    assert_eq!(decode_vector(&stored.vector).len(), DEFAULT_EMBEDDING_DIMENSION);
}

#[test(tokio::test)]
async fn test_update_all_embeddings_covers_users_and_courses() {
    let db = memory_db().await.unwrap();
    let instructor = create_user(&db, "instructor").await.unwrap();
    create_user(&db, "student").await.unwrap();
    let course = create_course(&db, instructor.id, "Rust", true).await.unwrap();

    let (courses, users) = update_all_embeddings(&db, &LlmConfig::default()).await.unwrap();
    assert_eq!(users, 2);
    assert_eq!(courses, 1);
    assert!(embedding::Query::find_course_embedding(&db, course.id).await.unwrap().is_some());
}

use edulearn_entity::ai::{chat_message, chat_session, course_embedding, feedback, user_embedding};
use edulearn_entity::course::{category, course, enrollment, lesson, lesson_progress};
use edulearn_entity::quiz::{answer, attempt, question, quiz, response, response_answer};
use edulearn_entity::{learning_activity, user, user_preference};
use edulearn_test_helpers::schema::{assert_entity_matches, entity_columns, memory_db, sqlite_columns};
use std::collections::{BTreeSet, HashMap};
use test_log::test;

macro_rules! validate_entities {
    ($tables:expr, $($entity:path),+ $(,)?) => {{
        $(assert_entity_matches::<$entity>($tables);)+
        BTreeSet::from([$(entity_columns::<$entity>().0),+])
    }};
}

#[test(tokio::test)]
async fn test_entities_match_migrated_schema() {
    let db = memory_db().await.unwrap();
    let tables: HashMap<_, _> = sqlite_columns(&db).await.unwrap();

    let covered = validate_entities!(
        &tables,
        user::Entity,
        user_preference::Entity,
        learning_activity::Entity,
        category::Entity,
        course::Entity,
        lesson::Entity,
        lesson_progress::Entity,
        enrollment::Entity,
        quiz::Entity,
        question::Entity,
        answer::Entity,
        attempt::Entity,
        response::Entity,
        response_answer::Entity,
        chat_session::Entity,
        chat_message::Entity,
        feedback::Entity,
        user_embedding::Entity,
        course_embedding::Entity,
    );

    let migrated: BTreeSet<_> = tables.into_keys().filter(|table| !table.starts_with("sqlite_")).collect();
    assert_eq!(migrated, covered);
}

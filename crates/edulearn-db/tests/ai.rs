use edulearn_db::ai::{chat_message, chat_session, embedding, feedback};
use edulearn_entity::ai::chat_message::Role;
use edulearn_entity::ai::feedback::CONTENT_TYPE_ESSAY;
use edulearn_test_helpers::fixtures::create_user;
use edulearn_test_helpers::schema::memory_db;
use test_log::test;

#[test(tokio::test)]
async fn test_last_messages_are_chronological() {
    let db = &memory_db().await.unwrap();
    let owner = create_user(db, "owner").await.unwrap();
    let session = chat_session::Mutation::create(db, owner.id, "Tutoring".to_owned()).await.unwrap();

    for i in 0..5 {
        chat_message::Mutation::create(db, session.id, Role::User, format!("message {i}"))
            .await
            .unwrap();
    }

    let last = chat_message::Query::last_messages(db, session.id, 3).await.unwrap();
    let contents: Vec<_> = last.iter().map(|message| message.content.as_str()).collect();
    assert_eq!(contents, vec!["message 2", "message 3", "message 4"]);
    assert_eq!(chat_message::Query::list_for_session(db, session.id).await.unwrap().len(), 5);
}

#[test(tokio::test)]
async fn test_sessions_are_scoped_to_owner() {
    let db = &memory_db().await.unwrap();
    let owner = create_user(db, "owner").await.unwrap();
    let other = create_user(db, "other").await.unwrap();
    let first = chat_session::Mutation::get_or_create(db, owner.id, "Voice Assistant Session")
        .await
        .unwrap();
    let again = chat_session::Mutation::get_or_create(db, owner.id, "Voice Assistant Session")
        .await
        .unwrap();
    assert_eq!(first.id, again.id);

    assert!(chat_session::Query::find_for_user(db, first.id, other.id).await.unwrap().is_none());
    assert_eq!(chat_session::Query::list_for_user(db, owner.id).await.unwrap().len(), 1);

    let renamed = chat_session::Mutation::rename(db, first.id, "Renamed".to_owned()).await.unwrap();
    assert_eq!(renamed.title, "Renamed");
    chat_session::Mutation::delete(db, first.id).await.unwrap();
    assert!(chat_session::Query::list_for_user(db, owner.id).await.unwrap().is_empty());
}

#[test(tokio::test)]
async fn test_embedding_upsert_replaces_vector() {
    let db = &memory_db().await.unwrap();
    let owner = create_user(db, "owner").await.unwrap();

    let first = embedding::Mutation::upsert_user_embedding(db, owner.id, vec![1, 2, 3, 4]).await.unwrap();
    let second = embedding::Mutation::upsert_user_embedding(db, owner.id, vec![5, 6, 7, 8]).await.unwrap();

    assert_eq!(first.id, second.id);
    let stored = embedding::Query::find_user_embedding(db, owner.id).await.unwrap().unwrap();
    assert_eq!(stored.vector, vec![5, 6, 7, 8]);
}

#[test(tokio::test)]
async fn test_feedback_is_listed_per_user() {
    let db = &memory_db().await.unwrap();
    let owner = create_user(db, "owner").await.unwrap();
    let other = create_user(db, "other").await.unwrap();

    let record = feedback::Mutation::create(db, owner.id, CONTENT_TYPE_ESSAY, None, "Good".to_owned(), Some(80.0))
        .await
        .unwrap();

    assert_eq!(feedback::Query::list_for_user(db, owner.id).await.unwrap().len(), 1);
    assert!(feedback::Query::list_for_user(db, other.id).await.unwrap().is_empty());
    assert!(feedback::Query::find_for_user(db, record.id, other.id).await.unwrap().is_none());
}

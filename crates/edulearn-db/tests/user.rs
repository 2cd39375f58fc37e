use edulearn_db::{activity, preference, user};
use edulearn_entity::user::ActiveModel as ActiveUserModel;
use edulearn_entity::user_preference::ActiveModel as ActivePreferenceModel;
use edulearn_test_helpers::fixtures::create_user;
use edulearn_test_helpers::schema::memory_db;
use paste::paste;
use sea_orm::ActiveValue::Set;
use serde_json::json;
use test_log::test;

#[test(tokio::test)]
async fn test_create_user_normalizes_email() {
    let db = &memory_db().await.unwrap();

    let created = user::Mutation::create_user(
        db,
        ActiveUserModel {
            email: Set("  Ada@Example.COM ".to_owned()),
            username: Set("ada".to_owned()),
            password_hash: Set("hash".to_owned()),
            first_name: Set("Ada".to_owned()),
            last_name: Set("Lovelace".to_owned()),
            bio: Set(String::new()),
            date_of_birth: Set(None),
            profile_picture: Set(None),
            interests: Set(json!(["math"])),
            learning_style: Set("reading".to_owned()),
            is_staff: Set(false),
            is_active: Set(true),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(created.email, "ada@example.com");
    let found = user::Query::find_user_by_email(db, "ADA@example.com").await.unwrap().unwrap();
    assert_eq!(found.id, created.id);
    assert_eq!(found.full_name(), "Ada Lovelace");
    assert_eq!(found.interest_list(), vec!["math".to_owned()]);
}

#[test(tokio::test)]
async fn test_duplicate_username_is_rejected() {
    let db = &memory_db().await.unwrap();
    create_user(db, "grace").await.unwrap();

    assert!(create_user(db, "grace").await.is_err());
}

#[test(tokio::test)]
async fn test_update_user_keeps_other_fields() {
    let db = &memory_db().await.unwrap();
    let created = create_user(db, "linus").await.unwrap();

    let mut changes = user::Mutation::changes(created.id);
    changes.bio = Set("kernel hacker".to_owned());
    let updated = user::Mutation::update_user(db, changes).await.unwrap();

    assert_eq!(updated.bio, "kernel hacker");
    assert_eq!(updated.username, "linus");
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);
}

macro_rules! test_set_user_field {
    ($i:ident, $v:expr) => {
        paste! {
            #[test(tokio::test)]
            async fn [<test_update_user_ $i>]() {
                let db = &memory_db().await.unwrap();
                let created = create_user(db, "margaret").await.unwrap();

                user::Mutation::[<update_user_ $i>](db, created.id, $v).await.unwrap();

                let found = user::Query::find_user_by_id(db, created.id).await.unwrap().unwrap();
                assert_eq!(found.$i, $v);
            }
        }
    };
}

test_set_user_field!(password_hash, "pbkdf2$abc".to_owned());
test_set_user_field!(is_staff, true);

#[test(tokio::test)]
async fn test_delete_user_cascades() {
    let db = &memory_db().await.unwrap();
    let created = create_user(db, "dennis").await.unwrap();
    activity::Mutation::create(db, created.id, "login".to_owned(), "session".to_owned(), None, json!({}))
        .await
        .unwrap();

    user::Mutation::delete(db, created.id).await.unwrap();

    assert!(user::Query::find_user_by_id(db, created.id).await.unwrap().is_none());
    assert_eq!(activity::Query::count_for_user(db, created.id).await.unwrap(), 0);
}

#[test(tokio::test)]
async fn test_single_preference_per_user() {
    let db = &memory_db().await.unwrap();
    let created = create_user(db, "barbara").await.unwrap();

    let preference = || ActivePreferenceModel {
        preferred_categories: Set(json!([])),
        difficulty_preference: Set("beginner".to_owned()),
        learning_pace: Set("moderate".to_owned()),
        notification_settings: Set(json!({})),
        ..Default::default()
    };
    let first = preference::Mutation::create(db, created.id, preference()).await.unwrap();
    assert!(preference::Mutation::create(db, created.id, preference()).await.is_err());

    let found = preference::Query::find_by_user(db, created.id).await.unwrap().unwrap();
    assert_eq!(found.id, first.id);
}

#[test(tokio::test)]
async fn test_activity_queries() {
    let db = &memory_db().await.unwrap();
    let owner = create_user(db, "ken").await.unwrap();
    let other = create_user(db, "rob").await.unwrap();

    for activity_type in ["view", "view", "quiz"] {
        activity::Mutation::create(db, owner.id, activity_type.to_owned(), "lesson".to_owned(), None, json!({}))
            .await
            .unwrap();
    }
    let foreign = activity::Mutation::create(db, other.id, "view".to_owned(), "course".to_owned(), None, json!({}))
        .await
        .unwrap();

    assert_eq!(activity::Query::count_for_user(db, owner.id).await.unwrap(), 3);
    assert_eq!(
        activity::Query::distinct_types_for_user(db, owner.id).await.unwrap(),
        vec!["quiz".to_owned(), "view".to_owned()]
    );
    assert_eq!(activity::Query::list_for_user(db, owner.id, Some(2)).await.unwrap().len(), 2);
    assert!(activity::Query::find_for_user(db, foreign.id, owner.id).await.unwrap().is_none());
    assert!(!activity::Mutation::delete_for_user(db, foreign.id, owner.id).await.unwrap());
    assert!(activity::Mutation::delete_for_user(db, foreign.id, other.id).await.unwrap());
}

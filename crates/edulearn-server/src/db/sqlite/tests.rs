use super::MIGRATIONS;

use crate::db::error::DbError;
use diesel::migration::MigrationVersion;
use diesel::prelude::*;
use diesel::sql_query;
use diesel_migrations::MigrationHarness;

use edulearn_test_helpers::{SqliteDb, TestDb};

use crate::db;
use test_log::test;
use url::Url;

pub(crate) fn revert_all_migrations(conn: &'_ mut SqliteConnection) -> Result<Vec<MigrationVersion<'_>>, DbError> {
    tracing::debug!("reverting migrations");
    conn.revert_all_migrations(MIGRATIONS)
        .map_err(|err| DbError::MigrationFailed(format! {"{err}"}))
}

#[test]
fn test_migrations() {
    let db = SqliteDb::new().unwrap();
    let db_uri = db.db_uri();
    let db_uri = db_uri.as_ref();
    let mut conn = SqliteConnection::establish(db_uri).unwrap();
    // Do it twice to make sure the migrations are idempotent
    for _ in 0..2 {
        let migrations = db::run_migrations(&mut conn, MIGRATIONS).unwrap();

        let mut conn = SqliteConnection::establish(db_uri).unwrap();
        let query = sql_query("SELECT id FROM users WHERE email = 'test@example.com'");
        query.clone().execute(&mut conn).unwrap();
        sql_query("SELECT vector FROM course_embeddings").execute(&mut conn).unwrap();

        let mut reverted_migrations = revert_all_migrations(&mut conn).unwrap();
        reverted_migrations.reverse();
        assert_eq!(migrations, reverted_migrations);

        query.execute(&mut conn).unwrap_err();
    }
}

#[test]
fn test_migration_by_url() {
    let db = SqliteDb::new().unwrap();
    let url = Url::parse(&db.db_uri()).unwrap();
    let applied = db::migration(&url).unwrap();
    assert!(!applied.is_empty());
    // nothing left to apply
    assert!(db::migration(&url).unwrap().is_empty());

    let unknown = Url::parse("mysql://localhost/edulearn").unwrap();
    assert!(matches!(db::migration(&unknown), Err(DbError::UnknownDbType(kind)) if kind == "mysql"));
}

use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DbConn, DbErr, EntityName, EntityTrait, IdenStatic, Iterable};
use sea_schema::sqlite::discovery::SchemaDiscovery;
use std::collections::{BTreeSet, HashMap};

const SQLITE_SCHEMA: &str =
    include_str!("../../edulearn-server/migrations/sqlite/2025-01-15-120000_create_schema/up.sql");

/// Applies the server's sqlite migration to `db`.
pub async fn setup_schema(db: &DbConn) -> Result<(), DbErr> {
    let schema = match db.get_database_backend() {
        DatabaseBackend::Sqlite => SQLITE_SCHEMA,
        backend => return Err(DbErr::Custom(format!("no test schema for {backend:?}"))),
    };
    db.execute_unprepared(schema).await?;
    Ok(())
}

/// Connects to a fresh in-memory sqlite database with the full schema.
pub async fn memory_db() -> Result<DbConn, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;
    setup_schema(&db).await?;
    Ok(db)
}

/// Column names per table as found in the live sqlite database.
pub async fn sqlite_columns(db: &DbConn) -> Result<HashMap<String, BTreeSet<String>>, DbErr> {
    let schema = SchemaDiscovery::new(db.get_sqlite_connection_pool().clone())
        .discover()
        .await
        .map_err(|error| DbErr::Custom(format!("schema discovery failed: {error:?}")))?;
    Ok(schema
        .tables
        .into_iter()
        .map(|table| {
            let columns = table.columns.into_iter().map(|column| column.name).collect();
            (table.name, columns)
        })
        .collect())
}

/// Table name and column names an entity expects.
#[must_use]
pub fn entity_columns<E: EntityTrait>() -> (String, BTreeSet<String>) {
    let columns = E::Column::iter().map(|column| column.as_str().to_owned()).collect();
    (E::default().table_name().to_owned(), columns)
}

/// Panics when the table of `E` is missing or its columns differ from the entity.
pub fn assert_entity_matches<E: EntityTrait>(tables: &HashMap<String, BTreeSet<String>>) {
    let (table, expected) = entity_columns::<E>();
    let actual = tables
        .get(&table)
        .unwrap_or_else(|| panic!("table {table} is missing from the schema"));
    assert_eq!(actual, &expected, "columns of {table} differ from the entity");
}

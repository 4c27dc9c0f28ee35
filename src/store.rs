//! Database bootstrap: create the database, schema and entity tables when missing.

use crate::error::AppError;
use crate::models::EntityKind;
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::str::FromStr;

const ENTITY_TABLES: &[EntityKind] = &[
    EntityKind::User,
    EntityKind::Amenity,
    EntityKind::Place,
    EntityKind::Review,
];

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Schema-qualified, quoted table name (e.g. `"hbnb"."places"`).
/// Unique index over `users.payload->>'email'`.
pub const USERS_EMAIL_KEY: &str = "users_email_key";

pub fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(table))
}

/// Create `schema` and one payload table per entity kind. Idempotent.
pub async fn ensure_tables(pool: &PgPool, schema: &str) -> Result<(), AppError> {
    let create_schema = format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(schema));
    tracing::debug!(sql = %create_schema, "bootstrap");
    sqlx::query(&create_schema).execute(pool).await?;

    for kind in ENTITY_TABLES {
        let table = qualified_table(schema, kind.collection());
        let ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id UUID PRIMARY KEY,
                payload JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            table
        );
        tracing::debug!(table = %table, "bootstrap");
        sqlx::query(&ddl).execute(pool).await?;
        let index = format!(
            "CREATE INDEX IF NOT EXISTS {} ON {} (created_at)",
            quote_ident(&format!("{}_created_at_idx", kind.collection())),
            table
        );
        sqlx::query(&index).execute(pool).await?;
    }

    let email_idx = format!(
        "CREATE UNIQUE INDEX IF NOT EXISTS {} ON {} ((payload ->> 'email'))",
        USERS_EMAIL_KEY,
        qualified_table(schema, EntityKind::User.collection())
    );
    sqlx::query(&email_idx).execute(pool).await?;
    Ok(())
}

/// Connect to the server's `postgres` database and create the target database if it does not exist.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| AppError::BadRequest(format!("invalid DATABASE_URL: {}", e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

/// Split a connection URL into (URL of the `postgres` admin database, target database name).
fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| AppError::BadRequest("DATABASE_URL: no path".into()))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let mut parts = path_and_query.splitn(2, '?');
    let db_name = parts.next().unwrap_or("").trim();
    let query = parts.next();
    let base = url.get(..path_start).unwrap_or(url);
    let admin_url = match query {
        Some(q) => format!("{}postgres?{}", base, q),
        None => format!("{}postgres", base),
    };
    Ok((admin_url, db_name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_database_name() {
        let (admin, name) = parse_db_name_from_url("postgres://u:p@localhost:5432/hbnb").unwrap();
        assert_eq!(admin, "postgres://u:p@localhost:5432/postgres");
        assert_eq!(name, "hbnb");
    }

    #[test]
    fn keeps_query_parameters_on_admin_url() {
        let (admin, name) =
            parse_db_name_from_url("postgres://localhost/hbnb?sslmode=disable").unwrap();
        assert_eq!(admin, "postgres://localhost/postgres?sslmode=disable");
        assert_eq!(name, "hbnb");
    }

    #[test]
    fn quotes_identifiers() {
        assert_eq!(qualified_table("hbnb", "users"), "\"hbnb\".\"users\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }
}

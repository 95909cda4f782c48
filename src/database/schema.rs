use sqlx::PgPool;
use tracing::{info, warn};

use crate::database::manager::DatabaseError;

/// Relations in creation order; dropped in reverse.
const TABLES: [(&str, &str); 4] = [
    (
        "users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id SERIAL PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT UNIQUE NOT NULL,
            latitude DOUBLE PRECISION NOT NULL DEFAULT 0,
            longitude DOUBLE PRECISION NOT NULL DEFAULT 0,
            age INT NOT NULL DEFAULT 0 CHECK (age >= 0),
            password_hash TEXT NOT NULL,
            bio TEXT,
            avatar TEXT
        )"#,
    ),
    (
        "posts",
        r#"
        CREATE TABLE IF NOT EXISTS posts (
            id SERIAL PRIMARY KEY,
            user_id INT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            date DATE NOT NULL,
            latitude DOUBLE PRECISION NOT NULL DEFAULT 0,
            longitude DOUBLE PRECISION NOT NULL DEFAULT 0,
            depth DOUBLE PRECISION NOT NULL DEFAULT 0 CHECK (depth >= 0),
            visibility DOUBLE PRECISION NOT NULL DEFAULT 0 CHECK (visibility >= 0),
            activity TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            images TEXT[] NOT NULL DEFAULT '{}',
            timestamp TIMESTAMPTZ NOT NULL DEFAULT now(),
            rating DOUBLE PRECISION CHECK (rating >= 0 AND rating <= 5),
            likes INT NOT NULL DEFAULT 0
        )"#,
    ),
    (
        "comments",
        r#"
        CREATE TABLE IF NOT EXISTS comments (
            id SERIAL PRIMARY KEY,
            post_id INT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            user_id INT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            content TEXT NOT NULL,
            timestamp TIMESTAMPTZ NOT NULL DEFAULT now()
        )"#,
    ),
    (
        "likes",
        r#"
        CREATE TABLE IF NOT EXISTS likes (
            id SERIAL PRIMARY KEY,
            post_id INT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            user_id INT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            UNIQUE (post_id, user_id)
        )"#,
    ),
];

/// Create any missing relation. Existing data is left alone.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), DatabaseError> {
    for (name, ddl) in TABLES {
        sqlx::query(ddl).execute(pool).await?;
        info!("Ensured table {}", name);
    }
    Ok(())
}

/// Drop every relation and recreate it empty.
pub async fn reset_schema(pool: &PgPool) -> Result<(), DatabaseError> {
    warn!("Dropping all tables");
    for (name, _) in TABLES.iter().rev() {
        let sql = format!("DROP TABLE IF EXISTS {} CASCADE", name);
        sqlx::query(&sql).execute(pool).await?;
    }
    ensure_schema(pool).await
}

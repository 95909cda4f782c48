use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{
    CombinedComment, Comment, Like, NewPost, NewUser, Post, PostFilter, PostUpdate, PostView,
    User, UserSummary, UserWithDigest,
};
use crate::database::query_builder::{bind_param_query_as, WhereClause};
use crate::database::repository::{CommentStore, LikeStore, PostStore, Store, UserStore};

const USER_COLUMNS: &str =
    "id, first_name, last_name, email, latitude, longitude, age, bio, avatar";

const POST_COLUMNS: &str = "id, user_id, title, date, latitude, longitude, depth, visibility, \
     activity, description, images, timestamp, rating, likes";

const POST_VIEW_SELECT: &str = r#"
    SELECT p.id, p.user_id, u.first_name || ' ' || u.last_name AS user_name,
           u.avatar AS user_avatar, p.title, p.date, p.latitude, p.longitude,
           p.depth, p.visibility, p.activity, p.description, p.images,
           p.timestamp, p.rating,
           (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id) AS likes
    FROM posts p
    JOIN users u ON p.user_id = u.id"#;

/// `sqlx`-backed implementation of every store trait
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escape LIKE metacharacters so user input only ever matches literally
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: &NewUser, password_hash: &str) -> Result<i32, DatabaseError> {
        let id: (i32,) = sqlx::query_as(
            r#"
            INSERT INTO users (first_name, last_name, email, latitude, longitude, age, password_hash, bio, avatar)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id"#,
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(user.latitude)
        .bind(user.longitude)
        .bind(user.age)
        .bind(password_hash)
        .bind(&user.bio)
        .bind(&user.avatar)
        .fetch_one(&self.pool)
        .await?;
        Ok(id.0)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserWithDigest>, DatabaseError> {
        let sql = format!("SELECT {}, password_hash FROM users WHERE email = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserWithDigest>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_user(&self, id: i32) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS);
        let rows = sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn search_users(&self, term: &str, limit: i64) -> Result<Vec<UserSummary>, DatabaseError> {
        let rows = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT id, first_name, last_name, email, avatar
            FROM users
            WHERE first_name ILIKE $1 ESCAPE '\'
               OR last_name ILIKE $1 ESCAPE '\'
            ORDER BY id
            LIMIT $2"#,
        )
        .bind(like_pattern(term))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn update_user(&self, user: &User) -> Result<Option<User>, DatabaseError> {
        let sql = format!(
            r#"
            UPDATE users
            SET first_name = $1, last_name = $2, email = $3, latitude = $4, longitude = $5,
                age = $6, bio = $7, avatar = $8
            WHERE id = $9
            RETURNING {}"#,
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(user.latitude)
            .bind(user.longitude)
            .bind(user.age)
            .bind(&user.bio)
            .bind(&user.avatar)
            .bind(user.id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn set_avatar(&self, id: i32, avatar: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query("UPDATE users SET avatar = $1 WHERE id = $2")
            .bind(avatar)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_user(&self, id: i32) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl PostStore for PgStore {
    async fn insert_post(&self, post: &NewPost) -> Result<i32, DatabaseError> {
        let id: (i32,) = sqlx::query_as(
            r#"
            INSERT INTO posts
                (user_id, title, date, latitude, longitude, depth, visibility, activity,
                 description, timestamp, rating, likes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 0)
            RETURNING id"#,
        )
        .bind(post.user_id)
        .bind(&post.title)
        .bind(post.date)
        .bind(post.latitude)
        .bind(post.longitude)
        .bind(post.depth)
        .bind(post.visibility)
        .bind(&post.activity)
        .bind(&post.description)
        .bind(post.timestamp)
        .bind(post.rating)
        .fetch_one(&self.pool)
        .await?;
        Ok(id.0)
    }

    async fn get_post(&self, id: i32) -> Result<Option<Post>, DatabaseError> {
        let sql = format!("SELECT {} FROM posts WHERE id = $1", POST_COLUMNS);
        let row = sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_post(&self, id: i32, update: &PostUpdate) -> Result<Option<Post>, DatabaseError> {
        let sql = format!(
            r#"
            UPDATE posts
            SET user_id = $1, title = $2, date = $3, latitude = $4, longitude = $5,
                depth = $6, visibility = $7, activity = $8, description = $9,
                timestamp = COALESCE($10, timestamp), rating = $11, likes = $12
            WHERE id = $13
            RETURNING {}"#,
            POST_COLUMNS
        );
        let row = sqlx::query_as::<_, Post>(&sql)
            .bind(update.user_id)
            .bind(&update.title)
            .bind(update.date)
            .bind(update.latitude)
            .bind(update.longitude)
            .bind(update.depth)
            .bind(update.visibility)
            .bind(&update.activity)
            .bind(&update.description)
            .bind(update.timestamp)
            .bind(update.rating)
            .bind(update.likes)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete_post(&self, id: i32) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_post_images(&self, id: i32, images: &[String]) -> Result<bool, DatabaseError> {
        let result = sqlx::query("UPDATE posts SET images = $1 WHERE id = $2")
            .bind(images)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn search_posts(&self, filter: &PostFilter) -> Result<Vec<PostView>, DatabaseError> {
        let clause = WhereClause::from(filter);
        let sql = format!(
            "{}{} ORDER BY p.timestamp DESC, p.id DESC",
            POST_VIEW_SELECT,
            clause.to_sql(1)
        );

        let mut q = sqlx::query_as::<_, PostView>(&sql);
        for p in clause.params() {
            q = bind_param_query_as(q, p);
        }
        let rows = q.fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn get_post_view(&self, id: i32) -> Result<Option<PostView>, DatabaseError> {
        let sql = format!("{} WHERE p.id = $1", POST_VIEW_SELECT);
        let row = sqlx::query_as::<_, PostView>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

#[async_trait]
impl CommentStore for PgStore {
    async fn insert_comment(&self, post_id: i32, user_id: i32, content: &str) -> Result<Comment, DatabaseError> {
        let row = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (post_id, user_id, content, timestamp)
            VALUES ($1, $2, $3, NOW())
            RETURNING id, post_id, user_id, content, timestamp"#,
        )
        .bind(post_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_comment(&self, id: i32) -> Result<Option<Comment>, DatabaseError> {
        let row = sqlx::query_as::<_, Comment>(
            "SELECT id, post_id, user_id, content, timestamp FROM comments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_comment(&self, id: i32, content: &str) -> Result<Option<Comment>, DatabaseError> {
        let row = sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET content = $1, timestamp = NOW()
            WHERE id = $2
            RETURNING id, post_id, user_id, content, timestamp"#,
        )
        .bind(content)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_comment(&self, id: i32) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn comments_for_post(&self, post_id: i32) -> Result<Vec<CombinedComment>, DatabaseError> {
        let rows = sqlx::query_as::<_, CombinedComment>(
            r#"
            SELECT c.id, c.post_id, c.user_id, u.first_name || ' ' || u.last_name AS user_name,
                   u.avatar AS user_avatar, c.content, c.timestamp
            FROM comments c
            JOIN users u ON c.user_id = u.id
            WHERE c.post_id = $1
            ORDER BY c.timestamp ASC, c.id ASC"#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl LikeStore for PgStore {
    async fn insert_like(&self, post_id: i32, user_id: i32) -> Result<Like, DatabaseError> {
        let row = sqlx::query_as::<_, Like>(
            "INSERT INTO likes (post_id, user_id) VALUES ($1, $2) RETURNING id, post_id, user_id",
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn likes_for_post(&self, post_id: i32) -> Result<Vec<Like>, DatabaseError> {
        let rows = sqlx::query_as::<_, Like>(
            "SELECT id, post_id, user_id FROM likes WHERE post_id = $1 ORDER BY id",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn delete_like(&self, post_id: i32, user_id: i32) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM likes WHERE user_id = $1 AND post_id = $2")
            .bind(user_id)
            .bind(post_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}

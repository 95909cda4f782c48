use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Like {
    pub id: i32,
    pub post_id: i32,
    pub user_id: i32,
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{parse_date, CombinedComment, InputError};

/// Row of the `posts` relation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub date: NaiveDate,
    pub latitude: f64,
    pub longitude: f64,
    pub depth: f64,
    pub visibility: f64,
    pub activity: String,
    pub description: String,
    pub images: Vec<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    pub likes: i32,
}

/// Body accepted by post create and update
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PostInput {
    pub user_id: Option<i32>,
    pub title: String,
    pub date: String,
    pub latitude: f64,
    pub longitude: f64,
    pub depth: f64,
    pub visibility: f64,
    pub activity: String,
    pub description: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub rating: Option<f64>,
    pub likes: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub user_id: i32,
    pub title: String,
    pub date: NaiveDate,
    pub latitude: f64,
    pub longitude: f64,
    pub depth: f64,
    pub visibility: f64,
    pub activity: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub rating: Option<f64>,
}

/// Full overwrite of a post except `images`. A `None` timestamp keeps the
/// stored one.
#[derive(Debug, Clone, PartialEq)]
pub struct PostUpdate {
    pub user_id: i32,
    pub title: String,
    pub date: NaiveDate,
    pub latitude: f64,
    pub longitude: f64,
    pub depth: f64,
    pub visibility: f64,
    pub activity: String,
    pub description: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub rating: Option<f64>,
    pub likes: i32,
}

impl PostInput {
    fn required(&self, owner: Option<i32>) -> Result<(i32, NaiveDate), InputError> {
        let mut missing = Vec::new();
        let user_id = owner.or(self.user_id);
        if user_id.is_none() {
            missing.push("user_id");
        }
        if self.title.trim().is_empty() {
            missing.push("title");
        }
        if self.date.trim().is_empty() {
            missing.push("date");
        }
        match user_id {
            Some(user_id) if missing.is_empty() => Ok((user_id, parse_date(self.date.trim())?)),
            _ => Err(InputError::MissingFields(missing)),
        }
    }

    /// `owner` overrides any `user_id` in the body. Like count and images
    /// always start empty.
    pub fn into_new_post(self, owner: Option<i32>, now: DateTime<Utc>) -> Result<NewPost, InputError> {
        let (user_id, date) = self.required(owner)?;
        Ok(NewPost {
            user_id,
            title: self.title,
            date,
            latitude: self.latitude,
            longitude: self.longitude,
            depth: self.depth,
            visibility: self.visibility,
            activity: self.activity,
            description: self.description,
            timestamp: self.timestamp.unwrap_or(now),
            rating: self.rating,
        })
    }

    pub fn into_update(self, owner: Option<i32>) -> Result<PostUpdate, InputError> {
        let (user_id, date) = self.required(owner)?;
        Ok(PostUpdate {
            user_id,
            title: self.title,
            date,
            latitude: self.latitude,
            longitude: self.longitude,
            depth: self.depth,
            visibility: self.visibility,
            activity: self.activity,
            description: self.description,
            timestamp: self.timestamp,
            rating: self.rating,
            likes: self.likes,
        })
    }
}

/// Optional equality filters for the post search. Empty strings,
/// non-positive user ids and zero coordinates count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PostQuery {
    pub user_id: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub date: Option<String>,
    pub activity: Option<String>,
}

impl PostQuery {
    pub fn user_id(&self) -> Option<i32> {
        self.user_id.filter(|id| *id > 0)
    }

    /// Exact location match; applies only when both coordinates are non-zero
    pub fn location(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) if lat != 0.0 && lng != 0.0 => Some((lat, lng)),
            _ => None,
        }
    }

    pub fn date(&self) -> Result<Option<NaiveDate>, InputError> {
        match self.date.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => parse_date(raw).map(Some),
        }
    }

    pub fn activity(&self) -> Option<&str> {
        self.activity.as_deref().filter(|a| !a.is_empty())
    }

    pub fn into_filter(self) -> Result<PostFilter, InputError> {
        Ok(PostFilter {
            user_id: self.user_id(),
            location: self.location(),
            date: self.date()?,
            activity: self.activity().map(str::to_string),
        })
    }
}

/// Validated search filters; every `Some` becomes one equality predicate
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostFilter {
    pub user_id: Option<i32>,
    /// `(latitude, longitude)`, matched as a pair
    pub location: Option<(f64, f64)>,
    pub date: Option<NaiveDate>,
    pub activity: Option<String>,
}

impl PostFilter {
    pub fn by_user(user_id: i32) -> Self {
        Self {
            user_id: Some(user_id),
            ..Default::default()
        }
    }

    pub fn matches(&self, post: &PostView) -> bool {
        self.user_id.map_or(true, |v| post.user_id == v)
            && self
                .location
                .map_or(true, |(lat, lng)| post.latitude == lat && post.longitude == lng)
            && self.date.map_or(true, |v| post.date == v)
            && self.activity.as_deref().map_or(true, |v| post.activity == v)
    }
}

/// Post joined with its author and live like count
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct PostView {
    pub id: i32,
    pub user_id: i32,
    pub user_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_avatar: Option<String>,
    pub title: String,
    pub date: NaiveDate,
    pub latitude: f64,
    pub longitude: f64,
    pub depth: f64,
    pub visibility: f64,
    pub activity: String,
    pub description: String,
    pub images: Vec<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    pub likes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedPost {
    #[serde(flatten)]
    pub post: PostView,
    pub comments: Vec<CombinedComment>,
}

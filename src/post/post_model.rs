use std::fmt;

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

const PREVIEW_CHARS: usize = 124;

/// Content kind of a post. Set once when the post is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PostType {
    News,
    Article,
}

impl PostType {
    pub const ALL: [PostType; 2] = [PostType::News, PostType::Article];

    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::News => "NEWS",
            PostType::Article => "ARTICLE",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PostType::News => "News",
            PostType::Article => "Article",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        PostType::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(raw.trim()))
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub types_post: PostType,
    pub author_id: ObjectId,
    pub title: String,
    pub text: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub datetime_post: DateTime<Utc>,
    #[serde(default)]
    pub categories: Vec<ObjectId>,
    #[serde(default)]
    pub rating: i64,
}

/// Validated post fields, not yet bound to a stored row.
#[derive(Debug, Clone, PartialEq)]
pub struct PostDraft {
    pub author_id: ObjectId,
    pub title: String,
    pub text: String,
    pub categories: Vec<ObjectId>,
}

impl Post {
    pub fn from_draft(draft: PostDraft, types_post: PostType) -> Self {
        Post {
            id: ObjectId::new(),
            types_post,
            author_id: draft.author_id,
            title: draft.title,
            text: draft.text,
            datetime_post: Utc::now(),
            categories: draft.categories,
            rating: 0,
        }
    }

    /// Copies editable fields; kind and creation time stay as they are.
    pub fn apply(&mut self, draft: PostDraft) {
        self.author_id = draft.author_id;
        self.title = draft.title;
        self.text = draft.text;
        self.categories = draft.categories;
    }

    pub fn preview(&self) -> String {
        if self.text.chars().count() <= PREVIEW_CHARS {
            return self.text.clone();
        }
        let mut short: String = self.text.chars().take(PREVIEW_CHARS).collect();
        short.push_str("...");
        short
    }
}

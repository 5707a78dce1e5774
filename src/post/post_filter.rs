use chrono::{DateTime, NaiveDate, Utc};
use mongodb::bson::{Bson, Document, doc, oid::ObjectId};

#[cfg(test)]
use crate::post::post_model::Post;
use crate::post::post_model::PostType;
use crate::utils::forms::{FieldErrors, parse_id};

pub const FILTER_FIELDS: [&str; 5] = ["title", "category", "author", "types_post", "date_after"];

/// Narrowing criteria for post listings, built from raw query pairs.
///
/// Blank values are ignored. Values that fail to parse are ignored too and
/// reported through [`PostFilter::errors`] so the filter form can show them.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub title: Option<String>,
    pub category: Option<ObjectId>,
    pub author: Option<ObjectId>,
    pub types_post: Option<PostType>,
    pub date_after: Option<NaiveDate>,
    raw: Vec<(String, String)>,
    errors: FieldErrors,
}

impl PostFilter {
    pub fn from_params(params: &[(String, String)]) -> Self {
        let mut filter = PostFilter::default();

        for (key, value) in params {
            let value = value.trim();
            if value.is_empty() || !FILTER_FIELDS.contains(&key.as_str()) {
                continue;
            }
            if filter.raw.iter().any(|(k, _)| k == key) {
                continue;
            }
            filter.raw.push((key.clone(), value.to_string()));

            match key.as_str() {
                "title" => filter.title = Some(value.to_string()),
                "category" => match parse_id(value) {
                    Some(id) => filter.category = Some(id),
                    None => filter.errors.add("category", "Select a valid choice."),
                },
                "author" => match parse_id(value) {
                    Some(id) => filter.author = Some(id),
                    None => filter.errors.add("author", "Select a valid choice."),
                },
                "types_post" => match PostType::parse(value) {
                    Some(kind) => filter.types_post = Some(kind),
                    None => filter.errors.add("types_post", "Select a valid choice."),
                },
                "date_after" => match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
                    Ok(date) => filter.date_after = Some(date),
                    Err(_) => filter.errors.add("date_after", "Enter a valid date."),
                },
                _ => {}
            }
        }

        filter
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Submitted value of a filter field, for re-rendering the form.
    pub fn value(&self, field: &str) -> &str {
        self.raw
            .iter()
            .find(|(k, _)| k == field)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    pub fn is_active(&self) -> bool {
        !self.raw.is_empty()
    }

    /// Active filters as a query string, for pagination links.
    pub fn query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.raw.iter())
            .finish()
    }

    fn date_after_start(&self) -> Option<DateTime<Utc>> {
        self.date_after
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|start| start.and_utc())
    }

    /// MongoDB query selecting the same posts as [`PostFilter::matches`].
    pub fn to_document(&self) -> Document {
        let mut query = Document::new();

        if let Some(title) = &self.title {
            query.insert(
                "title",
                doc! { "$regex": regex::escape(title), "$options": "i" },
            );
        }
        if let Some(category) = self.category {
            query.insert("categories", category);
        }
        if let Some(author) = self.author {
            query.insert("author_id", author);
        }
        if let Some(kind) = self.types_post {
            query.insert("types_post", kind.as_str());
        }
        if let Some(start) = self.date_after_start() {
            query.insert(
                "datetime_post",
                doc! { "$gte": Bson::DateTime(mongodb::bson::DateTime::from_chrono(start)) },
            );
        }

        query
    }

    #[cfg(test)]
    pub fn matches(&self, post: &Post) -> bool {
        if let Some(title) = &self.title {
            if !post.title.to_lowercase().contains(&title.to_lowercase()) {
                return false;
            }
        }
        if let Some(category) = self.category {
            if !post.categories.contains(&category) {
                return false;
            }
        }
        if let Some(author) = self.author {
            if post.author_id != author {
                return false;
            }
        }
        if let Some(kind) = self.types_post {
            if post.types_post != kind {
                return false;
            }
        }
        if let Some(start) = self.date_after_start() {
            if post.datetime_post < start {
                return false;
            }
        }
        true
    }
}

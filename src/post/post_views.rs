use askama::Template;
use mongodb::bson::oid::ObjectId;

use crate::category::model::{Category, category_names};
use crate::post::post_filter::PostFilter;
use crate::post::post_model::{Post, PostType};
use crate::user::model::Author;
use crate::utils::forms::{FieldErrors, FormData};
use crate::utils::pagination::Page;
use crate::utils::templates::format_datetime;

/// One `<option>` of a select control.
#[derive(Clone)]
pub struct ChoiceView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl ChoiceView {
    fn new(value: String, label: impl Into<String>, selected: bool) -> Self {
        Self {
            value,
            label: label.into(),
            selected,
        }
    }
}

#[derive(Clone)]
pub struct PostCard {
    pub title: String,
    pub preview: String,
    pub kind: String,
    pub published: String,
    pub categories: Vec<String>,
    pub href: String,
}

impl PostCard {
    pub fn new(post: &Post, categories: &[Category]) -> Self {
        Self {
            title: post.title.clone(),
            preview: post.preview(),
            kind: post.types_post.label().to_string(),
            published: format_datetime(&post.datetime_post),
            categories: category_names(&post.categories, categories),
            href: post_href(&post.id),
        }
    }
}

pub fn post_href(id: &ObjectId) -> String {
    format!("/news/{}/", id.to_hex())
}

/// Filter controls, re-rendered with whatever the visitor submitted.
pub struct FilterView {
    pub title: String,
    pub date_after: String,
    pub categories: Vec<ChoiceView>,
    pub authors: Vec<ChoiceView>,
    pub kinds: Vec<ChoiceView>,
    pub errors: Vec<String>,
    pub active: bool,
}

impl FilterView {
    pub fn new(filter: &PostFilter, categories: &[Category], authors: &[Author]) -> Self {
        let errors = filter.errors();
        let mut messages = Vec::new();
        for field in ["category", "author", "types_post", "date_after"] {
            for message in errors.get(field) {
                messages.push(format!("{}: {}", field, message));
            }
        }

        Self {
            title: filter.value("title").to_string(),
            date_after: filter.value("date_after").to_string(),
            categories: categories
                .iter()
                .map(|c| {
                    let value = c.id.to_hex();
                    let selected = filter.value("category") == value;
                    ChoiceView::new(value, c.name.clone(), selected)
                })
                .collect(),
            authors: authors
                .iter()
                .map(|a| {
                    let value = a.id.to_hex();
                    let selected = filter.value("author") == value;
                    ChoiceView::new(value, a.name.clone(), selected)
                })
                .collect(),
            kinds: PostType::ALL
                .iter()
                .map(|kind| {
                    ChoiceView::new(
                        kind.as_str().to_string(),
                        kind.label(),
                        filter.types_post == Some(*kind),
                    )
                })
                .collect(),
            errors: messages,
            active: filter.is_active(),
        }
    }
}

/// Pagination links that keep the active filters.
pub struct PageLinks {
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
    pub previous_href: Option<String>,
    pub next_href: Option<String>,
}

impl PageLinks {
    pub fn new(page: &Page, filter: &PostFilter) -> Self {
        let query = filter.query_string();
        let href = |number: u64| {
            if query.is_empty() {
                format!("?page={}", number)
            } else {
                format!("?{}&page={}", query, number)
            }
        };

        Self {
            number: page.number,
            num_pages: page.num_pages,
            total: page.total,
            previous_href: page.has_previous().then(|| href(page.number - 1)),
            next_href: page.has_next().then(|| href(page.number + 1)),
        }
    }
}

pub struct PostFormView {
    pub title: String,
    pub text: String,
    pub authors: Vec<ChoiceView>,
    pub categories: Vec<ChoiceView>,
    pub author_errors: Vec<String>,
    pub title_errors: Vec<String>,
    pub text_errors: Vec<String>,
    pub categories_errors: Vec<String>,
}

impl PostFormView {
    fn build(
        title: String,
        text: String,
        author: &str,
        selected: &[String],
        authors: &[Author],
        categories: &[Category],
        errors: &FieldErrors,
    ) -> Self {
        Self {
            title,
            text,
            authors: authors
                .iter()
                .map(|a| {
                    let value = a.id.to_hex();
                    let chosen = value == author;
                    ChoiceView::new(value, a.name.clone(), chosen)
                })
                .collect(),
            categories: categories
                .iter()
                .map(|c| {
                    let value = c.id.to_hex();
                    let chosen = selected.contains(&value);
                    ChoiceView::new(value, c.name.clone(), chosen)
                })
                .collect(),
            author_errors: errors.get("author").to_vec(),
            title_errors: errors.get("title").to_vec(),
            text_errors: errors.get("text").to_vec(),
            categories_errors: errors.get("categories").to_vec(),
        }
    }

    pub fn empty(authors: &[Author], categories: &[Category]) -> Self {
        Self::build(
            String::new(),
            String::new(),
            "",
            &[],
            authors,
            categories,
            &FieldErrors::default(),
        )
    }

    pub fn from_post(post: &Post, authors: &[Author], categories: &[Category]) -> Self {
        let selected: Vec<String> = post.categories.iter().map(|id| id.to_hex()).collect();
        Self::build(
            post.title.clone(),
            post.text.clone(),
            &post.author_id.to_hex(),
            &selected,
            authors,
            categories,
            &FieldErrors::default(),
        )
    }

    pub fn from_submission(
        data: &FormData,
        errors: &FieldErrors,
        authors: &[Author],
        categories: &[Category],
    ) -> Self {
        let selected: Vec<String> = data
            .all("categories")
            .into_iter()
            .map(str::to_string)
            .collect();
        Self::build(
            data.first("title").unwrap_or_default().to_string(),
            data.first("text").unwrap_or_default().to_string(),
            data.first("author").unwrap_or_default(),
            &selected,
            authors,
            categories,
            errors,
        )
    }
}

#[derive(Template)]
#[template(path = "posts.html")]
pub struct PostsTemplate {
    pub posts: Vec<PostCard>,
    pub page: PageLinks,
    pub filterset: FilterView,
    pub time_now: String,
    pub next_sale: Option<String>,
}

#[derive(Template)]
#[template(path = "search.html")]
pub struct SearchTemplate {
    pub search: Vec<PostCard>,
    pub filterset: FilterView,
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub post: PostCard,
    pub text: String,
    pub author: String,
    pub rating: i64,
}

#[derive(Template)]
#[template(path = "create.html")]
pub struct PostCreateTemplate {
    pub kind: String,
    pub action: String,
    pub form: PostFormView,
}

#[derive(Template)]
#[template(path = "post_edit.html")]
pub struct PostEditTemplate {
    pub post_id: String,
    pub action: String,
    pub form: PostFormView,
}

#[derive(Template)]
#[template(path = "post_delete.html")]
pub struct PostDeleteTemplate {
    pub post: PostCard,
    pub action: String,
}

use mongodb::bson::oid::ObjectId;

use crate::category::model::Category;
use crate::post::post_model::PostDraft;
use crate::user::model::Author;
use crate::utils::forms::{FieldErrors, FormData, parse_id};

pub const TITLE_MAX_CHARS: usize = 128;

const REQUIRED: &str = "This field is required.";
const INVALID_CHOICE: &str = "Select a valid choice.";

/// Validates a submitted post form against the known authors and categories.
pub fn validate_post_form(
    data: &FormData,
    authors: &[Author],
    categories: &[Category],
) -> Result<PostDraft, FieldErrors> {
    let mut errors = FieldErrors::default();

    let author_id = match data.first("author") {
        None => {
            errors.add("author", REQUIRED);
            None
        }
        Some(raw) => match parse_id(raw).filter(|id| authors.iter().any(|a| a.id == *id)) {
            Some(id) => Some(id),
            None => {
                errors.add("author", INVALID_CHOICE);
                None
            }
        },
    };

    let title = data.first("title").unwrap_or_default().to_string();
    if title.is_empty() {
        errors.add("title", REQUIRED);
    } else if title.chars().count() > TITLE_MAX_CHARS {
        errors.add(
            "title",
            format!(
                "Ensure this value has at most {} characters (it has {}).",
                TITLE_MAX_CHARS,
                title.chars().count()
            ),
        );
    }

    let text = data.first("text").unwrap_or_default().to_string();
    if text.is_empty() {
        errors.add("text", REQUIRED);
    }

    let mut selected: Vec<ObjectId> = Vec::new();
    for raw in data.all("categories") {
        match parse_id(raw).filter(|id| categories.iter().any(|c| c.id == *id)) {
            Some(id) if !selected.contains(&id) => selected.push(id),
            Some(_) => {}
            None => errors.add(
                "categories",
                format!("Select a valid choice. {} is not one of the available choices.", raw),
            ),
        }
    }

    match author_id {
        Some(author_id) => errors.finish(PostDraft {
            author_id,
            title,
            text,
            categories: selected,
        }),
        None => Err(errors),
    }
}

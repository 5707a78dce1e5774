use askama::Template;

use crate::post::post_views::ChoiceView;

#[derive(Template)]
#[template(path = "subscribe.html")]
pub struct SubscribeTemplate {
    pub categories: Vec<ChoiceView>,
    pub subscribed: Vec<String>,
    pub category_errors: Vec<String>,
}

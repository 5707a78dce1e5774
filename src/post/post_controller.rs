use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use chrono::Utc;
use log::info;

use crate::category::service::CategoryRepository;
use crate::middleware::auth::Principal;
use crate::middleware::permissions::{ADD_POST, CHANGE_POST, DELETE_POST, require_permission};
use crate::post::post_filter::PostFilter;
use crate::post::post_form::validate_post_form;
use crate::post::post_model::{Post, PostType};
use crate::post::post_service::PostRepository;
use crate::post::post_views::{
    FilterView, PageLinks, PostCard, PostCreateTemplate, PostDeleteTemplate, PostEditTemplate,
    PostFormView, PostTemplate, PostsTemplate, SearchTemplate, post_href,
};
use crate::user::service::{AuthorRepository, UserRepository};
use crate::utils::error::CustomError;
use crate::utils::forms::FormData;
use crate::utils::helpers::path_object_id;
use crate::utils::pagination::{POSTS_PER_PAGE, Page};
use crate::utils::templates::{format_datetime, html, html_with_status, redirect};

pub const LIST_URL: &str = "/news/";

type Params = web::Query<Vec<(String, String)>>;

fn page_param(params: &[(String, String)]) -> Option<&str> {
    params
        .iter()
        .find(|(k, _)| k == "page")
        .map(|(_, v)| v.as_str())
}

async fn load_post(posts: &dyn PostRepository, raw_id: &str) -> Result<Post, CustomError> {
    let id = path_object_id(raw_id, "Post")?;
    posts
        .get(&id)
        .await?
        .ok_or_else(|| CustomError::NotFoundError("Post not found".into()))
}

/// GET /news/
pub async fn list_posts(
    posts: web::Data<dyn PostRepository>,
    categories: web::Data<dyn CategoryRepository>,
    authors: web::Data<dyn AuthorRepository>,
    params: Params,
) -> Result<HttpResponse, CustomError> {
    let filter = PostFilter::from_params(&params);
    let total = posts.count(&filter).await?;
    let page = Page::resolve(page_param(&params), total, POSTS_PER_PAGE)?;
    let items = posts.list(&filter, Some(page.window())).await?;

    let categories = categories.list().await?;
    let authors = authors.list().await?;

    html(&PostsTemplate {
        posts: items.iter().map(|p| PostCard::new(p, &categories)).collect(),
        page: PageLinks::new(&page, &filter),
        filterset: FilterView::new(&filter, &categories, &authors),
        time_now: format_datetime(&Utc::now()),
        next_sale: None,
    })
}

/// GET /news/search/
pub async fn search_posts(
    posts: web::Data<dyn PostRepository>,
    categories: web::Data<dyn CategoryRepository>,
    authors: web::Data<dyn AuthorRepository>,
    params: Params,
) -> Result<HttpResponse, CustomError> {
    let filter = PostFilter::from_params(&params);
    let items = posts.list(&filter, None).await?;

    let categories = categories.list().await?;
    let authors = authors.list().await?;

    html(&SearchTemplate {
        search: items.iter().map(|p| PostCard::new(p, &categories)).collect(),
        filterset: FilterView::new(&filter, &categories, &authors),
    })
}

/// GET /news/{id}/
pub async fn get_post(
    post_id: web::Path<String>,
    posts: web::Data<dyn PostRepository>,
    categories: web::Data<dyn CategoryRepository>,
    authors: web::Data<dyn AuthorRepository>,
) -> Result<HttpResponse, CustomError> {
    let post = load_post(posts.get_ref(), &post_id).await?;
    let categories = categories.list().await?;
    let author = authors
        .get(&post.author_id)
        .await?
        .map(|a| a.name)
        .unwrap_or_else(|| "unknown".to_string());

    html(&PostTemplate {
        post: PostCard::new(&post, &categories),
        text: post.text.clone(),
        author,
        rating: post.rating,
    })
}

fn create_action(kind: PostType) -> &'static str {
    match kind {
        PostType::News => "/news/create/",
        PostType::Article => "/article/create/",
    }
}

/// GET /news/create/ and /article/create/
pub async fn create_post_form(
    kind: web::Data<PostType>,
    principal: Principal,
    users: web::Data<dyn UserRepository>,
    authors: web::Data<dyn AuthorRepository>,
    categories: web::Data<dyn CategoryRepository>,
) -> Result<HttpResponse, CustomError> {
    require_permission(users.get_ref(), &principal, ADD_POST).await?;

    let authors = authors.list().await?;
    let categories = categories.list().await?;

    html(&PostCreateTemplate {
        kind: kind.label().to_lowercase(),
        action: create_action(*kind.get_ref()).to_string(),
        form: PostFormView::empty(&authors, &categories),
    })
}

/// POST /news/create/ and /article/create/
///
/// The route decides the post kind; nothing in the form can change it.
pub async fn create_post(
    kind: web::Data<PostType>,
    principal: Principal,
    body: web::Bytes,
    users: web::Data<dyn UserRepository>,
    posts: web::Data<dyn PostRepository>,
    authors: web::Data<dyn AuthorRepository>,
    categories: web::Data<dyn CategoryRepository>,
) -> Result<HttpResponse, CustomError> {
    require_permission(users.get_ref(), &principal, ADD_POST).await?;

    let data = FormData::parse(&body);
    let authors = authors.list().await?;
    let categories = categories.list().await?;

    let draft = match validate_post_form(&data, &authors, &categories) {
        Ok(draft) => draft,
        Err(errors) => {
            return html_with_status(
                &PostCreateTemplate {
                    kind: kind.label().to_lowercase(),
                    action: create_action(*kind.get_ref()).to_string(),
                    form: PostFormView::from_submission(&data, &errors, &authors, &categories),
                },
                StatusCode::BAD_REQUEST,
            );
        }
    };

    let post = posts.insert(Post::from_draft(draft, *kind.get_ref())).await?;
    info!("user {} created {} {}", principal.user_id, post.types_post, post.id);

    Ok(redirect(&post_href(&post.id)))
}

/// GET /news/{id}/edit/
pub async fn edit_post_form(
    post_id: web::Path<String>,
    principal: Principal,
    users: web::Data<dyn UserRepository>,
    posts: web::Data<dyn PostRepository>,
    authors: web::Data<dyn AuthorRepository>,
    categories: web::Data<dyn CategoryRepository>,
) -> Result<HttpResponse, CustomError> {
    require_permission(users.get_ref(), &principal, CHANGE_POST).await?;

    let post = load_post(posts.get_ref(), &post_id).await?;
    let authors = authors.list().await?;
    let categories = categories.list().await?;

    html(&PostEditTemplate {
        post_id: post.id.to_hex(),
        action: format!("{}edit/", post_href(&post.id)),
        form: PostFormView::from_post(&post, &authors, &categories),
    })
}

/// POST /news/{id}/edit/
pub async fn update_post(
    post_id: web::Path<String>,
    principal: Principal,
    body: web::Bytes,
    users: web::Data<dyn UserRepository>,
    posts: web::Data<dyn PostRepository>,
    authors: web::Data<dyn AuthorRepository>,
    categories: web::Data<dyn CategoryRepository>,
) -> Result<HttpResponse, CustomError> {
    require_permission(users.get_ref(), &principal, CHANGE_POST).await?;

    let mut post = load_post(posts.get_ref(), &post_id).await?;
    let data = FormData::parse(&body);
    let authors = authors.list().await?;
    let categories = categories.list().await?;

    let draft = match validate_post_form(&data, &authors, &categories) {
        Ok(draft) => draft,
        Err(errors) => {
            return html_with_status(
                &PostEditTemplate {
                    post_id: post.id.to_hex(),
                    action: format!("{}edit/", post_href(&post.id)),
                    form: PostFormView::from_submission(&data, &errors, &authors, &categories),
                },
                StatusCode::BAD_REQUEST,
            );
        }
    };

    post.apply(draft);
    if !posts.update(&post).await? {
        return Err(CustomError::NotFoundError("Post not found".into()));
    }
    info!("user {} updated post {}", principal.user_id, post.id);

    Ok(redirect(&post_href(&post.id)))
}

/// GET /news/{id}/delete/
pub async fn delete_post_confirm(
    post_id: web::Path<String>,
    principal: Principal,
    users: web::Data<dyn UserRepository>,
    posts: web::Data<dyn PostRepository>,
    categories: web::Data<dyn CategoryRepository>,
) -> Result<HttpResponse, CustomError> {
    require_permission(users.get_ref(), &principal, DELETE_POST).await?;

    let post = load_post(posts.get_ref(), &post_id).await?;
    let categories = categories.list().await?;

    html(&PostDeleteTemplate {
        action: format!("{}delete/", post_href(&post.id)),
        post: PostCard::new(&post, &categories),
    })
}

/// POST /news/{id}/delete/
pub async fn delete_post(
    post_id: web::Path<String>,
    principal: Principal,
    users: web::Data<dyn UserRepository>,
    posts: web::Data<dyn PostRepository>,
) -> Result<HttpResponse, CustomError> {
    require_permission(users.get_ref(), &principal, DELETE_POST).await?;

    let id = path_object_id(&post_id, "Post")?;
    if !posts.delete(&id).await? {
        return Err(CustomError::NotFoundError("Post not found".into()));
    }
    info!("user {} deleted post {}", principal.user_id, id);

    Ok(redirect(LIST_URL))
}

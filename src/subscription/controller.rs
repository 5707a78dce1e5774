use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use log::info;
use mongodb::bson::oid::ObjectId;

use crate::category::model::{Category, category_names};
use crate::category::service::CategoryRepository;
use crate::middleware::auth::Principal;
use crate::post::post_controller::LIST_URL;
use crate::post::post_views::ChoiceView;
use crate::subscription::model::{SubscribersCategory, validate_subscribe_form};
use crate::subscription::service::SubscriptionRepository;
use crate::subscription::views::SubscribeTemplate;
use crate::user::service::UserRepository;
use crate::utils::error::CustomError;
use crate::utils::forms::{FieldErrors, FormData};
use crate::utils::templates::{html_with_status, redirect};

async fn render_form(
    subscriber_id: &ObjectId,
    subscriptions: &dyn SubscriptionRepository,
    categories: &[Category],
    chosen: &str,
    errors: &FieldErrors,
    status: StatusCode,
) -> Result<HttpResponse, CustomError> {
    let current: Vec<ObjectId> = subscriptions
        .list_for_subscriber(subscriber_id)
        .await?
        .into_iter()
        .map(|s| s.category_id)
        .collect();

    html_with_status(
        &SubscribeTemplate {
            categories: categories
                .iter()
                .map(|c| {
                    let value = c.id.to_hex();
                    let selected = value == chosen;
                    ChoiceView {
                        value,
                        label: c.name.clone(),
                        selected,
                    }
                })
                .collect(),
            subscribed: category_names(&current, categories),
            category_errors: errors.get("category").to_vec(),
        },
        status,
    )
}

/// GET /subscribe/
pub async fn subscribe_form(
    principal: Principal,
    subscriptions: web::Data<dyn SubscriptionRepository>,
    categories: web::Data<dyn CategoryRepository>,
) -> Result<HttpResponse, CustomError> {
    let categories = categories.list().await?;
    render_form(
        &principal.user_id,
        subscriptions.get_ref(),
        &categories,
        "",
        &FieldErrors::default(),
        StatusCode::OK,
    )
    .await
}

/// POST /subscribe/
pub async fn subscribe(
    principal: Principal,
    body: web::Bytes,
    users: web::Data<dyn UserRepository>,
    subscriptions: web::Data<dyn SubscriptionRepository>,
    categories: web::Data<dyn CategoryRepository>,
) -> Result<HttpResponse, CustomError> {
    let data = FormData::parse(&body);
    let categories = categories.list().await?;

    let category_id = match validate_subscribe_form(&data, &categories) {
        Ok(id) => id,
        Err(errors) => {
            return render_form(
                &principal.user_id,
                subscriptions.get_ref(),
                &categories,
                data.first("category").unwrap_or_default(),
                &errors,
                StatusCode::BAD_REQUEST,
            )
            .await;
        }
    };

    let subscriber = users
        .get(&principal.user_id)
        .await?
        .ok_or_else(|| CustomError::NotFoundError("User not found".into()))?;

    if subscriptions
        .subscribe(SubscribersCategory::new(subscriber.id, category_id))
        .await?
    {
        info!("user {} subscribed to category {}", subscriber.id, category_id);
    }

    Ok(redirect(LIST_URL))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;

    use super::*;
    use crate::testing::{TestStores, bearer, form_post, send};

    #[actix_web::test]
    async fn subscribing_twice_keeps_one_row() {
        let stores = TestStores::default();
        let user = stores.add_user("reader", &[]).await;
        let sport = stores.add_category("Sport").await;
        let sport_id = sport.id.to_hex();

        for _ in 0..2 {
            let req = form_post("/subscribe/", &[("category", sport_id.as_str())])
                .insert_header(bearer(&user));
            let res = send(&stores, req).await;
            assert_eq!(res.status, StatusCode::FOUND);
            assert_eq!(res.location.as_deref(), Some(LIST_URL));
        }

        let rows = stores.subscriptions.all().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].subscriber_id, user.id);
        assert_eq!(rows[0].category_id, sport.id);

        let page = send(
            &stores,
            TestRequest::get().uri("/subscribe/").insert_header(bearer(&user)),
        )
        .await;
        assert_eq!(page.status, StatusCode::OK);
        assert!(page.body.contains("You follow:"));
    }

    #[actix_web::test]
    async fn simultaneous_subscribes_keep_one_row() {
        let stores = TestStores::default();
        let user = stores.add_user("reader", &[]).await;
        let sport = stores.add_category("Sport").await;
        let sport_id = sport.id.to_hex();

        let request = || {
            form_post("/subscribe/", &[("category", sport_id.as_str())])
                .insert_header(bearer(&user))
        };
        let (first, second) =
            futures_util::join!(send(&stores, request()), send(&stores, request()));
        assert_eq!(first.status, StatusCode::FOUND);
        assert_eq!(second.status, StatusCode::FOUND);
        assert_eq!(stores.subscriptions.all().await.len(), 1);
    }

    #[actix_web::test]
    async fn unknown_category_is_rejected() {
        let stores = TestStores::default();
        let user = stores.add_user("reader", &[]).await;
        stores.add_category("Sport").await;

        let missing = ObjectId::new().to_hex();
        for value in ["", "garbage", missing.as_str()] {
            let req =
                form_post("/subscribe/", &[("category", value)]).insert_header(bearer(&user));
            let res = send(&stores, req).await;
            assert_eq!(res.status, StatusCode::BAD_REQUEST, "category {value:?}");
            assert!(res.body.contains("Subscribe to a category"));
            assert!(
                res.body.contains("This field is required.")
                    || res.body.contains("Select a valid choice.")
            );
        }
        assert!(stores.subscriptions.all().await.is_empty());
    }

    #[actix_web::test]
    async fn subscribe_needs_a_live_account() {
        let stores = TestStores::default();
        let sport = stores.add_category("Sport").await;
        let sport_id = sport.id.to_hex();

        let anonymous = send(
            &stores,
            form_post("/subscribe/", &[("category", sport_id.as_str())]),
        )
        .await;
        assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

        let user = stores.add_user("gone", &[]).await;
        stores.users.remove(&user.id).await;
        let req =
            form_post("/subscribe/", &[("category", sport_id.as_str())]).insert_header(bearer(&user));
        let res = send(&stores, req).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert!(stores.subscriptions.all().await.is_empty());
    }
}

use super::*;
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use shared::{
    domain::{ItemId, NavigationItem, SubscriptionId},
    error::FieldError,
};

#[derive(Deserialize)]
struct PageQuery {
    page: u32,
}

async fn items(Path(code): Path<String>, Query(q): Query<PageQuery>) -> Json<ItemPageResponse> {
    Json(ItemPageResponse {
        navigation_list: vec![NavigationItem {
            id: ItemId(i64::from(q.page)),
            name: format!("{code}:{}", q.page),
            title: None,
            url: "https://example.com".into(),
            image_url: None,
            description: String::new(),
            category_name: code,
        }],
        current_page: q.page,
        total: 9,
        page_size: 4,
    })
}

async fn newsletter(
    Json(req): Json<NewsletterRequest>,
) -> Result<Json<NewsletterResponse>, (StatusCode, Json<ApiError>)> {
    if req.email.contains('@') {
        Ok(Json(NewsletterResponse {
            subscription_id: SubscriptionId(7),
        }))
    } else {
        Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError::validation(vec![FieldError::new(
                "email",
                "Invalid email address",
            )])),
        ))
    }
}

async fn spawn_server() -> String {
    let app = Router::new()
        .route("/api/category/:code/items", get(items))
        .route("/api/newsletter", post(newsletter));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{addr}/")
}

#[tokio::test]
async fn fetches_item_pages_over_http() {
    let client = HttpDirectoryClient::new(&spawn_server().await).expect("client");
    let page = client.fetch_page("design tools", 3).await.expect("page");
    assert_eq!(page.current_page, 3);
    assert_eq!(page.total, 9);
    assert_eq!(page.navigation_list[0].name, "design tools:3");
}

#[tokio::test]
async fn subscription_round_trip() {
    let client = HttpDirectoryClient::new(&spawn_server().await).expect("client");
    let response = client
        .subscribe(&NewsletterRequest {
            name: "A".into(),
            email: "a@b.com".into(),
        })
        .await
        .expect("subscribed");
    assert_eq!(response.subscription_id, SubscriptionId(7));
}

#[tokio::test]
async fn rejected_requests_carry_server_error() {
    let client = HttpDirectoryClient::new(&spawn_server().await).expect("client");
    let err = client
        .subscribe(&NewsletterRequest {
            name: "A".into(),
            email: "nope".into(),
        })
        .await
        .expect_err("rejected");
    match &err {
        SourceError::Api { status, error } => {
            assert_eq!(*status, 400);
            assert_eq!(error.code, ErrorCode::Validation);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.field_errors().len(), 1);
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = HttpDirectoryClient::new(&format!("http://{addr}")).expect("client");
    let err = client.fetch_page("design", 1).await.expect_err("no server");
    assert!(matches!(err, SourceError::Transport(_)));
    assert_eq!(err.user_message(), "Network error, please try again");
}

#[test]
fn invalid_base_url_is_rejected() {
    assert!(matches!(
        HttpDirectoryClient::new("not a url"),
        Err(SourceError::InvalidUrl(_))
    ));
}

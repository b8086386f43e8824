use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;
use stockroom::{config::Config, create_router, AppState};
use tower::ServiceExt;

const BOUNDARY: &str = "stockroom-test-boundary";

/// A browser stand-in: keeps the session cookie the server hands out.
struct Browser {
    app: Router,
    cookie: Option<String>,
}

impl Browser {
    fn new(app: Router) -> Self {
        Self { app, cookie: None }
    }

    async fn send(&mut self, builder: axum::http::request::Builder, body: Body) -> Response {
        let builder = match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        };
        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        if self.cookie.is_none() {
            if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
                let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
                self.cookie = Some(pair.to_string());
            }
        }
        response
    }

    async fn get(&mut self, uri: &str) -> Response {
        self.send(Request::builder().uri(uri), Body::empty()).await
    }

    async fn post_form(&mut self, uri: &str, body: String) -> Response {
        let builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        self.send(builder, Body::from(body)).await
    }

    async fn upload(&mut self, csv: &[u8]) -> Response {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"inventory.csv\"\r\nContent-Type: text/csv\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(csv);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let builder = Request::builder()
            .method("POST")
            .uri("/transfer/import")
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"));
        self.send(builder, Body::from(body)).await
    }

    async fn inventory(&mut self) -> Value {
        let response = self.get("/api/items").await;
        assert_eq!(response.status(), StatusCode::OK);
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }
}

fn app() -> Router {
    create_router(AppState::new(Config::default()))
}

async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

fn decimal(value: &Value) -> Decimal {
    value.as_str().unwrap().parse().unwrap()
}

fn location(response: &Response) -> &str {
    response.headers().get(header::LOCATION).unwrap().to_str().unwrap()
}

#[tokio::test]
async fn new_session_starts_with_seed_inventory() {
    let mut browser = Browser::new(app());
    let inventory = browser.inventory().await;

    assert_eq!(inventory["item_count"], 4);
    assert_eq!(decimal(&inventory["total_value"]), dec!(92250.00));
    assert_eq!(inventory["items"][0]["name"], "Laptop Business");
    assert_eq!(decimal(&inventory["items"][0]["value"]), dec!(52500.00));
    assert!(browser.cookie.as_deref().unwrap().starts_with("stockroom_session="));
}

#[tokio::test]
async fn overview_shows_formatted_total() {
    let mut browser = Browser::new(app());
    let response = browser.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Laptop Business"));
    assert!(html.contains("92,250.00 PLN"));
}

#[tokio::test]
async fn add_form_appends_an_item() {
    let mut browser = Browser::new(app());
    let response = browser
        .post_form("/items", "name=Cable&quantity=10&unit_price=5.00".to_string())
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/?notice=Added%20item"));

    let inventory = browser.inventory().await;
    assert_eq!(inventory["item_count"], 5);
    assert_eq!(inventory["items"][4]["name"], "Cable");
    assert_eq!(decimal(&inventory["items"][4]["value"]), dec!(50.00));
    assert_eq!(decimal(&inventory["total_value"]), dec!(92300.00));
}

#[tokio::test]
async fn invalid_add_form_is_rejected() {
    let mut browser = Browser::new(app());
    let response = browser
        .post_form("/items", "name=&quantity=0&unit_price=5.00".to_string())
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("Item name is required"));
    assert!(html.contains("Quantity must be a whole number of at least 1"));

    assert_eq!(browser.inventory().await["item_count"], 4);
}

#[tokio::test]
async fn export_downloads_csv() {
    let mut browser = Browser::new(app());
    let response = browser.get("/transfer/export").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/csv; charset=utf-8"
    );
    let disposition = response.headers().get(header::CONTENT_DISPOSITION).unwrap();
    assert!(disposition.to_str().unwrap().contains("inventory.csv"));

    let csv = body_text(response).await;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "name,quantity,unitPrice,value");
    assert_eq!(lines[1], "Laptop Business,15,3500.00,52500.00");
}

#[tokio::test]
async fn import_replaces_inventory() {
    let mut browser = Browser::new(app());
    let response = browser.upload(b"name,quantity,unitPrice\nX,2,3.0\n").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/?notice=Imported%201%20items");

    let inventory = browser.inventory().await;
    assert_eq!(inventory["item_count"], 1);
    assert_eq!(decimal(&inventory["items"][0]["value"]), dec!(6.0));
}

#[tokio::test]
async fn import_missing_column_leaves_inventory_untouched() {
    let mut browser = Browser::new(app());
    let response = browser.upload(b"name,quantity\nA,1\n").await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("Import failed"));
    assert!(html.contains("unitPrice"));

    let inventory = browser.inventory().await;
    assert_eq!(inventory["item_count"], 4);
    assert_eq!(decimal(&inventory["total_value"]), dec!(92250.00));
}

#[tokio::test]
async fn import_without_file_is_a_bad_request() {
    let mut browser = Browser::new(app());
    let response = browser.upload(b"").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("Choose a CSV file"));
}

#[tokio::test]
async fn exported_file_imports_back_unchanged() {
    let mut browser = Browser::new(app());
    browser
        .post_form("/items", "name=Kabel+HDMI&quantity=7&unit_price=19%2C99".to_string())
        .await;
    let before = browser.inventory().await;

    let exported = body_bytes(browser.get("/transfer/export").await).await;
    let response = browser.upload(&exported).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let after = browser.inventory().await;
    assert_eq!(after["item_count"], 5);
    for (old, new) in before["items"].as_array().unwrap().iter().zip(after["items"].as_array().unwrap()) {
        assert_eq!(old["name"], new["name"]);
        assert_eq!(old["quantity"], new["quantity"]);
        assert_eq!(decimal(&old["unitPrice"]), decimal(&new["unitPrice"]));
        assert_eq!(decimal(&old["value"]), decimal(&new["value"]));
    }
}

#[tokio::test]
async fn bulk_edit_replaces_the_table() {
    let mut browser = Browser::new(app());
    let body = "name=Laptop+Business&quantity=1&unit_price=3500.00\
                &name=&quantity=&unit_price=";
    let response = browser.post_form("/items/edit", body.to_string()).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/items/edit?notice=Changes%20saved");

    let inventory = browser.inventory().await;
    assert_eq!(inventory["item_count"], 1);
    assert_eq!(decimal(&inventory["total_value"]), dec!(3500.00));
}

#[tokio::test]
async fn bulk_edit_can_remove_rows() {
    let mut browser = Browser::new(app());
    let body = "name=A&quantity=1&unit_price=1&name=B&quantity=2&unit_price=2&remove=0";
    browser.post_form("/items/edit", body.to_string()).await;

    let inventory = browser.inventory().await;
    assert_eq!(inventory["item_count"], 1);
    assert_eq!(inventory["items"][0]["name"], "B");
}

#[tokio::test]
async fn unchanged_bulk_edit_reports_no_changes() {
    let mut browser = Browser::new(app());
    let inventory = browser.inventory().await;

    let body = inventory["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| {
            format!(
                "name={}&quantity={}&unit_price={}",
                urlencoding::encode(item["name"].as_str().unwrap()),
                item["quantity"],
                item["unitPrice"].as_str().unwrap()
            )
        })
        .collect::<Vec<_>>()
        .join("&");

    let response = browser.post_form("/items/edit", body).await;
    assert_eq!(location(&response), "/items/edit?notice=No%20changes%20to%20save");
    assert_eq!(browser.inventory().await["item_count"], 4);
}

#[tokio::test]
async fn invalid_bulk_edit_keeps_the_table() {
    let mut browser = Browser::new(app());
    let response = browser
        .post_form("/items/edit", "name=A&quantity=1&unit_price=0".to_string())
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(response).await.contains("Row 1: unit price must be at least 0.01"));
    assert_eq!(browser.inventory().await["item_count"], 4);
}

#[tokio::test]
async fn edit_page_lists_rows_and_blank_slots() {
    let mut browser = Browser::new(app());
    let html = body_text(browser.get("/items/edit").await).await;

    assert!(html.contains("value=\"Laptop Business\""));
    assert_eq!(html.matches("name=\"remove\"").count(), 7);
}

#[tokio::test]
async fn sessions_do_not_share_inventory() {
    let app = app();
    let mut alice = Browser::new(app.clone());
    let mut bob = Browser::new(app);

    alice.upload(b"name,quantity,unitPrice\nOnly,1,1.00\n").await;

    assert_eq!(alice.inventory().await["item_count"], 1);
    assert_eq!(bob.inventory().await["item_count"], 4);
    assert_ne!(alice.cookie, bob.cookie);
}

#[tokio::test]
async fn import_that_overflows_the_total_keeps_pages_working() {
    let mut browser = Browser::new(app());
    let csv = format!("name,quantity,unitPrice\nA,1,{max}\nB,1,{max}\n", max = Decimal::MAX);
    let response = browser.upload(csv.as_bytes()).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(response).await.contains("total inventory value is out of range"));

    let response = browser.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("92,250.00 PLN"));
}

mod common;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use common::TestApp;
use serde_json::json;

const BOUNDARY: &str = "mfg-test-boundary";

fn multipart_body(file_name: &str, content: &str) -> String {
    format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"note\"\r\n\r\n\
         ignored\r\n\
         --{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
         Content-Type: text/plain\r\n\r\n\
         {content}\r\n\
         --{BOUNDARY}--\r\n"
    )
}

#[tokio::test]
async fn upload_then_delete_a_file() {
    let app = TestApp::new().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/uploads")
        .header("authorization", format!("Bearer {}", app.user.token))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body("spec sheet.TXT", "batch notes")))
        .unwrap();

    let response = app.send(request).await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    let files = response.body["files"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["original_name"], "spec sheet.TXT");
    assert_eq!(files[0]["size"], 11);
    let name = files[0]["name"].as_str().unwrap().to_string();
    assert!(name.ends_with(".txt"), "stored as {name}");

    let deleted = app
        .delete(&format!("/api/v1/uploads/{name}"), &app.user)
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["status"], "deleted");

    let again = app
        .delete(&format!("/api/v1/uploads/{name}"), &app.user)
        .await;
    assert_eq!(again.body["status"], "not_found");
}

#[tokio::test]
async fn uploads_need_a_session() {
    let app = TestApp::new().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/uploads")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body("a.txt", "x")))
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn material_codes_are_generated_and_deletes_respect_references() {
    let app = TestApp::new().await;

    let denied = app
        .post(
            "/api/v1/materials",
            json!({"name": "Lavender oil", "quantity": 5, "unit": "l", "material_type": "INGREDIENT"}),
            &app.user,
        )
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let created = app
        .post(
            "/api/v1/materials",
            json!({"name": "Lavender oil", "quantity": 5, "unit": "l", "material_type": "INGREDIENT"}),
            &app.admin,
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
    assert!(!created.body["code"].as_str().unwrap().is_empty());
    assert_eq!(created.body["status"], "AVAILABLE");
    let material_id = created.body["id"].clone();

    let empty = app
        .post(
            "/api/v1/materials",
            json!({"name": "Rose water", "quantity": 0, "unit": "l", "material_type": "INGREDIENT"}),
            &app.admin,
        )
        .await;
    assert_eq!(empty.body["status"], "OUT_OF_STOCK");

    let request = app
        .post(
            "/api/v1/requests",
            json!({
                "title": "Lavender bars",
                "source": "WEBSITE",
                "materials": [{"material_id": material_id, "quantity": 1}],
            }),
            &app.user,
        )
        .await;
    assert_eq!(request.status, StatusCode::CREATED);

    let blocked = app
        .delete(
            &format!("/api/v1/materials/{}", material_id.as_str().unwrap()),
            &app.admin,
        )
        .await;
    assert_eq!(blocked.status, StatusCode::CONFLICT);

    let listed = app
        .get("/api/v1/materials?search=lavender", &app.user)
        .await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.body["pagination"]["total"], 1);
}

#[tokio::test]
async fn customer_category_drives_request_code() {
    let app = TestApp::new().await;
    let customer = app
        .post(
            "/api/v1/customers",
            json!({"name": "Corner Shop", "email": "Buyer@Corner.test"}),
            &app.admin,
        )
        .await;
    assert_eq!(customer.status, StatusCode::CREATED, "{}", customer.body);
    assert_eq!(customer.body["email"], "buyer@corner.test");

    let request = app
        .post(
            "/api/v1/requests",
            json!({
                "title": "Private label",
                "source": "CUSTOMER_REFERRED",
                "customer_id": customer.body["id"],
            }),
            &app.user,
        )
        .await;
    assert_eq!(request.status, StatusCode::CREATED, "{}", request.body);
    assert!(request.body["code"].as_str().unwrap().starts_with("RD-"));

    let blocked = app
        .delete(
            &format!(
                "/api/v1/customers/{}",
                customer.body["id"].as_str().unwrap()
            ),
            &app.admin,
        )
        .await;
    assert_eq!(blocked.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn health_and_status_answer() {
    let app = TestApp::new().await;
    let health = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["status"], "up");

    let status = app.request(Method::GET, "/status", None, None).await;
    assert_eq!(status.status, StatusCode::OK);
    assert_eq!(status.body["checks"]["database"]["status"], "up");
    assert_eq!(status.body["reservation_mode"], "Reserve");
}

#[tokio::test]
async fn broadcast_reaches_every_active_user_and_marks_read_per_owner() {
    let app = TestApp::new().await;

    let denied = app
        .post(
            "/api/v1/notifications/broadcast",
            json!({"title": "Line 2 shutdown", "body": "Maintenance at 14:00"}),
            &app.user,
        )
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let sent = app
        .post(
            "/api/v1/notifications/broadcast",
            json!({"title": "Line 2 shutdown", "body": "Maintenance at 14:00"}),
            &app.admin,
        )
        .await;
    assert_eq!(sent.status, StatusCode::OK);
    assert_eq!(sent.body["recipients"], 3);

    let mine = app.get("/api/v1/notifications", &app.user).await;
    assert_eq!(mine.status, StatusCode::OK);
    assert_eq!(mine.body["pagination"]["total"], 1);
    let id = mine.body["data"][0]["id"].as_str().unwrap().to_string();

    let foreign = app
        .patch(
            &format!("/api/v1/notifications/{id}/read"),
            json!({}),
            &app.admin,
        )
        .await;
    assert_eq!(foreign.status, StatusCode::NOT_FOUND);

    let read = app
        .patch(
            &format!("/api/v1/notifications/{id}/read"),
            json!({}),
            &app.user,
        )
        .await;
    assert_eq!(read.status, StatusCode::OK);
    assert_eq!(read.body["is_read"], true);

    let unread = app
        .get("/api/v1/notifications?unread_only=true", &app.user)
        .await;
    assert_eq!(unread.body["pagination"]["total"], 0);
}

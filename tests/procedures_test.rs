mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::{json, Value};

async fn create_procedure(app: &TestApp, department: &Value) -> Value {
    let response = app
        .post(
            "/api/v1/procedures",
            json!({
                "name": "Cold process soap",
                "subprocesses": [
                    {"name": "Weigh oils", "step": 1, "department_id": department},
                    {"name": "Mix lye", "step": 2, "department_id": department},
                    {"name": "Cure", "step": 3, "department_id": department, "is_required": false},
                ],
            }),
            &app.admin,
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    response.body
}

async fn create_department(app: &TestApp) -> Value {
    let response = app
        .post(
            "/api/v1/departments",
            json!({"name": "Soap line"}),
            &app.admin,
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    response.body["id"].clone()
}

#[tokio::test]
async fn duplicate_steps_in_one_department_are_rejected() {
    let app = TestApp::new().await;
    let department = create_department(&app).await;

    let response = app
        .post(
            "/api/v1/procedures",
            json!({
                "name": "Broken",
                "subprocesses": [
                    {"name": "A", "step": 1, "department_id": department},
                    {"name": "B", "step": 1, "department_id": department},
                ],
            }),
            &app.admin,
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let procedure = create_procedure(&app, &department).await;
    let id = procedure["id"].as_str().unwrap();
    let clash = app
        .post(
            &format!("/api/v1/procedures/{id}/subprocesses"),
            json!({"name": "Extra", "step": 2, "department_id": department}),
            &app.admin,
        )
        .await;
    assert_eq!(clash.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn versions_count_up_per_name() {
    let app = TestApp::new().await;
    let department = create_department(&app).await;
    let first = create_procedure(&app, &department).await;
    let second = create_procedure(&app, &department).await;
    assert_eq!(first["version"], 1);
    assert_eq!(second["version"], 2);
    assert_eq!(first["subprocesses"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn swap_exchanges_steps() {
    let app = TestApp::new().await;
    let department = create_department(&app).await;
    let procedure = create_procedure(&app, &department).await;
    let subprocesses = procedure["subprocesses"].as_array().unwrap();
    let weigh = subprocesses.iter().find(|s| s["step"] == 1).unwrap();
    let cure = subprocesses.iter().find(|s| s["step"] == 3).unwrap();

    let response = app
        .post(
            "/api/v1/subprocesses/swap",
            json!({"first_id": weigh["id"], "second_id": cure["id"]}),
            &app.admin,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    assert_eq!(response.body["first"]["step"], 3);
    assert_eq!(response.body["second"]["step"], 1);

    let listed = app
        .get(
            &format!(
                "/api/v1/procedures/{}/subprocesses",
                procedure["id"].as_str().unwrap()
            ),
            &app.user,
        )
        .await;
    let steps: Vec<(String, i64)> = listed
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| (s["name"].as_str().unwrap().to_string(), s["step"].as_i64().unwrap()))
        .collect();
    assert!(steps.contains(&("Weigh oils".to_string(), 3)));
    assert!(steps.contains(&("Cure".to_string(), 1)));

    let denied = app
        .post(
            "/api/v1/subprocesses/swap",
            json!({"first_id": weigh["id"], "second_id": cure["id"]}),
            &app.user,
        )
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn progress_is_recorded_and_guarded() {
    let app = TestApp::new().await;
    let department = create_department(&app).await;
    let procedure = create_procedure(&app, &department).await;
    let subprocesses = procedure["subprocesses"].as_array().unwrap();
    let mix = subprocesses.iter().find(|s| s["step"] == 2).unwrap();
    let id = mix["id"].as_str().unwrap();
    let uri = format!("/api/v1/subprocesses/{id}/progress");

    let skipped = app
        .post(&uri, json!({"status": "SKIPPED"}), &app.user)
        .await;
    assert_eq!(skipped.status, StatusCode::BAD_REQUEST);

    let noop = app
        .post(&uri, json!({"status": "PENDING"}), &app.user)
        .await;
    assert_eq!(noop.status, StatusCode::BAD_REQUEST);

    let started = app
        .post(&uri, json!({"status": "IN_PROGRESS", "note": "batch 7"}), &app.user)
        .await;
    assert_eq!(started.status, StatusCode::OK, "{}", started.body);
    assert_eq!(started.body["status"], "IN_PROGRESS");

    let history = app
        .get(&format!("/api/v1/subprocesses/{id}/history"), &app.user)
        .await;
    let rows = history.body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["from_status"], "PENDING");
    assert_eq!(rows[0]["to_status"], "IN_PROGRESS");
    assert_eq!(rows[0]["changed_by"], json!(app.user.id));
}

#[tokio::test]
async fn deleting_a_procedure_removes_its_subprocesses() {
    let app = TestApp::new().await;
    let department = create_department(&app).await;
    let procedure = create_procedure(&app, &department).await;
    let id = procedure["id"].as_str().unwrap();
    let sub_id = procedure["subprocesses"][0]["id"].as_str().unwrap();

    let deleted = app
        .delete(&format!("/api/v1/procedures/{id}"), &app.admin)
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let gone = app
        .get(&format!("/api/v1/subprocesses/{sub_id}"), &app.user)
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

mod common;

use axum::http::StatusCode;
use common::TestApp;
use mfg_workflow_api::entities::material::MaterialType;
use serde_json::json;
use uuid::Uuid;

fn request_body(materials: serde_json::Value) -> serde_json::Value {
    json!({
        "title": "Pilot batch",
        "source": "WEBSITE",
        "materials": materials,
    })
}

#[tokio::test]
async fn create_reports_every_missing_or_inactive_material_at_once() {
    let app = TestApp::new().await;
    let missing = Uuid::new_v4();
    let inactive = app
        .seed_material("Old resin", MaterialType::Ingredient, 50, false)
        .await;
    let valid = app
        .seed_material("Cocoa butter", MaterialType::Ingredient, 50, true)
        .await;

    let response = app
        .post(
            "/api/v1/requests",
            request_body(json!([
                {"material_id": missing, "quantity": 1},
                {"material_id": inactive.id, "quantity": 1},
                {"material_id": valid.id, "quantity": 1},
            ])),
            &app.user,
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["code"], "NOT_FOUND");
    let message = response.body["message"].as_str().unwrap();
    assert!(message.contains(&missing.to_string()));
    assert!(message.contains(&inactive.id.to_string()));
    assert!(!message.contains(&valid.id.to_string()));
    assert_eq!(app.material_quantity(valid.id).await, 50);
}

#[tokio::test]
async fn requested_quantity_cannot_exceed_stock() {
    let app = TestApp::new().await;
    let material = app
        .seed_material("Glass jar", MaterialType::Accessory, 10, true)
        .await;

    let response = app
        .post(
            "/api/v1/requests",
            request_body(json!([{"material_id": material.id, "quantity": 11}])),
            &app.user,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .post(
            "/api/v1/requests",
            request_body(json!([{"material_id": material.id, "quantity": 10}])),
            &app.user,
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(app.material_quantity(material.id).await, 0);
}

#[tokio::test]
async fn created_request_gets_code_and_pending_status() {
    let app = TestApp::new().await;
    let material = app
        .seed_material("Shea", MaterialType::Ingredient, 5, true)
        .await;

    let response = app
        .post(
            "/api/v1/requests",
            request_body(json!([{"material_id": material.id, "quantity": 2}])),
            &app.user,
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["status"], "PENDING");
    assert_eq!(response.body["created_by"], json!(app.user.id));
    let code = response.body["code"].as_str().unwrap();
    assert!(code.starts_with("OT-"), "unexpected code {code}");
    assert!(code.ends_with("-001"), "unexpected code {code}");
    assert_eq!(response.body["materials"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn reservation_mode_controls_stock_decrement() {
    for (mode, expected) in [("reserve", 6), ("check-only", 10)] {
        let app = TestApp::with_reservation_mode(mode).await;
        let material = app
            .seed_material("Beeswax", MaterialType::Ingredient, 10, true)
            .await;

        let response = app
            .post(
                "/api/v1/requests",
                request_body(json!([{"material_id": material.id, "quantity": 4}])),
                &app.user,
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "mode {mode}");
        assert_eq!(app.material_quantity(material.id).await, expected, "mode {mode}");

        let id = response.body["id"].as_str().unwrap().to_string();
        let response = app
            .delete(&format!("/api/v1/requests/{id}"), &app.user)
            .await;
        assert_eq!(response.status, StatusCode::NO_CONTENT);
        assert_eq!(app.material_quantity(material.id).await, 10, "mode {mode}");
    }
}

#[tokio::test]
async fn update_replaces_the_whole_material_set() {
    let app = TestApp::new().await;
    let first = app
        .seed_material("Lye", MaterialType::Ingredient, 10, true)
        .await;
    let second = app
        .seed_material("Label", MaterialType::Accessory, 10, true)
        .await;

    let created = app
        .post(
            "/api/v1/requests",
            request_body(json!([{"material_id": first.id, "quantity": 3}])),
            &app.user,
        )
        .await;
    let id = created.body["id"].as_str().unwrap().to_string();

    let updated = app
        .put(
            &format!("/api/v1/requests/{id}"),
            json!({"materials": [{"material_id": second.id, "quantity": 2}]}),
            &app.user,
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    let lines = updated.body["materials"].as_array().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["material_id"], json!(second.id));
    assert_eq!(lines[0]["quantity"], 2);

    assert_eq!(app.material_quantity(first.id).await, 10);
    assert_eq!(app.material_quantity(second.id).await, 8);

    let untouched = app
        .put(
            &format!("/api/v1/requests/{id}"),
            json!({"title": "Renamed batch"}),
            &app.user,
        )
        .await;
    assert_eq!(untouched.body["title"], "Renamed batch");
    assert_eq!(untouched.body["materials"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn status_changes_reject_no_op_and_illegal_moves() {
    let app = TestApp::new().await;
    let created = app
        .post("/api/v1/requests", request_body(json!([])), &app.user)
        .await;
    let id = created.body["id"].as_str().unwrap().to_string();

    let same = app
        .patch(
            &format!("/api/v1/requests/{id}/status"),
            json!({"status": "PENDING"}),
            &app.user,
        )
        .await;
    assert_eq!(same.status, StatusCode::BAD_REQUEST);
    assert!(same.body["message"]
        .as_str()
        .unwrap()
        .contains("no-op transition not allowed"));

    let skip_ahead = app
        .patch(
            &format!("/api/v1/requests/{id}/status"),
            json!({"status": "COMPLETED"}),
            &app.user,
        )
        .await;
    assert_eq!(skip_ahead.status, StatusCode::BAD_REQUEST);

    let approved = app
        .post(
            &format!("/api/v1/requests/{id}/status-history"),
            json!({"status": "APPROVED", "note": "looks good"}),
            &app.user,
        )
        .await;
    assert_eq!(approved.status, StatusCode::OK);
    assert_eq!(approved.body["status"], "APPROVED");

    let history = app
        .get(&format!("/api/v1/requests/{id}/status-history"), &app.user)
        .await;
    let rows = history.body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["from_status"], "PENDING");
    assert_eq!(rows[0]["to_status"], "APPROVED");
    assert_eq!(rows[0]["changed_by"], json!(app.user.id));
}

#[tokio::test]
async fn approval_info_is_unique_and_blocks_delete() {
    let app = TestApp::new().await;
    let created = app
        .post("/api/v1/requests", request_body(json!([])), &app.user)
        .await;
    let id = created.body["id"].as_str().unwrap().to_string();
    let uri = format!("/api/v1/requests/{id}/approval-info");

    let forbidden = app
        .post(&uri, json!({"approval_type": "APPROVE"}), &app.user)
        .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let missing_reason = app
        .post(&uri, json!({"approval_type": "HOLD"}), &app.admin)
        .await;
    assert_eq!(missing_reason.status, StatusCode::BAD_REQUEST);

    let first = app
        .post(&uri, json!({"approval_type": "APPROVE"}), &app.admin)
        .await;
    assert_eq!(first.status, StatusCode::CREATED);

    let second = app
        .post(&uri, json!({"approval_type": "APPROVE"}), &app.admin)
        .await;
    assert_eq!(second.status, StatusCode::CONFLICT);

    let request = app
        .get(&format!("/api/v1/requests/{id}"), &app.user)
        .await;
    assert_eq!(request.body["status"], "APPROVED");
    assert_eq!(request.body["approval_info"]["approval_type"], "APPROVE");

    let delete = app
        .delete(&format!("/api/v1/requests/{id}"), &app.user)
        .await;
    assert_eq!(delete.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn add_and_remove_single_material_lines() {
    let app = TestApp::new().await;
    let material = app
        .seed_material("Wick", MaterialType::Accessory, 20, true)
        .await;
    let created = app
        .post("/api/v1/requests", request_body(json!([])), &app.user)
        .await;
    let id = created.body["id"].as_str().unwrap().to_string();
    let uri = format!("/api/v1/requests/{id}/materials");

    let line = app
        .post(&uri, json!({"material_id": material.id, "quantity": 5}), &app.user)
        .await;
    assert_eq!(line.status, StatusCode::CREATED);
    assert_eq!(app.material_quantity(material.id).await, 15);

    let duplicate = app
        .post(&uri, json!({"material_id": material.id, "quantity": 1}), &app.user)
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let removed = app
        .request(
            axum::http::Method::DELETE,
            &uri,
            Some(json!({"material_request_id": line.body["id"]})),
            Some(&app.user.token),
        )
        .await;
    assert_eq!(removed.status, StatusCode::NO_CONTENT);
    assert_eq!(app.material_quantity(material.id).await, 20);
}

#[tokio::test]
async fn list_uses_the_pagination_envelope() {
    let app = TestApp::new().await;
    for _ in 0..3 {
        let response = app
            .post("/api/v1/requests", request_body(json!([])), &app.user)
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
    }

    let page = app.get("/api/v1/requests?page=2&limit=2", &app.user).await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.body["data"].as_array().unwrap().len(), 1);
    assert_eq!(page.body["pagination"]["page"], 2);
    assert_eq!(page.body["pagination"]["limit"], 2);
    assert_eq!(page.body["pagination"]["total"], 3);
    assert_eq!(page.body["pagination"]["total_pages"], 2);
}

#[tokio::test]
async fn statistics_include_zero_counts() {
    let app = TestApp::new().await;
    let ingredient = app
        .seed_material("Oil", MaterialType::Ingredient, 10, true)
        .await;
    app.post(
        "/api/v1/requests",
        request_body(json!([{"material_id": ingredient.id, "quantity": 1}])),
        &app.user,
    )
    .await;

    let by_status = app
        .get("/api/v1/requests/statistics/status", &app.user)
        .await;
    let rows = by_status.body.as_array().unwrap();
    assert_eq!(rows.len(), 7);
    let pending = rows.iter().find(|r| r["status"] == "PENDING").unwrap();
    assert_eq!(pending["count"], 1);

    let by_type = app
        .get("/api/v1/requests/statistics/material-type", &app.user)
        .await;
    let rows = by_type.body.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    let accessory = rows
        .iter()
        .find(|r| r["material_type"] == "ACCESSORY")
        .unwrap();
    assert_eq!(accessory["count"], 0);
}

#[tokio::test]
async fn requests_need_a_session() {
    let app = TestApp::new().await;
    let response = app
        .request(axum::http::Method::GET, "/api/v1/requests", None, None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["code"], "AUTH_MISSING_HEADER");
}

#[tokio::test]
async fn second_request_sees_reserved_stock_only_in_reserve_mode() {
    for (mode, second_status) in [
        ("reserve", StatusCode::BAD_REQUEST),
        ("check-only", StatusCode::CREATED),
    ] {
        let app = TestApp::with_reservation_mode(mode).await;
        let material = app
            .seed_material("Tallow", MaterialType::Ingredient, 10, true)
            .await;

        let first = app
            .post(
                "/api/v1/requests",
                request_body(json!([{"material_id": material.id, "quantity": 5}])),
                &app.user,
            )
            .await;
        assert_eq!(first.status, StatusCode::CREATED, "mode {mode}");

        let second = app
            .post(
                "/api/v1/requests",
                request_body(json!([{"material_id": material.id, "quantity": 6}])),
                &app.user,
            )
            .await;
        assert_eq!(second.status, second_status, "mode {mode}");
    }
}

#[tokio::test]
async fn material_type_must_match_when_given() {
    let app = TestApp::new().await;
    let oil = app
        .seed_material("Argan oil", MaterialType::Ingredient, 20, true)
        .await;

    let response = app
        .post(
            "/api/v1/requests",
            request_body(json!([
                {"material_id": oil.id, "quantity": 2, "material_type": "ACCESSORY"}
            ])),
            &app.user,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let message = response.body["message"].as_str().unwrap();
    assert!(message.contains("type mismatch"));
    assert!(message.contains("expected ACCESSORY got INGREDIENT"));
    assert_eq!(app.material_quantity(oil.id).await, 20);

    let matching = app
        .post(
            "/api/v1/requests",
            request_body(json!([
                {"material_id": oil.id, "quantity": 2, "material_type": "INGREDIENT"}
            ])),
            &app.user,
        )
        .await;
    assert_eq!(matching.status, StatusCode::CREATED);
}

#[tokio::test]
async fn request_input_is_upserted_per_material() {
    let app = TestApp::new().await;
    let wax = app
        .seed_material("Beeswax", MaterialType::Ingredient, 5, true)
        .await;
    let input = |quantity: i32| {
        json!({
            "material_id": wax.id,
            "supplier": "Hive Co",
            "price": "12.50",
            "quantity": quantity,
        })
    };

    let first = app.put("/api/v1/request-inputs", input(40), &app.user).await;
    assert_eq!(first.status, StatusCode::OK);
    let second = app.put("/api/v1/request-inputs", input(75), &app.user).await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.body["id"], first.body["id"]);

    let listed = app.get("/api/v1/request-inputs", &app.user).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.body["pagination"]["total"], 1);
    assert_eq!(listed.body["data"][0]["quantity"], 75);
}

#[tokio::test]
async fn failed_create_leaves_nothing_behind() {
    let app = TestApp::new().await;
    let jar = app
        .seed_material("Amber jar", MaterialType::Accessory, 3, true)
        .await;
    let cap = app
        .seed_material("Jar cap", MaterialType::Accessory, 3, true)
        .await;

    let mut body = request_body(json!([
        {"material_id": cap.id, "quantity": 1},
        {"material_id": jar.id, "quantity": 4},
    ]));
    body["request_input"] = json!({
        "material_id": jar.id,
        "supplier": "Glassworks",
        "price": "0.80",
        "quantity": 500,
    });

    let response = app.post("/api/v1/requests", body, &app.user).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let requests = app.get("/api/v1/requests", &app.user).await;
    assert_eq!(requests.body["pagination"]["total"], 0);
    let inputs = app.get("/api/v1/request-inputs", &app.user).await;
    assert_eq!(inputs.body["pagination"]["total"], 0);
    assert_eq!(app.material_quantity(cap.id).await, 3);
    assert_eq!(app.material_quantity(jar.id).await, 3);
}

#[tokio::test]
async fn failed_replace_keeps_previous_lines_and_stock() {
    let app = TestApp::new().await;
    let soda = app
        .seed_material("Soda ash", MaterialType::Ingredient, 2, true)
        .await;

    let created = app
        .post(
            "/api/v1/requests",
            request_body(json!([{"material_id": soda.id, "quantity": 1}])),
            &app.user,
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.body["id"].as_str().unwrap().to_string();
    assert_eq!(app.material_quantity(soda.id).await, 1);

    let failed = app
        .put(
            &format!("/api/v1/requests/{id}"),
            json!({"materials": [{"material_id": Uuid::new_v4(), "quantity": 1}]}),
            &app.user,
        )
        .await;
    assert_eq!(failed.status, StatusCode::NOT_FOUND);

    let current = app.get(&format!("/api/v1/requests/{id}"), &app.user).await;
    let lines = current.body["materials"].as_array().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["material_id"], json!(soda.id));
    assert_eq!(app.material_quantity(soda.id).await, 1);
}

#[tokio::test]
async fn approval_matching_the_current_status_is_recorded_without_a_transition() {
    let app = TestApp::new().await;
    let material = app
        .seed_material("Citric acid", MaterialType::Ingredient, 10, true)
        .await;
    let created = app
        .post(
            "/api/v1/requests",
            request_body(json!([{"material_id": material.id, "quantity": 1}])),
            &app.user,
        )
        .await;
    let id = created.body["id"].as_str().unwrap().to_string();

    let moved = app
        .post(
            &format!("/api/v1/requests/{id}/status-history"),
            json!({"status": "APPROVED"}),
            &app.admin,
        )
        .await;
    assert_eq!(moved.status, StatusCode::OK);

    let info = app
        .post(
            &format!("/api/v1/requests/{id}/approval-info"),
            json!({"approval_type": "APPROVE"}),
            &app.admin,
        )
        .await;
    assert_eq!(info.status, StatusCode::CREATED);

    let request = app.get(&format!("/api/v1/requests/{id}"), &app.user).await;
    assert_eq!(request.body["status"], "APPROVED");
    let history = app
        .get(&format!("/api/v1/requests/{id}/status-history"), &app.user)
        .await;
    assert_eq!(history.body.as_array().unwrap().len(), 1);
}

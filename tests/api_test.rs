//! API integration tests
//!
//! End-to-end tests for the REST endpoints: record lifecycle, dynamic form
//! validation, and submission association rules.

use anyhow::Result;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use batchtrace::database::setup_database;
use batchtrace::server::app::create_app;
use sea_orm::Database;
use serde_json::{json, Value};
use tempfile::NamedTempFile;

/// Create a test server backed by a throwaway database file.
async fn setup_test_server() -> Result<(TestServer, NamedTempFile)> {
    let temp_file = NamedTempFile::new()?;
    let db_url = format!("sqlite://{}?mode=rwc", temp_file.path().display());

    let db = Database::connect(&db_url).await?;
    setup_database(&db).await?;

    let app = create_app(db, None).await?;
    let server = TestServer::new(app)?;

    Ok((server, temp_file))
}

fn batch_payload() -> Value {
    json!({
        "country": "KE",
        "production_type": "washed",
        "production_date": "2024-05-01T00:00:00Z",
        "form_gate_sourced": false,
        "cluster_group": "north",
        "quantity": 40,
        "uoms": "kg"
    })
}

fn bag_payload(batch_id: i64) -> Value {
    json!({
        "batch_id": batch_id,
        "internal_lot_number": "LOT-001",
        "state": "stored",
        "qr_code": "QR-001",
        "external_lot_number": "EXT-001",
        "external_update_date": "2024-05-02T00:00:00Z"
    })
}

async fn create_batch(server: &TestServer, extra: Value) -> Value {
    let mut payload = batch_payload();
    payload
        .as_object_mut()
        .unwrap()
        .extend(extra.as_object().unwrap().clone());
    let response = server.post("/api/v1/batches").json(&payload).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    response.json()
}

#[tokio::test]
async fn test_health_endpoint() -> Result<()> {
    let (server, _db) = setup_test_server().await?;

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["service"], "batchtrace");
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());

    Ok(())
}

#[tokio::test]
async fn test_batch_crud_and_display_code() -> Result<()> {
    let (server, _db) = setup_test_server().await?;

    let batch = create_batch(&server, json!({})).await;
    let batch_id = batch["id"].as_i64().unwrap();
    assert_eq!(batch["code"], format!("BATCH{}", batch_id));
    assert_eq!(batch["status"], "draft");
    assert!(batch["completed_at"].is_null());
    assert_eq!(batch["bag_count"], 0);

    // List includes the derived bag count
    let response = server.get("/api/v1/batches").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let batches: Vec<Value> = response.json();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0]["id"], batch_id);
    assert_eq!(batches[0]["bag_count"], 0);

    // Update keeps the code and moves the status
    let mut payload = batch_payload();
    payload["status"] = json!("working");
    payload["quantity"] = json!(45);
    let response = server
        .put(&format!("/api/v1/batches/{}", batch_id))
        .json(&payload)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let updated: Value = response.json();
    assert_eq!(updated["status"], "working");
    assert_eq!(updated["quantity"], 45);
    assert_eq!(updated["code"], format!("BATCH{}", batch_id));
    assert!(updated["completed_at"].is_null());
    assert_eq!(updated["bag_count"], 0);

    let response = server
        .delete(&format!("/api/v1/batches/{}", batch_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let response = server.get(&format!("/api/v1/batches/{}", batch_id)).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_completion_stamp_written_once() -> Result<()> {
    let (server, _db) = setup_test_server().await?;

    let batch = create_batch(&server, json!({"status": "working"})).await;
    let batch_id = batch["id"].as_i64().unwrap();
    assert!(batch["completed_at"].is_null());

    let mut payload = batch_payload();
    payload["status"] = json!("completed");
    let response = server
        .put(&format!("/api/v1/batches/{}", batch_id))
        .json(&payload)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let completed: Value = response.json();
    let stamp = completed["completed_at"].as_str().unwrap().to_string();

    // A privileged re-save in completed state keeps the first stamp
    let response = server
        .put(&format!("/api/v1/batches/{}", batch_id))
        .add_header(HeaderName::from_static("x-actor-id"), HeaderValue::from_static("1"))
        .add_header(
            HeaderName::from_static("x-actor-privileged"),
            HeaderValue::from_static("true"),
        )
        .json(&payload)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let resaved: Value = response.json();
    assert_eq!(resaved["completed_at"].as_str().unwrap(), stamp);

    // Moving away from completed does not clear it either
    payload["status"] = json!("working");
    let response = server
        .put(&format!("/api/v1/batches/{}", batch_id))
        .add_header(
            HeaderName::from_static("x-actor-privileged"),
            HeaderValue::from_static("true"),
        )
        .json(&payload)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let reopened: Value = response.json();
    assert_eq!(reopened["status"], "working");
    assert_eq!(reopened["completed_at"].as_str().unwrap(), stamp);

    Ok(())
}

#[tokio::test]
async fn test_completed_batch_locked_for_unprivileged_actors() -> Result<()> {
    let (server, _db) = setup_test_server().await?;

    let batch = create_batch(&server, json!({"status": "completed"})).await;
    let batch_id = batch["id"].as_i64().unwrap();
    assert!(batch["completed_at"].is_string());

    let response = server
        .put(&format!("/api/v1/batches/{}", batch_id))
        .json(&batch_payload())
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["error"], "completed_locked");

    let response = server
        .delete(&format!("/api/v1/batches/{}", batch_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    // The privileged escape hatch still works
    let response = server
        .put(&format!("/api/v1/batches/{}", batch_id))
        .add_header(
            HeaderName::from_static("x-actor-privileged"),
            HeaderValue::from_static("true"),
        )
        .json(&batch_payload())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server
        .delete(&format!("/api/v1/batches/{}", batch_id))
        .add_header(
            HeaderName::from_static("x-actor-privileged"),
            HeaderValue::from_static("true"),
        )
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    Ok(())
}

async fn create_form(server: &TestServer, payload: Value) -> Value {
    let response = server.post("/api/v1/forms").json(&payload).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    response.json()
}

fn intake_form_payload() -> Value {
    json!({
        "name": "Batch intake",
        "description": "Collected at the gate",
        "association_type": "batch",
        "fields": [
            {
                "name": "farm_name",
                "field_type": "text",
                "required": true,
                "validation_rules": {"min_length": 2, "max_length": 10}
            },
            {
                "name": "moisture",
                "field_type": "number",
                "required": false,
                "validation_rules": {"min_value": 0, "max_value": 100}
            },
            {
                "name": "grade",
                "field_type": "select",
                "required": false,
                "validation_rules": {"choices": ["AA", "AB", "C"]}
            }
        ]
    })
}

#[tokio::test]
async fn test_batch_form_data_validated_on_create() -> Result<()> {
    let (server, _db) = setup_test_server().await?;

    let form = create_form(&server, intake_form_payload()).await;
    let form_id = form["id"].as_i64().unwrap();
    assert_eq!(form["fields"].as_array().unwrap().len(), 3);

    // An empty mapping is still validated, so the required field fails it
    let mut payload = batch_payload();
    payload["form_id"] = json!(form_id);
    payload["form_data"] = json!({});
    let response = server.post("/api/v1/batches").json(&payload).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "Field 'farm_name' is required.");

    // Missing required field
    payload["form_data"] = json!({"moisture": 11});
    let response = server.post("/api/v1/batches").json(&payload).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "validation_failed");
    assert_eq!(body["message"], "Field 'farm_name' is required.");

    // Bound violation
    payload["form_data"] = json!({"farm_name": "K"});
    let response = server.post("/api/v1/batches").json(&payload).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(
        body["message"],
        "Field 'farm_name' must be at least 2 characters long."
    );

    // Undeclared key
    payload["form_data"] = json!({"farm_name": "Kianjiru", "altitude": 1800});
    let response = server.post("/api/v1/batches").json(&payload).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(
        body["message"],
        "Unexpected fields in form data: altitude."
    );

    // Choice outside the declared list
    payload["form_data"] = json!({"farm_name": "Kianjiru", "grade": "AAA"});
    let response = server.post("/api/v1/batches").json(&payload).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    // Valid data passes and is stored
    payload["form_data"] = json!({"farm_name": "Kianjiru", "moisture": 11.5, "grade": "AA"});
    let response = server.post("/api/v1/batches").json(&payload).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let batch: Value = response.json();
    assert_eq!(batch["form_data"]["grade"], "AA");

    Ok(())
}

#[tokio::test]
async fn test_form_binding_kind_is_enforced() -> Result<()> {
    let (server, _db) = setup_test_server().await?;

    let bag_form = create_form(
        &server,
        json!({
            "name": "Bag check",
            "association_type": "bag",
            "fields": []
        }),
    )
    .await;

    // A bag form cannot back a batch
    let mut payload = batch_payload();
    payload["form_id"] = bag_form["id"].clone();
    payload["form_data"] = json!({});
    let response = server.post("/api/v1/batches").json(&payload).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(
        body["message"],
        "Form association type \"bag\" does not match the associated object type \"batch\"."
    );

    // Binding a missing form is a 404
    payload["form_id"] = json!(9999);
    let response = server.post("/api/v1/batches").json(&payload).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_field_definition_gate() -> Result<()> {
    let (server, _db) = setup_test_server().await?;

    // Choice fields need a non-empty choice list
    let response = server
        .post("/api/v1/forms")
        .json(&json!({
            "name": "Broken",
            "association_type": "standalone",
            "fields": [
                {"name": "grade", "field_type": "select", "validation_rules": {"choices": []}}
            ]
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(
        body["message"],
        "Choices are required for select, radio, and checkbox fields."
    );

    // Uncompilable patterns are rejected at definition time
    let response = server
        .post("/api/v1/forms")
        .json(&json!({
            "name": "Broken",
            "association_type": "standalone",
            "fields": [
                {"name": "code", "field_type": "text", "validation_rules": {"regex": "["}}
            ]
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    // Unknown field type tags never reach storage
    let response = server
        .post("/api/v1/forms")
        .json(&json!({
            "name": "Broken",
            "association_type": "standalone",
            "fields": [{"name": "x", "field_type": "slider"}]
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    // Unknown association types too
    let response = server
        .post("/api/v1/forms")
        .json(&json!({"name": "Broken", "association_type": "pallet", "fields": []}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn test_form_update_replaces_field_set() -> Result<()> {
    let (server, _db) = setup_test_server().await?;

    let form = create_form(&server, intake_form_payload()).await;
    let form_id = form["id"].as_i64().unwrap();
    let farm_field_id = form["fields"][0]["id"].as_i64().unwrap();

    // Keep farm_name (renamed), drop the rest, add one
    let response = server
        .put(&format!("/api/v1/forms/{}", form_id))
        .json(&json!({
            "name": "Batch intake v2",
            "association_type": "batch",
            "fields": [
                {
                    "id": farm_field_id,
                    "name": "producer",
                    "field_type": "text",
                    "required": true,
                    "validation_rules": {"min_length": 2}
                },
                {"name": "organic", "field_type": "boolean", "required": false}
            ]
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let updated: Value = response.json();
    assert_eq!(updated["name"], "Batch intake v2");
    let fields = updated["fields"].as_array().unwrap();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0]["id"], farm_field_id);
    assert_eq!(fields[0]["name"], "producer");
    assert_eq!(fields[1]["name"], "organic");

    Ok(())
}

#[tokio::test]
async fn test_bag_belongs_to_batch() -> Result<()> {
    let (server, _db) = setup_test_server().await?;

    // Bags for a missing batch are rejected
    let response = server.post("/api/v1/bags").json(&bag_payload(999)).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let batch = create_batch(&server, json!({})).await;
    let batch_id = batch["id"].as_i64().unwrap();

    let response = server
        .post("/api/v1/bags")
        .json(&bag_payload(batch_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let bag: Value = response.json();
    assert_eq!(bag["batch_id"], batch_id);
    assert_eq!(bag["status"], "draft");

    // The parent's bag count reflects it
    let response = server.get(&format!("/api/v1/batches/{}", batch_id)).await;
    let fetched: Value = response.json();
    assert_eq!(fetched["bag_count"], 1);

    // And the list filter scopes by parent
    let response = server
        .get(&format!("/api/v1/bags?batch={}", batch_id))
        .await;
    let bags: Vec<Value> = response.json();
    assert_eq!(bags.len(), 1);

    let response = server.get("/api/v1/bags?batch=999").await;
    let bags: Vec<Value> = response.json();
    assert!(bags.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_submission_association_rules() -> Result<()> {
    let (server, _db) = setup_test_server().await?;

    let batch = create_batch(&server, json!({})).await;
    let batch_id = batch["id"].as_i64().unwrap();

    let batch_form = create_form(
        &server,
        json!({
            "name": "Quality check",
            "association_type": "batch",
            "fields": [
                {"name": "score", "field_type": "number", "required": true,
                 "validation_rules": {"min_value": 0, "max_value": 10}}
            ]
        }),
    )
    .await;
    let batch_form_id = batch_form["id"].as_i64().unwrap();

    // The pair is mandatory for an associated form
    let response = server
        .post("/api/v1/submissions")
        .json(&json!({"form_id": batch_form_id, "data": {"score": 7}}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    // The referenced record must exist
    let response = server
        .post("/api/v1/submissions")
        .json(&json!({
            "form_id": batch_form_id,
            "content_type": "batch",
            "object_id": 424242,
            "data": {"score": 7}
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "No batch found with ID 424242.");

    // A well-formed submission lands
    let response = server
        .post("/api/v1/submissions")
        .add_header(HeaderName::from_static("x-actor-id"), HeaderValue::from_static("5"))
        .json(&json!({
            "form_id": batch_form_id,
            "content_type": "batch",
            "object_id": batch_id,
            "data": {"score": 7}
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let submission: Value = response.json();
    assert_eq!(submission["content_type"], "batch");
    assert_eq!(submission["object_id"], batch_id);
    assert_eq!(submission["created_by"], 5);

    // A live bag referenced from a batch form is a mismatch naming both kinds
    let response = server
        .post("/api/v1/bags")
        .json(&bag_payload(batch_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let bag: Value = response.json();

    let response = server
        .post("/api/v1/submissions")
        .json(&json!({
            "form_id": batch_form_id,
            "content_type": "bag",
            "object_id": bag["id"],
            "data": {"score": 7}
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(
        body["message"],
        "Form association type \"batch\" does not match the associated object type \"bag\"."
    );

    // Standalone forms refuse any pairing
    let standalone = create_form(
        &server,
        json!({"name": "Notes", "association_type": "standalone", "fields": []}),
    )
    .await;
    let response = server
        .post("/api/v1/submissions")
        .json(&json!({
            "form_id": standalone["id"],
            "content_type": "batch",
            "object_id": batch_id,
            "data": {}
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    // An empty mapping on a form without required fields is fine
    let response = server
        .post("/api/v1/submissions")
        .json(&json!({"form_id": standalone["id"], "data": {}}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    // List filters: by form and by the form's association type
    let response = server
        .get(&format!("/api/v1/submissions?form={}", batch_form_id))
        .await;
    let submissions: Vec<Value> = response.json();
    assert_eq!(submissions.len(), 1);

    let response = server
        .get("/api/v1/submissions?association_type=standalone")
        .await;
    let submissions: Vec<Value> = response.json();
    assert_eq!(submissions.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_submission_data_validated() -> Result<()> {
    let (server, _db) = setup_test_server().await?;

    let form = create_form(
        &server,
        json!({
            "name": "Survey",
            "association_type": "standalone",
            "fields": [
                {"name": "contact", "field_type": "email", "required": true},
                {"name": "site", "field_type": "url", "required": false},
                {"name": "tags", "field_type": "checkbox", "required": false,
                 "validation_rules": {"choices": ["a", "b", "c"]}}
            ]
        }),
    )
    .await;
    let form_id = form["id"].as_i64().unwrap();

    let response = server
        .post("/api/v1/submissions")
        .json(&json!({"form_id": form_id, "data": {"contact": "not-an-email"}}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "Field 'contact' must be a valid email address.");

    let response = server
        .post("/api/v1/submissions")
        .json(&json!({
            "form_id": form_id,
            "data": {"contact": "a@b.co", "site": "https://example.com", "tags": ["a", "c"]}
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    // Checkbox selections outside the choice list are named in the error
    let response = server
        .post("/api/v1/submissions")
        .json(&json!({"form_id": form_id, "data": {"contact": "a@b.co", "tags": ["a", "z"]}}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "Field 'tags' has invalid choices: z.");

    Ok(())
}

#[tokio::test]
async fn test_error_handling() -> Result<()> {
    let (server, _db) = setup_test_server().await?;

    let response = server.get("/api/v1/batches/99999").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"], "not_found");

    let response = server.get("/api/v1/forms/99999").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = server.get("/api/v1/submissions/99999").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    // Unknown lifecycle status is a validation failure, not a crash
    let mut payload = batch_payload();
    payload["status"] = json!("shipped");
    let response = server.post("/api/v1/batches").json(&payload).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "Invalid status 'shipped'.");

    // Structurally invalid payloads are client errors
    let response = server
        .post("/api/v1/batches")
        .json(&json!({"country": "KE"}))
        .await;
    assert!(response.status_code().is_client_error());

    Ok(())
}

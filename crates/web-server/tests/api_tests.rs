//! End-to-end tests for the HR API, run against the in-memory store.

use axum::http::StatusCode;
use axum_test::TestServer;
use database::InMemoryRepository;
use serde_json::{json, Value};
use std::sync::Arc;
use web_server::{create_router, AppState};

fn test_server() -> TestServer {
    let state = AppState::new(Arc::new(InMemoryRepository::new()), None);
    TestServer::new(create_router(Arc::new(state))).unwrap()
}

async fn create_employee(server: &TestServer, number: &str) -> i64 {
    let response = server
        .post("/api/employees")
        .json(&json!({
            "employeeNumber": number,
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": format!("{number}@district.example"),
            "department": "Science",
            "position": "Teacher",
            "hireDate": "2024-08-15",
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["id"].as_i64().unwrap()
}

async fn default_timecard(server: &TestServer, employee_id: i64) -> Value {
    let cards: Vec<Value> = server
        .get(&format!("/api/employees/{employee_id}/timecards"))
        .await
        .json();
    assert_eq!(cards.len(), 1);
    cards[0].clone()
}

// ============ Health & auth ============

#[tokio::test]
async fn test_health_check() {
    let server = test_server();

    let response = server.get("/api/health").await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "ok");
}

#[tokio::test]
async fn test_login_checks_password() {
    let server = test_server();
    server
        .post("/api/users")
        .json(&json!({
            "username": "hr.admin",
            "password": "correct-horse",
            "fullName": "HR Admin",
            "role": "hr",
        }))
        .await
        .assert_status(StatusCode::CREATED);

    let ok = server
        .post("/api/auth/login")
        .json(&json!({ "username": "hr.admin", "password": "correct-horse" }))
        .await;
    ok.assert_status_ok();
    let user: Value = ok.json();
    assert_eq!(user["role"], "hr");
    assert!(user.get("passwordHash").is_none());

    server
        .post("/api/auth/login")
        .json(&json!({ "username": "hr.admin", "password": "wrong-password" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .post("/api/auth/login")
        .json(&json!({ "username": "nobody", "password": "correct-horse" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

// ============ Employees & time cards ============

#[tokio::test]
async fn test_new_employee_gets_one_draft_timecard() {
    let server = test_server();
    let employee_id = create_employee(&server, "E-100").await;

    let card = default_timecard(&server, employee_id).await;
    assert_eq!(card["status"], "draft");
    assert_eq!(card["weekStart"], "2024-08-12");

    let all: Vec<Value> = server.get("/api/timecards").await.json();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_duplicate_employee_number_conflicts() {
    let server = test_server();
    create_employee(&server, "E-101").await;

    let response = server
        .post("/api/employees")
        .json(&json!({
            "employeeNumber": "E-101",
            "firstName": "Other",
            "lastName": "Person",
            "email": "other@district.example",
            "department": "Science",
            "position": "Aide",
            "hireDate": "2024-09-01",
        }))
        .await;
    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_blank_employee_type_update_is_rejected() {
    let server = test_server();
    let employee_id = create_employee(&server, "E-106").await;

    server
        .patch(&format!("/api/employees/{employee_id}"))
        .json(&json!({ "employeeType": "" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    let employee: Value = server.get(&format!("/api/employees/{employee_id}")).await.json();
    assert!(!employee["employeeType"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_timecard_stages_run_in_order() {
    let server = test_server();
    let employee_id = create_employee(&server, "E-102").await;
    let card_id = default_timecard(&server, employee_id).await["id"].as_i64().unwrap();

    // Skipping ahead is refused and changes nothing.
    server
        .post(&format!("/api/timecards/{card_id}/admin-approve"))
        .await
        .assert_status(StatusCode::CONFLICT);
    let unchanged: Value = server.get(&format!("/api/timecards/{card_id}")).await.json();
    assert_eq!(unchanged["status"], "draft");
    assert!(unchanged["adminApprovedAt"].is_null());

    for (step, status) in [
        ("submit", "secretary_submitted"),
        ("employee-approve", "employee_approved"),
        ("admin-approve", "admin_approved"),
        ("payroll-process", "payroll_processed"),
    ] {
        let response = server.post(&format!("/api/timecards/{card_id}/{step}")).await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["status"], status);
    }

    server
        .post(&format!("/api/timecards/{card_id}/submit"))
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_rejecting_timecard_needs_reason() {
    let server = test_server();
    let employee_id = create_employee(&server, "E-103").await;
    let card_id = default_timecard(&server, employee_id).await["id"].as_i64().unwrap();
    server
        .post(&format!("/api/timecards/{card_id}/submit"))
        .await
        .assert_status_ok();

    server
        .post(&format!("/api/timecards/{card_id}/reject"))
        .json(&json!({}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .post(&format!("/api/timecards/{card_id}/reject"))
        .json(&json!({ "reason": "Missing Friday hours" }))
        .await;
    response.assert_status_ok();
    let card: Value = response.json();
    assert_eq!(card["status"], "rejected");
    assert_eq!(card["rejectionReason"], "Missing Friday hours");

    // Sent back to the secretary, the card is editable again.
    server
        .patch(&format!("/api/timecards/{card_id}"))
        .json(&json!({ "regularHours": 40, "notes": "Corrected" }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_submitted_timecard_cannot_be_edited() {
    let server = test_server();
    let employee_id = create_employee(&server, "E-104").await;
    let before = default_timecard(&server, employee_id).await;
    let card_id = before["id"].as_i64().unwrap();
    server
        .post(&format!("/api/timecards/{card_id}/submit"))
        .await
        .assert_status_ok();

    server
        .patch(&format!("/api/timecards/{card_id}"))
        .json(&json!({ "regularHours": 40 }))
        .await
        .assert_status(StatusCode::CONFLICT);
    let card: Value = server.get(&format!("/api/timecards/{card_id}")).await.json();
    assert_eq!(card["status"], "secretary_submitted");
    assert_eq!(card["regularHours"], before["regularHours"]);

    server
        .patch("/api/timecards/9999")
        .json(&json!({ "regularHours": 40 }))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_timecard_hours_too_large_to_add_are_a_bad_request() {
    let server = test_server();
    let employee_id = create_employee(&server, "E-105").await;

    server
        .post("/api/timecards")
        .json(&json!({
            "employeeId": employee_id,
            "weekStart": "2024-08-19",
            "regularHours": "50000000000000000000000000000",
            "overtimeHours": "50000000000000000000000000000",
        }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let card_id = default_timecard(&server, employee_id).await["id"].as_i64().unwrap();
    server
        .put(&format!("/api/timecards/{card_id}"))
        .json(&json!({
            "regularHours": "50000000000000000000000000000",
            "overtimeHours": "50000000000000000000000000000",
        }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

// ============ Leave ============

async fn create_leave_request(server: &TestServer, employee_id: i64) -> i64 {
    let response = server
        .post("/api/leave-requests")
        .json(&json!({
            "employeeId": employee_id,
            "startDate": "2024-10-07",
            "endDate": "2024-10-08",
            "reason": "Family visit",
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let request: Value = response.json();
    assert_eq!(request["status"], "pending");
    request["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_leave_requests_are_decided_once() {
    let server = test_server();
    let employee_id = create_employee(&server, "E-110").await;

    for (step, status) in [
        ("approve", "approved"),
        ("reject", "rejected"),
        ("cancel", "cancelled"),
    ] {
        let id = create_leave_request(&server, employee_id).await;
        let response = server
            .post(&format!("/api/leave-requests/{id}/{step}"))
            .json(&json!({ "notes": "Reviewed by principal" }))
            .await;
        response.assert_status_ok();
        let decided: Value = response.json();
        assert_eq!(decided["status"], status);

        for again in ["approve", "reject", "cancel"] {
            server
                .post(&format!("/api/leave-requests/{id}/{again}"))
                .await
                .assert_status(StatusCode::CONFLICT);
        }
        let after: Value = server.get(&format!("/api/leave-requests/{id}")).await.json();
        assert_eq!(after["status"], status);
    }

    server
        .post("/api/leave-requests/9999/approve")
        .await
        .assert_status_not_found();
}

// ============ Payroll ============

#[tokio::test]
async fn test_payroll_record_is_processed_then_paid() {
    let server = test_server();
    let employee_id = create_employee(&server, "E-120").await;

    let created = server
        .post("/api/payroll")
        .json(&json!({
            "employeeId": employee_id,
            "payPeriodStart": "2024-09-01",
            "payPeriodEnd": "2024-09-15",
            "grossPay": 2000,
            "deductions": 300,
        }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let record: Value = created.json();
    let id = record["id"].as_i64().unwrap();
    assert_eq!(record["status"], "pending");

    server
        .post(&format!("/api/payroll/{id}/mark-paid"))
        .await
        .assert_status(StatusCode::CONFLICT);

    let processed: Value = server.post(&format!("/api/payroll/{id}/process")).await.json();
    assert_eq!(processed["status"], "processed");
    assert!(processed["processedAt"].is_string());
    assert!(processed["paidAt"].is_null());
    server
        .post(&format!("/api/payroll/{id}/process"))
        .await
        .assert_status(StatusCode::CONFLICT);

    let paid: Value = server.post(&format!("/api/payroll/{id}/mark-paid")).await.json();
    assert_eq!(paid["status"], "paid");
    assert!(paid["paidAt"].is_string());
    assert_eq!(paid["processedAt"], processed["processedAt"]);

    for step in ["process", "mark-paid"] {
        server
            .post(&format!("/api/payroll/{id}/{step}"))
            .await
            .assert_status(StatusCode::CONFLICT);
    }
    let after: Value = server.get(&format!("/api/payroll/{id}")).await.json();
    assert_eq!(after["paidAt"], paid["paidAt"]);
    assert_eq!(after["processedAt"], processed["processedAt"]);
}

// ============ Extra pay ============

#[tokio::test]
async fn test_extra_pay_request_lifecycle() {
    let server = test_server();
    let employee_id = create_employee(&server, "E-200").await;

    let contract: Value = server
        .post("/api/extra-pay/contracts")
        .json(&json!({
            "title": "Robotics club advisor",
            "contractType": "stipend",
            "amount": 1500,
            "startDate": "2024-09-01",
        }))
        .await
        .json();
    let contract_id = contract["id"].as_i64().unwrap();

    let created = server
        .post("/api/extra-pay/requests")
        .json(&json!({ "contractId": contract_id, "employeeId": employee_id }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let request: Value = created.json();
    let request_id = request["id"].as_i64().unwrap();
    assert_eq!(request["status"], "pending");
    assert_eq!(request["amount"], contract["amount"]);

    // Payment before approval is refused.
    server
        .post(&format!("/api/extra-pay/requests/{request_id}/mark-paid"))
        .await
        .assert_status(StatusCode::CONFLICT);

    let approved: Value = server
        .post(&format!("/api/extra-pay/requests/{request_id}/approve"))
        .json(&json!({ "actorId": null }))
        .await
        .json();
    assert_eq!(approved["status"], "approved");
    assert!(approved["approvedAt"].is_string());
    assert!(approved["paidAt"].is_null());

    let paid: Value = server
        .post(&format!("/api/extra-pay/requests/{request_id}/mark-paid"))
        .await
        .json();
    assert_eq!(paid["status"], "paid");
    assert!(paid["paidAt"].is_string());
    assert_eq!(paid["approvedAt"], approved["approvedAt"]);

    for step in ["approve", "mark-paid", "reject"] {
        server
            .post(&format!("/api/extra-pay/requests/{request_id}/{step}"))
            .await
            .assert_status(StatusCode::CONFLICT);
    }
    let after: Value = server
        .get(&format!("/api/extra-pay/requests/{request_id}"))
        .await
        .json();
    assert_eq!(after["paidAt"], paid["paidAt"]);
    assert_eq!(after["approvedAt"], approved["approvedAt"]);
}

#[tokio::test]
async fn test_extra_pay_request_for_unknown_contract_is_rejected() {
    let server = test_server();
    let employee_id = create_employee(&server, "E-201").await;

    server
        .post("/api/extra-pay/requests")
        .json(&json!({ "contractId": 9999, "employeeId": employee_id }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

// ============ Personnel action forms ============

#[tokio::test]
async fn test_paf_without_justification_is_not_saved() {
    let server = test_server();

    let response = server
        .post("/api/paf/submit")
        .json(&json!({
            "pafType": "new_position",
            "positionTitle": "Reading Specialist",
            "department": "Elementary",
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["error"]
        .as_str()
        .unwrap()
        .contains("justification"));

    let pafs: Vec<Value> = server.get("/api/paf").await.json();
    assert!(pafs.is_empty());
}

#[tokio::test]
async fn test_paf_review_flow() {
    let server = test_server();

    let draft: Value = server
        .post("/api/paf")
        .json(&json!({
            "pafType": "new_position",
            "positionTitle": "Reading Specialist",
            "department": "Elementary",
            "justification": "Enrollment growth",
        }))
        .await
        .json();
    let id = draft["id"].as_i64().unwrap();
    assert_eq!(draft["status"], "draft");
    assert!(draft["submittedAt"].is_null());

    server
        .post(&format!("/api/paf/{id}/approve"))
        .await
        .assert_status(StatusCode::CONFLICT);

    for (step, status) in [
        ("submit", "submitted"),
        ("review", "under_review"),
        ("approve", "approved"),
    ] {
        let response = server.post(&format!("/api/paf/{id}/{step}")).await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["status"], status);
    }

    server
        .patch(&format!("/api/paf/{id}"))
        .json(&json!({ "department": "Secondary" }))
        .await
        .assert_status(StatusCode::CONFLICT);
}

// ============ Onboarding & signatures ============

#[tokio::test]
async fn test_onboarding_workflow_advances_to_completion() {
    let server = test_server();
    let employee_id = create_employee(&server, "E-130").await;

    let created = server
        .post("/api/onboarding/workflows")
        .json(&json!({
            "employeeId": employee_id,
            "title": "New teacher onboarding",
            "totalSteps": 2,
        }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let workflow: Value = created.json();
    let id = workflow["id"].as_i64().unwrap();
    assert_eq!(workflow["status"], "not_started");
    assert_eq!(workflow["currentStep"], 0);

    for (step, status) in [(1, "in_progress"), (2, "completed")] {
        let response = server.post(&format!("/api/onboarding/workflows/{id}/advance")).await;
        response.assert_status_ok();
        let advanced: Value = response.json();
        assert_eq!(advanced["currentStep"], step);
        assert_eq!(advanced["status"], status);
    }

    server
        .post(&format!("/api/onboarding/workflows/{id}/advance"))
        .await
        .assert_status(StatusCode::CONFLICT);
    let done: Value = server.get(&format!("/api/onboarding/workflows/{id}")).await.json();
    assert_eq!(done["currentStep"], 2);

    server
        .post("/api/onboarding/workflows/9999/advance")
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_signature_request_is_signed_once() {
    let server = test_server();
    let employee_id = create_employee(&server, "E-140").await;

    let request: Value = server
        .post("/api/signature-requests")
        .json(&json!({
            "employeeId": employee_id,
            "documentTitle": "Employment contract",
            "documentType": "contract",
        }))
        .await
        .json();
    let id = request["id"].as_i64().unwrap();
    assert_eq!(request["status"], "pending");

    server
        .post(&format!("/api/signature-requests/{id}/sign"))
        .json(&json!({}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .post(&format!("/api/signature-requests/{id}/sign"))
        .json(&json!({ "signatureData": "Ada Lovelace" }))
        .await;
    response.assert_status_ok();
    let signed: Value = response.json();
    assert_eq!(signed["status"], "signed");
    assert_eq!(signed["signatureData"], "Ada Lovelace");
    assert!(signed["signedAt"].is_string());

    server
        .post(&format!("/api/signature-requests/{id}/sign"))
        .json(&json!({ "signatureData": "Someone Else" }))
        .await
        .assert_status(StatusCode::CONFLICT);
    server
        .post(&format!("/api/signature-requests/{id}/decline"))
        .await
        .assert_status(StatusCode::CONFLICT);
}

// ============ Employee accounts ============

#[tokio::test]
async fn test_account_access_survives_suspend_and_is_cleared_by_revoke() {
    let server = test_server();
    let employee_id = create_employee(&server, "E-150").await;

    let created = server
        .post("/api/employee-accounts")
        .json(&json!({
            "employeeId": employee_id,
            "username": "alovelace",
            "email": "alovelace@district.example",
        }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let account: Value = created.json();
    let id = account["id"].as_i64().unwrap();
    assert_eq!(account["status"], "pending");
    assert_eq!(account["accessLevel"], "none");

    // Only active accounts can be suspended.
    server
        .post(&format!("/api/employee-accounts/{id}/suspend"))
        .await
        .assert_status(StatusCode::CONFLICT);

    let granted: Value = server
        .post(&format!("/api/employee-accounts/{id}/grant-access"))
        .json(&json!({ "accessLevel": "standard" }))
        .await
        .json();
    assert_eq!(granted["status"], "active");
    assert_eq!(granted["accessLevel"], "standard");
    assert!(granted["grantedAt"].is_string());

    let suspended: Value = server
        .post(&format!("/api/employee-accounts/{id}/suspend"))
        .await
        .json();
    assert_eq!(suspended["status"], "suspended");
    assert_eq!(suspended["accessLevel"], "standard");

    let revoked: Value = server
        .post(&format!("/api/employee-accounts/{id}/revoke-access"))
        .await
        .json();
    assert_eq!(revoked["status"], "revoked");
    assert_eq!(revoked["accessLevel"], "none");
    assert!(revoked["revokedAt"].is_string());

    for step in ["grant-access", "suspend", "revoke-access"] {
        server
            .post(&format!("/api/employee-accounts/{id}/{step}"))
            .await
            .assert_status(StatusCode::CONFLICT);
    }
}

// ============ Workflow templates ============

#[tokio::test]
async fn test_deleted_template_is_gone() {
    let server = test_server();

    let template: Value = server
        .post("/api/workflow-templates")
        .json(&json!({
            "name": "Classified hire",
            "category": "onboarding",
            "steps": [
                { "name": "Principal sign-off" },
                { "name": "HR review", "role": "hr" },
            ],
        }))
        .await
        .json();
    let id = template["id"].as_i64().unwrap();
    assert_eq!(template["steps"][1]["order"], 2);

    server
        .delete(&format!("/api/workflow-templates/{id}"))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    server
        .get(&format!("/api/workflow-templates/{id}"))
        .await
        .assert_status_not_found();
    let remaining: Vec<Value> = server.get("/api/workflow-templates").await.json();
    assert!(remaining.iter().all(|t| t["id"] != id));
}

// ============ Audit & admin ============

#[tokio::test]
async fn test_state_changes_are_audited() {
    let server = test_server();
    let employee_id = create_employee(&server, "E-300").await;

    let logs: Vec<Value> = server
        .get(&format!("/api/audit-logs?entityType=employee&entityId={employee_id}"))
        .await
        .json();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["action"], "create");
}

#[tokio::test]
async fn test_cleanup_twice_removes_nothing_the_second_time() {
    let server = test_server();
    create_employee(&server, "E-400").await;
    server
        .post("/api/users")
        .json(&json!({
            "username": "clerk",
            "password": "long-enough",
            "fullName": "Front Office Clerk",
        }))
        .await
        .assert_status(StatusCode::CREATED);

    let first: Value = server.post("/api/admin/cleanup").await.json();
    assert!(first["rowsDeleted"].as_u64().unwrap() > 0);
    assert!(first["errors"].as_array().unwrap().is_empty());

    let second: Value = server.post("/api/admin/cleanup").await.json();
    assert_eq!(second["rowsDeleted"], 0);

    let employees: Vec<Value> = server.get("/api/employees").await.json();
    assert!(employees.is_empty());
    // Staff accounts survive a reset.
    let users: Vec<Value> = server.get("/api/users").await.json();
    assert_eq!(users.len(), 1);
}

use alerter::EmailAlerter;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
    Router,
};
use configuration::Settings;
use database::HrStore;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer, ExposeHeaders},
    trace::TraceLayer,
};

pub mod alerting;
pub mod auth;
pub mod error;
pub mod handlers;

use handlers::{
    accounts, admin, audit, dashboard, employees, extra_pay, leave, onboarding, paf, payroll,
    signatures, timecards, users, workflows,
};

const DEFAULT_BODY_LIMIT_MB: usize = 10;

/// The shared application state that all handlers can access.
pub struct AppState {
    pub store: Arc<dyn HrStore>,
    /// `None` when SMTP is not configured; server errors are then only logged.
    pub alerter: Option<Arc<EmailAlerter>>,
    pub body_limit_bytes: usize,
}

impl AppState {
    pub fn new(store: Arc<dyn HrStore>, alerter: Option<Arc<EmailAlerter>>) -> Self {
        Self {
            store,
            alerter,
            body_limit_bytes: DEFAULT_BODY_LIMIT_MB * 1024 * 1024,
        }
    }

    pub fn with_body_limit_mb(mut self, megabytes: usize) -> Self {
        self.body_limit_bytes = megabytes * 1024 * 1024;
        self
    }
}

/// Builds the full HTTP API over the given state.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any())
        .expose_headers(ExposeHeaders::any());
    let body_limit = state.body_limit_bytes;

    Router::new()
        .route("/api/health", get(handlers::health))
        // --- Users ---
        .route("/api/auth/login", post(users::login))
        .route("/api/users", get(users::list_users).post(users::create_user))
        .route("/api/users/:id", get(users::get_user).delete(users::delete_user))
        .route("/api/dashboard/stats", get(dashboard::dashboard_stats))
        // --- Employees ---
        .route("/api/employees", get(employees::list_employees).post(employees::create_employee))
        .route(
            "/api/employees/:id",
            get(employees::get_employee)
                .patch(employees::update_employee)
                .put(employees::update_employee)
                .delete(employees::delete_employee),
        )
        .route("/api/employees/:id/timecards", get(employees::employee_timecards))
        .route("/api/employees/:id/leave-requests", get(employees::employee_leave_requests))
        .route("/api/employees/:id/payroll", get(employees::employee_payroll))
        // --- Leave ---
        .route("/api/leave-types", get(leave::list_leave_types).post(leave::create_leave_type))
        .route("/api/leave-types/:id", delete(leave::delete_leave_type))
        .route(
            "/api/leave-requests",
            get(leave::list_leave_requests).post(leave::create_leave_request),
        )
        .route(
            "/api/leave-requests/:id",
            get(leave::get_leave_request).delete(leave::delete_leave_request),
        )
        .route("/api/leave-requests/:id/approve", post(leave::approve_leave_request))
        .route("/api/leave-requests/:id/reject", post(leave::reject_leave_request))
        .route("/api/leave-requests/:id/cancel", post(leave::cancel_leave_request))
        // --- Time cards ---
        .route("/api/timecards", get(timecards::list_timecards).post(timecards::create_timecard))
        .route(
            "/api/timecards/:id",
            get(timecards::get_timecard)
                .patch(timecards::update_timecard)
                .put(timecards::update_timecard)
                .delete(timecards::delete_timecard),
        )
        .route("/api/timecards/:id/submit", post(timecards::submit_timecard))
        .route("/api/timecards/:id/employee-approve", post(timecards::employee_approve_timecard))
        .route("/api/timecards/:id/admin-approve", post(timecards::admin_approve_timecard))
        .route("/api/timecards/:id/payroll-process", post(timecards::payroll_process_timecard))
        .route("/api/timecards/:id/reject", post(timecards::reject_timecard))
        // --- Payroll ---
        .route(
            "/api/payroll",
            get(payroll::list_payroll_records).post(payroll::create_payroll_record),
        )
        .route(
            "/api/payroll/:id",
            get(payroll::get_payroll_record).delete(payroll::delete_payroll_record),
        )
        .route("/api/payroll/:id/process", post(payroll::process_payroll_record))
        .route("/api/payroll/:id/mark-paid", post(payroll::mark_payroll_record_paid))
        // --- Extra pay ---
        .route(
            "/api/extra-pay/contracts",
            get(extra_pay::list_contracts).post(extra_pay::create_contract),
        )
        .route(
            "/api/extra-pay/contracts/:id",
            get(extra_pay::get_contract)
                .patch(extra_pay::update_contract)
                .put(extra_pay::update_contract)
                .delete(extra_pay::delete_contract),
        )
        .route("/api/extra-pay/contracts/:id/requests", get(extra_pay::list_contract_requests))
        .route(
            "/api/extra-pay/requests",
            get(extra_pay::list_requests).post(extra_pay::create_request),
        )
        .route(
            "/api/extra-pay/requests/:id",
            get(extra_pay::get_request).delete(extra_pay::delete_request),
        )
        .route("/api/extra-pay/requests/:id/approve", post(extra_pay::approve_request))
        .route("/api/extra-pay/requests/:id/reject", post(extra_pay::reject_request))
        .route("/api/extra-pay/requests/:id/mark-paid", post(extra_pay::mark_request_paid))
        // --- Onboarding ---
        .route(
            "/api/onboarding/workflows",
            get(onboarding::list_workflows).post(onboarding::create_workflow),
        )
        .route(
            "/api/onboarding/workflows/:id",
            get(onboarding::get_workflow)
                .patch(onboarding::update_workflow)
                .put(onboarding::update_workflow)
                .delete(onboarding::delete_workflow),
        )
        .route("/api/onboarding/workflows/:id/advance", post(onboarding::advance_workflow))
        .route("/api/onboarding/forms", get(onboarding::list_forms).post(onboarding::create_form))
        .route(
            "/api/onboarding/forms/:id",
            get(onboarding::get_form)
                .patch(onboarding::update_form)
                .put(onboarding::update_form)
                .delete(onboarding::delete_form),
        )
        .route(
            "/api/onboarding/forms/:id/submissions",
            get(onboarding::list_submissions).post(onboarding::create_submission),
        )
        // --- Signatures ---
        .route(
            "/api/signature-requests",
            get(signatures::list_signature_requests).post(signatures::create_signature_request),
        )
        .route(
            "/api/signature-requests/:id",
            get(signatures::get_signature_request).delete(signatures::delete_signature_request),
        )
        .route("/api/signature-requests/:id/sign", post(signatures::sign_document))
        .route("/api/signature-requests/:id/decline", post(signatures::decline_document))
        // --- Personnel action forms ---
        .route("/api/paf", get(paf::list_pafs).post(paf::create_paf))
        .route("/api/paf/submit", post(paf::create_and_submit_paf))
        .route(
            "/api/paf/:id",
            get(paf::get_paf)
                .patch(paf::update_paf)
                .put(paf::update_paf)
                .delete(paf::delete_paf),
        )
        .route("/api/paf/:id/submit", post(paf::submit_paf))
        .route("/api/paf/:id/review", post(paf::review_paf))
        .route("/api/paf/:id/approve", post(paf::approve_paf))
        .route("/api/paf/:id/deny", post(paf::deny_paf))
        // --- Employee accounts ---
        .route(
            "/api/employee-accounts",
            get(accounts::list_accounts).post(accounts::create_account),
        )
        .route(
            "/api/employee-accounts/:id",
            get(accounts::get_account).delete(accounts::delete_account),
        )
        .route("/api/employee-accounts/:id/grant-access", post(accounts::grant_access))
        .route("/api/employee-accounts/:id/suspend", post(accounts::suspend_account))
        .route("/api/employee-accounts/:id/revoke-access", post(accounts::revoke_access))
        // --- Workflow templates ---
        .route(
            "/api/workflow-templates",
            get(workflows::list_templates).post(workflows::create_template),
        )
        .route(
            "/api/workflow-templates/:id",
            get(workflows::get_template)
                .patch(workflows::update_template)
                .put(workflows::update_template)
                .delete(workflows::delete_template),
        )
        // --- Audit & admin ---
        .route("/api/audit-logs", get(audit::list_audit_logs))
        .route("/api/admin/cleanup", post(admin::cleanup))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            alerting::alert_on_server_error,
        ))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(body_limit))
}

/// Serves the API until Ctrl-C.
pub async fn run_server(
    settings: &Settings,
    store: Arc<dyn HrStore>,
    alerter: Option<EmailAlerter>,
) -> anyhow::Result<()> {
    let state = AppState::new(store, alerter.map(Arc::new))
        .with_body_limit_mb(settings.server.body_limit_mb);
    let app = create_router(Arc::new(state));

    let addr = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Web server started and listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Web server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for the shutdown signal.");
    }
}

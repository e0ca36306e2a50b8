use crate::error::ServerErrorReport;
use crate::AppState;
use alerter::SystemAlert;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use serde_json::json;
use std::sync::Arc;

/// Emails an administrator for every response that carries a
/// [`ServerErrorReport`]. Delivery runs on its own task so the client never
/// waits on SMTP.
pub async fn alert_on_server_error(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    let (Some(report), Some(alerter)) = (
        response.extensions().get::<ServerErrorReport>(),
        state.alerter.clone(),
    ) else {
        return response;
    };

    let alert = alert_for(report).with_context(json!({
        "method": method,
        "path": path,
        "status": response.status().as_u16(),
    }));
    tokio::spawn(async move {
        if let Err(e) = alerter.send_alert(&alert).await {
            tracing::error!(error = ?e, "Failed to send alert email.");
        }
    });

    response
}

fn alert_for(report: &ServerErrorReport) -> SystemAlert {
    match report.kind {
        "database" => SystemAlert::database_error(report.message.clone()),
        "payroll" => SystemAlert::payroll_error(report.message.clone()),
        _ => SystemAlert::system_error(report.message.clone(), report.severity),
    }
}

use crate::error::AlerterError;
use chrono::{DateTime, Utc};
use configuration::SmtpSettings;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
pub mod error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Low => "low",
            AlertSeverity::Medium => "medium",
            AlertSeverity::High => "high",
            AlertSeverity::Critical => "critical",
        }
    }

    /// Banner colour used in the email body.
    fn colour(&self) -> &'static str {
        match self {
            AlertSeverity::Low => "#2e7d32",
            AlertSeverity::Medium => "#f9a825",
            AlertSeverity::High => "#ef6c00",
            AlertSeverity::Critical => "#c62828",
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A problem worth telling an administrator about.
#[derive(Debug, Clone, Serialize)]
pub struct SystemAlert {
    pub title: String,
    pub message: String,
    pub severity: AlertSeverity,
    pub context: Option<Value>,
    pub timestamp: DateTime<Utc>,
}

impl SystemAlert {
    pub fn system_error(message: impl Into<String>, severity: AlertSeverity) -> Self {
        Self::new("System error", message, severity)
    }

    pub fn database_error(message: impl Into<String>) -> Self {
        Self::new("Database error", message, AlertSeverity::High)
    }

    /// Payroll failures affect people's pay and are always critical.
    pub fn payroll_error(message: impl Into<String>) -> Self {
        Self::new("Payroll processing error", message, AlertSeverity::Critical)
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }

    fn new(title: &str, message: impl Into<String>, severity: AlertSeverity) -> Self {
        Self {
            title: title.to_string(),
            message: message.into(),
            severity,
            context: None,
            timestamp: Utc::now(),
        }
    }

    pub fn subject(&self) -> String {
        format!("[{}] {}", self.severity.as_str().to_uppercase(), self.title)
    }
}

/// Renders the alert as a small standalone HTML document.
pub fn render_html(alert: &SystemAlert) -> String {
    let context = alert
        .context
        .as_ref()
        .and_then(|c| serde_json::to_string_pretty(c).ok())
        .map(|json| format!("<h3>Context</h3><pre>{}</pre>", escape_html(&json)))
        .unwrap_or_default();

    format!(
        concat!(
            "<html><body style=\"font-family: sans-serif\">",
            "<div style=\"background: {colour}; color: #fff; padding: 8px 12px\">",
            "<strong>{severity}</strong> &middot; {title}</div>",
            "<p>{message}</p>",
            "{context}",
            "<p style=\"color: #777; font-size: 12px\">Reported at {timestamp}</p>",
            "</body></html>"
        ),
        colour = alert.severity.colour(),
        severity = alert.severity.as_str().to_uppercase(),
        title = escape_html(&alert.title),
        message = escape_html(&alert.message),
        context = context,
        timestamp = alert.timestamp.to_rfc3339(),
    )
}

/// Escapes the characters that have special meaning in HTML text and attributes.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Sends alert emails to the district administrators over SMTP.
pub struct EmailAlerter {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    recipients: Vec<Mailbox>,
}

impl EmailAlerter {
    /// Creates a new `EmailAlerter`.
    ///
    /// Returns `None` if the SMTP host or the recipient list is missing from
    /// the configuration, allowing the system to gracefully disable alerting.
    pub fn new(settings: &SmtpSettings) -> Option<Self> {
        match Self::try_new(settings) {
            Ok(alerter) => {
                tracing::info!(
                    recipients = alerter.recipients.len(),
                    "Email alerter configured."
                );
                Some(alerter)
            }
            Err(AlerterError::NotConfigured) => {
                tracing::warn!(
                    "Email alerter is not configured (missing SMTP host or ADMIN_EMAILS)."
                );
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Email alerter disabled due to invalid SMTP settings.");
                None
            }
        }
    }

    pub fn try_new(settings: &SmtpSettings) -> Result<Self, AlerterError> {
        if !settings.is_configured() {
            return Err(AlerterError::NotConfigured);
        }
        let host = settings.host.as_deref().ok_or(AlerterError::NotConfigured)?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
            .port(settings.port);
        if let (Some(user), Some(pass)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let recipients = settings
            .admin_emails
            .iter()
            .map(|address| address.parse::<Mailbox>())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            transport: builder.build(),
            from: settings.from.parse()?,
            recipients,
        })
    }

    /// Emails the alert to every configured administrator.
    pub async fn send_alert(&self, alert: &SystemAlert) -> Result<(), AlerterError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(alert.subject())
            .header(ContentType::TEXT_HTML);
        for recipient in &self.recipients {
            builder = builder.to(recipient.clone());
        }
        let message = builder.body(render_html(alert))?;

        self.transport.send(message).await?;
        tracing::info!(severity = %alert.severity, title = %alert.title, "Alert email sent.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn html_escapes_user_supplied_text() {
        let alert = SystemAlert::system_error(
            "failed for <script>alert('x')</script> & co",
            AlertSeverity::Medium,
        );
        let html = render_html(&alert);
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; co"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn html_and_subject_name_the_severity() {
        let alert = SystemAlert::payroll_error("net pay mismatch");
        assert_eq!(alert.severity, AlertSeverity::Critical);
        assert_eq!(alert.subject(), "[CRITICAL] Payroll processing error");
        assert!(render_html(&alert).contains("<strong>CRITICAL</strong>"));
    }

    #[test]
    fn context_is_rendered_as_escaped_json() {
        let alert = SystemAlert::database_error("insert failed")
            .with_context(json!({ "table": "<pafs>" }));
        let html = render_html(&alert);
        assert!(html.contains("<h3>Context</h3>"));
        assert!(html.contains("&lt;pafs&gt;"));
    }

    #[test]
    fn missing_recipients_disable_the_alerter() {
        let settings = SmtpSettings {
            host: Some("smtp.district.example".to_string()),
            ..SmtpSettings::default()
        };
        assert!(matches!(
            EmailAlerter::try_new(&settings),
            Err(AlerterError::NotConfigured)
        ));
        assert!(EmailAlerter::new(&settings).is_none());
    }

    #[test]
    fn severities_are_ordered() {
        assert!(AlertSeverity::Critical > AlertSeverity::High);
        assert!(AlertSeverity::Medium > AlertSeverity::Low);
    }
}

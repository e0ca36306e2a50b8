use crate::error::ConfigError;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{DatabaseSettings, LoggingSettings, ServerSettings, Settings, SmtpSettings};

/// Loads the application settings.
///
/// Sources, lowest precedence first: built-in defaults, the optional TOML file
/// at `path`, `HR__SECTION__KEY` environment variables, and finally the
/// conventional unprefixed variables (`DATABASE_URL`, `PORT`, `SMTP_*`,
/// `ADMIN_EMAILS`).
pub fn load_settings(path: &str) -> Result<Settings, ConfigError> {
    let mut settings = layered_settings(path, None)?;
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

/// File and `HR__` layers only. `env` stands in for the process environment
/// when given.
fn layered_settings(
    path: &str,
    env: Option<config::Map<String, String>>,
) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(
            config::Environment::with_prefix("HR")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("smtp.admin_emails")
                .try_parsing(true)
                .source(env),
        )
        .build()?;

    Ok(builder.try_deserialize::<Settings>()?)
}

/// Applies the unprefixed deployment variables on top of `settings`.
/// `lookup` is `std::env::var` in production; tests pass a map.
pub fn apply_env_overrides(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = var("DATABASE_URL") {
        settings.database.url = url;
    }
    if let Some(port) = var("PORT") {
        settings.server.port = parse_port("PORT", &port)?;
    }
    if let Some(host) = var("SMTP_HOST") {
        settings.smtp.host = Some(host);
    }
    if let Some(port) = var("SMTP_PORT") {
        settings.smtp.port = parse_port("SMTP_PORT", &port)?;
    }
    if let Some(user) = var("SMTP_USER") {
        settings.smtp.username = Some(user);
    }
    if let Some(pass) = var("SMTP_PASS") {
        settings.smtp.password = Some(pass);
    }
    if let Some(from) = var("SMTP_FROM") {
        settings.smtp.from = from;
    }
    if let Some(emails) = var("ADMIN_EMAILS") {
        settings.smtp.admin_emails = emails
            .split(',')
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string)
            .collect();
    }
    Ok(())
}

fn parse_port(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_usable_in_memory() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 5000);
        assert!(settings.validate(true).is_ok());
        assert!(settings.validate(false).is_err());
    }

    #[test]
    fn env_overrides_win_over_file_values() {
        let mut settings = Settings::default();
        settings.database.url = "postgres://file/hr".to_string();
        settings.smtp.host = Some("file.smtp.example".to_string());

        apply_env_overrides(
            &mut settings,
            lookup_from(&[
                ("DATABASE_URL", "postgres://env/hr"),
                ("SMTP_HOST", "smtp.district.example"),
                ("ADMIN_EMAILS", "a@district.example, b@district.example,"),
                ("PORT", "8080"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.database.url, "postgres://env/hr");
        assert_eq!(settings.smtp.host.as_deref(), Some("smtp.district.example"));
        assert_eq!(
            settings.smtp.admin_emails,
            vec!["a@district.example".to_string(), "b@district.example".to_string()]
        );
        assert_eq!(settings.server.port, 8080);
        assert!(settings.smtp.is_configured());
    }

    #[test]
    fn empty_variables_are_ignored() {
        let mut settings = Settings::default();
        settings.database.url = "postgres://file/hr".to_string();
        apply_env_overrides(&mut settings, lookup_from(&[("DATABASE_URL", "  ")])).unwrap();
        assert_eq!(settings.database.url, "postgres://file/hr");
    }

    #[test]
    fn malformed_port_is_rejected() {
        let mut settings = Settings::default();
        let err = apply_env_overrides(&mut settings, lookup_from(&[("SMTP_PORT", "smtp")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "SMTP_PORT"));
    }

    #[test]
    fn prefixed_admin_emails_split_on_commas() {
        let env: config::Map<String, String> = [
            ("HR__SMTP__ADMIN_EMAILS", "a@district.example,b@district.example"),
            ("HR__SERVER__PORT", "8081"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let settings = layered_settings("no-such-settings-file", Some(env)).unwrap();
        assert_eq!(
            settings.smtp.admin_emails,
            vec!["a@district.example".to_string(), "b@district.example".to_string()]
        );
        assert_eq!(settings.server.port, 8081);
    }

    #[test]
    fn zero_pool_size_is_invalid() {
        let mut settings = Settings::default();
        settings.database.max_connections = 0;
        assert!(settings.validate(true).is_err());
    }

    #[test]
    fn smtp_without_recipients_is_not_configured() {
        let mut settings = Settings::default();
        settings.smtp.host = Some("smtp.district.example".to_string());
        assert!(!settings.smtp.is_configured());
    }
}

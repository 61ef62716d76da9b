use std::env;

/// Event facts printed on tickets and emails. Config-driven so the pipeline
/// is not tied to a single event.
#[derive(Debug, Clone)]
pub struct EventDetails {
    pub name: String,
    pub tagline: String,
    pub date: String,
    pub location: String,
}

impl Default for EventDetails {
    fn default() -> Self {
        Self {
            name: "Annual Summit".into(),
            tagline: "See you there".into(),
            date: "TBA".into(),
            location: "TBA".into(),
        }
    }
}

/// All runtime settings, loaded from the environment once at startup and
/// injected into the services that need them. Nothing reads `env::var` after
/// construction.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub paystack_secret_key: String,
    pub resend_api_key: String,
    pub mail_from: String,
    pub admin_email: String,
    pub frontend_url: String,
    pub event: EventDetails,
}

impl Config {
    /// Reads the environment. Missing required variables are a startup
    /// failure, not a runtime one.
    pub fn from_env() -> Result<Config, String> {
        let event = EventDetails {
            name: env_or("EVENT_NAME", "Annual Summit"),
            tagline: env_or("EVENT_TAGLINE", "See you there"),
            date: env_or("EVENT_DATE", "TBA"),
            location: env_or("EVENT_LOCATION", "TBA"),
        };
        Ok(Config {
            database_url: required("DATABASE_URL")?,
            host: env_or("HOST", "0.0.0.0"),
            port: env_or("PORT", "8080")
                .parse()
                .map_err(|_| "PORT must be a valid number".to_string())?,
            paystack_secret_key: required("PAYSTACK_SECRET_KEY")?,
            resend_api_key: required("RESEND_API_KEY")?,
            mail_from: env_or("MAIL_FROM", "Tickets <no-reply@example.com>"),
            admin_email: required("ADMIN_EMAIL")?,
            frontend_url: env_or("FRONTEND_URL", "http://localhost:3000"),
            event,
        })
    }
}

fn required(key: &str) -> Result<String, String> {
    env::var(key).map_err(|_| format!("{} must be set", key))
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

use std::fmt;

use config::{
    Config, ConfigError, Environment, File,
    builder::{ConfigBuilder, DefaultState},
};
use serde::Deserialize;
use sweeper_push::VapidCredentials;

const DEFAULT_DATABASE_URL: &str = "sqlite://sweeper.db?mode=rwc";

#[derive(Deserialize, Debug)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize)]
pub struct TriggerSettings {
    pub secret: String,
}

impl fmt::Debug for TriggerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerSettings")
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[derive(Deserialize, Debug)]
pub struct DatabaseSettings {
    pub url: String,
}

#[derive(Deserialize, Debug)]
pub struct AppSettings {
    pub server: ServerSettings,
    pub trigger: TriggerSettings,
    pub vapid: VapidCredentials,
    pub database: DatabaseSettings,
    /// Base of the deep links put into notifications.
    pub app_url: String,
}

impl AppSettings {
    /// `appsettings.*`, then `appsettings.local.*`, then `APP_*` environment variables
    /// (`APP_SERVER__PORT`, `APP_VAPID__PRIVATE_KEY`, `APP_APP_URL`, ...).
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name("appsettings").required(false))
            .add_source(File::with_name("appsettings.local").required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            );

        Self::from_builder(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let settings: Self = builder
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("database.url", DEFAULT_DATABASE_URL)?
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.trigger.secret.trim().is_empty() {
            return Err(ConfigError::Message(
                "trigger.secret must not be empty".to_string(),
            ));
        }
        if self.app_url.trim().is_empty() {
            return Err(ConfigError::Message("app_url must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    const MINIMAL: &str = r#"
app_url = "https://notes.example.com"

[trigger]
secret = "s3cret"

[vapid]
public_key = "BPub"
private_key = "priv"
subject = "mailto:ops@example.com"
"#;

    fn load(toml: &str) -> Result<AppSettings, ConfigError> {
        AppSettings::from_builder(
            Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
        )
    }

    #[test]
    fn fills_in_defaults() {
        let settings = load(MINIMAL).unwrap();

        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.database.url, DEFAULT_DATABASE_URL);
        assert_eq!(settings.trigger.secret, "s3cret");
        assert_eq!(settings.vapid.subject, "mailto:ops@example.com");
        assert_eq!(settings.app_url, "https://notes.example.com");
    }

    #[test]
    fn explicit_values_override_defaults() {
        let toml = format!("{MINIMAL}\n[server]\nhost = \"127.0.0.1\"\nport = 9090\n");

        let settings = load(&toml).unwrap();

        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 9090);
    }

    #[test]
    fn missing_vapid_credentials_fail() {
        let toml = "app_url = \"https://notes.example.com\"\n[trigger]\nsecret = \"s3cret\"\n";

        assert!(load(toml).is_err());
    }

    #[test]
    fn empty_secret_fails() {
        let toml = MINIMAL.replace("\"s3cret\"", "\"  \"");

        assert!(matches!(load(&toml), Err(ConfigError::Message(_))));
    }

    #[test]
    fn secret_is_not_printed() {
        let settings = load(MINIMAL).unwrap();

        let debug = format!("{settings:?}");

        assert!(!debug.contains("s3cret"));
        assert!(!debug.contains("priv\""));
    }
}

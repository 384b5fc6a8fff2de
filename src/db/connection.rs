use anyhow::{anyhow, Result};

use crate::config::ConnectionSettings;

pub fn build_config(settings: &ConnectionSettings) -> Result<tiberius::Config> {
    let mut config = tiberius::Config::new();
    config.host(&settings.server);
    config.port(settings.port);
    config.database(&settings.database);
    config.application_name("lockgraph");

    match (&settings.user, &settings.password) {
        (Some(user), Some(pass)) => {
            config.authentication(tiberius::AuthMethod::sql_server(user, pass));
        }
        (Some(user), None) => {
            return Err(anyhow!(
                "Password is required for SQL authentication (user: {})",
                user
            ));
        }
        _ => {}
    }

    if settings.encrypt {
        config.encryption(tiberius::EncryptionLevel::Required);
    } else {
        config.encryption(tiberius::EncryptionLevel::NotSupported);
    }

    if settings.trust_cert {
        config.trust_cert();
    }

    Ok(config)
}

/// `server:port/database` without credentials, for logs and status output.
pub fn describe_target(settings: &ConnectionSettings) -> String {
    format!(
        "{}:{}/{}",
        settings.server, settings.port, settings.database
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_without_password_is_rejected() {
        let settings = ConnectionSettings {
            user: Some("sa".to_string()),
            ..ConnectionSettings::default()
        };
        let err = build_config(&settings).expect_err("missing password");
        assert!(err.to_string().contains("Password is required"));
    }

    #[test]
    fn describes_target_without_credentials() {
        let settings = ConnectionSettings {
            server: "db.example".to_string(),
            port: 1444,
            database: "main".to_string(),
            user: Some("sa".to_string()),
            password: Some("secret".to_string()),
            ..ConnectionSettings::default()
        };
        let target = describe_target(&settings);
        assert_eq!(target, "db.example:1444/main");
        assert!(!target.contains("secret"));
    }
}

use std::env;

use crate::error::ConfigError;


/// Process wide settings, read once before the runtime starts taking events.
#[derive(Debug, Clone)]
pub struct Config {
    /// SSM parameter holding the webhook url.
    pub webhook_parameter: String,
    pub excluded_accounts: Vec<String>,
    pub included_accounts: Vec<String>,
    pub use_path_style_buckets: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));

        let webhook_parameter = required("WEBHOOK_PARAMETER")?;
        let excluded_accounts = parse_accounts("EXCLUDED_ACCOUNTS", &required("EXCLUDED_ACCOUNTS")?)?;
        let included_accounts = parse_accounts("INCLUDED_ACCOUNTS", &required("INCLUDED_ACCOUNTS")?)?;

        let use_path_style_buckets = lookup("USE_PATH_STYLE_BUCKETS")
            .map(|var| var.to_lowercase() == "true")
            .unwrap_or(false);

        Ok(Config {
            webhook_parameter,
            excluded_accounts,
            included_accounts,
            use_path_style_buckets,
        })
    }
}

fn parse_accounts(name: &'static str, raw: &str) -> Result<Vec<String>, ConfigError> {
    serde_json::from_str(raw).map_err(|source| ConfigError::InvalidAccounts { name, source })
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn reads_all_settings() {
        let config = Config::from_lookup(lookup(&[
            ("WEBHOOK_PARAMETER", "/clickops/webhook"),
            ("EXCLUDED_ACCOUNTS", r#"["111111111111"]"#),
            ("INCLUDED_ACCOUNTS", "[]"),
            ("USE_PATH_STYLE_BUCKETS", "TRUE"),
        ]))
        .unwrap();

        assert_eq!(config.webhook_parameter, "/clickops/webhook");
        assert_eq!(config.excluded_accounts, vec!["111111111111".to_string()]);
        assert!(config.included_accounts.is_empty());
        assert!(config.use_path_style_buckets);
    }

    #[test]
    fn path_style_defaults_off() {
        let config = Config::from_lookup(lookup(&[
            ("WEBHOOK_PARAMETER", "/clickops/webhook"),
            ("EXCLUDED_ACCOUNTS", "[]"),
            ("INCLUDED_ACCOUNTS", "[]"),
        ]))
        .unwrap();

        assert!(!config.use_path_style_buckets);
    }

    #[test]
    fn missing_variable_is_an_error() {
        let err = Config::from_lookup(lookup(&[
            ("WEBHOOK_PARAMETER", "/clickops/webhook"),
            ("EXCLUDED_ACCOUNTS", "[]"),
        ]))
        .unwrap_err();

        assert!(matches!(err, ConfigError::Missing("INCLUDED_ACCOUNTS")));
    }

    #[test]
    fn malformed_account_list_is_an_error() {
        let err = Config::from_lookup(lookup(&[
            ("WEBHOOK_PARAMETER", "/clickops/webhook"),
            ("EXCLUDED_ACCOUNTS", "111111111111"),
            ("INCLUDED_ACCOUNTS", "[]"),
        ]))
        .unwrap_err();

        assert!(matches!(err, ConfigError::InvalidAccounts { name: "EXCLUDED_ACCOUNTS", .. }));
    }
}

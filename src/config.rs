use regex::Regex;
use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub env_name: String,

    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,

    pub db_url: String,
    pub db_schema: Option<String>,

    pub allowed_origins: Vec<String>,

    pub commission_rate_bps: i64,

    pub gateway_base_url: Option<String>,
    pub gateway_store_id: Option<String>,
    pub gateway_store_pass: Option<String>,
    pub gateway_timeout_secs: u64,

    pub frontend_success_url: Option<String>,
    pub frontend_fail_url: Option<String>,
    pub frontend_cancel_url: Option<String>,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(v) => {
            let v = v.trim().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        }
        Err(_) => None,
    }
}

fn parse_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

fn validate_postgres_url(url: &str) -> Result<(), String> {
    let scheme = url
        .split_once(':')
        .map(|(s, _)| s.trim().to_lowercase())
        .unwrap_or_default();
    match scheme.as_str() {
        "postgres" | "postgresql" => Ok(()),
        _ => Err("DB_URL must be a postgres URL".to_string()),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let env_name = env_or("ENV", "dev");
        let env_lower = env_name.trim().to_lowercase();
        let prod_like = matches!(env_lower.as_str(), "prod" | "production" | "staging");

        let host = env_or("APP_HOST", "0.0.0.0");
        let port: u16 = env_or("APP_PORT", "8080")
            .parse()
            .map_err(|_| "APP_PORT must be a valid u16".to_string())?;

        let db_url = env_opt("DB_URL")
            .unwrap_or_else(|| "postgresql://tours:tours@db:5432/tours".to_string());
        validate_postgres_url(&db_url)?;

        let db_schema = env_opt("DB_SCHEMA");
        if let Some(s) = &db_schema {
            let re = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").map_err(|e| e.to_string())?;
            if !re.is_match(s) {
                return Err("DB_SCHEMA must match ^[A-Za-z_][A-Za-z0-9_]*$".to_string());
            }
        }

        let mut allowed_origins = parse_csv(&env_or("ALLOWED_ORIGINS", ""));
        if allowed_origins.is_empty() {
            // Safe local default for development.
            allowed_origins = vec![
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:5173".to_string(),
            ];
        }
        if prod_like && allowed_origins.iter().any(|o| o.trim() == "*") {
            return Err("ALLOWED_ORIGINS must not contain '*' in prod/staging".to_string());
        }
        if prod_like
            && allowed_origins
                .iter()
                .any(|o| !o.trim().starts_with("https://"))
        {
            return Err("ALLOWED_ORIGINS must use https:// origins in prod/staging".to_string());
        }

        let max_body_bytes: usize = env_or("MAX_BODY_BYTES", "1048576")
            .parse()
            .map_err(|_| "MAX_BODY_BYTES must be an integer".to_string())?;
        let max_body_bytes = max_body_bytes.clamp(16 * 1024, 10 * 1024 * 1024);

        let commission_rate_bps: i64 = env_or("COMMISSION_RATE_BPS", "1500")
            .parse()
            .map_err(|_| "COMMISSION_RATE_BPS must be an integer".to_string())?;
        if !(0..=10_000).contains(&commission_rate_bps) {
            return Err("COMMISSION_RATE_BPS must be within 0..=10000".to_string());
        }

        let gateway_base_url = env_opt("GATEWAY_BASE_URL");
        let gateway_store_id = env_opt("GATEWAY_STORE_ID");
        let gateway_store_pass = env_opt("GATEWAY_STORE_PASS");
        if gateway_base_url.is_some()
            && prod_like
            && (gateway_store_id.is_none() || gateway_store_pass.is_none())
        {
            return Err(
                "GATEWAY_STORE_ID and GATEWAY_STORE_PASS must be set when GATEWAY_BASE_URL is configured in prod/staging"
                    .to_string(),
            );
        }

        let gateway_timeout_secs: u64 = env_or("GATEWAY_TIMEOUT_SECS", "15")
            .parse()
            .map_err(|_| "GATEWAY_TIMEOUT_SECS must be an integer".to_string())?;
        let gateway_timeout_secs = gateway_timeout_secs.clamp(1, 120);

        let frontend_success_url = env_opt("FRONTEND_SUCCESS_URL");
        let frontend_fail_url = env_opt("FRONTEND_FAIL_URL");
        let frontend_cancel_url = env_opt("FRONTEND_CANCEL_URL");

        Ok(Self {
            env_name,
            host,
            port,
            max_body_bytes,
            db_url,
            db_schema,
            allowed_origins,
            commission_rate_bps,
            gateway_base_url,
            gateway_store_id,
            gateway_store_pass,
            gateway_timeout_secs,
            frontend_success_url,
            frontend_fail_url,
            frontend_cancel_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    struct EnvGuard {
        saved: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn new(keys: &[&str]) -> Self {
            let mut keys = keys.to_vec();
            for required in ["ALLOWED_ORIGINS", "MAX_BODY_BYTES", "COMMISSION_RATE_BPS"] {
                if !keys.contains(&required) {
                    keys.push(required);
                }
            }
            let mut saved = Vec::with_capacity(keys.len());
            for k in keys {
                let existing = env::var(k).ok();
                saved.push((k.to_string(), existing));
                env::remove_var(k);
            }
            Self { saved }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (k, v) in self.saved.drain(..) {
                match v {
                    Some(val) => env::set_var(k, val),
                    None => env::remove_var(k),
                }
            }
        }
    }

    #[test]
    fn rejects_non_postgres_url() {
        let _g = ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap();
        let _env = EnvGuard::new(&["ENV", "DB_URL"]);

        env::set_var("DB_URL", "sqlite:////tmp/tours.db");
        assert!(Config::from_env().is_err());
    }

    #[test]
    fn prod_rejects_wildcard_origins() {
        let _g = ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap();
        let _env = EnvGuard::new(&["ENV", "DB_URL"]);

        env::set_var("ENV", "prod");
        env::set_var("DB_URL", "postgresql://u:p@localhost:5432/tours");
        env::set_var("ALLOWED_ORIGINS", "*");

        let err = Config::from_env().expect_err("wildcard origins must be rejected in prod");
        assert!(err.contains("ALLOWED_ORIGINS"));
    }

    #[test]
    fn prod_rejects_non_https_origins() {
        let _g = ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap();
        let _env = EnvGuard::new(&["ENV", "DB_URL"]);

        env::set_var("ENV", "prod");
        env::set_var("DB_URL", "postgresql://u:p@localhost:5432/tours");
        env::set_var("ALLOWED_ORIGINS", "http://tours.example.com");

        let err = Config::from_env().expect_err("non-https origins must be rejected in prod");
        assert!(err.contains("https://"));
    }

    #[test]
    fn prod_requires_gateway_credentials_when_gateway_configured() {
        let _g = ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap();
        let _env = EnvGuard::new(&[
            "ENV",
            "DB_URL",
            "GATEWAY_BASE_URL",
            "GATEWAY_STORE_ID",
            "GATEWAY_STORE_PASS",
        ]);

        env::set_var("ENV", "prod");
        env::set_var("DB_URL", "postgresql://u:p@localhost:5432/tours");
        env::set_var("ALLOWED_ORIGINS", "https://tours.example.com");
        env::set_var("GATEWAY_BASE_URL", "https://sandbox.gateway.example");

        let err = Config::from_env().expect_err("missing gateway creds must be rejected");
        assert!(err.contains("GATEWAY_STORE_ID"));
    }

    #[test]
    fn body_limit_and_timeout_are_clamped() {
        let _g = ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap();
        let _env = EnvGuard::new(&["ENV", "DB_URL", "GATEWAY_TIMEOUT_SECS"]);

        env::set_var("ENV", "dev");
        env::set_var("DB_URL", "postgresql://u:p@localhost:5432/tours");

        env::set_var("MAX_BODY_BYTES", "1");
        env::set_var("GATEWAY_TIMEOUT_SECS", "0");
        let cfg = Config::from_env().expect("config");
        assert_eq!(cfg.max_body_bytes, 16 * 1024);
        assert_eq!(cfg.gateway_timeout_secs, 1);

        env::set_var("MAX_BODY_BYTES", "999999999");
        env::set_var("GATEWAY_TIMEOUT_SECS", "9999");
        let cfg = Config::from_env().expect("config");
        assert_eq!(cfg.max_body_bytes, 10 * 1024 * 1024);
        assert_eq!(cfg.gateway_timeout_secs, 120);
    }

    #[test]
    fn commission_rate_out_of_range_is_rejected() {
        let _g = ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap();
        let _env = EnvGuard::new(&["ENV", "DB_URL"]);

        env::set_var("DB_URL", "postgresql://u:p@localhost:5432/tours");
        env::set_var("COMMISSION_RATE_BPS", "10001");
        assert!(Config::from_env().is_err());
    }
}

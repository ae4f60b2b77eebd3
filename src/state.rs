use reqwest::Client;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub db_schema: Option<String>,
    pub env_name: String,
    pub commission_rate_bps: i64,
    pub gateway_base_url: Option<String>,
    pub gateway_store_id: Option<String>,
    pub gateway_store_pass: Option<String>,
    pub frontend_success_url: Option<String>,
    pub frontend_fail_url: Option<String>,
    pub frontend_cancel_url: Option<String>,
    pub http: Client,
}

impl AppState {
    pub fn table(&self, name: &str) -> String {
        match &self.db_schema {
            Some(s) => format!("{s}.{name}"),
            None => name.to_string(),
        }
    }

    pub fn gateway_enabled(&self) -> bool {
        self.gateway_base_url.as_deref().unwrap_or("").trim() != ""
    }
}

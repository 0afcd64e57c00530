use crate::models::FieldSet;
use std::env;
use std::net::SocketAddr;

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_RATE_LIMIT_MS: u64 = 200;
pub const DEFAULT_RATE_LIMIT_BURST: u32 = 20;

pub struct Config {
    pub analytics_token: String,
    pub analytics_ignore_dnt: bool,
    pub frontend_origin: String,
    pub listen_addr: SocketAddr,
    pub field_set: FieldSet,
    pub rate_limit_ms: u64,
    pub rate_limit_burst: u32,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok(); // Load .env file

        let analytics_token =
            env::var("ANALYTICS_PROJECT_TOKEN").expect("ANALYTICS_PROJECT_TOKEN must be set");

        let frontend_origin = env::var("FRONTEND_ORIGIN").expect("FRONTEND_ORIGIN must be set");

        let analytics_ignore_dnt = env::var("ANALYTICS_IGNORE_DNT")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(true);

        let listen_addr = env::var("LISTEN_ADDR")
            .ok()
            .and_then(|v| v.parse::<SocketAddr>().ok())
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.parse().unwrap());

        let field_set = match env::var("SIGNUP_FIELD_SET").as_deref() {
            Ok("password") => FieldSet::Password,
            _ => FieldSet::Company,
        };

        let rate_limit_ms = env::var("RATE_LIMITER_MILLISECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_RATE_LIMIT_MS);
        let rate_limit_burst = env::var("RATE_LIMITER_BURST")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(DEFAULT_RATE_LIMIT_BURST);

        Config {
            analytics_token,
            analytics_ignore_dnt,
            frontend_origin,
            listen_addr,
            field_set,
            rate_limit_ms,
            rate_limit_burst,
        }
    }
}

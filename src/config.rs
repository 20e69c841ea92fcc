// src/config.rs

use dotenvy::dotenv;
use std::env;

/// How long a trainer's one-time passcode stays valid.
/// Expiry is checked lazily at verification time; nothing sweeps stale codes.
pub const OTP_EXPIRY_MINUTES: i64 = 5;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    /// Optional credentials for seeding a verified trainer on startup,
    /// so a fresh deployment has a course author.
    pub seed_trainer_email: Option<String>,
    pub seed_trainer_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        // 7 days, matching the token lifetime the web client expects.
        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(604_800);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            seed_trainer_email: env::var("SEED_TRAINER_EMAIL").ok(),
            seed_trainer_password: env::var("SEED_TRAINER_PASSWORD").ok(),
        }
    }
}

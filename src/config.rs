use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Credentials and endpoint of the Razorpay REST API.
#[derive(Debug, Clone, Deserialize)]
pub struct RazorpayConfig {
    pub key_id: String,
    pub key_secret: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub razorpay: RazorpayConfig,
    /// Share of every session payment kept by the platform, in percent.
    pub platform_fee_percent: u8,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "timerent".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "timerent-users".into()),
            ttl_minutes: env_parse("JWT_TTL_MINUTES").unwrap_or(60),
            refresh_ttl_minutes: env_parse("JWT_REFRESH_TTL_MINUTES").unwrap_or(60 * 24 * 14),
        };
        let razorpay = RazorpayConfig {
            key_id: std::env::var("RAZORPAY_KEY_ID")?,
            key_secret: std::env::var("RAZORPAY_KEY_SECRET")?,
            base_url: std::env::var("RAZORPAY_BASE_URL")
                .unwrap_or_else(|_| "https://api.razorpay.com/v1".into()),
        };
        let platform_fee_percent = env_parse::<u8>("PLATFORM_FEE_PERCENT").unwrap_or(20);
        anyhow::ensure!(
            platform_fee_percent <= 100,
            "PLATFORM_FEE_PERCENT must be within 0..=100"
        );

        Ok(Self {
            database_url,
            jwt,
            razorpay,
            platform_fee_percent,
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

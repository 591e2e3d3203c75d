#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub app_url: String,
    pub jwt_secret: String,
    pub jwt_maxage: i64,
    pub port: u16,
    // File storage configuration
    pub storage_root: String,
    pub max_upload_bytes: usize,
    pub signed_url_ttl_secs: i64,
    // SMS carrier configuration
    pub sms_api_url: String,
    pub sms_api_key: String,
    pub otp_resend_cooldown_secs: i64,
}

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let jwt_secret = std::env::var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY must be set");
        let jwt_maxage = std::env::var("JWT_MAXAGE").expect("JWT_MAXAGE must be set");
        let app_url = std::env::var("APP_URL").expect("APP_URL must be set");

        // Storage configuration (with defaults)
        let storage_root = std::env::var("STORAGE_ROOT")
            .unwrap_or_else(|_| "storage".to_string());
        let max_upload_bytes = std::env::var("MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(10 * 1024 * 1024);
        let signed_url_ttl_secs = std::env::var("SIGNED_URL_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(300);

        // SMS carrier configuration (with defaults)
        let sms_api_url = std::env::var("SMS_API_URL")
            .unwrap_or_else(|_| "https://api.sms-provider.test/messages".to_string());
        let sms_api_key = std::env::var("SMS_API_KEY")
            .unwrap_or_else(|_| "test_api_key".to_string());
        let otp_resend_cooldown_secs = std::env::var("OTP_RESEND_COOLDOWN_SECS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(60);

        Config {
            database_url,
            app_url,
            jwt_secret,
            jwt_maxage: jwt_maxage.parse::<i64>().unwrap(),
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(8000),
            storage_root,
            max_upload_bytes,
            signed_url_ttl_secs,
            sms_api_url,
            sms_api_key,
            otp_resend_cooldown_secs,
        }
    }
}

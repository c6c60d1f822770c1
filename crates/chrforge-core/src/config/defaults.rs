// Single source of truth for all default values.

// --- Client ---
pub const DEFAULT_LANGUAGE: &str = "zh-Hant_TW";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

// --- Domains ---
pub const DEFAULT_HOST_DOMAIN: &str = "http://localhost:8111";
pub const DEFAULT_OBS_DOMAIN: &str = "http://localhost:8112";
pub const DEFAULT_API_DOMAIN: &str = "http://localhost:8113";
pub const DEFAULT_ACCESS_DOMAIN: &str = "http://localhost:8114";
pub const DEFAULT_BIZ_TIMELINE_DOMAIN: &str = "http://localhost:8121";

// --- Retry ---
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 500;
pub const DEFAULT_MAX_BACKOFF_MS: u64 = 30_000;
pub const DEFAULT_MAX_RATE_LIMIT_WAIT_MS: u64 = 60_000;
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;
pub const DEFAULT_JITTER_RATIO: f64 = 0.2;

// --- Session ---
pub const DEFAULT_REFRESH_MARGIN_SECS: u64 = 60;
pub const DEFAULT_VERIFY_PATH: &str = "/S4";
pub const DEFAULT_VERIFY_METHOD: &str = "getServerTime";
pub const DEFAULT_REFRESH_METHOD: &str = "refresh";
pub const DEFAULT_QR_LOGIN_METHOD: &str = "qrCodeLoginV2";

// --- Error codes ---
pub const DEFAULT_AUTH_CODES: &[i32] = &[1, 8, 14, 17, 119];
pub const DEFAULT_RATE_LIMIT_CODES: &[i32] = &[4, 35];

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = true;

/// chrforge version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum nesting depth accepted by the decoders.
pub const MAX_DECODE_DEPTH: usize = 64;

/// Largest single string/binary payload the decoders will accept (16 MiB).
pub const MAX_STRING_LEN: usize = 16 * 1024 * 1024;

/// Protocol type id for the Thrift binary protocol.
pub const PROTOCOL_TYPE_BINARY: u8 = 3;

/// Protocol type id for the Thrift compact protocol.
pub const PROTOCOL_TYPE_COMPACT: u8 = 4;

/// Content type used for every request and reply body.
pub const THRIFT_CONTENT_TYPE: &str = "application/x-thrift";

/// Reply header carrying a rotated access token.
pub const NEXT_ACCESS_HEADER: &str = "x-line-next-access";

/// Request header carrying the current access token.
pub const ACCESS_HEADER: &str = "x-line-access";

/// Declared-exception code asking the client to refresh its v3 token.
pub const MUST_REFRESH_V3_TOKEN: i32 = 119;

/// Path of the v3 token refresh endpoint.
pub const TOKEN_REFRESH_ENDPOINT: &str = "/EXT/auth/tokenrefresh/v1";

/// Path of the secondary QR login endpoint.
pub const SECONDARY_QR_LOGIN_ENDPOINT: &str = "/acct/lgn/sq/v1";

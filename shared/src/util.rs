/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate an opaque token (QR tokens, session tokens, resource IDs)
pub fn new_token() -> String {
    uuid::Uuid::new_v4().to_string()
}

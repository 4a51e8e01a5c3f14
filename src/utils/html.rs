use ammonia;

/// Clean HTML content using the ammonia library.
///
/// Whitelist-based sanitization: safe tags (like <b>, <p>) survive, dangerous
/// tags (like <script>, <iframe>) and attributes (like onclick) are stripped.
/// Applied to post content before it is stored, as a fail-safe against
/// stored XSS reaching the dashboard or any other client.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

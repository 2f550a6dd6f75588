//! Session cookie helpers

/// Builds the `Set-Cookie` value carrying a session token.
pub fn session_cookie(name: &str, token: &str, max_age_seconds: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; Path=/; Max-Age={}; SameSite=Lax",
        name, token, max_age_seconds
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Builds the `Set-Cookie` value that clears a session cookie.
pub fn clear_cookie(name: &str) -> String {
    format!("{}=; HttpOnly; Path=/; Max-Age=0; SameSite=Lax", name)
}

/// Finds `name` in a `Cookie` request header value.
pub fn read_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("roster_admin_session", "abc", 60, true);
        assert!(cookie.starts_with("roster_admin_session=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=60"));
        assert!(cookie.ends_with("; Secure"));
    }

    #[test]
    fn test_read_cookie() {
        let header = "theme=dark; roster_admin_session=tok.en.sig; other=1";
        assert_eq!(read_cookie(header, "roster_admin_session"), Some("tok.en.sig"));
        assert_eq!(read_cookie(header, "roster_employee_session"), None);
        assert_eq!(read_cookie("roster_admin_session=", "roster_admin_session"), None);
    }
}

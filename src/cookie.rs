use percent_encoding::percent_decode_str;

/// Name of the cookie carrying the cross-site request forgery token.
pub const CSRF_COOKIE: &str = "csrftoken";

/// Looks up a cookie in a `;`-delimited cookie header and percent-decodes its value.
///
/// The first cookie whose trimmed text starts with `{name}=` wins.
pub fn get_cookie(cookie_header: &str, name: &str) -> Option<String> {
    if cookie_header.is_empty() {
        return None;
    }
    let prefix = format!("{}=", name);
    cookie_header
        .split(';')
        .map(str::trim)
        .find_map(|cookie| cookie.strip_prefix(prefix.as_str()))
        .map(|raw| percent_decode_str(raw).decode_utf8_lossy().into_owned())
}

/// Returns the `csrftoken` cookie value, if set.
pub fn csrf_token(cookie_header: &str) -> Option<String> {
    get_cookie(cookie_header, CSRF_COOKIE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_token_among_cookies() {
        let header = "sessionid=abc; csrftoken=tok123; theme=dark";
        assert_eq!(csrf_token(header), Some("tok123".to_string()));
    }

    #[test]
    fn test_value_is_percent_decoded() {
        assert_eq!(
            get_cookie("csrftoken=a%2Fb%3Dc", "csrftoken"),
            Some("a/b=c".to_string())
        );
    }

    #[test]
    fn test_prefix_similar_names_do_not_match() {
        assert_eq!(get_cookie("csrftokenx=nope; xcsrftoken=no", "csrftoken"), None);
    }

    #[test]
    fn test_missing_or_empty_header() {
        assert_eq!(csrf_token(""), None);
        assert_eq!(csrf_token("sessionid=abc"), None);
    }

    #[test]
    fn test_first_match_wins() {
        assert_eq!(
            csrf_token("csrftoken=first;csrftoken=second"),
            Some("first".to_string())
        );
    }
}

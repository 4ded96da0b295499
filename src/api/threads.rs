use url::Url;

use crate::error::{AppError, AppResult};

pub fn list_segments(user_id: &str) -> [&str; 5] {
    ["gmail", "v1", "users", user_id, "threads"]
}

pub fn thread_segments<'a>(user_id: &'a str, id: &'a str) -> [&'a str; 6] {
    ["gmail", "v1", "users", user_id, "threads", id]
}

pub fn message_segments<'a>(user_id: &'a str, id: &'a str) -> [&'a str; 6] {
    ["gmail", "v1", "users", user_id, "messages", id]
}

/// Replaces the path of `base_url` with `segments`, percent-encoding each one
/// so ids containing `/` or `?` stay inside their segment.
pub fn endpoint_url(base_url: &str, segments: &[&str]) -> AppResult<Url> {
    let mut url = Url::parse(base_url)?;
    url.path_segments_mut()
        .map_err(|()| AppError::Config(format!("{base_url} cannot carry a path")))?
        .clear()
        .extend(segments);
    Ok(url)
}

pub fn list_query(page_token: Option<&str>) -> Vec<(String, String)> {
    page_token
        .filter(|token| !token.is_empty())
        .map(|token| vec![("pageToken".to_string(), token.to_string())])
        .unwrap_or_default()
}

/// `minimal` still carries the message ids and snippets.
pub fn minimal_query() -> Vec<(String, String)> {
    vec![("format".to_string(), "minimal".to_string())]
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://gmail.googleapis.com";

    fn path_of(segments: &[&str]) -> String {
        let url = endpoint_url(BASE, segments).expect("url");
        url.path().to_string()
    }

    #[test]
    fn first_page_has_no_page_token() {
        assert!(list_query(None).is_empty());
        assert!(list_query(Some("")).is_empty());
    }

    #[test]
    fn forwards_page_token() {
        assert_eq!(
            list_query(Some("abc")),
            vec![("pageToken".to_string(), "abc".to_string())]
        );
    }

    #[test]
    fn builds_user_scoped_paths() {
        assert_eq!(path_of(&list_segments("me")), "/gmail/v1/users/me/threads");
        assert_eq!(
            path_of(&thread_segments("me", "t1")),
            "/gmail/v1/users/me/threads/t1"
        );
        assert_eq!(
            path_of(&message_segments("me", "m1")),
            "/gmail/v1/users/me/messages/m1"
        );

        let url = endpoint_url(BASE, &list_segments("me")).expect("url");
        assert_eq!(url.host_str(), Some("gmail.googleapis.com"));
    }

    #[test]
    fn escapes_separators_inside_segments() {
        assert_eq!(
            path_of(&thread_segments("a/b", "t1?x")),
            "/gmail/v1/users/a%2Fb/threads/t1%3Fx"
        );
        assert_eq!(
            path_of(&list_segments("../me")),
            "/gmail/v1/users/..%2Fme/threads"
        );
    }

    #[test]
    fn rejects_base_without_path() {
        let err = endpoint_url("mailto:someone@example.com", &list_segments("me"))
            .expect_err("should fail");
        assert!(matches!(err, AppError::Config(_)));
    }
}

use authgate::NewAccount;

pub const APPLICATION_HREF: &str = "memory://application";

pub const ALICE_EMAIL: &str = "alice@example.com";
pub const ALICE_PASSWORD: &str = "correct horse";

/// Provider credential the fake GitHub token endpoint hands out.
pub const GITHUB_ACCESS_TOKEN: &str = "gho_integration";
pub const GITHUB_CODE: &str = "good-code";

pub fn alice() -> NewAccount {
    NewAccount {
        email: ALICE_EMAIL.to_string(),
        password: ALICE_PASSWORD.to_string(),
        given_name: "Alice".to_string(),
        surname: "Liddell".to_string(),
        ..Default::default()
    }
}

/// Every `Set-Cookie` header of a response.
pub fn set_cookies(headers: &http::HeaderMap) -> Vec<String> {
    headers
        .get_all(http::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

/// Value of the named cookie among `Set-Cookie` headers, if it was set.
pub fn set_cookie_value(headers: &http::HeaderMap, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    set_cookies(headers).into_iter().find_map(|cookie| {
        cookie
            .strip_prefix(&prefix)
            .and_then(|rest| rest.split(';').next())
            .map(str::to_string)
    })
}

pub fn location(headers: &http::HeaderMap) -> Option<String> {
    headers
        .get(http::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

//! Session cookie construction.

use axum_extra::extract::cookie::{Cookie, SameSite};

use warden_core::config::{CookieConfig, SameSitePolicy};

/// Builds the HttpOnly cookie that carries the bearer token.
#[derive(Debug, Clone)]
pub struct SessionCookies {
    name: String,
    path: String,
    secure: bool,
    same_site: SameSite,
}

impl SessionCookies {
    /// Creates a builder from configuration.
    pub fn new(config: &CookieConfig) -> Self {
        let same_site = match config.same_site {
            SameSitePolicy::Strict => SameSite::Strict,
            SameSitePolicy::Lax => SameSite::Lax,
            SameSitePolicy::None => SameSite::None,
        };

        Self {
            name: config.name.clone(),
            path: config.path.clone(),
            secure: config.secure,
            same_site,
        }
    }

    /// Cookie name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cookie carrying `token` for `max_age_seconds`.
    pub fn session(&self, token: &str, max_age_seconds: i64) -> Cookie<'static> {
        Cookie::build((self.name.clone(), token.to_string()))
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .path(self.path.clone())
            .max_age(time::Duration::seconds(max_age_seconds.max(0)))
            .build()
    }

    /// Cookie instructing the client to drop the session cookie.
    pub fn removal(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build((self.name.clone(), String::new()))
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .path(self.path.clone())
            .build();
        cookie.make_removal();
        cookie
    }

    /// Extract the bearer token from a raw `Cookie` request header.
    pub fn token_from_header(&self, header: &str) -> Option<String> {
        Cookie::split_parse(header)
            .filter_map(Result::ok)
            .find(|c| c.name() == self.name)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cookies() -> SessionCookies {
        SessionCookies::new(&CookieConfig::default())
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = cookies().session("abc.def.ghi", 900);
        assert_eq!(cookie.name(), "access_token");
        assert_eq!(cookie.value(), "abc.def.ghi");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(900)));
    }

    #[test]
    fn test_removal_cookie_expires_immediately() {
        let cookie = cookies().removal();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
        assert_eq!(cookie.http_only(), Some(true));
    }

    #[test]
    fn test_same_site_strict() {
        let config = CookieConfig {
            same_site: SameSitePolicy::Strict,
            ..CookieConfig::default()
        };
        let cookie = SessionCookies::new(&config).session("t", 60);
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
    }

    #[test]
    fn test_token_from_header() {
        let cookies = cookies();
        assert_eq!(
            cookies.token_from_header("theme=dark; access_token=abc.def; lang=en"),
            Some("abc.def".to_string())
        );
        assert_eq!(cookies.token_from_header("theme=dark"), None);
        assert_eq!(cookies.token_from_header("access_token="), None);
    }
}

use tower_cookies::{Cookie, Cookies};
use uuid::Uuid;

use crate::sessions::SessionRegistry;

pub const SESSION_COOKIE: &str = "stockroom_session";

/// Resolve the caller's session id from its cookie, minting a new one when the
/// cookie is absent or unreadable. The cookie is re-issued on every request so
/// its lifetime slides along with the registry's idle timeout.
pub fn current_session(cookies: &Cookies, sessions: &SessionRegistry) -> Uuid {
    let session_id = cookies
        .get(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
        .unwrap_or_else(Uuid::new_v4);

    let cookie = Cookie::build((SESSION_COOKIE, session_id.to_string()))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::minutes(sessions.idle_ttl().num_minutes()))
        .build();
    cookies.add(cookie);

    session_id
}

//! Push token format check.

use once_cell::sync::Lazy;
use regex_lite::Regex;

static PUSH_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:Expo(?:nent)?PushToken\[.+\]|[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12})$",
    )
    .unwrap()
});

/// Returns true if `token` looks like a push token the service accepts.
///
/// Accepts `ExponentPushToken[..]`, `ExpoPushToken[..]` with a non-empty key,
/// and bare UUID-shaped device ids. The check is purely syntactic.
pub fn is_expo_push_token(token: &str) -> bool {
    PUSH_TOKEN.is_match(token)
}

//! Decoding and expiry checks for compact session tokens.
//!
//! The signature is never verified here; the API is the authority. The
//! client only needs the claims to decide whether a token is still worth
//! sending and to show who is signed in.

use base64ct::{Base64UrlUnpadded, Encoding};
use secrecy::SecretString;
use serde_json::{Map, Value};
use std::{
    fmt,
    time::{SystemTime, UNIX_EPOCH},
};

const REDACTED: &str = "[REDACTED]";

/// Claims carried in the middle segment of a session token.
///
/// Every field of the payload is kept as sent. Typed accessors read the
/// claims this client understands and yield `None` when a claim is absent or
/// has an unexpected JSON type.
#[derive(Clone, Default, PartialEq)]
pub struct Claims(Map<String, Value>);

impl Claims {
    /// Expiry in epoch seconds. Fractional values are truncated.
    #[must_use]
    pub fn exp(&self) -> Option<i64> {
        self.seconds("exp")
    }

    #[must_use]
    pub fn iat(&self) -> Option<i64> {
        self.seconds("iat")
    }

    #[must_use]
    pub fn nbf(&self) -> Option<i64> {
        self.seconds("nbf")
    }

    #[must_use]
    pub fn sub(&self) -> Option<&str> {
        self.text("sub")
    }

    #[must_use]
    pub fn jti(&self) -> Option<&str> {
        self.text("jti")
    }

    #[must_use]
    pub fn iss(&self) -> Option<&str> {
        self.text("iss")
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.text("username")
    }

    #[must_use]
    pub fn role(&self) -> Option<&str> {
        self.text("role")
    }

    /// Password echo used by the old-password pre-check. Never log it.
    #[must_use]
    pub fn password(&self) -> Option<SecretString> {
        self.text("password").map(SecretString::from)
    }

    /// Raw value of any claim, as sent.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// True when `exp` is present and strictly after `now` (epoch seconds).
    #[must_use]
    pub fn is_valid_at(&self, now: i64) -> bool {
        self.exp().is_some_and(|exp| exp > now)
    }

    fn text(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn seconds(&self, name: &str) -> Option<i64> {
        let value = self.0.get(name)?;
        value.as_i64().or_else(|| {
            value
                .as_f64()
                .filter(|seconds| seconds.is_finite())
                .map(|seconds| seconds.trunc() as i64)
        })
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, value) in &self.0 {
            if name == "password" {
                map.entry(name, &REDACTED);
            } else {
                map.entry(name, value);
            }
        }
        map.finish()
    }
}

/// Current time in epoch seconds, rounded up.
#[must_use]
pub fn now() -> i64 {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis());
    i64::try_from(millis.div_ceil(1000)).unwrap_or(i64::MAX)
}

/// Decodes the claims of `token`, or `None` when it is not a well formed
/// three-segment token with a JSON object payload.
#[must_use]
pub fn decode(token: &str) -> Option<Claims> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return None;
    };

    // tolerate padding and the standard alphabet
    let normalized: String = payload
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();

    let bytes = Base64UrlUnpadded::decode_vec(&normalized).ok()?;
    serde_json::from_slice::<Map<String, Value>>(&bytes)
        .ok()
        .map(Claims::from)
}

/// Checks `token` against the current clock.
#[must_use]
pub fn check(token: &str) -> bool {
    check_at(token, now())
}

/// Checks `token` against `now` (epoch seconds).
#[must_use]
pub fn check_at(token: &str, now: i64) -> bool {
    decode(token).is_some_and(|claims| claims.is_valid_at(now))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::mint_token;
    use secrecy::ExposeSecret;
    use serde_json::json;

    #[test]
    fn decode_returns_claims() {
        let token = mint_token(&json!({
            "exp": 1_700_000_000,
            "sub": "42",
            "username": "root",
            "role": "super",
            "password": "abc",
            "tenant": "north"
        }));

        let claims = decode(&token).unwrap();
        assert_eq!(claims.exp(), Some(1_700_000_000));
        assert_eq!(claims.sub(), Some("42"));
        assert_eq!(claims.username(), Some("root"));
        assert_eq!(claims.role(), Some("super"));
        assert_eq!(
            claims.password().as_ref().map(ExposeSecret::expose_secret),
            Some("abc")
        );
        assert_eq!(claims.get("tenant"), Some(&json!("north")));
    }

    #[test]
    fn opaque_claims_of_any_type_still_decode() {
        let exp = now() + 3600;
        let token = mint_token(&json!({
            "exp": exp,
            "role": 1,
            "sub": 42,
            "username": ["root"],
            "password": null
        }));

        let claims = decode(&token).unwrap();
        assert_eq!(claims.exp(), Some(exp));
        assert_eq!(claims.role(), None);
        assert_eq!(claims.get("role"), Some(&json!(1)));
        assert_eq!(claims.get("sub"), Some(&json!(42)));
        assert_eq!(claims.username(), None);
        assert!(claims.password().is_none());
        assert!(check(&token));
    }

    #[test]
    fn fractional_exp_is_truncated() {
        let now = now();
        #[allow(clippy::cast_precision_loss)]
        let token = mint_token(&json!({ "exp": (now + 60) as f64 + 0.75 }));
        assert_eq!(decode(&token).unwrap().exp(), Some(now + 60));
        assert!(check_at(&token, now));
        assert!(!check_at(&token, now + 60));

        let text = mint_token(&json!({ "exp": "soon" }));
        assert!(decode(&text).is_some());
        assert!(!check_at(&text, now));
    }

    #[test]
    fn decode_rejects_malformed_input() {
        let payload = Base64UrlUnpadded::encode_string(b"not json");
        let array = Base64UrlUnpadded::encode_string(b"[1,2]");
        let inputs = [
            String::new(),
            "no-dots-here".to_string(),
            "a.b".to_string(),
            "a.b.c.d".to_string(),
            "header.%%%%.sig".to_string(),
            format!("header.{payload}.sig"),
            format!("header.{array}.sig"),
            "..".to_string(),
        ];

        for input in inputs {
            assert!(decode(&input).is_none(), "expected None for {input:?}");
        }
    }

    #[test]
    fn decode_accepts_padded_payload() {
        let body = br#"{"exp":12}"#;
        let padded = base64ct::Base64Url::encode_string(body);
        assert!(padded.ends_with('='));
        let claims = decode(&format!("h.{padded}.s"));
        assert_eq!(claims.and_then(|c| c.exp()), Some(12));
    }

    #[test]
    fn debug_output_redacts_password() {
        let token = mint_token(&json!({"exp": 1, "password": "hunter2"}));
        let rendered = format!("{:?}", decode(&token));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("exp"));
    }

    #[test]
    fn check_requires_future_exp() {
        let now = now();
        let past = mint_token(&json!({ "exp": now - 1 }));
        let present = mint_token(&json!({ "exp": now }));
        let future = mint_token(&json!({ "exp": now + 3600 }));
        let missing = mint_token(&json!({ "sub": "1" }));

        assert!(!check_at(&past, now));
        assert!(!check_at(&present, now));
        assert!(check_at(&future, now));
        assert!(!check_at(&missing, now));
        assert!(!check_at("garbage", now));
    }

    #[test]
    fn check_uses_wall_clock() {
        let future = mint_token(&json!({ "exp": now() + 3600 }));
        let past = mint_token(&json!({ "exp": now() - 1 }));
        assert!(check(&future));
        assert!(!check(&past));
    }

    #[test]
    fn now_rounds_up() {
        let floor = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        assert!(now() >= i64::try_from(floor).unwrap());
    }
}

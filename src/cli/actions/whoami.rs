use crate::{config::ClientConfig, session::Claims};
use anyhow::{bail, Result};
use serde_json::Value;
use std::fmt::Write as _;

/// # Errors
/// Returns an error if no valid session is stored.
pub fn execute(config: &ClientConfig) -> Result<()> {
    let session = config.session_store();
    let Some(claims) = session.claims() else {
        if session.has_stored_token() {
            bail!("the stored session has expired, run `uportal login`");
        }
        bail!("not signed in, run `uportal login`");
    };

    print!("{}", describe(&claims));
    Ok(())
}

fn describe(claims: &Claims) -> String {
    let mut out = String::new();
    let rows = [
        ("username", "username"),
        ("role", "role"),
        ("subject", "sub"),
        ("issuer", "iss"),
        ("expires", "exp"),
    ];
    for (label, name) in rows {
        // claims are opaque, show strings and numbers as sent
        let value = match claims.get(name) {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Number(number)) => number.to_string(),
            _ => continue,
        };
        let _ = writeln!(out, "{label:<9} {value}");
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::session::token;
    use crate::test_support::mint_token;
    use serde_json::json;

    #[test]
    fn describe_lists_known_claims_without_password() {
        let claims = token::decode(&mint_token(&json!({
            "exp": 1_900_000_000,
            "username": "root",
            "role": 7,
            "password": "abc",
        })))
        .unwrap();

        let text = describe(&claims);
        assert!(text.contains("username  root"));
        assert!(text.contains("role      7"));
        assert!(text.contains("expires   1900000000"));
        assert!(!text.contains("subject"));
        assert!(!text.contains("abc"));
    }
}

//! # uPortal back-office client
//!
//! `uportal_admin` holds the pieces of the back-office web client that carry
//! real state: the session token slot, the navigation guard, the request
//! interceptor and the password-change wizard. Screens that only list or edit
//! records are collaborators; they talk to the API through [`api::ApiClient`]
//! and never touch the token directly.
//!
//! ## Session
//!
//! The bearer token is a compact three-segment string whose middle segment is
//! base64url JSON claims. A token is only ever stored, or handed out, while its
//! `exp` claim is in the future. See [`session::SessionStore`].
//!
//! ## Requests
//!
//! Same-origin requests get `Authorization: Bearer <token>`, refreshed tokens
//! arrive in a `Set-Token` response header, and every body is an envelope
//! `{code, message, data}` where `0` is success and `401` means the session is
//! gone. Cross-origin requests are forwarded untouched so the token never
//! leaves the application origin.
//!
//! ## Password change
//!
//! A three step flow (old, new, confirm). Step values are kept in a short-lived
//! in-memory flow addressed by an opaque id; routes only carry the step number
//! and that id. See [`wizard::PasswordChange`].

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod notify;
pub mod router;
pub mod session;
pub mod wizard;

#[cfg(test)]
pub(crate) mod test_support;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

//! Auth endpoints of the back-office API. Request bodies hold plaintext
//! credentials only for the duration of the call; never log them.

use super::{
    client::{ApiClient, Reply},
    envelope::ApiError,
    transport::Transport,
};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;

pub const LOGIN_ENDPOINT: &str = "/admin/auth/login";
pub const CHANGE_PASSWORD_ENDPOINT: &str = "/admin/auth/change-password";

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct ChangePasswordRequest<'a> {
    old_password: &'a str,
    new_password: &'a str,
}

impl<T: Transport> ApiClient<T> {
    /// `POST /admin/auth/login`. The session token arrives in the
    /// `Set-Token` header and is stored by the interceptor.
    ///
    /// # Errors
    /// Returns the API error for rejected credentials or transport failures.
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<Reply<()>, ApiError> {
        let body = LoginRequest {
            username,
            password: password.expose_secret(),
        };
        let reply: Reply<Value> = self.post(LOGIN_ENDPOINT, &body).await?;
        Ok(reply.map(drop))
    }

    /// `POST /admin/auth/change-password`.
    ///
    /// # Errors
    /// Returns the API error if the server refuses the change.
    pub async fn change_password(
        &self,
        old_password: &SecretString,
        new_password: &SecretString,
    ) -> Result<Reply<()>, ApiError> {
        let body = ChangePasswordRequest {
            old_password: old_password.expose_secret(),
            new_password: new_password.expose_secret(),
        };
        let reply: Reply<Value> = self.post(CHANGE_PASSWORD_ENDPOINT, &body).await?;
        Ok(reply.map(drop))
    }
}

//! Login and signup.

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tote_core::{Email, UserId};
use tracing::{info, instrument};

use super::ApiClient;
use crate::error::ApiError;

/// A signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
}

/// Result of a successful login or signup.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Bearer token for subsequent requests
    pub token: SecretString,
    pub user: User,
}

#[derive(Deserialize)]
struct AuthResponse {
    token: String,
    user: User,
}

impl From<AuthResponse> for AuthSession {
    fn from(response: AuthResponse) -> Self {
        Self {
            token: SecretString::from(response.token),
            user: response.user,
        }
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SignupRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

impl ApiClient {
    /// Log in and attach the returned token to this client.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] for bad credentials, or another error
    /// if the request fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthSession, ApiError> {
        let body = LoginRequest {
            email: email.as_str(),
            password: password.expose_secret(),
        };
        let response: AuthResponse = self
            .execute_json(self.request(Method::POST, "auth/login").json(&body))
            .await?;

        let session = AuthSession::from(response);
        self.set_token(session.token.clone()).await;
        info!(user_id = %session.user.id, "Logged in");
        Ok(session)
    }

    /// Create an account and attach the returned token to this client.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Status`] if the backend refuses the signup (e.g.
    /// email already registered), or another error if the request fails.
    #[instrument(skip(self, name, password), fields(email = %email))]
    pub async fn signup(
        &self,
        name: &str,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthSession, ApiError> {
        let body = SignupRequest {
            name: name.trim(),
            email: email.as_str(),
            password: password.expose_secret(),
        };
        let response: AuthResponse = self
            .execute_json(self.request(Method::POST, "auth/signup").json(&body))
            .await?;

        let session = AuthSession::from(response);
        self.set_token(session.token.clone()).await;
        info!(user_id = %session.user.id, "Signed up");
        Ok(session)
    }
}

//! Login and signup commands.
//!
//! The token is printed for the caller to export as `TOTE_API_TOKEN`; it is
//! not stored anywhere.

use secrecy::{ExposeSecret, SecretString};
use tote_client::AuthSession;
use tote_core::Email;

use super::{CommandError, client};

/// Log in with email and password.
///
/// # Errors
///
/// Returns an error if the email is invalid, the credentials are rejected, or
/// the request fails.
pub async fn login(email: &str, password: SecretString) -> Result<(), CommandError> {
    let email = Email::parse(email)?;
    let session = client()?.login(&email, &password).await?;
    print_session(&session);
    Ok(())
}

/// Create an account.
///
/// # Errors
///
/// Returns an error if the email is invalid, the backend refuses the signup,
/// or the request fails.
pub async fn signup(name: &str, email: &str, password: SecretString) -> Result<(), CommandError> {
    let email = Email::parse(email)?;
    let session = client()?.signup(name, &email, &password).await?;
    print_session(&session);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_session(session: &AuthSession) {
    println!("Signed in as {} <{}>", session.user.name, session.user.email);
    println!("export TOTE_API_TOKEN={}", session.token.expose_secret());
}

//! Sign-up, sign-in and profile calls.

use serde::{Deserialize, Serialize};

use super::{ApiConfig, ApiError};
use crate::http_client;

/// The authenticated account as the backend reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Response to a successful sign-in or sign-up.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

#[derive(Serialize)]
struct SignUpRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct ProfileResponse {
    user: User,
}

/// Create an account and return the fresh credential.
pub fn sign_up(
    config: &ApiConfig,
    name: &str,
    email: &str,
    password: &str,
) -> Result<AuthResponse, ApiError> {
    let url = config.endpoint("/auth/signup");
    let request = http_client::agent()
        .post(&url)
        .set("Accept", "application/json")
        .set("Content-Type", "application/json");
    let response = match request.send_json(&SignUpRequest {
        name,
        email,
        password,
    }) {
        Ok(response) => response,
        Err(ureq::Error::Status(code, response)) => {
            return Err(super::status_error(code, response, "Signup failed"));
        }
        Err(ureq::Error::Transport(err)) => return Err(super::transport_error(&err)),
    };
    super::read_json(response)
}

/// Exchange credentials for a token and user.
pub fn sign_in(config: &ApiConfig, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
    let url = config.endpoint("/auth/signin");
    let request = http_client::agent()
        .post(&url)
        .set("Accept", "application/json")
        .set("Content-Type", "application/json");
    let response = match request.send_json(&SignInRequest { email, password }) {
        Ok(response) => response,
        Err(ureq::Error::Status(code, response)) => {
            return Err(super::status_error(code, response, "Signin failed"));
        }
        Err(ureq::Error::Transport(err)) => return Err(super::transport_error(&err)),
    };
    super::read_json(response)
}

/// Fetch the profile for a bearer token.
pub fn get_profile(config: &ApiConfig, token: &str) -> Result<User, ApiError> {
    let url = config.endpoint("/profile");
    let request = http_client::agent()
        .get(&url)
        .set("Accept", "application/json")
        .set("Authorization", &format!("Bearer {}", token.trim()));
    let response = match request.call() {
        Ok(response) => response,
        Err(ureq::Error::Status(code, response)) => {
            return Err(super::status_error(
                code,
                response,
                "Failed to fetch profile",
            ));
        }
        Err(ureq::Error::Transport(err)) => return Err(super::transport_error(&err)),
    };
    let parsed: ProfileResponse = super::read_json(response)?;
    Ok(parsed.user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_auth_response_shape() {
        let json = r#"
        {
          "user": { "id": 7, "name": "Ada", "email": "ada@example.com", "createdAt": "2025-01-01T00:00:00Z" },
          "token": "tok_123"
        }"#;
        let parsed: AuthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.user.id, 7);
        assert_eq!(parsed.user.created_at.as_deref(), Some("2025-01-01T00:00:00Z"));
        assert_eq!(parsed.token, "tok_123");
    }

    #[test]
    fn user_tolerates_missing_created_at() {
        let json = r#"{ "id": 1, "name": "Ada", "email": "ada@example.com" }"#;
        let parsed: User = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.created_at, None);
    }

    #[test]
    fn parses_profile_wrapper() {
        let json = r#"{ "user": { "id": 2, "name": "Bo", "email": "bo@example.com" } }"#;
        let parsed: ProfileResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.user.name, "Bo");
    }
}

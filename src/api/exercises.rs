//! Exercise catalog calls.

use serde::{Deserialize, Serialize};

use super::{ApiConfig, ApiError};
use crate::http_client;

/// Difficulty rating of a catalog exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// A server-owned exercise definition referenced by id from drafts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub muscle_group: String,
    #[serde(default)]
    pub equipment: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub video_url: String,
    #[serde(default)]
    pub image_url: String,
}

/// Fetch the full exercise catalog.
///
/// The endpoint started out unauthenticated; later backend revisions require
/// a bearer token, so one is attached when available.
pub fn list_exercises(config: &ApiConfig, token: Option<&str>) -> Result<Vec<Exercise>, ApiError> {
    let url = config.endpoint("/exercises");
    let mut request = http_client::agent()
        .get(&url)
        .set("Accept", "application/json");
    if let Some(token) = token {
        request = request.set("Authorization", &format!("Bearer {}", token.trim()));
    }
    let response = match request.call() {
        Ok(response) => response,
        Err(ureq::Error::Status(code, response)) => {
            return Err(super::status_error(
                code,
                response,
                "Failed to fetch exercises",
            ));
        }
        Err(ureq::Error::Transport(err)) => return Err(super::transport_error(&err)),
    };
    super::read_json(response)
}

//! Workout save, history and delete calls.

use serde::{Deserialize, Serialize};

use super::{ApiConfig, ApiError, exercises::Exercise};
use crate::{http_client, workout::WeightUnit};

/// One performed set as it travels over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRecord {
    pub reps: u32,
    pub weight: f64,
    pub weight_unit: WeightUnit,
}

/// One exercise block inside a submission payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExercisePayload {
    pub exercise_id: i64,
    pub sets: Vec<SetRecord>,
}

/// The full submission payload handed to `POST /workouts`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPayload {
    pub user_id: i64,
    /// Submission time as an RFC 3339 timestamp.
    pub date: String,
    /// Elapsed active-workout time in seconds.
    pub duration: u64,
    pub exercises: Vec<ExercisePayload>,
}

/// One exercise block of a saved workout. The backend may embed the full
/// catalog entry, the bare id, or both.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutExerciseEntry {
    #[serde(default)]
    pub exercise: Option<Exercise>,
    #[serde(default)]
    pub exercise_id: Option<i64>,
    #[serde(default)]
    pub sets: Vec<SetRecord>,
}

/// A saved workout as the backend reports it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRecord {
    pub id: i64,
    pub user_id: i64,
    pub date: String,
    #[serde(default)]
    pub duration: u64,
    #[serde(default)]
    pub exercises: Vec<WorkoutExerciseEntry>,
}

/// Submit a finished workout. Returns the saved record.
pub fn save_workout(
    config: &ApiConfig,
    token: &str,
    payload: &WorkoutPayload,
) -> Result<WorkoutRecord, ApiError> {
    let url = config.endpoint("/workouts");
    let request = http_client::agent()
        .post(&url)
        .set("Accept", "application/json")
        .set("Content-Type", "application/json")
        .set("Authorization", &format!("Bearer {}", token.trim()));
    let response = match request.send_json(payload) {
        Ok(response) => response,
        Err(ureq::Error::Status(code, response)) => {
            return Err(super::status_error(
                code,
                response,
                "Failed to save workout",
            ));
        }
        Err(ureq::Error::Transport(err)) => return Err(super::transport_error(&err)),
    };
    super::read_json(response)
}

/// Fetch the caller's workout history.
pub fn list_workouts(config: &ApiConfig, token: &str) -> Result<Vec<WorkoutRecord>, ApiError> {
    let url = config.endpoint("/workouts");
    let response = match authorized_get(&url, token) {
        Ok(response) => response,
        Err(ureq::Error::Status(code, response)) => {
            return Err(super::status_error(
                code,
                response,
                "Failed to fetch workouts",
            ));
        }
        Err(ureq::Error::Transport(err)) => return Err(super::transport_error(&err)),
    };
    super::read_json(response)
}

/// Fetch one saved workout by id.
pub fn get_workout(config: &ApiConfig, token: &str, id: i64) -> Result<WorkoutRecord, ApiError> {
    let url = config.endpoint(&format!("/workouts/{id}"));
    let response = match authorized_get(&url, token) {
        Ok(response) => response,
        Err(ureq::Error::Status(code, response)) => {
            return Err(super::status_error(
                code,
                response,
                "Failed to fetch workout",
            ));
        }
        Err(ureq::Error::Transport(err)) => return Err(super::transport_error(&err)),
    };
    super::read_json(response)
}

/// Delete a saved workout. The backend answers 200 or 204 with no useful body.
pub fn delete_workout(config: &ApiConfig, token: &str, id: i64) -> Result<(), ApiError> {
    let url = config.endpoint(&format!("/workouts/{id}"));
    let request = http_client::agent()
        .delete(&url)
        .set("Accept", "application/json")
        .set("Authorization", &format!("Bearer {}", token.trim()));
    match request.call() {
        Ok(_) => Ok(()),
        Err(ureq::Error::Status(code, response)) => Err(super::status_error(
            code,
            response,
            "Failed to delete workout",
        )),
        Err(ureq::Error::Transport(err)) => Err(super::transport_error(&err)),
    }
}

fn authorized_get(url: &str, token: &str) -> Result<ureq::Response, ureq::Error> {
    http_client::agent()
        .get(url)
        .set("Accept", "application/json")
        .set("Authorization", &format!("Bearer {}", token.trim()))
        .call()
}

/// Render a duration in seconds the way history screens show it:
/// `mm:ss` under an hour, `h:mm:ss` above.
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_serializes_camel_case() {
        let payload = WorkoutPayload {
            user_id: 7,
            date: "2025-06-01T10:00:00Z".to_string(),
            duration: 1800,
            exercises: vec![ExercisePayload {
                exercise_id: 5,
                sets: vec![SetRecord {
                    reps: 10,
                    weight: 135.0,
                    weight_unit: WeightUnit::Kg,
                }],
            }],
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["userId"], 7);
        assert_eq!(json["exercises"][0]["exerciseId"], 5);
        assert_eq!(json["exercises"][0]["sets"][0]["weightUnit"], "kg");
    }

    #[test]
    fn parses_saved_workout_with_embedded_exercise() {
        let json = r#"
        {
          "id": 42,
          "userId": 7,
          "date": "2025-06-01T10:00:00Z",
          "duration": 1800,
          "exercises": [
            {
              "exercise": { "id": 5, "name": "Bench Press", "difficulty": "intermediate" },
              "sets": [ { "reps": 10, "weight": 135.0, "weightUnit": "kg" } ]
            }
          ]
        }"#;
        let parsed: WorkoutRecord = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.id, 42);
        let entry = &parsed.exercises[0];
        assert_eq!(entry.exercise.as_ref().map(|e| e.id), Some(5));
        assert_eq!(entry.sets[0].reps, 10);
    }

    #[test]
    fn parses_sparse_workout_record() {
        let json = r#"{ "id": 1, "userId": 2, "date": "2025-06-01T10:00:00Z" }"#;
        let parsed: WorkoutRecord = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.duration, 0);
        assert!(parsed.exercises.is_empty());
    }

    #[test]
    fn formats_durations() {
        assert_eq!(format_duration(0), "00:00");
        assert_eq!(format_duration(65), "01:05");
        assert_eq!(format_duration(2700), "45:00");
        assert_eq!(format_duration(3661), "1:01:01");
    }
}

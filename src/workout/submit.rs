//! Turning a finished draft into a workout submission.
//!
//! `build_payload` is a pure transform: it never mutates the draft, and a
//! draft with no completed sets fails validation before any network code
//! runs. Clearing the draft after a successful save is the caller's separate
//! action.

use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::api::{
    self, ApiConfig, ApiError,
    workouts::{ExercisePayload, SetRecord, WorkoutPayload, WorkoutRecord},
};

use super::draft::DraftWorkout;

/// Errors surfaced by payload construction and submission.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// No set anywhere in the draft is marked completed.
    #[error("No completed sets to save")]
    NothingToSave,
    /// A submission for this draft is already running.
    #[error("A workout submission is already in flight")]
    AlreadyInFlight,
    /// Failed to format the submission timestamp.
    #[error("Failed to format submission time: {0}")]
    FormatTime(time::error::Format),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Build the submission payload for a draft.
///
/// Each exercise keeps only its completed sets and is dropped entirely when
/// none remain. Reps and weight text coerce leniently to numbers; anything
/// unparsable becomes `0`. Each set carries its own unit snapshot.
pub fn build_payload(
    draft: &DraftWorkout,
    user_id: i64,
    elapsed_seconds: u64,
) -> Result<WorkoutPayload, SubmitError> {
    let exercises = draft
        .exercises()
        .iter()
        .filter_map(|exercise| {
            let sets = exercise
                .sets
                .iter()
                .filter(|set| set.is_completed)
                .map(|set| SetRecord {
                    reps: coerce_reps(&set.reps),
                    weight: coerce_weight(&set.weight),
                    weight_unit: set.weight_unit,
                })
                .collect::<Vec<_>>();
            if sets.is_empty() {
                None
            } else {
                Some(ExercisePayload {
                    exercise_id: exercise.exercise_id,
                    sets,
                })
            }
        })
        .collect::<Vec<_>>();

    if exercises.is_empty() {
        return Err(SubmitError::NothingToSave);
    }

    let date = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(SubmitError::FormatTime)?;
    Ok(WorkoutPayload {
        user_id,
        date,
        duration: elapsed_seconds,
        exercises,
    })
}

/// Progress of the one allowed submission for the active draft.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmitState {
    #[default]
    Idle,
    InFlight,
    Done,
}

/// Enforces at most one concurrent submission in the core, instead of
/// leaving the guarantee to a disabled button.
#[derive(Debug, Default)]
pub struct WorkoutSubmitter {
    state: SubmitState,
}

impl WorkoutSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SubmitState {
        self.state
    }

    /// Validate, build and send the submission for `draft`.
    ///
    /// Validation failures leave the state untouched and never reach the
    /// network. A completed submission parks the guard in `Done` until
    /// `reset` is called for the next draft.
    pub fn submit(
        &mut self,
        config: &ApiConfig,
        token: &str,
        draft: &DraftWorkout,
        user_id: i64,
    ) -> Result<WorkoutRecord, SubmitError> {
        if self.state == SubmitState::InFlight {
            return Err(SubmitError::AlreadyInFlight);
        }
        let payload = build_payload(draft, user_id, draft.elapsed_seconds())?;
        self.state = SubmitState::InFlight;
        let result = api::workouts::save_workout(config, token, &payload);
        match result {
            Ok(saved) => {
                self.state = SubmitState::Done;
                tracing::info!("Workout saved as id {}", saved.id);
                Ok(saved)
            }
            Err(err) => {
                // A failed attempt may be retried by the user.
                self.state = SubmitState::Idle;
                Err(SubmitError::Api(err))
            }
        }
    }

    /// Re-arm the guard for a new draft.
    pub fn reset(&mut self) {
        self.state = SubmitState::Idle;
    }
}

fn coerce_reps(text: &str) -> u32 {
    text.trim().parse().unwrap_or(0)
}

fn coerce_weight(text: &str) -> f64 {
    text.trim().parse().unwrap_or(0.0)
}

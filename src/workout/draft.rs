//! In-memory state for the workout being built right now.
//!
//! The draft holds selected exercises and their sets until the user finishes
//! or discards the workout. Reps and weight stay free-form text while
//! editing; nothing is validated until submission. Mutations acting on ids
//! that no longer exist are tolerated and report failure instead of
//! panicking, so re-entrant UI updates cannot crash the store.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unit a weight value is expressed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lbs,
}

impl WeightUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kg => "kg",
            Self::Lbs => "lbs",
        }
    }
}

impl std::fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of a draft set, unique within the process.
pub type SetId = Uuid;

/// Which editable field of a set an update targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetField {
    Reps,
    Weight,
}

/// One set of an exercise in the draft.
///
/// `weight_unit` snapshots the global preference at creation time, so later
/// preference changes never reinterpret numbers the user already entered.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftSet {
    pub id: SetId,
    pub reps: String,
    pub weight: String,
    pub weight_unit: WeightUnit,
    pub is_completed: bool,
}

impl DraftSet {
    fn new(weight_unit: WeightUnit) -> Self {
        Self {
            id: Uuid::new_v4(),
            reps: String::new(),
            weight: String::new(),
            weight_unit,
            is_completed: false,
        }
    }
}

/// One exercise selected into the draft, with its ordered sets.
///
/// The name is a denormalized snapshot so the draft stays renderable when the
/// catalog is unavailable.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftExercise {
    pub exercise_id: i64,
    pub name: String,
    pub sets: Vec<DraftSet>,
}

impl DraftExercise {
    /// Number of sets marked completed.
    pub fn completed_sets(&self) -> usize {
        self.sets.iter().filter(|set| set.is_completed).count()
    }
}

/// Whether adding an exercise already in the draft is allowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Reject a second entry with the same exercise id.
    #[default]
    Reject,
    /// Allow the same exercise more than once (supersets).
    Allow,
}

/// The single in-progress workout.
///
/// Zero or one of these exists per process; the UI never holds its own copy
/// and drives all changes through this API.
#[derive(Debug)]
pub struct DraftWorkout {
    exercises: Vec<DraftExercise>,
    weight_unit: WeightUnit,
    duplicate_policy: DuplicatePolicy,
    started_at: Instant,
}

impl DraftWorkout {
    /// Start an empty draft using the given unit preference.
    pub fn new(weight_unit: WeightUnit) -> Self {
        Self::with_policy(weight_unit, DuplicatePolicy::default())
    }

    /// Start an empty draft with an explicit duplicate-exercise policy.
    pub fn with_policy(weight_unit: WeightUnit, duplicate_policy: DuplicatePolicy) -> Self {
        Self {
            exercises: Vec::new(),
            weight_unit,
            duplicate_policy,
            started_at: Instant::now(),
        }
    }

    /// Exercises in the order the user added them.
    pub fn exercises(&self) -> &[DraftExercise] {
        &self.exercises
    }

    /// Look up one exercise by catalog id.
    pub fn exercise(&self, exercise_id: i64) -> Option<&DraftExercise> {
        self.exercises
            .iter()
            .find(|exercise| exercise.exercise_id == exercise_id)
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// The current global unit preference.
    pub fn weight_unit(&self) -> WeightUnit {
        self.weight_unit
    }

    /// Wall-clock seconds since this draft was started or last reset.
    pub fn elapsed_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Append an exercise with no sets. Returns `false` when the id is
    /// already present and the policy rejects duplicates.
    pub fn add_exercise(&mut self, exercise_id: i64, name: &str) -> bool {
        if self.duplicate_policy == DuplicatePolicy::Reject
            && self.exercise(exercise_id).is_some()
        {
            tracing::debug!("Ignoring duplicate exercise {exercise_id} in draft");
            return false;
        }
        self.exercises.push(DraftExercise {
            exercise_id,
            name: name.to_string(),
            sets: Vec::new(),
        });
        true
    }

    /// Remove an exercise and all its sets. Returns whether it existed.
    pub fn delete_exercise(&mut self, exercise_id: i64) -> bool {
        let before = self.exercises.len();
        self.exercises
            .retain(|exercise| exercise.exercise_id != exercise_id);
        let removed = self.exercises.len() != before;
        if !removed {
            tracing::debug!("Delete of absent exercise {exercise_id} ignored");
        }
        removed
    }

    /// Append an empty set to an exercise, snapshotting the current unit.
    /// Returns the new set's id, or `None` when the exercise is absent.
    pub fn add_set(&mut self, exercise_id: i64) -> Option<SetId> {
        let weight_unit = self.weight_unit;
        let Some(exercise) = self.exercise_mut(exercise_id) else {
            tracing::debug!("Add set to absent exercise {exercise_id} ignored");
            return None;
        };
        let set = DraftSet::new(weight_unit);
        let id = set.id;
        exercise.sets.push(set);
        Some(id)
    }

    /// Replace the text of one editable field on a set.
    pub fn update_set(
        &mut self,
        exercise_id: i64,
        set_id: SetId,
        field: SetField,
        value: &str,
    ) -> bool {
        let Some(set) = self.set_mut(exercise_id, set_id) else {
            tracing::debug!("Update of absent set {set_id} ignored");
            return false;
        };
        match field {
            SetField::Reps => set.reps = value.to_string(),
            SetField::Weight => set.weight = value.to_string(),
        }
        true
    }

    /// Remove one set. Returns whether it existed.
    pub fn delete_set(&mut self, exercise_id: i64, set_id: SetId) -> bool {
        let Some(exercise) = self.exercise_mut(exercise_id) else {
            tracing::debug!("Delete of set on absent exercise {exercise_id} ignored");
            return false;
        };
        let before = exercise.sets.len();
        exercise.sets.retain(|set| set.id != set_id);
        exercise.sets.len() != before
    }

    /// Flip the completion flag on one set.
    pub fn toggle_set_completion(&mut self, exercise_id: i64, set_id: SetId) -> bool {
        let Some(set) = self.set_mut(exercise_id, set_id) else {
            tracing::debug!("Toggle of absent set {set_id} ignored");
            return false;
        };
        set.is_completed = !set.is_completed;
        true
    }

    /// Change the global unit preference. Existing set snapshots keep the
    /// unit they were created under.
    pub fn set_weight_unit(&mut self, unit: WeightUnit) {
        self.weight_unit = unit;
    }

    /// Discard all exercises and restart the stopwatch. The unit preference
    /// is untouched.
    pub fn reset(&mut self) {
        self.exercises.clear();
        self.started_at = Instant::now();
    }

    fn exercise_mut(&mut self, exercise_id: i64) -> Option<&mut DraftExercise> {
        self.exercises
            .iter_mut()
            .find(|exercise| exercise.exercise_id == exercise_id)
    }

    fn set_mut(&mut self, exercise_id: i64, set_id: SetId) -> Option<&mut DraftSet> {
        self.exercise_mut(exercise_id)?
            .sets
            .iter_mut()
            .find(|set| set.id == set_id)
    }
}

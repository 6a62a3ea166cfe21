//! Draft workout state and submission.

mod draft;
mod submit;

pub use draft::{
    DraftExercise, DraftSet, DraftWorkout, DuplicatePolicy, SetField, SetId, WeightUnit,
};
pub use submit::{SubmitError, SubmitState, WorkoutSubmitter, build_payload};

use crate::settings::{self, AppSettings, SettingsError};

/// The draft plus its persistence contract.
///
/// Draft contents are session-scoped and die with the process; only the
/// weight-unit preference survives a restart, written through to the settings
/// file the moment it changes.
#[derive(Debug)]
pub struct WorkoutStore {
    draft: DraftWorkout,
    settings: AppSettings,
}

impl WorkoutStore {
    /// Load persisted preferences and start an empty draft from them.
    pub fn load() -> Result<Self, SettingsError> {
        let settings = settings::load_or_default()?;
        Ok(Self::from_settings(settings))
    }

    /// Build a store from already-loaded settings.
    pub fn from_settings(settings: AppSettings) -> Self {
        Self {
            draft: DraftWorkout::new(settings.weight_unit),
            settings,
        }
    }

    pub fn draft(&self) -> &DraftWorkout {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut DraftWorkout {
        &mut self.draft
    }

    /// Change the global unit preference and persist it immediately.
    /// Existing set snapshots keep the unit they were created under.
    pub fn set_weight_unit(&mut self, unit: WeightUnit) -> Result<(), SettingsError> {
        self.draft.set_weight_unit(unit);
        self.settings.weight_unit = unit;
        settings::save(&self.settings)
    }

    /// Discard the draft, e.g. on cancel or after a successful save.
    pub fn reset_workout(&mut self) {
        self.draft.reset();
    }
}

// MoodLog - core/form.rs
//
// Pending-submission form state and its validation.
// Validation is synchronous and happens before any store request.

use crate::core::model::{Mood, NewEntry};
use crate::util::constants::{DEFAULT_ENERGY, MAX_DESCRIPTION_CHARS, MAX_ENERGY, MIN_ENERGY};
use crate::util::error::ValidationError;

/// The fields the user is editing for the next entry.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryForm {
    /// Selected mood; `None` until the user picks one.
    pub mood: Option<Mood>,

    /// Free-text story of the day.
    pub description: String,

    /// Whether the energy rating is attached to the entry.
    pub energy_enabled: bool,

    /// Energy slider position; only sent when `energy_enabled`.
    pub energy: u8,

    /// ID of the picked emoji; `None` until the user picks one.
    pub emoji_id: Option<i64>,
}

impl Default for EntryForm {
    fn default() -> Self {
        Self {
            mood: None,
            description: String::new(),
            energy_enabled: false,
            energy: DEFAULT_ENERGY,
            emoji_id: None,
        }
    }
}

impl EntryForm {
    /// Check every required field and build the record to insert.
    ///
    /// Checks run in form order (mood, story, energy, emoji) and the first
    /// failure is returned. `user_id` is attached verbatim when present.
    pub fn validate(&self, user_id: Option<&str>) -> Result<NewEntry, ValidationError> {
        let mood = self.mood.ok_or(ValidationError::MissingMood)?;

        let description = self.description.trim();
        if description.is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        let length = description.chars().count();
        if length > MAX_DESCRIPTION_CHARS {
            return Err(ValidationError::DescriptionTooLong {
                length,
                max: MAX_DESCRIPTION_CHARS,
            });
        }

        let energy_level = if self.energy_enabled {
            if !(MIN_ENERGY..=MAX_ENERGY).contains(&self.energy) {
                return Err(ValidationError::EnergyOutOfRange {
                    value: self.energy,
                    min: MIN_ENERGY,
                    max: MAX_ENERGY,
                });
            }
            Some(self.energy)
        } else {
            None
        };

        let emoji_id = self.emoji_id.ok_or(ValidationError::MissingEmoji)?;

        Ok(NewEntry {
            mood,
            description: description.to_string(),
            energy_level,
            emoji_id,
            user_id: user_id.map(str::to_string),
        })
    }

    /// Return every field to its initial value.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// True when nothing has been entered yet.
    pub fn is_pristine(&self) -> bool {
        *self == Self::default()
    }
}

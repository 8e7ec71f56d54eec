// MoodLog - core/model.rs
//
// Core data model types. Pure data definitions with no I/O, no UI,
// no platform dependencies.
//
// Row shapes mirror the hosted tables:
//   journal_entries(id, mood, description, energy_level, emoji_id, user_id, created_at)
//   emojis(id, symbol)

use crate::util::constants::{MAX_ENERGY, MIN_ENERGY};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

// =============================================================================
// Mood
// =============================================================================

/// The closed set of moods offered by the form.
///
/// Serialised as the display label so the stored text reads naturally
/// (`"Not Fine"`, not `"NotFine"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    Fine,
    #[serde(rename = "Not Fine")]
    NotFine,
    Productive,
    Exhausted,
    Romantic,
    Unmotivated,
    Peaceful,
    Overthinking,
    Inspired,
}

impl Mood {
    /// Returns all variants in picker order.
    pub fn all() -> &'static [Mood] {
        &[
            Mood::Fine,
            Mood::NotFine,
            Mood::Productive,
            Mood::Exhausted,
            Mood::Romantic,
            Mood::Unmotivated,
            Mood::Peaceful,
            Mood::Overthinking,
            Mood::Inspired,
        ]
    }

    /// Human-readable label, identical to the stored value.
    pub fn label(&self) -> &'static str {
        match self {
            Mood::Fine => "Fine",
            Mood::NotFine => "Not Fine",
            Mood::Productive => "Productive",
            Mood::Exhausted => "Exhausted",
            Mood::Romantic => "Romantic",
            Mood::Unmotivated => "Unmotivated",
            Mood::Peaceful => "Peaceful",
            Mood::Overthinking => "Overthinking",
            Mood::Inspired => "Inspired",
        }
    }

    /// Look up a mood by its stored label. Exact match.
    pub fn from_label(label: &str) -> Option<Mood> {
        Mood::all().iter().copied().find(|m| m.label() == label)
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Emoji
// =============================================================================

/// One row of the emoji reference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emoji {
    pub id: i64,
    pub symbol: String,
}

impl Emoji {
    pub fn new(id: i64, symbol: &str) -> Self {
        Self {
            id,
            symbol: symbol.to_string(),
        }
    }
}

/// Built-in emoji set used when the store has no `emojis` rows.
///
/// IDs match the seed rows of the hosted table so entries written with the
/// fallback set still resolve once the table is populated.
pub fn builtin_emojis() -> Vec<Emoji> {
    vec![
        Emoji::new(1, "\u{2728}"),          // magical
        Emoji::new(2, "\u{1f33f}"),         // peaceful
        Emoji::new(3, "\u{1f525}"),         // productive
        Emoji::new(4, "\u{2601}\u{fe0f}"),  // overthinking
        Emoji::new(5, "\u{1f311}"),         // exhausted
        Emoji::new(6, "\u{1f338}"),         // romantic
        Emoji::new(7, "\u{26a1}"),          // inspired
    ]
}

// =============================================================================
// Journal entry (read shape)
// =============================================================================

/// Store-assigned entry identifier.
///
/// Opaque to the client: the hosted table may use a serial integer or a
/// UUID, and both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum EntryId {
    Int(i64),
    Text(String),
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryId::Int(n) => write!(f, "{n}"),
            EntryId::Text(s) => f.write_str(s),
        }
    }
}

/// The embedded `emojis(symbol)` object of an entry read.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmbeddedEmoji {
    #[serde(default)]
    pub symbol: Option<String>,
}

/// A persisted journal entry as returned by the store.
///
/// Immutable from the client's perspective: there is no edit or delete.
/// `mood` is kept as text so rows written by other clients with labels
/// outside [`Mood::all`] still render.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JournalEntry {
    pub id: EntryId,

    #[serde(default)]
    pub mood: Option<String>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,

    /// Values outside the rating range read as unrated.
    #[serde(default, deserialize_with = "energy_in_range")]
    pub energy_level: Option<u8>,

    #[serde(default)]
    pub emoji_id: Option<i64>,

    /// Embedded reference row, present when the read asked for it.
    #[serde(default, rename = "emojis")]
    pub emoji: Option<EmbeddedEmoji>,

    #[serde(default)]
    pub user_id: Option<String>,

    /// RFC 3339; a `timestamp without time zone` column is read as UTC.
    #[serde(deserialize_with = "utc_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl JournalEntry {
    /// The display symbol of the referenced emoji, if the read embedded one.
    pub fn symbol(&self) -> Option<&str> {
        self.emoji.as_ref().and_then(|e| e.symbol.as_deref())
    }

    /// Mood label for display; empty when the row has none.
    pub fn mood_label(&self) -> &str {
        self.mood.as_deref().unwrap_or("")
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn energy_in_range<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(serde_json::Value::as_i64)
        .filter(|n| (i64::from(MIN_ENERGY)..=i64::from(MAX_ENERGY)).contains(n))
        .and_then(|n| u8::try_from(n).ok()))
}

fn utc_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse_timestamp(&text)
        .ok_or_else(|| de::Error::custom(format!("unrecognised timestamp '{text}'")))
}

/// Parse a store timestamp. Offset-less values are taken as UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| naive.and_utc())
}

// =============================================================================
// New entry (write shape)
// =============================================================================

/// A validated entry ready to be inserted. Built only by `EntryForm::validate`.
///
/// `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewEntry {
    pub mood: Mood,

    pub description: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy_level: Option<u8>,

    pub emoji_id: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mood_labels_round_trip() {
        for mood in Mood::all() {
            assert_eq!(Mood::from_label(mood.label()), Some(*mood));
        }
        assert_eq!(Mood::from_label("not fine"), None);
    }

    #[test]
    fn test_mood_serialises_as_label() {
        assert_eq!(serde_json::to_value(Mood::NotFine).unwrap(), json!("Not Fine"));
    }

    #[test]
    fn test_entry_decodes_embedded_emoji_and_nulls() {
        let row = json!({
            "id": 7,
            "mood": "Productive",
            "description": null,
            "energy_level": null,
            "emoji_id": 3,
            "emojis": { "symbol": "\u{1f525}" },
            "user_id": null,
            "created_at": "2025-03-01T09:30:00.123456+00:00"
        });
        let entry: JournalEntry = serde_json::from_value(row).unwrap();
        assert_eq!(entry.id, EntryId::Int(7));
        assert_eq!(entry.description, "");
        assert_eq!(entry.symbol(), Some("\u{1f525}"));
        assert_eq!(entry.mood_label(), "Productive");
    }

    #[test]
    fn test_entry_accepts_uuid_id_and_missing_embed() {
        let row = json!({
            "id": "5c1b4a9e-8f7e-4c1b-9d55-0d2a7d0e2f11",
            "mood": "Someday",
            "description": "Custom mood from another client",
            "created_at": "2025-03-01T09:30:00Z"
        });
        let entry: JournalEntry = serde_json::from_value(row).unwrap();
        assert!(matches!(entry.id, EntryId::Text(_)));
        assert_eq!(entry.symbol(), None);
        assert_eq!(entry.mood_label(), "Someday");
    }

    #[test]
    fn test_out_of_range_energy_reads_as_unrated() {
        for bad in [json!(300), json!(-1), json!(0), json!("high"), json!(2.5)] {
            let row = json!({
                "id": 1,
                "energy_level": bad,
                "created_at": "2025-03-01T09:30:00Z"
            });
            let entry: JournalEntry = serde_json::from_value(row).unwrap();
            assert_eq!(entry.energy_level, None);
        }
        let row = json!({ "id": 1, "energy_level": 10, "created_at": "2025-03-01T09:30:00Z" });
        let entry: JournalEntry = serde_json::from_value(row).unwrap();
        assert_eq!(entry.energy_level, Some(10));
    }

    #[test]
    fn test_timestamp_without_offset_is_utc() {
        let expected = parse_timestamp("2025-03-01T09:30:00Z").unwrap();
        assert_eq!(parse_timestamp("2025-03-01T09:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-01 09:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-01T11:30:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);

        let row = json!({ "id": 1, "created_at": "2025-03-01T09:30:00.5" });
        assert!(serde_json::from_value::<JournalEntry>(row).is_ok());
    }

    #[test]
    fn test_new_entry_omits_absent_optionals() {
        let entry = NewEntry {
            mood: Mood::Fine,
            description: "ok".to_string(),
            energy_level: None,
            emoji_id: 2,
            user_id: None,
        };
        let v = serde_json::to_value(&entry).unwrap();
        assert_eq!(v, json!({ "mood": "Fine", "description": "ok", "emoji_id": 2 }));
    }

    #[test]
    fn test_builtin_emoji_ids_are_unique() {
        let emojis = builtin_emojis();
        let mut ids: Vec<i64> = emojis.iter().map(|e| e.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), emojis.len());
    }
}

// MoodLog - core/stats.rs
//
// Mood distribution and energy average over the loaded entries.
// Pure computation for the summary panel; no I/O.

use crate::core::model::{JournalEntry, Mood};

/// Aggregate view of a list of entries.
#[derive(Debug, Clone, PartialEq)]
pub struct MoodSummary {
    /// `(label, count)` for every mood that occurs at least once: closed-set
    /// moods first in picker order, then unknown labels alphabetically.
    pub counts: Vec<(String, usize)>,

    /// Mean energy over entries that carry a rating.
    pub mean_energy: Option<f32>,

    pub total: usize,
}

impl MoodSummary {
    /// Largest single count, for scaling bars. Zero when empty.
    pub fn max_count(&self) -> usize {
        self.counts.iter().map(|(_, n)| *n).max().unwrap_or(0)
    }
}

/// Summarise `entries`.
///
/// Entries without a mood are counted under an empty label so the per-mood
/// counts always add up to `total`.
pub fn summarise(entries: &[JournalEntry]) -> MoodSummary {
    let mut counts: Vec<(String, usize)> = Mood::all()
        .iter()
        .map(|m| (m.label().to_string(), 0))
        .collect();
    let mut extra: Vec<(String, usize)> = Vec::new();

    for entry in entries {
        let label = entry.mood_label();
        if let Some(slot) = counts.iter_mut().find(|(l, _)| l == label) {
            slot.1 += 1;
        } else if let Some(slot) = extra.iter_mut().find(|(l, _)| l == label) {
            slot.1 += 1;
        } else {
            extra.push((label.to_string(), 1));
        }
    }

    extra.sort_by(|a, b| a.0.cmp(&b.0));
    counts.retain(|(_, n)| *n > 0);
    counts.extend(extra);

    let energies: Vec<u8> = entries.iter().filter_map(|e| e.energy_level).collect();
    let mean_energy = if energies.is_empty() {
        None
    } else {
        Some(energies.iter().map(|&e| f32::from(e)).sum::<f32>() / energies.len() as f32)
    };

    MoodSummary {
        counts,
        mean_energy,
        total: entries.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::EntryId;
    use chrono::Utc;

    fn entry(id: i64, mood: Option<&str>, energy: Option<u8>) -> JournalEntry {
        JournalEntry {
            id: EntryId::Int(id),
            mood: mood.map(str::to_string),
            description: "x".to_string(),
            energy_level: energy,
            emoji_id: None,
            emoji: None,
            user_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_summary() {
        let s = summarise(&[]);
        assert!(s.counts.is_empty());
        assert_eq!(s.mean_energy, None);
        assert_eq!(s.max_count(), 0);
    }

    #[test]
    fn test_counts_follow_picker_order_then_unknown() {
        let entries = vec![
            entry(1, Some("Inspired"), None),
            entry(2, Some("Zesty"), None),
            entry(3, Some("Fine"), None),
            entry(4, Some("Inspired"), None),
            entry(5, None, None),
        ];
        let s = summarise(&entries);
        let labels: Vec<&str> = s.counts.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["Fine", "Inspired", "", "Zesty"]);
        assert_eq!(s.counts.iter().map(|(_, n)| n).sum::<usize>(), s.total);
        assert_eq!(s.max_count(), 2);
    }

    #[test]
    fn test_mean_energy_ignores_unrated_entries() {
        let entries = vec![
            entry(1, Some("Fine"), Some(4)),
            entry(2, Some("Fine"), None),
            entry(3, Some("Fine"), Some(8)),
        ];
        assert_eq!(summarise(&entries).mean_energy, Some(6.0));
    }
}

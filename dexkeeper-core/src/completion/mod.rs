//! Completion tracking - the normal/shiny lattice and progress metric
//!
//! A species is in one of three states: uncaught, caught, or caught in
//! both variants. A shiny catch is also a normal catch, so "shiny but not
//! normal" is unrepresentable in [`CompletionState`]. Stores hold the
//! two-boolean [`CompletionRecord`], which may be off the lattice when
//! written by another actor; toggles and progress work on the raw record.

mod engine;
mod store;

pub use engine::CompletionEngine;
pub use store::{CompletionSnapshot, CompletionStore, FileStore, HttpStore, MemoryStore};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::catalog::SpeciesEntry;

/// Which variant a view tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Normal,
    Shiny,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Normal => f.write_str("normal"),
            Mode::Shiny => f.write_str("shiny"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "normal" => Ok(Mode::Normal),
            "shiny" => Ok(Mode::Shiny),
            other => Err(format!("Unknown mode '{other}' (expected normal or shiny)")),
        }
    }
}

/// The three legal completion states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompletionState {
    #[default]
    Uncaught,
    /// Caught in the normal variant only
    Caught,
    /// Caught in both variants
    CaughtShiny,
}

impl CompletionState {
    /// Apply a toggle in `mode`
    ///
    /// Shiny toggles flip the shiny flag, and setting it also sets normal.
    /// Normal toggles flip the normal flag, and clearing it also clears shiny.
    pub fn toggle(self, mode: Mode) -> Self {
        use CompletionState::*;

        match (mode, self) {
            (Mode::Normal, Uncaught) => Caught,
            (Mode::Normal, Caught | CaughtShiny) => Uncaught,
            (Mode::Shiny, Uncaught | Caught) => CaughtShiny,
            (Mode::Shiny, CaughtShiny) => Caught,
        }
    }

    /// Whether this state counts as done in `mode`
    pub fn is_complete(self, mode: Mode) -> bool {
        match mode {
            Mode::Normal => self != CompletionState::Uncaught,
            Mode::Shiny => self == CompletionState::CaughtShiny,
        }
    }
}

/// Wire shape of a completion record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompletionRecord {
    #[serde(default)]
    pub normal: bool,
    #[serde(default)]
    pub shiny: bool,
}

impl From<CompletionState> for CompletionRecord {
    fn from(state: CompletionState) -> Self {
        match state {
            CompletionState::Uncaught => Self {
                normal: false,
                shiny: false,
            },
            CompletionState::Caught => Self {
                normal: true,
                shiny: false,
            },
            CompletionState::CaughtShiny => Self {
                normal: true,
                shiny: true,
            },
        }
    }
}

impl From<CompletionRecord> for CompletionState {
    /// Lattice view of a record; a stray shiny flag without normal reads as
    /// caught in both
    ///
    /// Only for presentation. Toggling and counting read the raw record.
    fn from(record: CompletionRecord) -> Self {
        match (record.normal, record.shiny) {
            (_, true) => CompletionState::CaughtShiny,
            (true, false) => CompletionState::Caught,
            (false, false) => CompletionState::Uncaught,
        }
    }
}

impl CompletionRecord {
    /// Flip the field matching `mode`, then restore the lattice
    ///
    /// A shiny flag that ends up set forces normal on; a normal flag that
    /// ends up cleared forces shiny off. Stores may hold `{normal: false,
    /// shiny: true}`; it is flipped like any other record.
    pub fn toggled(self, mode: Mode) -> Self {
        match mode {
            Mode::Shiny => {
                let shiny = !self.shiny;
                Self {
                    normal: self.normal || shiny,
                    shiny,
                }
            }
            Mode::Normal => {
                let normal = !self.normal;
                Self {
                    normal,
                    shiny: self.shiny && normal,
                }
            }
        }
    }

    /// The field matching `mode`
    pub fn is_complete(self, mode: Mode) -> bool {
        match mode {
            Mode::Normal => self.normal,
            Mode::Shiny => self.shiny,
        }
    }
}

/// Completion of a list in one mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Progress {
    pub done: usize,
    pub total: usize,
}

impl Progress {
    /// Count entries of `list` that are complete in `mode`
    pub fn tally(list: &[SpeciesEntry], snapshot: &CompletionSnapshot, mode: Mode) -> Self {
        let done = list
            .iter()
            .filter(|entry| snapshot.record(&entry.api_name).is_complete(mode))
            .count();

        Self {
            done,
            total: list.len(),
        }
    }

    /// Percentage rounded half-up; 0 for an empty list
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.done * 200 + self.total) / (self.total * 2)) as u32
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}% • {} / {}", self.percent(), self.done, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(normal: bool, shiny: bool) -> CompletionRecord {
        CompletionRecord { normal, shiny }
    }

    fn toggled(start: CompletionRecord, mode: Mode) -> CompletionRecord {
        start.toggled(mode)
    }

    #[test]
    fn test_toggle_table() {
        // (start, mode, expected)
        let table = [
            (record(false, false), Mode::Normal, record(true, false)),
            (record(false, false), Mode::Shiny, record(true, true)),
            (record(true, false), Mode::Normal, record(false, false)),
            (record(true, false), Mode::Shiny, record(true, true)),
            (record(true, true), Mode::Normal, record(false, false)),
            (record(true, true), Mode::Shiny, record(true, false)),
            // shiny without normal flips the raw field, then corrects
            (record(false, true), Mode::Normal, record(true, true)),
            (record(false, true), Mode::Shiny, record(false, false)),
        ];

        for (start, mode, expected) in table {
            assert_eq!(toggled(start, mode), expected, "{start:?} toggled {mode}");
        }
    }

    #[test]
    fn test_shiny_sequence() {
        let start = record(false, false);
        let once = toggled(start, Mode::Shiny);
        assert_eq!(once, record(true, true));
        let twice = toggled(once, Mode::Shiny);
        assert_eq!(twice, record(true, false));
        assert_eq!(toggled(twice, Mode::Normal), record(false, false));
    }

    #[test]
    fn test_lattice_states_toggle_like_records() {
        let states = [
            CompletionState::Uncaught,
            CompletionState::Caught,
            CompletionState::CaughtShiny,
        ];
        for state in states {
            for mode in [Mode::Normal, Mode::Shiny] {
                assert_eq!(
                    CompletionRecord::from(state.toggle(mode)),
                    CompletionRecord::from(state).toggled(mode),
                    "{state:?} toggled {mode}"
                );
            }
        }
    }

    #[test]
    fn test_progress_counts_raw_field() {
        let mut snapshot = CompletionSnapshot::default();
        snapshot.caught.insert("mew".to_string(), record(false, true));
        let list = [SpeciesEntry {
            api_name: "mew".to_string(),
            display_name: "Mew".to_string(),
            entry_number: 151,
            species_id: 151,
        }];

        assert_eq!(Progress::tally(&list, &snapshot, Mode::Normal), Progress { done: 0, total: 1 });
        assert_eq!(Progress::tally(&list, &snapshot, Mode::Shiny), Progress { done: 1, total: 1 });
    }

    #[test]
    fn test_toggle_never_produces_shiny_without_normal() {
        for start in [
            record(false, false),
            record(true, false),
            record(true, true),
            record(false, true),
        ] {
            for mode in [Mode::Normal, Mode::Shiny] {
                let rec = start.toggled(mode);
                assert!(!rec.shiny || rec.normal, "{start:?} toggled {mode}");
            }
        }
    }

    #[test]
    fn test_is_complete() {
        assert!(!CompletionState::Uncaught.is_complete(Mode::Normal));
        assert!(CompletionState::Caught.is_complete(Mode::Normal));
        assert!(!CompletionState::Caught.is_complete(Mode::Shiny));
        assert!(CompletionState::CaughtShiny.is_complete(Mode::Normal));
        assert!(CompletionState::CaughtShiny.is_complete(Mode::Shiny));
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("normal".parse::<Mode>().unwrap(), Mode::Normal);
        assert_eq!("SHINY".parse::<Mode>().unwrap(), Mode::Shiny);
        assert!("golden".parse::<Mode>().is_err());
        assert_eq!(Mode::default(), Mode::Normal);
        assert_eq!(Mode::Shiny.to_string(), "shiny");
    }

    #[test]
    fn test_record_defaults_missing_fields() {
        let rec: CompletionRecord = serde_json::from_str(r#"{ "shiny": true }"#).unwrap();
        assert_eq!(rec, record(false, true));
        assert_eq!(CompletionState::from(rec), CompletionState::CaughtShiny);
    }

    #[test]
    fn test_empty_progress() {
        let snapshot = CompletionSnapshot::default();
        for mode in [Mode::Normal, Mode::Shiny] {
            let progress = Progress::tally(&[], &snapshot, mode);
            assert_eq!(progress, Progress { done: 0, total: 0 });
            assert_eq!(progress.percent(), 0);
            assert_eq!(progress.to_string(), "0% • 0 / 0");
        }
    }

    #[test]
    fn test_percent_rounding() {
        assert_eq!(Progress { done: 1, total: 3 }.percent(), 33);
        assert_eq!(Progress { done: 2, total: 3 }.percent(), 67);
        assert_eq!(Progress { done: 1, total: 8 }.percent(), 13);
        assert_eq!(Progress { done: 151, total: 151 }.percent(), 100);
        assert_eq!(Progress { done: 1, total: 2 }.to_string(), "50% • 1 / 2");
    }
}

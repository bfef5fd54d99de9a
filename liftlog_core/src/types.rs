//! Core domain types for the lift log.
//!
//! This module defines the fundamental types used throughout the system:
//! - Stored log entries and the write-side inputs that create/modify them
//! - Primary lift identities
//! - Derived per-day summaries (scored sets, assistance sets, day groups)
//! - Selection policy for how many ranked sets survive per lift per day

use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// Number of ranked sets kept per lift per day under the default policy
pub const DEFAULT_TOP_N: usize = 3;

// ============================================================================
// Stored Entries
// ============================================================================

/// A single recorded set, as held by the entry store
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LogEntry {
    pub id: Uuid,
    pub performed_at: DateTime<Utc>,
    pub exercise: String,
    pub weight: f64,
    pub reps: u32,
}

/// Input for recording a new set
#[derive(Clone, Debug)]
pub struct NewEntry {
    pub exercise: String,
    pub weight: f64,
    pub reps: u32,
    /// Defaults to "now" when the store inserts the entry
    pub performed_at: Option<DateTime<Utc>>,
}

impl NewEntry {
    pub fn new(exercise: impl Into<String>, weight: f64, reps: u32) -> Self {
        Self {
            exercise: exercise.into(),
            weight,
            reps,
            performed_at: None,
        }
    }

    pub fn at(mut self, performed_at: DateTime<Utc>) -> Self {
        self.performed_at = Some(performed_at);
        self
    }

    /// Reject input the store must never persist
    pub fn validate(&self) -> Result<()> {
        if self.exercise.trim().is_empty() {
            return Err(Error::Validation("exercise name is empty".into()));
        }
        validate_weight(self.weight)
    }

    /// Materialize into a stored entry with a fresh id
    pub fn into_entry(self, now: DateTime<Utc>) -> LogEntry {
        LogEntry {
            id: Uuid::new_v4(),
            performed_at: self.performed_at.unwrap_or(now),
            exercise: self.exercise,
            weight: self.weight,
            reps: self.reps,
        }
    }
}

/// Partial update for an existing entry (only weight and reps are editable)
#[derive(Clone, Debug, Default)]
pub struct EntryPatch {
    pub weight: Option<f64>,
    pub reps: Option<u32>,
}

impl EntryPatch {
    pub fn is_empty(&self) -> bool {
        self.weight.is_none() && self.reps.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        match self.weight {
            Some(weight) => validate_weight(weight),
            None => Ok(()),
        }
    }

    pub fn apply(&self, entry: &mut LogEntry) {
        if let Some(weight) = self.weight {
            entry.weight = weight;
        }
        if let Some(reps) = self.reps {
            entry.reps = reps;
        }
    }
}

fn validate_weight(weight: f64) -> Result<()> {
    if !weight.is_finite() || weight < 0.0 {
        return Err(Error::Validation(format!(
            "weight must be a non-negative number, got {}",
            weight
        )));
    }
    Ok(())
}

// ============================================================================
// Lifts
// ============================================================================

/// One of the three primary lifts subject to ranking
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Lift {
    Bench,
    Squat,
    Deadlift,
}

impl Lift {
    pub const ALL: [Lift; 3] = [Lift::Bench, Lift::Squat, Lift::Deadlift];

    /// Reserved exercise name stored in log entries
    pub fn name(self) -> &'static str {
        match self {
            Lift::Bench => "bench",
            Lift::Squat => "squat",
            Lift::Deadlift => "deadlift",
        }
    }

    /// Capitalized label used for export column headers
    pub fn label(self) -> &'static str {
        match self {
            Lift::Bench => "Bench",
            Lift::Squat => "Squat",
            Lift::Deadlift => "Deadlift",
        }
    }

    /// Exact, case-sensitive match against the reserved names
    pub fn from_exercise(name: &str) -> Option<Lift> {
        Lift::ALL.into_iter().find(|lift| lift.name() == name)
    }
}

impl fmt::Display for Lift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Derived Summary Types
// ============================================================================

/// A primary-lift set with its estimated one-rep max
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ScoredSet {
    pub id: Uuid,
    pub weight: f64,
    pub reps: u32,
    pub strength_index: f64,
}

/// An assistance-exercise set; recorded but never ranked
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct AssistanceSet {
    pub id: Uuid,
    pub name: String,
    pub weight: f64,
    pub reps: u32,
}

/// Calendar-day key
///
/// Renders as zero-padded `YYYY/MM/DD`, so chronological order and
/// lexicographic order of the rendered key agree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Parse `YYYY-MM-DD` or `YYYY/MM/DD`
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(s, "%Y/%m/%d"))
            .map(Self)
            .map_err(|e| Error::Other(format!("Invalid date '{}': {}", s, e)))
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y/%m/%d"))
    }
}

/// Serializes as the rendered key, same as display and export
impl Serialize for DayKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// All entries performed on one calendar day
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct DayGroup {
    pub date: DayKey,
    pub bench: Vec<ScoredSet>,
    pub squat: Vec<ScoredSet>,
    pub deadlift: Vec<ScoredSet>,
    pub others: Vec<AssistanceSet>,
}

impl DayGroup {
    pub fn new(date: DayKey) -> Self {
        Self {
            date,
            bench: Vec::new(),
            squat: Vec::new(),
            deadlift: Vec::new(),
            others: Vec::new(),
        }
    }

    pub fn lift(&self, lift: Lift) -> &[ScoredSet] {
        match lift {
            Lift::Bench => &self.bench,
            Lift::Squat => &self.squat,
            Lift::Deadlift => &self.deadlift,
        }
    }

    pub fn lift_mut(&mut self, lift: Lift) -> &mut Vec<ScoredSet> {
        match lift {
            Lift::Bench => &mut self.bench,
            Lift::Squat => &mut self.squat,
            Lift::Deadlift => &mut self.deadlift,
        }
    }

    /// Number of sets retained in this group across lifts and assistance
    pub fn len(&self) -> usize {
        Lift::ALL.iter().map(|l| self.lift(*l).len()).sum::<usize>() + self.others.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Selection Policy
// ============================================================================

/// How many ranked sets per lift per day survive aggregation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Keep the N highest strength indices
    TopN(usize),
    /// Keep only the single best set
    BestOfDay,
}

impl SelectionPolicy {
    /// Upper bound on retained sets per lift per day
    pub fn limit(&self) -> usize {
        match self {
            SelectionPolicy::TopN(n) => *n,
            SelectionPolicy::BestOfDay => 1,
        }
    }
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        SelectionPolicy::TopN(DEFAULT_TOP_N)
    }
}

//! Survey record types for both sides of the paper form.
//!
//! DESIGN
//! ======
//! Side 2 is keyed in by hand through the form aggregator; side 1 is read
//! off a photo by the vision model. Both sides are fixed structs whose
//! serialized keys match the question labels printed on the paper form
//! (`studentId`, `Q1`..`Q24`), so the JSON API and the CSV header agree.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::services::export::{Cell, Column, Tabular};

/// Fixed options for the Q4 "thoughts" multi-select.
pub const Q4_OPTIONS: [&str; 5] = [
    "1. 专注于课堂内容",
    "2. 思考与本节课或本课程相关的其他内容",
    "3. 思考与其他课程相关的事情",
    "4. 在想与任何课程都无相关的事情",
    "5. 使用手机或电脑进行于课堂无关的活动",
];

pub const SCAN_QUESTION_COUNT: usize = 14;

/// Question keys extracted from a side-1 scan, in sheet order.
pub const SCAN_KEYS: [&str; SCAN_QUESTION_COUNT] =
    ["Q11", "Q12", "Q13", "Q14", "Q15", "Q16", "Q17", "Q18", "Q19", "Q20", "Q21", "Q22", "Q23", "Q24"];

// =============================================================================
// RATING
// =============================================================================

/// Rating outside the 1–5 Likert domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("rating {0} outside 1..=5")]
pub struct RatingOutOfRange(pub i64);

/// A Likert rating in `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Validate a raw integer as a rating.
    ///
    /// # Errors
    ///
    /// Returns [`RatingOutOfRange`] for values outside `1..=5`.
    pub fn new(value: i64) -> Result<Self, RatingOutOfRange> {
        match u8::try_from(value) {
            Ok(v) if (Self::MIN..=Self::MAX).contains(&v) => Ok(Self(v)),
            _ => Err(RatingOutOfRange(value)),
        }
    }

    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = RatingOutOfRange;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

fn rating_cell(rating: Option<Rating>) -> Cell<'static> {
    rating.map_or(Cell::Absent, |r| Cell::Int(i64::from(r.get())))
}

/// Apply the sequential-fallback rule: a blank entry becomes `existing_count + 1`.
#[must_use]
pub fn resolve_student_id(entered: &str, existing_count: usize) -> String {
    let trimmed = entered.trim();
    if trimmed.is_empty() { (existing_count + 1).to_string() } else { trimmed.to_string() }
}

// =============================================================================
// SIDE 2: MANUAL ENTRY
// =============================================================================

/// One submitted side-2 form. Immutable once built by the form aggregator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Side2Record {
    pub id: Uuid,
    #[serde(rename = "studentId")]
    pub student_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Number of distraction occurrences.
    #[serde(rename = "Q1")]
    pub occurrence_count: u32,
    /// Aggregated per-occurrence durations, e.g. `第1次=5p, 第2次=?`.
    #[serde(rename = "Q2")]
    pub occurrence_times: String,
    #[serde(rename = "Q3")]
    pub reason: String,
    #[serde(rename = "Q4")]
    pub thoughts: Vec<String>,
    #[serde(rename = "Q5")]
    pub measures: String,
    #[serde(rename = "Q6")]
    pub self_rating: Option<Rating>,
    #[serde(rename = "Q7")]
    pub impact: Option<Rating>,
    #[serde(rename = "Q8")]
    pub focus: String,
    #[serde(rename = "Q9")]
    pub distraction: String,
    #[serde(rename = "Q10")]
    pub lecture_interest: Option<Rating>,
}

pub const SIDE2_COLUMNS: [Column; 11] = [
    Column { key: "studentId", label: "ID" },
    Column { key: "Q1", label: "Q1 (Count)" },
    Column { key: "Q2", label: "Q2 (Time)" },
    Column { key: "Q3", label: "Q3 (Reason)" },
    Column { key: "Q4", label: "Q4 (Thoughts)" },
    Column { key: "Q5", label: "Q5 (Measures)" },
    Column { key: "Q6", label: "Q6 (Rate)" },
    Column { key: "Q7", label: "Q7 (Impact)" },
    Column { key: "Q8", label: "Q8 (Focus)" },
    Column { key: "Q9", label: "Q9 (Distraction)" },
    Column { key: "Q10", label: "Q10 (Interest)" },
];

impl Tabular for Side2Record {
    fn id(&self) -> Uuid {
        self.id
    }

    fn cell(&self, key: &str) -> Cell<'_> {
        match key {
            "id" => Cell::Owned(self.id.to_string()),
            "studentId" => Cell::Text(&self.student_id),
            "timestamp" => Cell::Owned(format_timestamp(self.timestamp)),
            "Q1" => Cell::Int(i64::from(self.occurrence_count)),
            "Q2" => Cell::Text(&self.occurrence_times),
            "Q3" => Cell::Text(&self.reason),
            "Q4" => Cell::List(&self.thoughts),
            "Q5" => Cell::Text(&self.measures),
            "Q6" => rating_cell(self.self_rating),
            "Q7" => rating_cell(self.impact),
            "Q8" => Cell::Text(&self.focus),
            "Q9" => Cell::Text(&self.distraction),
            "Q10" => rating_cell(self.lecture_interest),
            _ => Cell::Absent,
        }
    }
}

// =============================================================================
// SIDE 1: SCANNED RATINGS
// =============================================================================

/// Ratings for Q11–Q24 as read off a scanned sheet. Absent when undetermined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanRatings([Option<Rating>; SCAN_QUESTION_COUNT]);

impl ScanRatings {
    /// Rating for a question key such as `"Q13"`. `None` for unknown keys.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Rating> {
        slot(key).and_then(|i| self.0[i])
    }

    /// Set the rating for a question key. Returns `false` for unknown keys.
    pub fn set(&mut self, key: &str, rating: Option<Rating>) -> bool {
        let Some(i) = slot(key) else {
            return false;
        };
        self.0[i] = rating;
        true
    }

    /// `(key, rating)` pairs in sheet order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Option<Rating>)> + '_ {
        SCAN_KEYS.iter().copied().zip(self.0.iter().copied())
    }

    /// Number of questions with a determined rating.
    #[must_use]
    pub fn answered(&self) -> usize {
        self.0.iter().filter(|r| r.is_some()).count()
    }
}

fn slot(key: &str) -> Option<usize> {
    SCAN_KEYS.iter().position(|k| *k == key)
}

impl Serialize for ScanRatings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(SCAN_QUESTION_COUNT))?;
        for (key, rating) in self.iter() {
            map.serialize_entry(key, &rating)?;
        }
        map.end()
    }
}

/// One saved side-1 scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Side1Record {
    pub id: Uuid,
    #[serde(rename = "studentId")]
    pub student_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(flatten)]
    pub ratings: ScanRatings,
}

impl Side1Record {
    /// Stamp scanned ratings into a record, applying the sequential-fallback ID.
    #[must_use]
    pub fn new(ratings: ScanRatings, entered_student_id: &str, existing_count: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            student_id: resolve_student_id(entered_student_id, existing_count),
            timestamp: OffsetDateTime::now_utc(),
            ratings,
        }
    }
}

pub const SIDE1_COLUMNS: [Column; 15] = [
    Column { key: "studentId", label: "ID" },
    Column { key: "Q11", label: "Q11" },
    Column { key: "Q12", label: "Q12" },
    Column { key: "Q13", label: "Q13" },
    Column { key: "Q14", label: "Q14" },
    Column { key: "Q15", label: "Q15" },
    Column { key: "Q16", label: "Q16" },
    Column { key: "Q17", label: "Q17" },
    Column { key: "Q18", label: "Q18" },
    Column { key: "Q19", label: "Q19" },
    Column { key: "Q20", label: "Q20" },
    Column { key: "Q21", label: "Q21" },
    Column { key: "Q22", label: "Q22" },
    Column { key: "Q23", label: "Q23" },
    Column { key: "Q24", label: "Q24" },
];

impl Tabular for Side1Record {
    fn id(&self) -> Uuid {
        self.id
    }

    fn cell(&self, key: &str) -> Cell<'_> {
        match key {
            "id" => Cell::Owned(self.id.to_string()),
            "studentId" => Cell::Text(&self.student_id),
            "timestamp" => Cell::Owned(format_timestamp(self.timestamp)),
            other => rating_cell(self.ratings.get(other)),
        }
    }
}

fn format_timestamp(ts: OffsetDateTime) -> String {
    ts.format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "survey_test.rs"]
mod tests;

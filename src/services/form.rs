//! Side-2 form aggregator.
//!
//! DESIGN
//! ======
//! `Side2Draft` holds the in-progress answers plus one timing entry per
//! reported occurrence. The occurrence count and the timing list are kept
//! the same length at all times: raising the count appends blank entries,
//! lowering it truncates from the end. `submit` folds the timings into the
//! Q2 display string, stamps id and time, and resets the draft.
//!
//! Nothing is required. A blank student ID is filled in at submit time from
//! the caller's current record count.

use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::survey::{Rating, RatingOutOfRange, Side2Record, resolve_student_id};

const BLANK_TIMING: &str = "?";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("timing index {index} out of range (occurrence count {len})")]
    TimingIndexOutOfRange { index: usize, len: usize },
    #[error(transparent)]
    RatingOutOfRange(#[from] RatingOutOfRange),
}

impl crate::error::ErrorCode for FormError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::TimingIndexOutOfRange { .. } => "E_TIMING_INDEX",
            Self::RatingOutOfRange(_) => "E_RATING_RANGE",
        }
    }
}

/// The three 1–5 rating questions on side 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingField {
    /// Q6
    SelfRating,
    /// Q7
    Impact,
    /// Q10
    LectureInterest,
}

/// In-progress side-2 answers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Side2Draft {
    student_id: String,
    timings: Vec<String>,
    reason: String,
    thoughts: Vec<String>,
    measures: String,
    self_rating: Option<Rating>,
    impact: Option<Rating>,
    focus: String,
    distraction: String,
    lecture_interest: Option<Rating>,
}

// =============================================================================
// DRAFT
// =============================================================================

impl Side2Draft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_student_id(&mut self, value: impl Into<String>) {
        self.student_id = value.into();
    }

    pub fn set_reason(&mut self, value: impl Into<String>) {
        self.reason = value.into();
    }

    pub fn set_measures(&mut self, value: impl Into<String>) {
        self.measures = value.into();
    }

    pub fn set_focus(&mut self, value: impl Into<String>) {
        self.focus = value.into();
    }

    pub fn set_distraction(&mut self, value: impl Into<String>) {
        self.distraction = value.into();
    }

    /// Q1. Negative counts clamp to zero; the timing list follows the count.
    ///
    /// # Panics
    ///
    /// Panics with a capacity overflow if the timing list cannot hold
    /// `count` entries. Callers taking untrusted input bound the count first.
    pub fn set_occurrence_count(&mut self, count: i64) {
        let count = usize::try_from(count.max(0)).unwrap_or(usize::MAX);
        self.timings.resize(count, String::new());
    }

    #[must_use]
    pub fn occurrence_count(&self) -> usize {
        self.timings.len()
    }

    /// Q2 entry for occurrence `index` (0-based).
    ///
    /// # Errors
    ///
    /// Returns [`FormError::TimingIndexOutOfRange`] if `index` is not below
    /// the occurrence count.
    pub fn set_timing(&mut self, index: usize, value: impl Into<String>) -> Result<(), FormError> {
        let len = self.timings.len();
        let slot = self
            .timings
            .get_mut(index)
            .ok_or(FormError::TimingIndexOutOfRange { index, len })?;
        *slot = value.into();
        Ok(())
    }

    #[must_use]
    pub fn timings(&self) -> &[String] {
        &self.timings
    }

    /// Q4. Adds the option if absent, removes it if present.
    pub fn toggle_thought(&mut self, option: &str) {
        if let Some(pos) = self.thoughts.iter().position(|t| t == option) {
            self.thoughts.remove(pos);
        } else {
            self.thoughts.push(option.to_string());
        }
    }

    #[must_use]
    pub fn thoughts(&self) -> &[String] {
        &self.thoughts
    }

    /// Set or clear one of Q6, Q7, Q10.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::RatingOutOfRange`] for values outside 1–5.
    pub fn set_rating(&mut self, field: RatingField, value: Option<i64>) -> Result<(), FormError> {
        let rating = value.map(Rating::new).transpose()?;
        *self.rating_slot(field) = rating;
        Ok(())
    }

    /// Select `value`, or clear the field if `value` is already selected.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::RatingOutOfRange`] for values outside 1–5.
    pub fn toggle_rating(&mut self, field: RatingField, value: i64) -> Result<(), FormError> {
        let rating = Rating::new(value)?;
        let slot = self.rating_slot(field);
        *slot = if *slot == Some(rating) { None } else { Some(rating) };
        Ok(())
    }

    #[must_use]
    pub fn rating(&self, field: RatingField) -> Option<Rating> {
        match field {
            RatingField::SelfRating => self.self_rating,
            RatingField::Impact => self.impact,
            RatingField::LectureInterest => self.lecture_interest,
        }
    }

    fn rating_slot(&mut self, field: RatingField) -> &mut Option<Rating> {
        match field {
            RatingField::SelfRating => &mut self.self_rating,
            RatingField::Impact => &mut self.impact,
            RatingField::LectureInterest => &mut self.lecture_interest,
        }
    }

    /// Finish the draft into a record and reset to defaults.
    ///
    /// `existing_count` is the number of records already collected; it
    /// drives the fallback student ID.
    pub fn submit(&mut self, existing_count: usize) -> Side2Record {
        let draft = std::mem::take(self);
        draft.into_record(existing_count, Uuid::new_v4(), OffsetDateTime::now_utc())
    }

    fn into_record(self, existing_count: usize, id: Uuid, timestamp: OffsetDateTime) -> Side2Record {
        Side2Record {
            id,
            student_id: resolve_student_id(&self.student_id, existing_count),
            timestamp,
            occurrence_count: u32::try_from(self.timings.len()).unwrap_or(u32::MAX),
            occurrence_times: aggregate_timings(&self.timings),
            reason: self.reason,
            thoughts: self.thoughts,
            measures: self.measures,
            self_rating: self.self_rating,
            impact: self.impact,
            focus: self.focus,
            distraction: self.distraction,
            lecture_interest: self.lecture_interest,
        }
    }
}

/// Fold timing entries into `第1次=5p, 第2次=?, ...`. Blank entries become `?`.
#[must_use]
pub fn aggregate_timings(entries: &[String]) -> String {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let value = entry.trim();
            let value = if value.is_empty() { BLANK_TIMING } else { value };
            format!("第{}次={value}", i + 1)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// SUBMISSION
// =============================================================================

/// A complete side-2 form as posted by a client. Keys match the paper form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Side2Submission {
    #[serde(rename = "studentId")]
    pub student_id: String,
    #[serde(rename = "Q1")]
    pub occurrence_count: i64,
    /// One entry per occurrence; may be shorter than `Q1`.
    #[serde(rename = "Q2")]
    pub occurrence_times: Vec<String>,
    #[serde(rename = "Q3")]
    pub reason: String,
    #[serde(rename = "Q4")]
    pub thoughts: Vec<String>,
    #[serde(rename = "Q5")]
    pub measures: String,
    #[serde(rename = "Q6")]
    pub self_rating: Option<i64>,
    #[serde(rename = "Q7")]
    pub impact: Option<i64>,
    #[serde(rename = "Q8")]
    pub focus: String,
    #[serde(rename = "Q9")]
    pub distraction: String,
    #[serde(rename = "Q10")]
    pub lecture_interest: Option<i64>,
}

impl Side2Submission {
    /// Replay the submission through the draft operations. `Q4` is the
    /// selected set, so repeated options are kept once.
    ///
    /// # Errors
    ///
    /// Returns [`FormError`] if more timing entries than occurrences are
    /// given or a rating falls outside 1–5.
    pub fn into_draft(self) -> Result<Side2Draft, FormError> {
        let mut draft = Side2Draft::new();
        draft.set_student_id(self.student_id);
        draft.set_occurrence_count(self.occurrence_count);
        for (index, value) in self.occurrence_times.into_iter().enumerate() {
            draft.set_timing(index, value)?;
        }
        draft.set_reason(self.reason);
        for option in &self.thoughts {
            if !draft.thoughts().contains(option) {
                draft.toggle_thought(option);
            }
        }
        draft.set_measures(self.measures);
        draft.set_rating(RatingField::SelfRating, self.self_rating)?;
        draft.set_rating(RatingField::Impact, self.impact)?;
        draft.set_focus(self.focus);
        draft.set_distraction(self.distraction);
        draft.set_rating(RatingField::LectureInterest, self.lecture_interest)?;
        Ok(draft)
    }
}

#[cfg(test)]
#[path = "form_test.rs"]
mod tests;

use crate::errors::AppError;
use crate::utils::date::serialize_utc;
use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use std::fmt;

pub const RATING_MIN: i64 = 1;
pub const RATING_MAX: i64 = 5;

/// The five self-assessed 1..=5 scores of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingField {
    Focus,
    Energy,
    Productivity,
    Enjoyment,
    Challenge,
}

impl RatingField {
    pub const ALL: [RatingField; 5] = [
        RatingField::Focus,
        RatingField::Energy,
        RatingField::Productivity,
        RatingField::Enjoyment,
        RatingField::Challenge,
    ];

    /// JSON key and SQL column (they coincide for ratings).
    pub fn key(&self) -> &'static str {
        match self {
            RatingField::Focus => "focus",
            RatingField::Energy => "energy",
            RatingField::Productivity => "productivity",
            RatingField::Enjoyment => "enjoyment",
            RatingField::Challenge => "challenge",
        }
    }
}

/// Client-supplied content of a timesheet entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryData {
    #[serde(serialize_with = "serialize_utc")]
    pub date: DateTime<Utc>,
    pub task_activity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub productivity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enjoyment: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome_result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learnings_reflections: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

/// Field-level violations collected by [`EntryData::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<String>);

impl ValidationErrors {
    pub fn push(&mut self, msg: impl Into<String>) {
        self.0.push(msg.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::BadRequest(errors.to_string())
    }
}

fn trim_optional(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl EntryData {
    pub fn new(date: DateTime<Utc>, task_activity: impl Into<String>) -> Self {
        Self {
            date,
            task_activity: task_activity.into(),
            ..Default::default()
        }
    }

    pub fn rating(&self, field: RatingField) -> Option<i64> {
        match field {
            RatingField::Focus => self.focus,
            RatingField::Energy => self.energy,
            RatingField::Productivity => self.productivity,
            RatingField::Enjoyment => self.enjoyment,
            RatingField::Challenge => self.challenge,
        }
    }

    pub fn set_rating(&mut self, field: RatingField, value: Option<i64>) {
        let slot = match field {
            RatingField::Focus => &mut self.focus,
            RatingField::Energy => &mut self.energy,
            RatingField::Productivity => &mut self.productivity,
            RatingField::Enjoyment => &mut self.enjoyment,
            RatingField::Challenge => &mut self.challenge,
        };
        *slot = value;
    }

    /// Trim every text field; optional text that ends up empty is dropped.
    pub fn normalized(mut self) -> Self {
        self.task_activity = self.task_activity.trim().to_string();
        self.category_project = trim_optional(self.category_project);
        self.outcome_result = trim_optional(self.outcome_result);
        self.learnings_reflections = trim_optional(self.learnings_reflections);
        self.comments = trim_optional(self.comments);
        self
    }

    /// Schema rules shared by the API layer and direct store access.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        self.collect_violations(&mut errors);
        errors.into_result()
    }

    pub fn collect_violations(&self, errors: &mut ValidationErrors) {
        // stored dates are fixed-width 4-digit years
        if !(0..=9999).contains(&self.date.year()) {
            errors.push(format!(
                "date must fall between years 0000 and 9999 (got {})",
                self.date.year()
            ));
        }

        if self.task_activity.trim().is_empty() {
            errors.push("Task/Activity is required.");
        }

        for field in RatingField::ALL {
            if let Some(v) = self.rating(field)
                && !(RATING_MIN..=RATING_MAX).contains(&v)
            {
                errors.push(format!(
                    "{} must be between {} and {} (got {})",
                    field.key(),
                    RATING_MIN,
                    RATING_MAX,
                    v
                ));
            }
        }
    }
}

/// A persisted entry with its store-assigned identity and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetEntry {
    pub id: String,
    #[serde(flatten)]
    pub data: EntryData,
    #[serde(serialize_with = "serialize_utc")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "serialize_utc")]
    pub updated_at: DateTime<Utc>,
}

/// Client view of an entry in listings: bookkeeping timestamps are left out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntrySummary {
    pub id: String,
    #[serde(flatten)]
    pub data: EntryData,
}

impl From<TimesheetEntry> for EntrySummary {
    fn from(entry: TimesheetEntry) -> Self {
        Self {
            id: entry.id,
            data: entry.data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn jan_first() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn minimal_entry_is_valid() {
        assert!(EntryData::new(jan_first(), "Write report").validate().is_ok());
    }

    #[test]
    fn blank_task_is_rejected_after_trim() {
        let entry = EntryData::new(jan_first(), "   ").normalized();
        let err = entry.validate().unwrap_err();
        assert_eq!(err.0, vec!["Task/Activity is required.".to_string()]);
    }

    #[test]
    fn out_of_range_ratings_are_all_reported() {
        let mut entry = EntryData::new(jan_first(), "X");
        entry.focus = Some(7);
        entry.challenge = Some(0);
        entry.energy = Some(5);

        let err = entry.validate().unwrap_err();
        assert_eq!(err.0.len(), 2);
        assert_eq!(
            err.to_string(),
            "focus must be between 1 and 5 (got 7), challenge must be between 1 and 5 (got 0)"
        );
    }

    #[test]
    fn normalized_drops_empty_optional_text() {
        let mut entry = EntryData::new(jan_first(), "  Review PR  ");
        entry.category_project = Some("   ".into());
        entry.comments = Some("  ok ".into());

        let entry = entry.normalized();
        assert_eq!(entry.task_activity, "Review PR");
        assert_eq!(entry.category_project, None);
        assert_eq!(entry.comments.as_deref(), Some("ok"));
    }

    #[test]
    fn absent_ratings_are_not_serialized() {
        let entry = EntryData::new(jan_first(), "Write report");
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["date"], "2025-01-01T00:00:00.000Z");
        assert_eq!(json["taskActivity"], "Write report");
        for field in RatingField::ALL {
            assert!(json.get(field.key()).is_none());
        }
    }

    #[test]
    fn summary_hides_timestamps() {
        let entry = TimesheetEntry {
            id: "abc".into(),
            data: EntryData::new(jan_first(), "X"),
            created_at: jan_first(),
            updated_at: jan_first(),
        };

        let full = serde_json::to_value(&entry).unwrap();
        assert!(full.get("createdAt").is_some());

        let summary = serde_json::to_value(EntrySummary::from(entry)).unwrap();
        assert_eq!(summary["id"], "abc");
        assert!(summary.get("createdAt").is_none());
        assert!(summary.get("updatedAt").is_none());
    }
}

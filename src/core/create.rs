use crate::errors::{AppError, AppResult};
use crate::models::entry::{EntryData, RatingField, ValidationErrors};
use crate::utils::date::parse_wire_date;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

pub const MISSING_REQUIRED: &str = "Missing required fields: date and taskActivity";

/// Turns a create-entry JSON body into a validated [`EntryData`].
pub struct CreateLogic;

/// `null`, `false`, `0`, `""` and absence all count as "not provided".
fn is_provided(v: Option<&Value>) -> bool {
    match v {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(_) => true,
    }
}

fn coerce_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn wire_date(v: &Value) -> Option<DateTime<Utc>> {
    match v {
        Value::String(s) => parse_wire_date(s),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

fn text(obj: &Map<String, Value>, key: &str, errors: &mut ValidationErrors) -> Option<String> {
    match obj.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => Some(v.to_string()),
        Some(_) => {
            errors.push(format!("{key} must be text"));
            None
        }
    }
}

impl CreateLogic {
    pub fn entry_from_payload(body: &Value) -> AppResult<EntryData> {
        let obj = body
            .as_object()
            .ok_or_else(|| AppError::bad_request("Request body must be a JSON object."))?;

        //
        // 1. Required fields, before anything else
        //
        if !is_provided(obj.get("date")) || !is_provided(obj.get("taskActivity")) {
            return Err(AppError::bad_request(MISSING_REQUIRED));
        }

        //
        // 2. Ratings: empty → omitted, otherwise must read as a number
        //
        let mut ratings: Vec<(RatingField, f64)> = Vec::new();
        for field in RatingField::ALL {
            match obj.get(field.key()) {
                None | Some(Value::Null) => {}
                Some(Value::String(s)) if s.is_empty() => {}
                Some(v) => {
                    let n = coerce_number(v).ok_or_else(|| {
                        AppError::bad_request(format!("Invalid number format for {}", field.key()))
                    })?;
                    ratings.push((field, n));
                }
            }
        }

        //
        // 3. Build the entry, collecting every field-level problem
        //
        let mut errors = ValidationErrors::default();

        let date = match obj.get("date").and_then(wire_date) {
            Some(d) => d,
            None => {
                errors.push(format!("Invalid date: {}", obj["date"]));
                DateTime::<Utc>::default()
            }
        };

        let mut entry = EntryData {
            date,
            task_activity: text(obj, "taskActivity", &mut errors).unwrap_or_default(),
            category_project: text(obj, "categoryProject", &mut errors),
            outcome_result: text(obj, "outcomeResult", &mut errors),
            learnings_reflections: text(obj, "learningsReflections", &mut errors),
            comments: text(obj, "comments", &mut errors),
            ..Default::default()
        };

        for (field, n) in ratings {
            if n.fract() != 0.0 {
                errors.push(format!("{} must be a whole number (got {})", field.key(), n));
            } else {
                entry.set_rating(field, Some(n as i64));
            }
        }

        //
        // 4. Shared schema rules
        //
        let entry = entry.normalized();
        entry.collect_violations(&mut errors);
        errors.into_result()?;

        Ok(entry)
    }
}

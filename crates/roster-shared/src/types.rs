//! Common types

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use uuid::Uuid;

pub type EntityId = Uuid;

pub fn new_id() -> EntityId {
    Uuid::new_v4()
}

/// `YYYY-MM` bucket used for monthly statistics and sheet links.
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

pub fn current_month_key(now: DateTime<Utc>) -> String {
    month_key(now.date_naive())
}

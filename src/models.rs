use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffRef {
    pub id: u64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub username: String,
}

impl StaffRef {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClubRef {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftAttendanceRecord {
    pub id: u64,
    pub staff: StaffRef,
    #[serde(default)]
    pub club: Option<ClubRef>,
    pub check_in: DateTime<Utc>,
    #[serde(default)]
    pub check_out: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_hours: Option<f64>,
}

impl ShiftAttendanceRecord {
    pub fn is_open(&self) -> bool {
        self.check_out.is_none()
    }

    /// A closed shift must end after it started.
    pub fn is_consistent(&self) -> bool {
        self.check_out.is_none_or(|out| out > self.check_in)
    }

    /// Hours worked, falling back to the timestamps when the backend left it out.
    pub fn worked_hours(&self) -> Option<f64> {
        let check_out = self.check_out?;
        if let Some(hours) = self.duration_hours {
            return Some(hours);
        }
        let seconds = (check_out - self.check_in).num_seconds();
        Some(seconds as f64 / 3600.0)
    }

    /// Calendar day of the check-in as seen from `tz`.
    pub fn check_in_day<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        self.check_in.with_timezone(tz).date_naive()
    }

    pub fn club_name(&self) -> &str {
        self.club.as_ref().map(|club| club.name.as_str()).unwrap_or("")
    }
}

/// `staff_details` as returned by check-in and check-out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffDetails {
    pub id: u64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CheckResponse {
    pub staff_details: StaffDetails,
}

#[derive(Debug, Serialize)]
pub struct CheckRequest<'a> {
    pub rfid_code: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffLookupResult {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub club: Option<ClubRef>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct Paged<T> {
    pub results: Vec<T>,
}

/// List endpoints answer with either a bare array or a `{results}` envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListBody<T> {
    Bare(Vec<T>),
    Paged(Paged<T>),
}

impl<T> ListBody<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            ListBody::Bare(items) => items,
            ListBody::Paged(page) => page.results,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusFilter {
    #[default]
    All,
    CheckedIn,
    CheckedOut,
}

impl StatusFilter {
    pub fn matches(self, record: &ShiftAttendanceRecord) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::CheckedIn => record.is_open(),
            StatusFilter::CheckedOut => !record.is_open(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub club: Option<String>,
    #[serde(default)]
    pub date_from: Option<NaiveDate>,
    #[serde(default)]
    pub date_to: Option<NaiveDate>,
    #[serde(default)]
    pub status: StatusFilter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationState {
    pub page: usize,
    pub page_size: usize,
}

impl PaginationState {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn total_pages(&self, len: usize) -> usize {
        len.div_ceil(self.page_size)
    }
}

/// Member subscription states; display strings live in `labels`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubscriptionStatus {
    Active,
    Expired,
    Upcoming,
    Frozen,
    Cancelled,
    Remaining,
    NearingExpiry,
}

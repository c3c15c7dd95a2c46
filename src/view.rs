use crate::models::{FilterCriteria, PaginationState, ShiftAttendanceRecord};
use crate::store::StoreSnapshot;
use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Serialize;

/// Filter then sort, newest check-in first. Date bounds use the local calendar.
pub fn filter_and_sort(
    records: &[ShiftAttendanceRecord],
    criteria: &FilterCriteria,
) -> Vec<ShiftAttendanceRecord> {
    filter_and_sort_in(records, criteria, &Local)
}

/// The sort is stable: records sharing a check-in keep their input order.
pub fn filter_and_sort_in<Tz: TimeZone>(
    records: &[ShiftAttendanceRecord],
    criteria: &FilterCriteria,
    tz: &Tz,
) -> Vec<ShiftAttendanceRecord> {
    let name = criteria.name.trim().to_lowercase();
    let club = criteria
        .club
        .as_deref()
        .map(|club| club.trim().to_lowercase())
        .filter(|club| !club.is_empty());

    let mut filtered: Vec<ShiftAttendanceRecord> = records
        .iter()
        .filter(|record| name.is_empty() || record_name(record).contains(&name))
        .filter(|record| {
            club.as_ref()
                .is_none_or(|club| record.club_name().to_lowercase().contains(club))
        })
        .filter(|record| {
            let day = record.check_in_day(tz);
            criteria.date_from.is_none_or(|from| day >= from)
                && criteria.date_to.is_none_or(|to| day <= to)
        })
        .filter(|record| criteria.status.matches(record))
        .cloned()
        .collect();

    filtered.sort_by(|a, b| b.check_in.cmp(&a.check_in));
    filtered
}

fn record_name(record: &ShiftAttendanceRecord) -> String {
    format!("{} {}", record.staff.first_name, record.staff.last_name).to_lowercase()
}

pub fn page_slice<T>(items: &[T], pagination: PaginationState) -> &[T] {
    let start = (pagination.page.max(1) - 1).saturating_mul(pagination.page_size);
    if start >= items.len() {
        return &[];
    }
    let end = (start + pagination.page_size).min(items.len());
    &items[start..end]
}

/// Filter input and page cursor owned by one kiosk screen.
#[derive(Debug, Clone)]
pub struct ViewState {
    criteria: FilterCriteria,
    pagination: PaginationState,
}

impl ViewState {
    pub fn new(page_size: usize) -> Self {
        Self {
            criteria: FilterCriteria::default(),
            pagination: PaginationState::new(page_size),
        }
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn pagination(&self) -> PaginationState {
        self.pagination
    }

    /// Any change of criteria sends the cursor back to the first page.
    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.pagination.page = 1;
    }

    pub fn reset(&mut self) {
        self.set_criteria(FilterCriteria::default());
    }

    pub fn set_page(&mut self, page: usize, filtered_len: usize) {
        let last = self.pagination.total_pages(filtered_len).max(1);
        self.pagination.page = page.clamp(1, last);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewStatus {
    Loading,
    Error { message: String },
    Empty,
    Rows,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendancePage {
    pub status: ViewStatus,
    pub rows: Vec<ShiftAttendanceRecord>,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_matches: usize,
    /// Set when a refetch failed but earlier data is still on screen.
    pub stale_error: Option<String>,
    pub last_fetched_at: Option<DateTime<Utc>>,
}

pub fn build_page(snapshot: &StoreSnapshot, view: &ViewState) -> AttendancePage {
    let filtered = filter_and_sort(&snapshot.data, view.criteria());
    let pagination = view.pagination();
    let has_data = snapshot.last_fetched_at.is_some();

    let status = match (&snapshot.error, has_data) {
        (_, false) if snapshot.loading => ViewStatus::Loading,
        (Some(message), false) => ViewStatus::Error {
            message: message.clone(),
        },
        (None, false) => ViewStatus::Loading,
        (_, true) if filtered.is_empty() => ViewStatus::Empty,
        (_, true) => ViewStatus::Rows,
    };
    let stale_error = if has_data { snapshot.error.clone() } else { None };

    AttendancePage {
        rows: page_slice(&filtered, pagination).to_vec(),
        page: pagination.page,
        page_size: pagination.page_size,
        total_pages: pagination.total_pages(filtered.len()),
        total_matches: filtered.len(),
        status,
        stale_error,
        last_fetched_at: snapshot.last_fetched_at,
    }
}

use crate::models::ShiftAttendanceRecord;
use chrono::{Duration, Local, NaiveDate, TimeZone};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
pub struct StaffHours {
    pub staff_id: u64,
    pub name: String,
    pub shifts: u32,
    pub hours: f64,
}

#[derive(Debug, Serialize)]
pub struct DailyHours {
    pub date: String,
    pub check_ins: u32,
    pub hours: f64,
}

#[derive(Debug, Serialize)]
pub struct ShiftSummary {
    pub currently_present: usize,
    pub total_hours: f64,
    pub per_staff: Vec<StaffHours>,
    pub last_7_days: Vec<DailyHours>,
}

pub fn build_summary(records: &[ShiftAttendanceRecord]) -> ShiftSummary {
    build_summary_at(Local::now().date_naive(), records, &Local)
}

/// `today` and the per-day buckets are both days of `tz`.
pub fn build_summary_at<Tz: TimeZone>(
    today: NaiveDate,
    records: &[ShiftAttendanceRecord],
    tz: &Tz,
) -> ShiftSummary {
    let mut per_staff: BTreeMap<u64, StaffHours> = BTreeMap::new();
    let mut per_day: BTreeMap<NaiveDate, (u32, f64)> = BTreeMap::new();
    let mut total_hours = 0.0;

    for record in records {
        let hours = record.worked_hours().unwrap_or(0.0);
        total_hours += hours;

        let entry = per_staff.entry(record.staff.id).or_insert_with(|| StaffHours {
            staff_id: record.staff.id,
            name: record.staff.full_name(),
            shifts: 0,
            hours: 0.0,
        });
        entry.shifts = entry.shifts.saturating_add(1);
        entry.hours += hours;

        let day = per_day.entry(record.check_in_day(tz)).or_default();
        day.0 = day.0.saturating_add(1);
        day.1 += hours;
    }

    let last_7_days = (0..7)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            let (check_ins, hours) = per_day.get(&date).copied().unwrap_or_default();
            DailyHours {
                date: date.to_string(),
                check_ins,
                hours: round2(hours),
            }
        })
        .collect();

    let mut per_staff: Vec<StaffHours> = per_staff
        .into_values()
        .map(|mut staff| {
            staff.hours = round2(staff.hours);
            staff
        })
        .collect();
    per_staff.sort_by(|a, b| b.hours.total_cmp(&a.hours));

    ShiftSummary {
        currently_present: records.iter().filter(|record| record.is_open()).count(),
        total_hours: round2(total_hours),
        per_staff,
        last_7_days,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

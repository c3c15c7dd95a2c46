use crate::labels;
use crate::models::ShiftAttendanceRecord;
use chrono::{Local, NaiveDate, TimeZone};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

pub const CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    pub staff: String,
    pub club: String,
    pub check_in: String,
    pub check_out: String,
    pub duration: String,
}

pub fn export_rows(records: &[ShiftAttendanceRecord]) -> Vec<ExportRow> {
    export_rows_in(records, &Local)
}

pub fn export_rows_in<Tz: TimeZone>(records: &[ShiftAttendanceRecord], tz: &Tz) -> Vec<ExportRow>
where
    Tz::Offset: std::fmt::Display,
{
    const STAMP: &str = "%Y-%m-%d %H:%M";

    records
        .iter()
        .map(|record| ExportRow {
            staff: record.staff.full_name(),
            club: record.club_name().to_string(),
            check_in: record.check_in.with_timezone(tz).format(STAMP).to_string(),
            check_out: record
                .check_out
                .map(|out| out.with_timezone(tz).format(STAMP).to_string())
                .unwrap_or_else(|| labels::STILL_PRESENT.to_string()),
            duration: record
                .worked_hours()
                .map(|hours| format!("{hours:.2}"))
                .unwrap_or_else(|| labels::UNAVAILABLE.to_string()),
        })
        .collect()
}

/// Cell text of the sheet: one header row followed by one row per record.
pub fn sheet_cells(rows: &[ExportRow]) -> Vec<Vec<String>> {
    let header = labels::EXPORT_HEADERS.iter().map(|title| title.to_string()).collect();
    std::iter::once(header)
        .chain(rows.iter().map(|row| {
            vec![
                row.staff.clone(),
                row.club.clone(),
                row.check_in.clone(),
                row.check_out.clone(),
                row.duration.clone(),
            ]
        }))
        .collect()
}

pub fn to_xlsx(rows: &[ExportRow]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();
    worksheet.set_right_to_left(true);

    let bold = Format::new().set_bold();
    for (r, cells) in sheet_cells(rows).iter().enumerate() {
        for (c, text) in cells.iter().enumerate() {
            if r == 0 {
                worksheet.write_string_with_format(0, c as u16, text, &bold)?;
            } else {
                worksheet.write_string(r as u32, c as u16, text)?;
            }
        }
    }

    workbook.push_worksheet(worksheet);
    workbook.save_to_buffer()
}

pub fn file_name(today: NaiveDate) -> String {
    format!("shift-attendance-{}.xlsx", today.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StaffRef;
    use chrono::{Duration, FixedOffset, Utc};

    fn record(id: u64, closed: bool) -> ShiftAttendanceRecord {
        let check_in = Utc.with_ymd_and_hms(2026, 4, 2, 6, 0, 0).unwrap();
        ShiftAttendanceRecord {
            id,
            staff: StaffRef {
                id,
                first_name: "Sara".into(),
                last_name: format!("N{id}"),
                username: String::new(),
            },
            club: None,
            check_in,
            check_out: closed.then(|| check_in + Duration::minutes(455)),
            duration_hours: None,
        }
    }

    #[test]
    fn rows_use_sentinels_for_open_shifts() {
        let records = vec![record(1, true), record(2, false), record(3, true)];
        let rows = export_rows_in(&records, &FixedOffset::east_opt(3 * 3600).unwrap());

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].staff, "Sara N1");
        assert_eq!(rows[0].check_in, "2026-04-02 09:00");
        assert_eq!(rows[0].check_out, "2026-04-02 16:35");
        assert_eq!(rows[0].duration, "7.58");
        assert_eq!(rows[1].check_out, labels::STILL_PRESENT);
        assert_eq!(rows[1].duration, labels::UNAVAILABLE);
    }

    #[test]
    fn sheet_has_header_plus_one_row_per_record() {
        let rows = export_rows_in(&[record(1, true), record(2, false), record(3, true)], &Utc);
        let cells = sheet_cells(&rows);
        assert_eq!(cells.len(), 4);
        assert_eq!(cells[0][3], labels::EXPORT_HEADERS[3]);
        assert_eq!(cells[2][3], labels::STILL_PRESENT);
    }

    #[test]
    fn workbook_is_written() {
        let rows = export_rows_in(&[record(1, true), record(2, false), record(3, true)], &Utc);
        let bytes = to_xlsx(&rows).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn file_name_carries_date() {
        let day = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        assert_eq!(file_name(day), "shift-attendance-2026-10-17.xlsx");
    }
}

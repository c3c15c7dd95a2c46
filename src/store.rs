use crate::api::AttendanceApi;
use crate::errors::AppError;
use crate::labels;
use crate::models::{ShiftAttendanceRecord, StaffDetails};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    pub data: Vec<ShiftAttendanceRecord>,
    pub loading: bool,
    pub error: Option<String>,
    pub last_fetched_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct StoreState {
    snapshot: StoreSnapshot,
    in_flight: usize,
    /// Sequence number handed to the most recently started fetch.
    issued: u64,
    /// Sequence number of the fetch whose outcome is on display.
    applied: u64,
}

/// Canonical copy of the shift-attendance list. Only a full fetch replaces it.
#[derive(Clone, Default)]
pub struct AttendanceStore {
    state: Arc<Mutex<StoreState>>,
}

impl AttendanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        self.state.lock().await.snapshot.clone()
    }

    /// On failure the previous collection stays in place next to the error.
    /// Overlapping fetches resolve in issue order: an outcome older than the
    /// one already applied is dropped and the current row count returned.
    pub async fn fetch_shift_attendances<A: AttendanceApi>(
        &self,
        api: &A,
    ) -> Result<usize, AppError> {
        let seq = {
            let mut state = self.state.lock().await;
            state.issued += 1;
            state.in_flight += 1;
            state.snapshot.loading = true;
            state.issued
        };

        let result = api.list_shift_attendances().await;

        let mut state = self.state.lock().await;
        state.in_flight = state.in_flight.saturating_sub(1);
        state.snapshot.loading = state.in_flight > 0;

        if seq < state.applied {
            match result {
                Ok(_) => {
                    info!(seq, applied = state.applied, "older shift list arrived late; ignored")
                }
                Err(err) => warn!(seq, "older shift fetch failed after a newer one landed: {err}"),
            }
            return Ok(state.snapshot.data.len());
        }
        state.applied = seq;

        match result {
            Ok(records) => {
                let total = records.len();
                let records: Vec<_> = records
                    .into_iter()
                    .filter(|record| {
                        let keep = record.is_consistent();
                        if !keep {
                            warn!(
                                record_id = record.id,
                                "dropping shift with check-out before check-in"
                            );
                        }
                        keep
                    })
                    .collect();
                info!(count = records.len(), total, "shift attendances fetched");
                let count = records.len();
                state.snapshot.data = records;
                state.snapshot.error = None;
                state.snapshot.last_fetched_at = Some(Utc::now());
                Ok(count)
            }
            Err(err) => {
                error!("failed to fetch shift attendances: {err}");
                state.snapshot.error = Some(labels::error_message(&err));
                Err(err)
            }
        }
    }

    /// Does not touch the collection; the caller refetches on success.
    pub async fn check_in<A: AttendanceApi>(
        &self,
        api: &A,
        rfid_code: &str,
    ) -> Result<StaffDetails, AppError> {
        let staff = api.check_in(rfid_code).await?;
        info!(staff_id = staff.id, "checked in");
        Ok(staff)
    }

    pub async fn check_out<A: AttendanceApi>(
        &self,
        api: &A,
        rfid_code: &str,
    ) -> Result<StaffDetails, AppError> {
        let staff = api.check_out(rfid_code).await?;
        info!(staff_id = staff.id, "checked out");
        Ok(staff)
    }
}

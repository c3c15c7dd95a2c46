use crate::api::AttendanceApi;
use crate::config::Config;
use crate::debounce::{Debouncer, Ticket};
use crate::errors::{AppError, ErrorKind};
use crate::export::{self, ExportRow};
use crate::labels;
use crate::models::{FilterCriteria, ShiftAttendanceRecord, StaffDetails, StaffLookupResult};
use crate::stats::{build_summary, ShiftSummary};
use crate::store::AttendanceStore;
use crate::view::{build_page, filter_and_sort, AttendancePage, ViewState};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

const MAX_RFID_LEN: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    CheckIn,
    CheckOut,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ChannelState {
    /// True while any request fired from this channel is unanswered.
    pub pending: bool,
    pub preview: Option<StaffDetails>,
    pub error: Option<String>,
    #[serde(skip)]
    in_flight: usize,
}

impl ChannelState {
    fn begin_request(&mut self) {
        self.in_flight += 1;
        self.pending = true;
    }

    fn finish_request(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.pending = self.in_flight > 0;
    }

    /// Clears the form; requests already sent still count as pending.
    fn clear(&mut self) {
        *self = Self {
            in_flight: self.in_flight,
            pending: self.in_flight > 0,
            ..Self::default()
        };
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Toast {
    pub id: u64,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DeskState {
    pub check_in: ChannelState,
    pub check_out: ChannelState,
    pub toasts: Vec<Toast>,
    /// The kiosk sends the operator back to the login screen when set.
    pub session_expired: bool,
}

impl DeskState {
    fn channel_mut(&mut self, channel: Channel) -> &mut ChannelState {
        match channel {
            Channel::CheckIn => &mut self.check_in,
            Channel::CheckOut => &mut self.check_out,
        }
    }
}

/// Trims the code and rejects anything a card reader cannot produce.
pub fn validate_rfid(raw: &str) -> Result<&str, AppError> {
    let code = raw.trim();
    if code.is_empty() {
        return Err(AppError::validation("rfid code is empty"));
    }
    if code.len() > MAX_RFID_LEN
        || !code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::validation(format!("malformed rfid code {code:?}")));
    }
    Ok(code)
}

struct Inner<A> {
    api: A,
    store: AttendanceStore,
    desk: Mutex<DeskState>,
    view: Mutex<ViewState>,
    check_in: Debouncer,
    check_out: Debouncer,
    next_toast: AtomicU64,
}

/// Ties the scan channels, the backend and the attendance store together.
pub struct Coordinator<A> {
    inner: Arc<Inner<A>>,
}

impl<A> Clone for Coordinator<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: AttendanceApi> Coordinator<A> {
    pub fn new(api: A, config: &Config) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                store: AttendanceStore::new(),
                desk: Mutex::new(DeskState::default()),
                view: Mutex::new(ViewState::new(config.page_size)),
                check_in: Debouncer::new(config.check_in_debounce),
                check_out: Debouncer::new(config.check_out_debounce),
                next_toast: AtomicU64::new(1),
            }),
        }
    }

    fn debouncer(&self, channel: Channel) -> &Debouncer {
        match channel {
            Channel::CheckIn => &self.inner.check_in,
            Channel::CheckOut => &self.inner.check_out,
        }
    }

    /// Feeds one keystroke's worth of input into a channel.
    pub async fn input(&self, channel: Channel, value: &str) {
        if value.trim().is_empty() {
            self.inner.desk.lock().await.channel_mut(channel).error = None;
        }

        let this = self.clone();
        self.debouncer(channel)
            .input(value, move |code, ticket| async move {
                this.submit(channel, code, ticket).await;
            })
            .await;
    }

    async fn submit(&self, channel: Channel, code: String, ticket: Ticket) {
        let code = match validate_rfid(&code) {
            Ok(code) => code.to_string(),
            Err(err) => {
                if ticket.is_current() {
                    self.report(Some(channel), &err).await;
                }
                return;
            }
        };

        self.inner.desk.lock().await.channel_mut(channel).begin_request();

        let store = &self.inner.store;
        let result = match channel {
            Channel::CheckIn => store.check_in(&self.inner.api, &code).await,
            Channel::CheckOut => store.check_out(&self.inner.api, &code).await,
        };

        self.inner.desk.lock().await.channel_mut(channel).finish_request();

        match result {
            Ok(staff) => {
                if ticket.is_current() {
                    let mut desk = self.inner.desk.lock().await;
                    let state = desk.channel_mut(channel);
                    state.error = None;
                    state.preview = Some(staff);
                } else {
                    info!(?channel, "input changed while request was in flight; preview discarded");
                }
                // The server state changed either way.
                let _ = self.refresh().await;
            }
            Err(err) => {
                if ticket.is_current() {
                    self.report(Some(channel), &err).await;
                } else {
                    warn!(?channel, "stale request failed: {err}");
                }
            }
        }
    }

    /// Refetches the whole collection; earlier data stays visible on failure.
    pub async fn refresh(&self) -> Result<usize, AppError> {
        let result = self
            .inner
            .store
            .fetch_shift_attendances(&self.inner.api)
            .await;
        if let Err(err) = &result {
            self.report(None, err).await;
        }
        result
    }

    /// Routes a failure to the form it came from or to a toast.
    async fn report(&self, channel: Option<Channel>, err: &AppError) {
        let message = labels::error_message(err);
        let mut desk = self.inner.desk.lock().await;
        match channel {
            Some(channel) if err.is_inline() => {
                desk.channel_mut(channel).error = Some(message);
            }
            _ => {
                if err.kind == ErrorKind::Auth {
                    desk.session_expired = true;
                }
                let id = self.inner.next_toast.fetch_add(1, Ordering::SeqCst);
                desk.toasts.push(Toast { id, message });
            }
        }
    }

    pub async fn reset_channel(&self, channel: Channel) {
        self.debouncer(channel).cancel().await;
        self.inner.desk.lock().await.channel_mut(channel).clear();
    }

    pub async fn desk(&self) -> DeskState {
        self.inner.desk.lock().await.clone()
    }

    pub async fn dismiss_toast(&self, id: u64) -> bool {
        let mut desk = self.inner.desk.lock().await;
        let before = desk.toasts.len();
        desk.toasts.retain(|toast| toast.id != id);
        desk.toasts.len() != before
    }

    pub async fn search_staff(&self, query: &str) -> Result<Vec<StaffLookupResult>, AppError> {
        let query = validate_rfid(query)?;
        match self.inner.api.search_staff(query).await {
            Ok(found) => Ok(found),
            Err(err) => {
                if !err.is_inline() {
                    self.report(None, &err).await;
                }
                Err(err)
            }
        }
    }

    pub async fn page(&self) -> AttendancePage {
        let snapshot = self.inner.store.snapshot().await;
        let view = self.inner.view.lock().await;
        build_page(&snapshot, &view)
    }

    pub async fn set_filter(&self, criteria: FilterCriteria) -> AttendancePage {
        self.inner.view.lock().await.set_criteria(criteria);
        self.page().await
    }

    pub async fn reset_filter(&self) -> AttendancePage {
        self.inner.view.lock().await.reset();
        self.page().await
    }

    pub async fn set_page(&self, page: usize) -> AttendancePage {
        let filtered_len = self.filtered().await.len();
        self.inner.view.lock().await.set_page(page, filtered_len);
        self.page().await
    }

    async fn filtered(&self) -> Vec<ShiftAttendanceRecord> {
        let snapshot = self.inner.store.snapshot().await;
        let view = self.inner.view.lock().await;
        filter_and_sort(&snapshot.data, view.criteria())
    }

    pub async fn summary(&self) -> ShiftSummary {
        build_summary(&self.filtered().await)
    }

    pub async fn export_rows(&self) -> Vec<ExportRow> {
        export::export_rows(&self.filtered().await)
    }

    /// Spreadsheet of every filtered record, not just the current page.
    pub async fn export(&self) -> Result<(String, Vec<u8>), AppError> {
        let rows = self.export_rows().await;
        let bytes = export::to_xlsx(&rows).map_err(AppError::internal)?;
        info!(rows = rows.len(), "attendance exported");
        Ok((export::file_name(Local::now().date_naive()), bytes))
    }
}

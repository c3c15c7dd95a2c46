use crate::errors::AppError;
use crate::models::{
    CheckRequest, CheckResponse, ListBody, ShiftAttendanceRecord, StaffDetails, StaffLookupResult,
};
use crate::storage::load_session;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::future::Future;
use std::path::PathBuf;
use tracing::warn;

pub const CHECK_IN_PATH: &str = "/staff/api/check-in/";
pub const CHECK_OUT_PATH: &str = "/staff/api/check-out/";
pub const SHIFT_REPORTS_PATH: &str = "/accounts/api/shift-reports/";
pub const USERS_PATH: &str = "/accounts/api/users/";

/// The backend calls the desk depends on.
pub trait AttendanceApi: Send + Sync + 'static {
    fn check_in(&self, rfid_code: &str)
    -> impl Future<Output = Result<StaffDetails, AppError>> + Send;

    fn check_out(
        &self,
        rfid_code: &str,
    ) -> impl Future<Output = Result<StaffDetails, AppError>> + Send;

    fn list_shift_attendances(
        &self,
    ) -> impl Future<Output = Result<Vec<ShiftAttendanceRecord>, AppError>> + Send;

    fn search_staff(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<StaffLookupResult>, AppError>> + Send;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CheckBody {
    Found(CheckResponse),
    Failed { error: String },
}

#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
    session_path: PathBuf,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>, session_path: PathBuf) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            session_path,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attaches the bearer token persisted by the login screen.
    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, AppError> {
        let session = load_session(&self.session_path).await;
        match session.access_token {
            Some(token) if !token.is_empty() => Ok(request.bearer_auth(token)),
            _ => Err(AppError::auth("no access token in session storage")),
        }
    }

    async fn post_check(&self, path: &str, rfid_code: &str) -> Result<StaffDetails, AppError> {
        let request = self
            .client
            .post(self.url(path))
            .json(&CheckRequest { rfid_code });
        let response = self.authorize(request).await?.send().await?;
        let response = ensure_success(response).await?;

        match response.json::<CheckBody>().await? {
            CheckBody::Found(body) => Ok(body.staff_details),
            CheckBody::Failed { error } => Err(AppError::lookup_miss(error)),
        }
    }
}

impl AttendanceApi for HttpApi {
    async fn check_in(&self, rfid_code: &str) -> Result<StaffDetails, AppError> {
        self.post_check(CHECK_IN_PATH, rfid_code).await
    }

    async fn check_out(&self, rfid_code: &str) -> Result<StaffDetails, AppError> {
        self.post_check(CHECK_OUT_PATH, rfid_code).await
    }

    async fn list_shift_attendances(&self) -> Result<Vec<ShiftAttendanceRecord>, AppError> {
        let request = self.client.get(self.url(SHIFT_REPORTS_PATH));
        let response = self.authorize(request).await?.send().await?;
        let response = ensure_success(response).await?;
        let body = response.json::<ListBody<ShiftAttendanceRecord>>().await?;
        Ok(body.into_vec())
    }

    async fn search_staff(&self, query: &str) -> Result<Vec<StaffLookupResult>, AppError> {
        let request = self.client.get(self.url(USERS_PATH)).query(&[("q", query)]);
        let response = self.authorize(request).await?.send().await?;
        let response = ensure_success(response).await?;
        let body = response.json::<ListBody<StaffLookupResult>>().await?;
        Ok(body.into_vec())
    }
}

async fn ensure_success(response: Response) -> Result<Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.json::<ErrorBody>().await.ok();
    let message = body
        .and_then(|body| body.error.or(body.detail))
        .unwrap_or_else(|| status.to_string());
    warn!(%status, "backend refused request: {message}");

    Err(classify(status, message))
}

fn classify(status: StatusCode, message: String) -> AppError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::auth(message),
        StatusCode::NOT_FOUND => AppError::lookup_miss(message),
        status if status.is_client_error() => AppError::rejected(message),
        _ => AppError::network_message(message),
    }
}

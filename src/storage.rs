use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::error;

/// Client-persisted authentication state, stored under the same keys the
/// login screen writes.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Session {
    #[serde(rename = "accessToken", default)]
    pub access_token: Option<String>,
    #[serde(rename = "refreshToken", default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub role: Option<String>,
}

pub async fn load_session(path: &Path) -> Session {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(session) => session,
            Err(err) => {
                error!("failed to parse session file: {err}");
                Session::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Session::default(),
        Err(err) => {
            error!("failed to read session file: {err}");
            Session::default()
        }
    }
}

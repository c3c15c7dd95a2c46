use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use once_cell::sync::Lazy;
use reqwest::Client;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

const TOKEN: &str = "test-token";
const LOOKUP_MISS: &str = "لم يتم العثور على موظف بهذا الرمز";

struct FakeBackend {
    base_url: String,
    list_calls: Arc<AtomicUsize>,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static BACKEND: Lazy<FakeBackend> = Lazy::new(start_backend);
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {TOKEN}"))
}

async fn fake_check(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "token not valid" })),
        );
    }
    match body["rfid_code"].as_str() {
        Some("A123") => (
            StatusCode::OK,
            Json(json!({
                "staff_details": { "id": 7, "first_name": "Ali", "last_name": "Hassan" }
            })),
        ),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "staff not found" })),
        ),
    }
}

async fn fake_shift_reports(State(calls): State<Arc<AtomicUsize>>) -> Json<Value> {
    calls.fetch_add(1, Ordering::SeqCst);
    Json(json!([
        {
            "id": 1,
            "staff": { "id": 7, "first_name": "Ali", "last_name": "Hassan", "username": "ali" },
            "club": { "id": 1, "name": "North" },
            "check_in": "2026-06-01T08:00:00Z",
            "check_out": "2026-06-01T16:00:00Z",
            "duration_hours": 8.0
        },
        {
            "id": 2,
            "staff": { "id": 8, "first_name": "Mona", "last_name": "Adel", "username": "mona" },
            "club": { "id": 1, "name": "North" },
            "check_in": "2026-06-02T08:00:00+03:00",
            "check_out": null
        },
        {
            "id": 3,
            "staff": { "id": 9, "first_name": "Omar", "last_name": "Zaki", "username": "omar" },
            "club": null,
            "check_in": "2026-06-03T09:00:00Z",
            "check_out": "2026-06-03T12:30:00Z"
        }
    ]))
}

async fn fake_users(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    let q = query.get("q").cloned().unwrap_or_default();
    let results = if "A123".contains(q.as_str()) {
        json!([{ "id": 7, "name": "Ali Hassan", "role": "coach", "is_active": true }])
    } else {
        json!([])
    };
    Json(json!({ "results": results }))
}

fn start_backend() -> FakeBackend {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind backend port");
    listener.set_nonblocking(true).expect("nonblocking listener");
    let port = listener.local_addr().unwrap().port();
    let list_calls = Arc::new(AtomicUsize::new(0));

    let app = Router::new()
        .route("/staff/api/check-in/", post(fake_check))
        .route("/staff/api/check-out/", post(fake_check))
        .route("/accounts/api/shift-reports/", get(fake_shift_reports))
        .route("/accounts/api/users/", get(fake_users))
        .with_state(Arc::clone(&list_calls));

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("backend runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).expect("tokio listener");
            axum::serve(listener, app).await.expect("backend serve");
        });
    });

    FakeBackend {
        base_url: format!("http://127.0.0.1:{port}"),
        list_calls,
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_session_path() -> std::path::PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("attendance_desk_http_{}_{}.json", std::process::id(), nanos));
    let session = json!({
        "accessToken": TOKEN,
        "refreshToken": "r",
        "user": { "id": 1, "username": "desk" },
    });
    std::fs::write(&path, serde_json::to_vec(&session).unwrap()).expect("write session");
    path
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/attendance")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_attendance_desk"))
        .env("PORT", port.to_string())
        .env("DESK_API_BASE_URL", &BACKEND.base_url)
        .env("DESK_SESSION_PATH", unique_session_path())
        .env("DESK_CHECK_IN_DEBOUNCE_MS", "100")
        .env("DESK_CHECK_OUT_DEBOUNCE_MS", "100")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

/// Polls the desk state until `ready` accepts it.
async fn wait_for_desk(client: &Client, base_url: &str, ready: impl Fn(&Value) -> bool) -> Value {
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        let desk: Value = client
            .get(format!("{base_url}/api/desk"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        if ready(&desk) {
            return desk;
        }
        if Instant::now() > deadline {
            panic!("desk never reached expected state: {desk}");
        }
        sleep(Duration::from_millis(50)).await;
    }
}

async fn reset_channels(client: &Client, base_url: &str) {
    for channel in ["check-in", "check-out"] {
        let response = client
            .post(format!("{base_url}/api/{channel}/reset"))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
    }
}

#[tokio::test]
async fn http_check_in_shows_preview_and_refetches() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    reset_channels(&client, &server.base_url).await;
    let before = BACKEND.list_calls.load(Ordering::SeqCst);

    let response = client
        .post(format!("{}/api/check-in/input", server.base_url))
        .json(&json!({ "value": "A123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::ACCEPTED);

    let desk = wait_for_desk(&client, &server.base_url, |desk| {
        !desk["check_in"]["preview"].is_null()
    })
    .await;
    assert_eq!(desk["check_in"]["preview"]["first_name"], "Ali");

    let deadline = Instant::now() + Duration::from_secs(3);
    while BACKEND.list_calls.load(Ordering::SeqCst) == before {
        assert!(Instant::now() < deadline, "no refetch after check-in");
        sleep(Duration::from_millis(50)).await;
    }
    sleep(Duration::from_millis(300)).await;
    assert_eq!(BACKEND.list_calls.load(Ordering::SeqCst), before + 1);
}

#[tokio::test]
async fn http_unknown_code_shows_inline_error() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    reset_channels(&client, &server.base_url).await;
    let before = BACKEND.list_calls.load(Ordering::SeqCst);

    client
        .post(format!("{}/api/check-out/input", server.base_url))
        .json(&json!({ "value": "NOPE1" }))
        .send()
        .await
        .unwrap();

    let desk = wait_for_desk(&client, &server.base_url, |desk| {
        !desk["check_out"]["error"].is_null()
    })
    .await;
    assert_eq!(desk["check_out"]["error"], LOOKUP_MISS);
    assert!(desk["check_out"]["preview"].is_null());

    sleep(Duration::from_millis(300)).await;
    assert_eq!(BACKEND.list_calls.load(Ordering::SeqCst), before);
}

#[tokio::test]
async fn http_filter_resets_page_and_exports() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let page: Value = client
        .post(format!("{}/api/attendance/filter", server.base_url))
        .json(&json!({ "status": "checkedOut" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page["page"], 1);
    assert_eq!(page["total_matches"], 2);
    assert_eq!(page["status"]["state"], "rows");
    assert_eq!(page["rows"][0]["id"], 3);

    let export = client
        .get(format!("{}/api/attendance/export", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(export.status().is_success());
    let disposition = export
        .headers()
        .get("content-disposition")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(disposition.contains("shift-attendance-"));
    let bytes = export.bytes().await.unwrap();
    assert!(bytes.starts_with(b"PK"));

    let page: Value = client
        .post(format!("{}/api/attendance/filter/reset", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page["total_matches"], 3);
}

#[tokio::test]
async fn http_staff_search_proxies_lookup() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let found: Value = client
        .get(format!("{}/api/staff?q=A12", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(found[0]["name"], "Ali Hassan");

    let empty = client
        .get(format!("{}/api/staff?q=", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(empty.status(), reqwest::StatusCode::BAD_REQUEST);
}

use chrono::{Duration as Days, NaiveDate};
use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
struct Record {
    #[serde(rename = "Water")]
    water: f64,
    #[serde(rename = "Sleep")]
    sleep: f64,
    #[serde(rename = "Screen")]
    screen: f64,
}

#[derive(Debug, Deserialize)]
struct Session {
    today: String,
    selected_date: String,
    editable: bool,
    record: Record,
}

#[derive(Debug, Deserialize)]
struct History {
    days: BTreeMap<String, Record>,
}

#[derive(Debug, Deserialize)]
struct Cell {
    current_month: bool,
}

#[derive(Debug, Deserialize)]
struct Grid {
    month: String,
    cells: Vec<Cell>,
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

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("habitwise_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/session")).send().await {
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
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_habitwise"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env("HABIT_PERSIST_DELAY_MS", "50")
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

async fn post<T: for<'de> Deserialize<'de>>(client: &Client, url: String, body: serde_json::Value) -> T {
    let response = client.post(url).json(&body).send().await.unwrap();
    assert!(response.status().is_success(), "status {}", response.status());
    response.json().await.unwrap()
}

async fn get<T: for<'de> Deserialize<'de>>(client: &Client, url: String) -> T {
    client.get(url).send().await.unwrap().json().await.unwrap()
}

async fn select(client: &Client, server: &TestServer, date: &str) -> Session {
    post(
        client,
        format!("{}/api/session/select", server.base_url),
        serde_json::json!({ "date": date }),
    )
    .await
}

async fn today(client: &Client, server: &TestServer) -> NaiveDate {
    let session: Session = get(client, format!("{}/api/session", server.base_url)).await;
    NaiveDate::parse_from_str(&session.today, "%Y-%m-%d").unwrap()
}

fn key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[tokio::test]
async fn http_increment_writes_through_for_today() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let today = key(today(&client, &server).await);

    select(&client, &server, &today).await;
    let set: Session = post(
        &client,
        format!("{}/api/session/value", server.base_url),
        serde_json::json!({ "category": "Water", "value": 3 }),
    )
    .await;
    assert_eq!(set.record.water, 3.0);

    let after: Session = post(
        &client,
        format!("{}/api/session/increment", server.base_url),
        serde_json::json!({ "category": "Water" }),
    )
    .await;
    assert_eq!(after.record.water, 4.0);
    assert_eq!(after.selected_date, today);

    let history: History = get(&client, format!("{}/api/history", server.base_url)).await;
    assert_eq!(history.days[&today].water, 4.0);
}

#[tokio::test]
async fn http_past_edit_is_saved_on_commit() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let past = key(today(&client, &server).await - Days::days(3));

    let selected = select(&client, &server, &past).await;
    assert!(selected.editable);
    assert_eq!(selected.record, Record { water: 0.0, sleep: 0.0, screen: 0.0 });

    let _: Session = post(
        &client,
        format!("{}/api/session/value", server.base_url),
        serde_json::json!({ "category": "Sleep", "value": 6.5 }),
    )
    .await;
    let history: History = get(&client, format!("{}/api/history", server.base_url)).await;
    assert!(!history.days.contains_key(&past));

    let _: Session = post(&client, format!("{}/api/session/commit", server.base_url), serde_json::json!({})).await;
    let history: History = get(&client, format!("{}/api/history", server.base_url)).await;
    assert_eq!(history.days[&past].sleep, 6.5);
}

#[tokio::test]
async fn http_future_date_is_read_only() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let future = key(today(&client, &server).await + Days::days(2));

    let selected = select(&client, &server, &future).await;
    assert!(!selected.editable);

    let response = client
        .post(format!("{}/api/session/increment", server.base_url))
        .json(&serde_json::json!({ "category": "Screen" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = client
        .post(format!("{}/api/session/commit", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn http_slider_write_lands_after_delay() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let today = key(today(&client, &server).await);

    select(&client, &server, &today).await;
    let live: Session = post(
        &client,
        format!("{}/api/session/value", server.base_url),
        serde_json::json!({ "category": "Screen", "value": 5.5, "source": "slider" }),
    )
    .await;
    assert_eq!(live.record.screen, 5.5);

    sleep(Duration::from_millis(400)).await;
    let history: History = get(&client, format!("{}/api/history", server.base_url)).await;
    assert_eq!(history.days[&today].screen, 5.5);
}

#[tokio::test]
async fn http_calendar_grid_and_navigation() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let grid: Grid = get(&client, format!("{}/api/calendar?month=2025-12", server.base_url)).await;
    assert_eq!(grid.month, "2025-12");
    assert_eq!(grid.cells.len(), 42);
    assert_eq!(grid.cells.iter().filter(|c| c.current_month).count(), 31);

    select(&client, &server, "2025-12-15").await;
    let next: Grid = post(
        &client,
        format!("{}/api/calendar/navigate", server.base_url),
        serde_json::json!({ "delta": 1 }),
    )
    .await;
    assert_eq!(next.month, "2026-01");

    let response = client
        .post(format!("{}/api/calendar/navigate", server.base_url))
        .json(&serde_json::json!({ "delta": 3 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_rejects_bad_input() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/session/select", server.base_url))
        .json(&serde_json::json!({ "date": "19/10/2026" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .post(format!("{}/api/session/increment", server.base_url))
        .json(&serde_json::json!({ "category": "Steps" }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_client_error());

    let response = client
        .get(format!("{}/api/calendar?month=2026-13", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_calendar_at_end_of_date_range_is_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let today = key(today(&client, &server).await);

    select(&client, &server, &key(NaiveDate::MAX)).await;
    let response = client
        .get(format!("{}/api/calendar", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let session = select(&client, &server, &today).await;
    assert_eq!(session.selected_date, today);
    let grid: Grid = get(&client, format!("{}/api/calendar", server.base_url)).await;
    assert_eq!(grid.cells.len(), 42);
}

#[tokio::test]
async fn http_index_serves_dashboard() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let body = client
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("<title>HabitWise</title>"));
}

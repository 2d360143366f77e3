use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::Result;
use cauli_core::config::parse_backend_url;
use cauli_core::progress::COMPLETE;
use cauli_core::state::{ALERT_UPLOAD_FAILED, HomeState};
use cauli_core::{ClientConfig, PredictClient, ProgressMode, cards, pick_path};
use tempfile::tempdir;

/// Accepts one connection, reads the whole multipart request and answers with `status` and `body`.
fn serve_once(status: &'static str, body: &'static str) -> Result<(String, JoinHandle<String>)> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let base = format!("http://{}", listener.local_addr()?);
    let handle = thread::spawn(move || {
        let Ok((mut stream, _)) = listener.accept() else {
            return String::new();
        };
        let request = read_request(&mut stream);
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let _ = stream.write_all(response.as_bytes());
        request
    });
    Ok((base, handle))
}

/// Accepts one connection and never answers.
fn serve_silence(hold: Duration) -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let base = format!("http://{}", listener.local_addr()?);
    thread::spawn(move || {
        if let Ok((stream, _)) = listener.accept() {
            thread::sleep(hold);
            drop(stream);
        }
    });
    Ok(base)
}

fn read_request(stream: &mut TcpStream) -> String {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let mut raw = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => raw.extend_from_slice(&buf[..n]),
        }
        let text = String::from_utf8_lossy(&raw);
        let closing = text
            .lines()
            .find_map(|l| l.to_ascii_lowercase().contains("boundary=").then(|| l.to_string()))
            .and_then(|l| l.split("boundary=").nth(1).map(|b| format!("--{}--", b.trim())));
        if closing.is_some_and(|c| text.contains(&c)) {
            break;
        }
    }
    String::from_utf8_lossy(&raw).into_owned()
}

fn config(base: &str, timeout: Option<Duration>, mode: ProgressMode) -> Result<ClientConfig> {
    Ok(ClientConfig {
        backend_url: parse_backend_url(base)?,
        timeout,
        progress_mode: mode,
    })
}

fn state_with_leaf(mode: ProgressMode) -> Result<(HomeState, tempfile::TempDir)> {
    let dir = tempdir()?;
    let path = dir.path().join("leaf.jpg");
    std::fs::write(&path, b"\xFF\xD8\xFF\xE0 not really a jpeg")?;
    let mut state = HomeState::new(mode);
    state.select(pick_path(&path, None));
    assert!(state.selected().is_some());
    Ok((state, dir))
}

fn run_to_completion(state: &mut HomeState) {
    let deadline = Instant::now() + Duration::from_secs(15);
    while Instant::now() < deadline {
        if state.poll(Instant::now()) {
            return;
        }
        thread::sleep(Duration::from_millis(10));
    }
    panic!("upload did not finish in time");
}

#[test]
fn single_label_response_renders_one_card() -> Result<()> {
    let (base, server) = serve_once("200 OK", r#"{"label":"Black Rot","confidence":0.87}"#)?;
    let client = Arc::new(PredictClient::new(&config(
        &base,
        Some(Duration::from_secs(10)),
        ProgressMode::Simulated,
    )?)?);
    let (mut state, _dir) = state_with_leaf(ProgressMode::Simulated)?;

    state.begin_upload(&client, Instant::now())?;
    assert!(state.is_uploading());
    run_to_completion(&mut state);

    let views = cards(state.result()).unwrap_or_default();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].title, "Black Rot");
    assert_eq!(views[0].confidence.as_deref(), Some("87.00%"));
    assert_eq!(state.progress().percent(), COMPLETE);
    assert!(state.alert().is_none());

    let request = server.join().unwrap_or_default();
    assert!(request.starts_with("POST /predict "));
    assert!(request.contains("name=\"file\""));
    assert!(request.contains("filename=\"leaf.jpg\""));
    assert!(request.contains("image/jpeg"));
    Ok(())
}

#[test]
fn prediction_list_renders_cards_in_order() -> Result<()> {
    let (base, _server) = serve_once(
        "200 OK",
        r#"{"predictions":[{"label":"Healthy","confidence":0.95},{"label":"Clubroot","confidence":0.4}]}"#,
    )?;
    let client = Arc::new(PredictClient::new(&config(&base, None, ProgressMode::Simulated)?)?);
    let (mut state, _dir) = state_with_leaf(ProgressMode::Simulated)?;

    state.begin_upload(&client, Instant::now())?;
    run_to_completion(&mut state);

    let views = cards(state.result()).unwrap_or_default();
    let titles: Vec<_> = views.iter().map(|v| v.title.as_str()).collect();
    assert_eq!(titles, vec!["Healthy", "Clubroot"]);
    assert_eq!(views[0].confidence.as_deref(), Some("95.00%"));
    assert_eq!(views[1].confidence.as_deref(), Some("40.00%"));
    Ok(())
}

#[test]
fn timeout_alerts_and_returns_to_idle() -> Result<()> {
    let base = serve_silence(Duration::from_secs(5))?;
    let client = Arc::new(PredictClient::new(&config(
        &base,
        Some(Duration::from_millis(500)),
        ProgressMode::Simulated,
    )?)?);
    let (mut state, _dir) = state_with_leaf(ProgressMode::Simulated)?;

    state.begin_upload(&client, Instant::now())?;
    run_to_completion(&mut state);

    assert_eq!(state.alert(), Some(ALERT_UPLOAD_FAILED));
    assert_eq!(state.progress().percent(), COMPLETE);
    assert!(!state.progress().is_running());
    assert!(!state.is_uploading());
    assert!(state.result().is_none());
    Ok(())
}

#[test]
fn backend_error_status_is_a_failure() -> Result<()> {
    let (base, _server) = serve_once(
        "500 Internal Server Error",
        r#"{"error":"cannot identify image file"}"#,
    )?;
    let client = Arc::new(PredictClient::new(&config(&base, None, ProgressMode::Simulated)?)?);
    let (mut state, _dir) = state_with_leaf(ProgressMode::Simulated)?;

    state.begin_upload(&client, Instant::now())?;
    run_to_completion(&mut state);

    assert_eq!(state.alert(), Some(ALERT_UPLOAD_FAILED));
    assert!(state.result().is_none());
    Ok(())
}

#[test]
fn transport_progress_ends_at_hundred() -> Result<()> {
    let (base, _server) = serve_once("200 OK", r#"[{"disease":"Downy Mildew"}]"#)?;
    let client = Arc::new(PredictClient::new(&config(&base, None, ProgressMode::Transport)?)?);
    let (mut state, _dir) = state_with_leaf(ProgressMode::Transport)?;

    state.begin_upload(&client, Instant::now())?;
    run_to_completion(&mut state);

    assert_eq!(state.progress().percent(), COMPLETE);
    let views = cards(state.result()).unwrap_or_default();
    assert_eq!(views[0].title, "Downy Mildew");
    assert!(views[0].confidence.is_none());
    Ok(())
}

#[test]
fn direct_client_call_returns_raw_json() -> Result<()> {
    let (base, _server) = serve_once("200 OK", r#"{"prediction":"Healthy"}"#)?;
    let client = PredictClient::new(&config(&base, None, ProgressMode::Simulated)?)?;
    let dir = tempdir()?;
    let path = dir.path().join("leaf.png");
    std::fs::write(&path, b"png-ish")?;
    let image = pick_path(&path, None)?;

    let payload = client.predict(&image)?;
    assert_eq!(payload, serde_json::json!({"prediction": "Healthy"}));
    Ok(())
}

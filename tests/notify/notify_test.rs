//! Notification side-channel tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use persona_relay::config::Secrets;
use persona_relay::notify::{
    notifier_from_secrets, push, record_unknown_question, record_user_details, NoopNotifier,
    Notifier, NotifyError, PushoverNotifier, RecordAck,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    fn sent(&self) -> Vec<String> {
        self.sent.lock().expect("sent lock").clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        self.sent.lock().expect("sent lock").push(message.to_owned());
        Ok(())
    }
}

/// Serve one response and return the raw request text once the client is done.
async fn serve_once(status_line: &str) -> (String, JoinHandle<String>) {
    let listener = match TcpListener::bind("127.0.0.1:0").await {
        Ok(listener) => listener,
        Err(err) => panic!("listener should bind: {err}"),
    };
    let addr = match listener.local_addr() {
        Ok(addr) => addr,
        Err(err) => panic!("listener should expose local addr: {err}"),
    };

    let status_line_owned = status_line.to_owned();
    let handle = tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return String::new();
        };
        let mut received = Vec::new();
        let mut buf = [0_u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap_or(0);
            if n == 0 {
                break;
            }
            received.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&received);
            if let Some((head, body)) = text.split_once("\r\n\r\n") {
                let expected = head
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        if name.eq_ignore_ascii_case("content-length") {
                            value.trim().parse::<usize>().ok()
                        } else {
                            None
                        }
                    })
                    .unwrap_or(0);
                if body.len() >= expected {
                    break;
                }
            }
        }
        let body = r#"{"status":1}"#;
        let response = format!(
            "HTTP/1.1 {status_line_owned}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let _ = socket.write_all(response.as_bytes()).await;
        String::from_utf8_lossy(&received).into_owned()
    });

    (format!("http://{addr}/1/messages.json"), handle)
}

// ---------------------------------------------------------------------------
// Record operations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn record_user_details_formats_message() {
    let notifier = RecordingNotifier::default();
    let ack = record_user_details(&notifier, "ada@example.com", Some("Ada"), Some("hiring")).await;

    assert_eq!(ack, RecordAck { recorded: "ok".to_owned() });
    assert_eq!(
        notifier.sent(),
        vec!["Recording interest from Ada with email ada@example.com and notes hiring"]
    );
}

#[tokio::test]
async fn record_user_details_uses_defaults() {
    let notifier = RecordingNotifier::default();
    record_user_details(&notifier, "x@example.com", None, Some("  ")).await;

    assert_eq!(
        notifier.sent(),
        vec!["Recording interest from Name not provided with email x@example.com and notes not provided"]
    );
}

#[tokio::test]
async fn record_unknown_question_formats_message() {
    let notifier = RecordingNotifier::default();
    let ack = record_unknown_question(&notifier, "What is your favourite compiler?").await;

    assert_eq!(ack.recorded, "ok");
    assert_eq!(
        notifier.sent(),
        vec!["Recording unknown question: What is your favourite compiler?"]
    );
}

#[test]
fn record_ack_serializes_as_recorded_ok() {
    let ack = RecordAck {
        recorded: "ok".to_owned(),
    };
    assert_eq!(
        serde_json::to_value(&ack).expect("serialize"),
        serde_json::json!({"recorded": "ok"})
    );
}

// ---------------------------------------------------------------------------
// Delivery
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pushover_posts_form_fields() {
    let (url, handle) = serve_once("200 OK").await;
    let notifier = PushoverNotifier::with_url("user-1", "token-2", url);

    let result = notifier.notify("hello there").await;
    assert!(result.is_ok(), "delivery should succeed: {result:?}");

    let raw = handle.await.unwrap_or_default();
    assert!(raw.starts_with("POST /1/messages.json"));
    assert!(raw
        .to_ascii_lowercase()
        .contains("content-type: application/x-www-form-urlencoded"));
    let body = raw.split_once("\r\n\r\n").map(|(_, b)| b).unwrap_or_default();
    assert_eq!(body, "user=user-1&token=token-2&message=hello+there");
}

#[tokio::test]
async fn pushover_error_status_is_reported() {
    let (url, _handle) = serve_once("400 Bad Request").await;
    let notifier = PushoverNotifier::with_url("u", "t", url);

    match notifier.notify("x").await {
        Err(NotifyError::HttpStatus { status, .. }) => assert_eq!(status, 400),
        other => panic!("expected http status error, got: {other:?}"),
    }
}

#[tokio::test]
async fn push_swallows_delivery_failures() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let notifier = PushoverNotifier::with_url("u", "t", format!("http://{addr}/"));
    push(&notifier, "nobody is listening").await;

    let ack = record_unknown_question(&notifier, "still fine?").await;
    assert_eq!(ack.recorded, "ok");
}

#[tokio::test]
async fn noop_notifier_is_disabled_and_silent() {
    let notifier = NoopNotifier;
    assert!(!notifier.is_enabled());
    assert!(notifier.notify("ignored").await.is_ok());
    push(&notifier, "ignored").await;
}

#[test]
fn notifier_selection_follows_credentials() {
    let none = notifier_from_secrets(&Secrets::default());
    assert!(!none.is_enabled());

    let secrets = Secrets::from_env_with(|key| match key {
        "PUSHOVER_USER" => Some("u".to_owned()),
        "PUSHOVER_TOKEN" => Some("t".to_owned()),
        _ => None,
    });
    let some: Arc<dyn Notifier> = notifier_from_secrets(&secrets);
    assert!(some.is_enabled());
}

#[test]
fn pushover_debug_redacts_credentials() {
    let notifier = PushoverNotifier::new("user-secret", "token-secret");
    let rendered = format!("{notifier:?}");
    assert!(!rendered.contains("user-secret"));
    assert!(!rendered.contains("token-secret"));
}

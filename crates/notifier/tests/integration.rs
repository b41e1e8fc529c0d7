//! Integration tests for the WhatsApp transport against a mock bridge and the
//! email transport against a plaintext SMTP listener.

use std::sync::{Arc, Mutex};

use mockito::Matcher;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use herald_common::config::EmailConfig;
use herald_notifier::whatsapp::{BridgeClient, poll_session};
use herald_notifier::{
    ChatSession, EmailTransport, SessionEvent, SessionState, Transport, WhatsAppTransport,
};

fn ready_session() -> Arc<ChatSession> {
    let session = Arc::new(ChatSession::new());
    session.handle(SessionEvent::Initialize);
    session.handle(SessionEvent::Ready);
    session
}

#[tokio::test]
async fn test_send_posts_rendered_message() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/messages")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({ "chat_id": "391234567890@c.us" })),
            Matcher::Regex("Dear Bo,".to_string()),
        ]))
        .with_status(200)
        .with_body(r#"{"ok":true}"#)
        .create_async()
        .await;

    let bridge = BridgeClient::new(server.url()).unwrap();
    let transport = WhatsAppTransport::new(bridge, ready_session());

    assert!(transport.send("391234567890", "Bo", &json!("paid")).await);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_send_fails_without_request_when_not_ready() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/messages")
        .expect(0)
        .create_async()
        .await;

    let bridge = BridgeClient::new(server.url()).unwrap();
    let session = Arc::new(ChatSession::new());
    session.handle(SessionEvent::Initialize);
    session.handle(SessionEvent::QrChallenge("2@pair".to_string()));
    let transport = WhatsAppTransport::new(bridge, session);

    assert!(!transport.send("391234567890", "Bo", &json!("paid")).await);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_bridge_rejection_is_a_failed_send() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/messages")
        .with_status(500)
        .with_body("session closed")
        .create_async()
        .await;

    let bridge = BridgeClient::new(server.url()).unwrap();
    let transport = WhatsAppTransport::new(bridge, ready_session());

    assert!(!transport.send("391234567890", "Bo", &json!("paid")).await);
}

#[tokio::test]
async fn test_unreachable_bridge_is_a_failed_send() {
    let bridge = BridgeClient::new("http://127.0.0.1:9").unwrap();
    let transport = WhatsAppTransport::new(bridge, ready_session());

    assert!(!transport.send("391234567890", "Bo", &json!("paid")).await);
}

#[tokio::test]
async fn test_poll_moves_session_to_pairing_then_ready() {
    let mut server = mockito::Server::new_async().await;
    let session = ChatSession::new();
    session.handle(SessionEvent::Initialize);

    let qr = server
        .mock("GET", "/status")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"state":"qr","qr":"2@pair"}"#)
        .create_async()
        .await;

    let bridge = BridgeClient::new(server.url()).unwrap();
    poll_session(&bridge, &session).await;
    assert_eq!(
        session.state(),
        SessionState::AwaitingPairing {
            qr: "2@pair".to_string()
        }
    );
    qr.remove_async().await;

    let _ready = server
        .mock("GET", "/status")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"state":"ready"}"#)
        .create_async()
        .await;

    poll_session(&bridge, &session).await;
    assert!(session.is_ready());
}

#[tokio::test]
async fn test_poll_reinitializes_after_disconnect() {
    let mut server = mockito::Server::new_async().await;
    let _status = server
        .mock("GET", "/status")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"state":"disconnected"}"#)
        .create_async()
        .await;
    let init = server
        .mock("POST", "/initialize")
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let session = ready_session();
    let bridge = BridgeClient::new(server.url()).unwrap();
    poll_session(&bridge, &session).await;

    assert_eq!(session.state(), SessionState::Initializing);
    assert!(!session.is_ready());
    init.assert_async().await;
}

/// Minimal SMTP server that never offers STARTTLS.
///
/// Accepts one connection and records the verb of every command it receives.
async fn spawn_plaintext_smtp() -> (u16, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (read, mut write) = stream.into_split();
        let mut lines = BufReader::new(read).lines();
        write.write_all(b"220 relay.test ESMTP\r\n").await.unwrap();

        let mut in_data = false;
        while let Ok(Some(line)) = lines.next_line().await {
            if in_data {
                if line == "." {
                    in_data = false;
                    write.write_all(b"250 2.0.0 queued\r\n").await.unwrap();
                }
                continue;
            }

            let verb = line
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_ascii_uppercase();
            log.lock().unwrap().push(verb.clone());

            let reply: &[u8] = match verb.as_str() {
                "EHLO" => b"250-relay.test\r\n250 SIZE 10240000\r\n",
                "MAIL" | "RCPT" | "RSET" | "NOOP" => b"250 2.1.0 ok\r\n",
                "DATA" => {
                    in_data = true;
                    b"354 end data with <CR><LF>.<CR><LF>\r\n"
                }
                "QUIT" => {
                    let _ = write.write_all(b"221 bye\r\n").await;
                    break;
                }
                _ => b"502 5.5.2 command not implemented\r\n",
            };
            write.write_all(reply).await.unwrap();
        }
    });

    (port, seen)
}

#[tokio::test]
async fn test_email_delivered_through_relay_without_starttls() {
    let (port, seen) = spawn_plaintext_smtp().await;
    let transport = EmailTransport::new(&EmailConfig {
        host: "127.0.0.1".to_string(),
        port,
        secure: false,
        username: String::new(),
        password: String::new(),
        from: "Notification System <notifications@example.com>".to_string(),
        subject: "Monthly notification".to_string(),
    })
    .unwrap();

    assert!(transport.send("ana@x.com", "Ana", &json!("€50")).await);

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.first().map(String::as_str), Some("EHLO"));
    for verb in ["MAIL", "RCPT", "DATA"] {
        assert!(seen.iter().any(|v| v == verb), "missing {verb} in {seen:?}");
    }
    assert!(!seen.iter().any(|v| v == "STARTTLS" || v == "AUTH"));
}

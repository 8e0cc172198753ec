use gradebook_core::ServiceError;
use gradebook_rpc::{Request, Response, RpcConnection, ServiceUrl};
use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

/// How the scripted host answers one request.
enum Reply {
    After(Duration),
    WrongId,
}

/// Serves one connection, answering requests in `script` order, and reports
/// every request id it received.
fn scripted_host(script: Vec<Reply>) -> (ServiceUrl, Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let (seen_tx, seen_rx) = mpsc::channel();

    thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut writer = stream.try_clone().unwrap();
        let mut lines = BufReader::new(stream).lines();
        for reply in script {
            let Some(Ok(line)) = lines.next() else {
                return;
            };
            let request: Request = serde_json::from_str(&line).unwrap();
            seen_tx.send(request.id.clone()).unwrap();
            let id = match reply {
                Reply::After(delay) => {
                    thread::sleep(delay);
                    request.id
                }
                Reply::WrongId => "someone-else".to_string(),
            };
            let response = Response::ok(&id, json!([]));
            writeln!(writer, "{}", serde_json::to_string(&response).unwrap()).unwrap();
            writer.flush().unwrap();
        }
        // Keep the socket open until the client side is done.
        for _ in lines {}
    });

    let url = ServiceUrl::parse(&format!("gradebook://127.0.0.1:{port}")).unwrap();
    (url, seen_rx)
}

#[test]
fn slow_replies_are_awaited_and_the_connection_stays_usable() {
    let (url, seen) = scripted_host(vec![
        Reply::After(Duration::from_millis(1500)),
        Reply::After(Duration::ZERO),
    ]);
    let connection = RpcConnection::connect(&url).unwrap();

    let first = connection.call("ScoreService", "getAll", Value::Null).unwrap();
    assert_eq!(first, json!([]));
    let second = connection.call("ScoreService", "getAll", Value::Null).unwrap();
    assert_eq!(second, json!([]));

    assert_eq!(seen.try_iter().count(), 2);
}

#[test]
fn out_of_step_reply_disables_the_connection() {
    let (url, seen) = scripted_host(vec![Reply::WrongId, Reply::After(Duration::ZERO)]);
    let connection = RpcConnection::connect(&url).unwrap();

    let first = connection
        .call("ScoreService", "getAll", Value::Null)
        .unwrap_err();
    assert!(matches!(first, ServiceError::Transport(message) if message.contains("does not match")));

    let second = connection
        .call("ScoreService", "getAll", Value::Null)
        .unwrap_err();
    assert!(matches!(second, ServiceError::Transport(message) if message.contains("unusable")));

    // The second call never reached the host.
    assert!(seen.recv_timeout(Duration::from_secs(5)).is_ok());
    assert!(seen.recv_timeout(Duration::from_millis(200)).is_err());
}

use drowsy_guard::adapters::outbound::init_noop_logger;
use drowsy_guard::application::{GeoBackend, PresenceService};
use drowsy_guard::Config;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start_server() -> (SocketAddr, oneshot::Sender<()>) {
    let service = PresenceService::from_config(&Config::default(), GeoBackend::Memory, init_noop_logger())
        .await
        .unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();
    tokio::spawn(async move {
        service
            .serve(listener, async move {
                let _ = stopped.await;
            })
            .await
            .unwrap();
    });
    (addr, stop)
}

async fn connect(addr: SocketAddr) -> Socket {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws", addr))
        .await
        .unwrap();
    ws
}

async fn send(ws: &mut Socket, event: Value) {
    ws.send(Message::Text(event.to_string())).await.unwrap();
}

async fn next_event(ws: &mut Socket) -> Value {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for a server event")
            .expect("socket closed")
            .unwrap();
        if let Message::Text(text) = frame {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

async fn register(ws: &mut Socket, id: &str) {
    send(ws, json!({"event": "register", "data": {"driverId": id}})).await;
    let reply = next_event(ws).await;
    assert_eq!(reply["event"], "registered");
    assert_eq!(reply["data"]["success"], true);
    assert_eq!(reply["data"]["driverId"], id);
}

/// Sends a location update and waits until the connection has processed it.
async fn update_and_sync(ws: &mut Socket, id: &str, lat: f64, lon: f64) {
    send(
        ws,
        json!({"event": "update_location", "data": {"driverId": id, "latitude": lat, "longitude": lon}}),
    )
    .await;
    ws.send(Message::Text("not json".into())).await.unwrap();
    let reply = next_event(ws).await;
    assert_eq!(reply["event"], "error");
    assert_eq!(reply["data"]["type"], "protocol");
}

#[tokio::test]
async fn test_health_endpoint() {
    let (addr, stop) = start_server().await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();

    assert!(response.starts_with("HTTP/1.1 200"), "{}", response);
    assert!(response.contains(r#""status":"ok""#));

    let _ = stop.send(());
}

#[tokio::test]
async fn test_alert_fans_out_over_websocket() {
    let (addr, stop) = start_server().await;

    let mut driver1 = connect(addr).await;
    let mut driver2 = connect(addr).await;
    let mut driver4 = connect(addr).await;

    register(&mut driver1, "driver1").await;
    register(&mut driver2, "driver2").await;
    register(&mut driver4, "driver4").await;

    update_and_sync(&mut driver2, "driver2", 12.9719, 77.5947).await;
    update_and_sync(&mut driver4, "driver4", 12.9850, 77.6090).await;

    send(
        &mut driver1,
        json!({"event": "drowsy_alert", "data": {
            "driverId": "driver1", "latitude": 12.9716, "longitude": 77.5946, "alertType": "drowsy"
        }}),
    )
    .await;

    let alert = next_event(&mut driver2).await;
    assert_eq!(alert["event"], "nearby_alert");
    assert_eq!(alert["data"]["alertingDriver"], "driver1");
    assert_eq!(alert["data"]["alertType"], "drowsy");
    assert_eq!(alert["data"]["location"]["latitude"], 12.9716);
    assert!(alert["data"]["timestamp"].as_str().unwrap().ends_with('Z'));

    // The far driver gets nothing: its next event is the reply to its own probe.
    driver4.send(Message::Text("{}".into())).await.unwrap();
    let reply = next_event(&mut driver4).await;
    assert_eq!(reply["event"], "error");

    let _ = stop.send(());
}

#[tokio::test]
async fn test_invalid_update_reports_error_event() {
    let (addr, stop) = start_server().await;
    let mut ws = connect(addr).await;
    register(&mut ws, "driver9").await;

    send(
        &mut ws,
        json!({"event": "update_location", "data": {"driverId": "driver9", "latitude": 95.0, "longitude": 0.0}}),
    )
    .await;
    let reply = next_event(&mut ws).await;
    assert_eq!(reply["event"], "error");
    assert_eq!(reply["data"]["type"], "location_update");
    assert_eq!(reply["data"]["code"], "out_of_range");

    let _ = stop.send(());
}

#[tokio::test]
async fn test_empty_registration_fails_over_websocket() {
    let (addr, stop) = start_server().await;
    let mut ws = connect(addr).await;

    send(&mut ws, json!({"event": "register", "data": {"driverId": ""}})).await;
    let reply = next_event(&mut ws).await;
    assert_eq!(reply["event"], "registered");
    assert_eq!(reply["data"]["success"], false);
    assert_eq!(reply["data"]["error"], "Registration failed: Driver ID is required");

    let _ = stop.send(());
}

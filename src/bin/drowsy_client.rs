// Interactive test client: four simulated drivers around Bangalore.

use drowsy_guard::domains::presence::{ClientEvent, DrowsyAlertRequest, LocationUpdateRequest, RegisterRequest, ServerEvent};
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

struct TestDriver {
    id: &'static str,
    lat: f64,
    lng: f64,
}

static TEST_DRIVERS: [TestDriver; 4] = [
    TestDriver { id: "driver1", lat: 12.9716, lng: 77.5946 },
    TestDriver { id: "driver2", lat: 12.9719, lng: 77.5947 }, // ~35m from driver1
    TestDriver { id: "driver3", lat: 12.9721, lng: 77.5949 }, // ~65m from driver1
    TestDriver { id: "driver4", lat: 12.9850, lng: 77.6090 }, // ~2km from driver1
];

#[derive(Debug)]
enum Command {
    Send(ClientEvent),
    Close,
}

struct DriverSocket {
    commands: mpsc::UnboundedSender<Command>,
    task: JoinHandle<()>,
}

async fn connect_driver(url: &str, driver: &'static TestDriver) -> Result<DriverSocket, Box<dyn std::error::Error>> {
    let (ws, _) = tokio_tungstenite::connect_async(url).await?;
    println!("{} connected", driver.id);
    let (mut sink, mut stream) = ws.split();
    let (commands, mut rx) = mpsc::unbounded_channel::<Command>();

    commands.send(Command::Send(ClientEvent::Register(RegisterRequest {
        driver_id: Some(driver.id.to_string()),
    })))?;

    let task = tokio::spawn(async move {
        loop {
            tokio::select! {
                cmd = rx.recv() => match cmd {
                    Some(Command::Send(event)) => {
                        let Ok(json) = serde_json::to_string(&event) else { continue };
                        if sink.send(Message::Text(json)).await.is_err() {
                            break;
                        }
                    }
                    Some(Command::Close) | None => {
                        let _ = sink.close().await;
                        break;
                    }
                },
                frame = stream.next() => match frame {
                    Some(Ok(Message::Text(text))) => match serde_json::from_str::<ServerEvent>(&text) {
                        Ok(ServerEvent::Registered(r)) => println!("{} registration response: {:?}", driver.id, r),
                        Ok(ServerEvent::NearbyAlert(a)) => println!("{} received alert: {:?}", driver.id, a),
                        Ok(ServerEvent::Error(e)) => eprintln!("{} error: {:?}", driver.id, e),
                        Err(e) => eprintln!("{} undecodable frame: {}", driver.id, e),
                    },
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        eprintln!("{} socket error: {}", driver.id, e);
                        break;
                    }
                },
            }
        }
        println!("{} disconnected", driver.id);
    });

    Ok(DriverSocket { commands, task })
}

fn update_location(socket: &DriverSocket, driver: &TestDriver) {
    let _ = socket.commands.send(Command::Send(ClientEvent::UpdateLocation(LocationUpdateRequest {
        driver_id: Some(driver.id.to_string()),
        latitude: Some(driver.lat),
        longitude: Some(driver.lng),
    })));
}

fn send_drowsy_alert(socket: &DriverSocket, driver: &TestDriver) {
    let _ = socket.commands.send(Command::Send(ClientEvent::DrowsyAlert(DrowsyAlertRequest {
        driver_id: Some(driver.id.to_string()),
        latitude: Some(driver.lat),
        longitude: Some(driver.lng),
        alert_type: Some("drowsy".to_string()),
    })));
}

fn disconnect_all(sockets: &[DriverSocket]) {
    for socket in sockets {
        let _ = socket.commands.send(Command::Close);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "ws://localhost:3000/ws".to_string());

    println!("Starting test client against {}...", url);
    let mut sockets = Vec::with_capacity(TEST_DRIVERS.len());
    for driver in TEST_DRIVERS.iter() {
        sockets.push(connect_driver(&url, driver).await?);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    loop {
        stdout
            .write_all(
                b"\n=== Test Menu ===\n\
                  1. Update all drivers' locations\n\
                  2. Send drowsy alert from driver1\n\
                  3. Send drowsy alert from driver2\n\
                  4. Disconnect all drivers\n\
                  5. Exit\n\
                  \nSelect an option (1-5): ",
            )
            .await?;
        stdout.flush().await?;

        let Some(answer) = lines.next_line().await? else { break };
        match answer.trim() {
            "1" => {
                for (socket, driver) in sockets.iter().zip(TEST_DRIVERS.iter()) {
                    update_location(socket, driver);
                }
                println!("Updated all driver locations");
            }
            "2" => {
                send_drowsy_alert(&sockets[0], &TEST_DRIVERS[0]);
                println!("Sent drowsy alert from driver1");
            }
            "3" => {
                send_drowsy_alert(&sockets[1], &TEST_DRIVERS[1]);
                println!("Sent drowsy alert from driver2");
            }
            "4" => {
                disconnect_all(&sockets);
                println!("Disconnected all drivers");
            }
            "5" => {
                println!("Exiting...");
                break;
            }
            _ => println!("Invalid option"),
        }
    }

    disconnect_all(&sockets);
    for socket in sockets {
        let _ = socket.task.await;
    }
    Ok(())
}

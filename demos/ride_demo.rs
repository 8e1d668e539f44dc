//! Books a ride, adds a card, chats with the driver, follows the ride to
//! completion and rates it.
//!
//! ```text
//! cargo run --example ride_demo [config.json]
//! RUST_LOG=swiftride=debug cargo run --example ride_demo
//! ```

use std::time::Duration;

use swiftride::emitter::NotificationEmitter;
use swiftride::{
    BookingRequest, CardDetails, Engine, EngineConfig, EventKind, Location, RideType, SenderRole,
};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default()
            .with_tick_interval(Duration::from_secs(2))
            .with_reply_delay(Duration::from_millis(500)),
    };
    let engine = Engine::new(config)?;

    let card = engine
        .payments()
        .add(CardDetails::new("user123", "John Doe", "4111 1111 1111 1111", "12/27", "123"))
        .await?;
    info!(brand = %card.card_brand, last4 = %card.card_last4, "card on file");

    let ride = engine
        .rides()
        .create_ride(
            BookingRequest::new(
                "user123",
                Location::new("123 Main St, Downtown").with_coordinate(40.7128, -74.0060),
                Location::new("Airport Terminal 1").with_coordinate(40.6413, -73.7781),
            )
            .ride_type(RideType::Premium),
        )
        .await?;
    info!(ride_id = ride.id, fare = %ride.fare, distance = ride.distance_miles, "ride booked");

    let mut toasts = NotificationEmitter::new();
    toasts.on("ride.completed", |json| println!("completed: {json}"));

    let session = engine.chat().open(ride.id);
    let mut events = engine.rides().subscribe(ride.id).await?;
    while let Some(event) = events.next().await {
        println!("[{}] {} (eta {} min)", event.status, event.message, event.eta_minutes);
        toasts.emit(&event);

        if event.kind == EventKind::Transition && event.status == swiftride::RideStatus::Assigned {
            let sent = session.send("I'm on my way down").await?;
            if let Some(reply) = sent.auto_reply {
                if let Some(message) = reply.wait().await? {
                    println!("driver: {}", message.content);
                }
            }
        }
    }
    session.close();

    let rated = engine
        .rides()
        .rate_ride(ride.id, 5, Some("Great driver!".into()))
        .await?;
    info!(ride_id = rated.id, rating = ?rated.rating, "thanks for riding");

    for message in engine.chat().list_messages(ride.id).await? {
        let who = match message.sender {
            SenderRole::Rider => "you",
            SenderRole::Driver => "driver",
        };
        println!("{who}: {}", message.content);
    }
    Ok(())
}

use std::time::Duration;

use swiftride::chat::{quick_messages, FALLBACK_REPLY};
use swiftride::{Error, SenderRole, ValidationError};
use crate::support::{airport_trip, engine, slow_engine};

#[tokio::test(start_paused = true)]
async fn whitespace_message_fails_without_reply() {
    let engine = engine();
    let ride = engine.rides().create_ride(airport_trip("user123")).await.unwrap();

    let err = engine
        .chat()
        .send(ride.id, SenderRole::Rider, "    ")
        .await
        .unwrap_err();
    assert_eq!(err, Error::Validation(ValidationError::EmptyMessage));

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(engine.chat().list_messages(ride.id).await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn quick_messages_get_their_canned_replies() {
    let engine = engine();
    let session = engine.chat().open(1);

    for prompt in quick_messages() {
        let sent = session.send(prompt).await.unwrap();
        let reply = sent.auto_reply.unwrap().wait().await.unwrap().unwrap();
        assert_ne!(reply.content, FALLBACK_REPLY);
        assert_eq!(reply.sender, SenderRole::Driver);
    }

    let messages = session.messages().await.unwrap();
    assert_eq!(messages.len(), quick_messages().len() * 2);
    assert_eq!(messages[0].content, "I'm on my way down");
    assert_eq!(messages[1].content, "Great! I'll be waiting outside.");
}

#[tokio::test(start_paused = true)]
async fn send_returns_before_the_reply() {
    let engine = slow_engine();
    let started = tokio::time::Instant::now();
    let sent = engine
        .chat()
        .send(1, SenderRole::Rider, "Running 2 minutes late")
        .await
        .unwrap();
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(!sent.auto_reply.as_ref().unwrap().is_finished());

    let reply = sent.auto_reply.unwrap().wait().await.unwrap().unwrap();
    assert_eq!(reply.content, "No problem, take your time.");
    assert!(started.elapsed() >= Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn closing_the_session_drops_pending_replies() {
    let engine = engine();
    let sent = {
        let session = engine.chat().open(5);
        session.send("Thank you!").await.unwrap()
    };

    assert_eq!(sent.auto_reply.unwrap().wait().await.unwrap(), None);
    let messages = engine.chat().list_messages(5).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].sender, SenderRole::Rider);
}

use swiftride::lifecycle::message_for;
use swiftride::{EventKind, RideStatus};
use crate::support::{airport_trip, engine, slow_engine, TICK};

#[tokio::test(start_paused = true)]
async fn ride_walks_every_status_once_in_order() {
    let engine = engine();
    let ride = engine.rides().create_ride(airport_trip("user123")).await.unwrap();
    assert_eq!(ride.status, RideStatus::Searching);

    let events = engine.rides().subscribe(ride.id).await.unwrap().collect().await;

    let statuses: Vec<RideStatus> = events.iter().map(|event| event.status).collect();
    assert_eq!(
        statuses,
        vec![
            RideStatus::Assigned,
            RideStatus::Arriving,
            RideStatus::InProgress,
            RideStatus::Completed,
        ]
    );
    for event in &events {
        assert_eq!(event.message, message_for(event.status));
        assert_eq!(event.ride_id, ride.id);
    }
    let etas: Vec<u32> = events.iter().map(|event| event.eta_minutes).collect();
    assert_eq!(etas, vec![4, 2, 0, 0]);

    let stored = engine.rides().get_ride(ride.id).await.unwrap();
    assert_eq!(stored.status, RideStatus::Completed);
    let driver = engine.drivers().get_driver(stored.driver_id.unwrap()).await.unwrap();
    // Dispatched driver ends up at the pickup.
    let pickup = ride.pickup.coordinate.unwrap();
    assert!(driver.location.distance_miles(&pickup) < 0.01);
}

#[tokio::test(start_paused = true)]
async fn completed_event_carries_final_snapshot() {
    let engine = engine();
    let ride = engine.rides().create_ride(airport_trip("user123")).await.unwrap();
    let events = engine.rides().subscribe(ride.id).await.unwrap().collect().await;

    let last = events.last().unwrap();
    let EventKind::Completed(snapshot) = &last.kind else {
        panic!("expected completion, got {:?}", last.kind);
    };
    assert_eq!(snapshot.id, ride.id);
    assert_eq!(snapshot.status, RideStatus::Completed);
    assert_eq!(snapshot.fare, ride.fare);
}

#[tokio::test(start_paused = true)]
async fn steps_are_spaced_by_the_tick_interval() {
    let engine = slow_engine();
    let ride = engine.rides().create_ride(airport_trip("user123")).await.unwrap();
    let mut events = engine.rides().subscribe(ride.id).await.unwrap();

    let started = tokio::time::Instant::now();
    events.next().await.unwrap();
    let first = started.elapsed();
    events.next().await.unwrap();
    let second = started.elapsed();

    // Each step lands on its own tick, after that step's store writes.
    assert!(first >= TICK && first < TICK * 2);
    assert!(second >= TICK * 2 && second < TICK * 3);
}

#[tokio::test(start_paused = true)]
async fn tracked_ride_cancelled_by_id_never_moves_forward() {
    let engine = engine();
    let ride = engine.rides().create_ride(airport_trip("user123")).await.unwrap();
    let tracked = engine.rides().track(ride.clone()).unwrap();
    let mut events = tracked.subscribe();

    engine.rides().cancel_ride(ride.id).await.unwrap();
    tokio::time::sleep(TICK * 3).await;

    let only = events.next().await.unwrap();
    assert_eq!(only.kind, EventKind::Cancelled);
    assert!(events.next().await.is_none());
    assert_eq!(tracked.status(), RideStatus::Cancelled);
    assert_eq!(engine.rides().get_ride(ride.id).await.unwrap().driver_id, None);
}

#[tokio::test(start_paused = true)]
async fn no_forward_event_after_cancel() {
    let engine = engine();
    let ride = engine.rides().create_ride(airport_trip("user123")).await.unwrap();
    let mut events = engine.rides().subscribe(ride.id).await.unwrap();

    assert_eq!(events.next().await.unwrap().status, RideStatus::Assigned);
    let cancelled = engine.rides().cancel_ride(ride.id).await.unwrap();
    assert_eq!(cancelled.status, RideStatus::Cancelled);

    let last = events.next().await.unwrap();
    assert_eq!(last.kind, EventKind::Cancelled);
    assert_eq!(last.message, "Ride cancelled successfully");
    assert!(events.next().await.is_none());

    // Several intervals later nothing has moved.
    tokio::time::sleep(TICK * 5).await;
    let stored = engine.rides().get_ride(ride.id).await.unwrap();
    assert_eq!(stored.status, RideStatus::Cancelled);
    assert!(engine.rides().active_ride("user123").await.unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn cancel_is_rejected_once_the_trip_started() {
    let engine = engine();
    let ride = engine.rides().create_ride(airport_trip("user123")).await.unwrap();
    let mut events = engine.rides().subscribe(ride.id).await.unwrap();
    while events.next().await.unwrap().status != RideStatus::InProgress {}

    let err = engine.rides().cancel_ride(ride.id).await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(events.next().await.unwrap().status, RideStatus::Completed);
}

#[tokio::test(start_paused = true)]
async fn outage_surfaces_as_warning_and_ride_keeps_moving() {
    let engine = engine();
    let ride = engine.rides().create_ride(airport_trip("user123")).await.unwrap();
    let mut events = engine.rides().subscribe(ride.id).await.unwrap();
    engine.backend().set_offline(true);

    let assigned = events.next().await.unwrap();
    assert_eq!(assigned.kind, EventKind::Transition);
    assert_eq!(assigned.status, RideStatus::Assigned);
    let warning = events.next().await.unwrap();
    assert!(warning.is_warning());

    engine.backend().set_offline(false);
    let remaining = events.collect().await;
    assert!(remaining.last().unwrap().is_terminal());
    assert_eq!(
        engine.rides().get_ride(ride.id).await.unwrap().status,
        RideStatus::Completed
    );
}

#[tokio::test(start_paused = true)]
async fn dropping_the_engine_ends_the_stream() {
    let engine = engine();
    let ride = engine.rides().create_ride(airport_trip("user123")).await.unwrap();
    let mut events = engine.rides().subscribe(ride.id).await.unwrap();

    drop(engine);
    assert!(events.next().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn subscribing_to_a_finished_ride_yields_nothing() {
    let engine = engine();
    let ride = engine.rides().create_ride(airport_trip("user123")).await.unwrap();
    engine.rides().cancel_ride(ride.id).await.unwrap();

    let mut events = engine.rides().subscribe(ride.id).await.unwrap();
    assert!(events.next().await.is_none());
}

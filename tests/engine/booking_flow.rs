use swiftride::{BookingRequest, Error, RideStatus, RideType, ValidationError};
use crate::support::{airport_trip, engine, slow_engine};

#[tokio::test(start_paused = true)]
async fn book_track_rate_and_rebook() {
    let engine = engine();
    let rides = engine.rides();

    let ride = rides
        .create_ride(airport_trip("user123").ride_type(RideType::Premium))
        .await
        .unwrap();
    assert_eq!(ride.id, 1);
    assert_eq!(rides.active_ride("user123").await.unwrap().unwrap().id, ride.id);

    let events = rides.subscribe(ride.id).await.unwrap().collect().await;
    assert!(events.last().unwrap().is_terminal());

    let rated = rides
        .rate_ride(ride.id, 5, Some("Smooth ride".into()))
        .await
        .unwrap();
    assert_eq!(rated.rating, Some(5));
    assert_eq!(rated.status, RideStatus::Completed);

    let request = rides.rebook(ride.id).await.unwrap();
    let again = rides.create_ride(request).await.unwrap();
    assert_eq!(again.id, 2);
    assert_eq!(again.pickup, ride.pickup);
    assert_eq!(again.destination, ride.destination);
    assert_eq!(again.ride_type, RideType::Premium);
    assert_eq!(again.status, RideStatus::Searching);

    let history = rides.history("user123").await.unwrap();
    assert_eq!(history.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2, 1]);
    assert_eq!(history[1].rating, Some(5));
}

#[tokio::test]
async fn identical_pickup_and_destination_creates_nothing() {
    let engine = engine();
    let err = engine
        .rides()
        .create_ride(BookingRequest::new("user123", "Central Park", "  Central Park "))
        .await
        .unwrap_err();
    assert_eq!(err, Error::Validation(ValidationError::SameLocation));
    assert!(engine.rides().list_rides().await.unwrap().is_empty());

    // The rejected booking consumed no id.
    let ride = engine.rides().create_ride(airport_trip("user123")).await.unwrap();
    assert_eq!(ride.id, 1);
}

#[tokio::test]
async fn rating_zero_is_rejected() {
    let engine = engine();
    let ride = engine.rides().create_ride(airport_trip("user123")).await.unwrap();
    let err = engine.rides().rate_ride(ride.id, 0, None).await.unwrap_err();
    assert_eq!(err, Error::Validation(ValidationError::RatingOutOfRange(0)));
}

#[tokio::test]
async fn ids_increase_and_are_never_reused() {
    let engine = engine();
    let rides = engine.rides();
    let mut ids = Vec::new();
    for _ in 0..3 {
        ids.push(rides.create_ride(airport_trip("user123")).await.unwrap().id);
    }
    assert_eq!(ids, vec![1, 2, 3]);

    assert!(rides.rides().store().delete(3).await.unwrap());
    let next = rides.create_ride(airport_trip("user123")).await.unwrap();
    assert_eq!(next.id, 4);
    assert!(rides.get_ride(3).await.unwrap_err().is_not_found());
}

#[tokio::test(start_paused = true)]
async fn concurrent_bookings_get_unique_ids() {
    let engine = slow_engine();
    let handles: Vec<_> = (0..8)
        .map(|n| {
            let rides = engine.rides().clone();
            tokio::spawn(async move { rides.create_ride(airport_trip(&format!("rider-{n}"))).await })
        })
        .collect();

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().unwrap().id);
    }
    ids.sort_unstable();
    assert_eq!(ids, (1..=8).collect::<Vec<u64>>());
}

#[tokio::test]
async fn fares_stay_in_their_bracket() {
    let engine = engine();
    for ride_type in RideType::ALL {
        let ride = engine
            .rides()
            .create_ride(airport_trip("user123").ride_type(ride_type))
            .await
            .unwrap();
        let base = ride_type.base_fare().cents();
        assert!(ride.fare.cents() + 500 >= base && ride.fare.cents() < base + 500);
        assert!((2.0..17.0).contains(&ride.distance_miles));
    }
}

#[tokio::test]
async fn stored_cancellation_survives_later_status_writes() {
    let engine = engine();
    let ride = engine.rides().create_ride(airport_trip("user123")).await.unwrap();
    engine.rides().cancel_ride(ride.id).await.unwrap();

    let err = engine
        .rides()
        .update_ride(ride.id, swiftride::ride::RidePatch::status(RideStatus::Assigned))
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(
        engine.rides().get_ride(ride.id).await.unwrap().status,
        RideStatus::Cancelled
    );
}

use swiftride::payment::CardBrand;
use swiftride::{CardDetails, Error, ValidationError};
use crate::support::engine;

fn card(owner: &str, number: &str) -> CardDetails {
    CardDetails::new(owner, "John Doe", number, "12/27", "123")
}

#[tokio::test]
async fn visa_card_keeps_only_last_four() {
    let engine = engine();
    let method = engine
        .payments()
        .add(card("user123", "4111 1111 1111 1111"))
        .await
        .unwrap();
    assert_eq!(method.card_brand, CardBrand::Visa);
    assert_eq!(method.card_last4, "1111");
    assert!(method.is_default);

    let json = serde_json::to_string(&method).unwrap();
    assert!(!json.contains("4111 1111"));
}

#[tokio::test]
async fn short_card_number_creates_nothing() {
    let engine = engine();
    let err = engine
        .payments()
        .add(card("user123", "4111 1111 1111 111"))
        .await
        .unwrap_err();
    assert_eq!(err, Error::Validation(ValidationError::CardNumberTooShort));
    assert!(engine.payments().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn set_default_leaves_exactly_one_per_owner() {
    let engine = engine();
    let payments = engine.payments();
    let mut ids = Vec::new();
    for number in ["4111111111111111", "5555555555554444", "6011000990139424"] {
        ids.push(payments.add(card("user123", number)).await.unwrap().id);
    }
    payments.add(card("user456", "4242424242424242")).await.unwrap();

    for &id in ids.iter().rev() {
        payments.set_default(id).await.unwrap();
        let defaults: Vec<u64> = payments
            .list_for("user123")
            .await
            .unwrap()
            .into_iter()
            .filter(|m| m.is_default)
            .map(|m| m.id)
            .collect();
        assert_eq!(defaults, vec![id]);
    }
    assert!(payments.default_for("user456").await.unwrap().is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_set_default_calls_still_leave_one() {
    let engine = engine();
    let payments = engine.payments().clone();
    let mut ids = Vec::new();
    for number in ["4111111111111111", "5555555555554444", "6011000990139424", "3782822463100050"] {
        ids.push(payments.add(card("user123", number)).await.unwrap().id);
    }

    let handles: Vec<_> = ids
        .iter()
        .map(|&id| {
            let payments = payments.clone();
            tokio::spawn(async move { payments.set_default(id).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let defaults = payments
        .list_for("user123")
        .await
        .unwrap()
        .into_iter()
        .filter(|m| m.is_default)
        .count();
    assert_eq!(defaults, 1);
}

#[tokio::test]
async fn removing_the_default_leaves_none() {
    let engine = engine();
    let payments = engine.payments();
    let first = payments.add(card("user123", "4111111111111111")).await.unwrap();
    let second = payments.add(card("user123", "5555555555554444")).await.unwrap();

    payments.remove(first.id).await.unwrap();
    assert_eq!(payments.default_for("user123").await.unwrap(), None);

    let chosen = payments.set_default(second.id).await.unwrap();
    assert!(chosen.is_default);
}

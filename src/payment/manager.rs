//! PaymentManager - stored cards and the one-default-per-owner rule.

use tracing::info;

use super::card::CardDetails;
use super::model::{PaymentDraft, PaymentMethod};
use crate::error::{Error, Result};
use crate::store::{RecordStore, StoreError};

#[derive(Clone)]
pub struct PaymentManager {
    store: RecordStore<PaymentMethod>,
}

impl PaymentManager {
    pub fn new(store: RecordStore<PaymentMethod>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &RecordStore<PaymentMethod> {
        &self.store
    }

    pub async fn list(&self) -> Result<Vec<PaymentMethod>> {
        Ok(self.store.list_all().await?)
    }

    pub async fn list_for(&self, owner_id: &str) -> Result<Vec<PaymentMethod>> {
        Ok(self.store.find(|method| method.owner_id == owner_id).await?)
    }

    pub async fn default_for(&self, owner_id: &str) -> Result<Option<PaymentMethod>> {
        Ok(self
            .store
            .find(|method| method.owner_id == owner_id && method.is_default)
            .await?
            .into_iter()
            .next())
    }

    /// Validate and store a card. An owner's first card becomes the default.
    pub async fn add(&self, card: CardDetails) -> Result<PaymentMethod> {
        let card = card.validate()?;
        let method = self
            .store
            .create_with(|existing| {
                let first = !existing.iter().any(|method| method.owner_id == card.owner_id);
                Ok::<_, Error>(PaymentDraft {
                    owner_id: card.owner_id,
                    card_last4: card.last4,
                    card_brand: card.brand,
                    cardholder_name: card.cardholder_name,
                    expiry: card.expiry,
                    is_default: first,
                })
            })
            .await?;
        info!(
            payment_id = method.id,
            brand = %method.card_brand,
            is_default = method.is_default,
            "payment method added"
        );
        Ok(method)
    }

    /// Make `id` its owner's only default, in one batched write.
    pub async fn set_default(&self, id: u64) -> Result<PaymentMethod> {
        let method = self
            .store
            .modify_all(|methods| {
                let owner = methods
                    .iter()
                    .find(|method| method.id == id)
                    .map(|method| method.owner_id.clone())
                    .ok_or_else(|| StoreError::not_found::<PaymentMethod>(id))?;

                let mut chosen = None;
                for method in methods.iter_mut().filter(|method| method.owner_id == owner) {
                    method.is_default = method.id == id;
                    if method.is_default {
                        chosen = Some(method.clone());
                    }
                }
                chosen.ok_or_else(|| Error::from(StoreError::not_found::<PaymentMethod>(id)))
            })
            .await?;
        info!(payment_id = id, owner_id = %method.owner_id, "default payment method set");
        Ok(method)
    }

    /// Delete a card. Removing the default leaves the owner without one.
    pub async fn remove(&self, id: u64) -> Result<bool> {
        let removed = self.store.delete(id).await?;
        info!(payment_id = id, "payment method removed");
        Ok(removed)
    }
}

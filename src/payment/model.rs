use serde::{Deserialize, Serialize};

use super::card::CardBrand;
use crate::store::Record;

/// A stored card. Only the last four digits are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: u64,
    pub owner_id: String,
    pub card_last4: String,
    pub card_brand: CardBrand,
    pub cardholder_name: String,
    pub expiry: String,
    pub is_default: bool,
}

#[derive(Debug, Clone)]
pub struct PaymentDraft {
    pub owner_id: String,
    pub card_last4: String,
    pub card_brand: CardBrand,
    pub cardholder_name: String,
    pub expiry: String,
    pub is_default: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PaymentPatch {
    pub cardholder_name: Option<String>,
    pub expiry: Option<String>,
    pub is_default: Option<bool>,
}

impl Record for PaymentMethod {
    const COLLECTION: &'static str = "payment_methods";

    type Draft = PaymentDraft;
    type Patch = PaymentPatch;

    fn id(&self) -> u64 {
        self.id
    }

    fn from_draft(id: u64, draft: PaymentDraft) -> Self {
        PaymentMethod {
            id,
            owner_id: draft.owner_id,
            card_last4: draft.card_last4,
            card_brand: draft.card_brand,
            cardholder_name: draft.cardholder_name,
            expiry: draft.expiry,
            is_default: draft.is_default,
        }
    }

    fn apply(&mut self, patch: PaymentPatch) {
        if let Some(name) = patch.cardholder_name {
            self.cardholder_name = name;
        }
        if let Some(expiry) = patch.expiry {
            self.expiry = expiry;
        }
        if let Some(is_default) = patch.is_default {
            self.is_default = is_default;
        }
    }
}

//! Stored payment cards.

mod card;
mod manager;
mod model;

pub use card::{CardBrand, CardDetails, ValidCard};
pub use manager::PaymentManager;
pub use model::{PaymentDraft, PaymentMethod, PaymentPatch};

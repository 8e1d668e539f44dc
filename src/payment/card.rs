use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const MIN_CARD_DIGITS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardBrand {
    Visa,
    Mastercard,
    Amex,
    Discover,
}

impl CardBrand {
    /// Brand from the leading digit; unknown prefixes count as visa.
    pub fn from_number(digits: &str) -> Self {
        match digits.chars().next() {
            Some('5') | Some('2') => CardBrand::Mastercard,
            Some('3') => CardBrand::Amex,
            Some('6') => CardBrand::Discover,
            _ => CardBrand::Visa,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CardBrand::Visa => "visa",
            CardBrand::Mastercard => "mastercard",
            CardBrand::Amex => "amex",
            CardBrand::Discover => "discover",
        }
    }
}

impl fmt::Display for CardBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the add-card form submits. Never stored as is: only the last four
/// digits and the brand survive validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardDetails {
    pub owner_id: String,
    pub cardholder_name: String,
    pub card_number: String,
    /// `MM/YY`
    pub expiry: String,
    pub cvv: String,
}

/// A card that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidCard {
    pub owner_id: String,
    pub cardholder_name: String,
    pub last4: String,
    pub brand: CardBrand,
    pub expiry: String,
}

impl CardDetails {
    pub fn new(
        owner_id: impl Into<String>,
        cardholder_name: impl Into<String>,
        card_number: impl Into<String>,
        expiry: impl Into<String>,
        cvv: impl Into<String>,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            cardholder_name: cardholder_name.into(),
            card_number: card_number.into(),
            expiry: expiry.into(),
            cvv: cvv.into(),
        }
    }

    pub fn validate(&self) -> Result<ValidCard, ValidationError> {
        for (field, value) in [
            ("owner_id", &self.owner_id),
            ("cardholder_name", &self.cardholder_name),
            ("card_number", &self.card_number),
            ("expiry", &self.expiry),
            ("cvv", &self.cvv),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingCardField(field));
            }
        }

        let digits: String = self
            .card_number
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::CardNumberNotNumeric);
        }
        if digits.len() < MIN_CARD_DIGITS {
            return Err(ValidationError::CardNumberTooShort);
        }

        let expiry = self.expiry.trim();
        if !is_valid_expiry(expiry) {
            return Err(ValidationError::InvalidExpiry);
        }

        let cvv = self.cvv.trim();
        if !(3..=4).contains(&cvv.len()) || !cvv.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidCvv);
        }

        Ok(ValidCard {
            owner_id: self.owner_id.trim().to_string(),
            cardholder_name: self.cardholder_name.trim().to_string(),
            last4: digits[digits.len() - 4..].to_string(),
            brand: CardBrand::from_number(&digits),
            expiry: expiry.to_string(),
        })
    }
}

fn is_valid_expiry(expiry: &str) -> bool {
    let Some((month, year)) = expiry.split_once('/') else {
        return false;
    };
    let two_digits = |part: &str| part.len() == 2 && part.chars().all(|c| c.is_ascii_digit());
    if !two_digits(month) || !two_digits(year) {
        return false;
    }
    matches!(month.parse::<u8>(), Ok(1..=12))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(number: &str) -> CardDetails {
        CardDetails::new("user123", "John Doe", number, "12/27", "123")
    }

    #[test]
    fn visa_with_spaces() {
        let valid = card("4111 1111 1111 1111").validate().unwrap();
        assert_eq!(valid.brand, CardBrand::Visa);
        assert_eq!(valid.last4, "1111");
    }

    #[test]
    fn brand_from_prefix() {
        assert_eq!(CardBrand::from_number("5500000000000004"), CardBrand::Mastercard);
        assert_eq!(CardBrand::from_number("2221000000000009"), CardBrand::Mastercard);
        assert_eq!(CardBrand::from_number("3782822463100050"), CardBrand::Amex);
        assert_eq!(CardBrand::from_number("6011000990139424"), CardBrand::Discover);
        assert_eq!(CardBrand::from_number("9999000000000000"), CardBrand::Visa);
    }

    #[test]
    fn dashes_are_stripped() {
        let valid = card("5555-5555-5555-4444").validate().unwrap();
        assert_eq!(valid.brand, CardBrand::Mastercard);
        assert_eq!(valid.last4, "4444");
    }

    #[test]
    fn short_number_rejected() {
        assert_eq!(
            card("4111 1111 1111 111").validate(),
            Err(ValidationError::CardNumberTooShort)
        );
    }

    #[test]
    fn letters_rejected() {
        assert_eq!(
            card("4111 1111 1111 11a1").validate(),
            Err(ValidationError::CardNumberNotNumeric)
        );
    }

    #[test]
    fn missing_fields_named() {
        let mut details = card("4111111111111111");
        details.cardholder_name = "  ".into();
        assert_eq!(
            details.validate(),
            Err(ValidationError::MissingCardField("cardholder_name"))
        );
    }

    #[test]
    fn expiry_and_cvv_checked() {
        let mut details = card("4111111111111111");
        details.expiry = "13/27".into();
        assert_eq!(details.validate(), Err(ValidationError::InvalidExpiry));
        details.expiry = "1/27".into();
        assert_eq!(details.validate(), Err(ValidationError::InvalidExpiry));

        details.expiry = "01/27".into();
        details.cvv = "12".into();
        assert_eq!(details.validate(), Err(ValidationError::InvalidCvv));
        details.cvv = "1234".into();
        assert!(details.validate().is_ok());
    }
}

//! Checkout form and placed-order summary.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use boutique_core::{CartState, Email, FieldErrors, is_phone};

/// Longest order note accepted at checkout.
pub const MAX_NOTE_CHARS: usize = 500;

/// Raw checkout form submission.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub note: String,
}

/// Validated contact and delivery details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub note: Option<String>,
}

impl CheckoutForm {
    /// Validate every field, collecting one message per failing field.
    ///
    /// # Errors
    ///
    /// Returns the per-field messages when any field is invalid.
    pub fn validate(&self) -> Result<ContactDetails, FieldErrors> {
        let mut errors = FieldErrors::new();

        let full_name = self.full_name.trim();
        errors.check(full_name.is_empty(), "full_name", "Please enter your full name");

        let email = match Email::parse(&self.email) {
            Ok(email) => Some(email),
            Err(e) => {
                errors.add("email", e.to_string());
                None
            }
        };

        let phone = self.phone.trim();
        if phone.is_empty() {
            errors.add("phone", "Please enter a phone number");
        } else {
            errors.check(
                !is_phone(phone),
                "phone",
                "Phone numbers need 8 to 15 digits",
            );
        }

        let address = self.address.trim();
        errors.check(address.is_empty(), "address", "Please enter a delivery address");

        let note = self.note.trim();
        errors.check(
            note.chars().count() > MAX_NOTE_CHARS,
            "note",
            "Notes are limited to 500 characters",
        );

        match email {
            Some(email) if errors.is_empty() => Ok(ContactDetails {
                full_name: full_name.to_string(),
                email: email.into_inner(),
                phone: phone.to_string(),
                address: address.to_string(),
                note: (!note.is_empty()).then(|| note.to_string()),
            }),
            _ => Err(errors),
        }
    }
}

/// One purchased line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedLine {
    pub name: String,
    pub variant: Option<String>,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// Summary of a placed order, kept in the session for the confirmation page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedOrder {
    pub number: String,
    pub placed_at: DateTime<Utc>,
    pub contact: ContactDetails,
    pub lines: Vec<PlacedLine>,
    pub total: Decimal,
}

impl PlacedOrder {
    /// Build an order from the selected cart lines.
    ///
    /// Returns `None` when nothing is selected.
    #[must_use]
    pub fn from_selection(cart: &CartState, contact: ContactDetails) -> Option<Self> {
        if !cart.has_selection() {
            return None;
        }
        let lines: Vec<PlacedLine> = cart
            .selected_items()
            .map(|item| PlacedLine {
                name: item.name.clone(),
                variant: item.variant.label(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                line_total: item.line_total(),
            })
            .collect();
        let placed_at = Utc::now();

        Some(Self {
            number: order_number(placed_at),
            placed_at,
            contact,
            lines,
            total: cart.selected_total(),
        })
    }

    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

/// `BQ-<date>-<6 hex>`, e.g. `BQ-20261018-4F1A9C`.
fn order_number(placed_at: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "BQ-{}-{}",
        placed_at.format("%Y%m%d"),
        suffix.get(..6).unwrap_or(&suffix).to_uppercase()
    )
}

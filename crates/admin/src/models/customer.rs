//! Customer records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use boutique_core::CustomerId;

/// A registered shop customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub city: String,
    pub joined_on: NaiveDate,
    pub accepts_marketing: bool,
}

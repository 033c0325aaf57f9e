use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sweetshop_shared::{PartnerStatus, PARTNER_CODE_MAX, PARTNER_CODE_MIN, PARTNER_CODE_PREFIX};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct DeliveryPartner {
    pub id: Uuid,
    pub name: String,
    /// Login credential handed to the partner out of band, e.g. `DP-40721`
    pub code: String,
    pub mobile: String,
    pub status: PartnerStatus,
    pub created_at: DateTime<Utc>,
}

impl DeliveryPartner {
    pub fn new(name: String, mobile: String, code: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            code,
            mobile,
            status: PartnerStatus::Active,
            created_at: Utc::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == PartnerStatus::Active
    }

    /// Draw a candidate partner code. Uniqueness is enforced by the store.
    pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> String {
        let number = rng.gen_range(PARTNER_CODE_MIN..=PARTNER_CODE_MAX);
        format!("{}{}", PARTNER_CODE_PREFIX, number)
    }

    /// Credentials match exactly and case-sensitively
    pub fn matches_credentials(&self, name: &str, code: &str) -> bool {
        self.name == name && self.code == code
    }
}

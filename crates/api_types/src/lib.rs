use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    #[default]
    Aud,
}

pub mod profile {
    use super::*;

    /// Request body for creating a fundraising profile.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProfileNew {
        pub name: String,
        /// Raw currency code; validated server side against the currency
        /// table so unknown codes get a descriptive error.
        pub currency: String,
        /// Parent profile id. Defaults to the campaign profile.
        pub parent_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProfileView {
        pub id: Uuid,
        pub name: String,
        pub currency: Currency,
        /// `None` marks the root campaign profile.
        pub parent_id: Option<Uuid>,
        /// Amount raised so far, in minor units of `currency`.
        pub total_minor: i64,
    }
}

pub mod donation {
    use super::*;

    /// Request body for donating to a profile.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct DonationNew {
        pub donor_name: String,
        /// Must be > 0, in minor units of `currency`.
        pub amount_minor: i64,
        /// Raw currency code; validated server side against the currency
        /// table so unknown codes get a descriptive error.
        pub currency: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DonationCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DonationView {
        pub id: Uuid,
        pub donor_name: String,
        pub amount_minor: i64,
        pub currency: Currency,
        pub profile_id: Uuid,
        /// RFC3339 timestamp (UTC), set when the donation was accepted.
        pub created_at: DateTime<Utc>,
    }
}

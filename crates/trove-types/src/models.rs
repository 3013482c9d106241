use std::fmt;

use serde::{Deserialize, Serialize};

/// Offer lifecycle. `Pending` is the only state that permits a transition;
/// the other three are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferStatus {
    Pending,
    Accepted,
    Rejected,
    Withdrawn,
}

impl OfferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferStatus::Pending => "pending",
            OfferStatus::Accepted => "accepted",
            OfferStatus::Rejected => "rejected",
            OfferStatus::Withdrawn => "withdrawn",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OfferStatus::Pending),
            "accepted" => Some(OfferStatus::Accepted),
            "rejected" => Some(OfferStatus::Rejected),
            "withdrawn" => Some(OfferStatus::Withdrawn),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, OfferStatus::Pending)
    }
}

impl fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Product categories offered by the listing form.
pub const CATEGORIES: &[&str] = &[
    "Electronics",
    "Clothing",
    "Furniture",
    "Books",
    "Sports",
    "Home & Garden",
    "Toys",
    "Other",
];

/// Average rating plus the number of reviews behind it. A `count` of zero
/// means "no rating yet"; the average is 0.0 in that case, never null, so
/// callers must check `count` before rendering stars.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RatingSummary {
    pub average: f64,
    pub count: u32,
}

impl RatingSummary {
    pub fn none() -> Self {
        Self { average: 0.0, count: 0 }
    }
}

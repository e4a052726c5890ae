use serde::{Deserialize, Serialize};

use crate::domain::profile::{Horizon, InvestmentProfile, Preference, RiskTolerance};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub i64);

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One financial product document as stored in the index.
///
/// Created offline by the ingestion pipeline and immutable for the duration
/// of any advisory session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub name: String,
    /// The product's own investment threshold. A product fits a customer
    /// when this does not exceed what the customer is willing to invest.
    pub min_amount: u64,
    pub horizon: Horizon,
    pub risk: RiskTolerance,
    /// Present only in some schema variants of the product sheet.
    pub cost: Option<Preference>,
    pub sustainable: bool,
    /// Path of the original product information sheet, used for download
    /// delivery. Relative to the configured documents directory.
    pub source_file: String,
}

/// Conjunctive metadata predicate evaluated against the product index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductFilter {
    /// Upper bound for the product's `min_amount` (the customer's amount).
    pub amount: u64,
    pub horizon: Horizon,
    pub risk: RiskTolerance,
    /// Only constrains candidates when the profile carries a cost preference.
    pub cost: Option<Preference>,
}

impl ProductFilter {
    pub fn from_profile(profile: &InvestmentProfile) -> Self {
        Self {
            amount: profile.amount,
            horizon: profile.horizon,
            risk: profile.risk,
            cost: profile.cost_acceptance,
        }
    }

    /// Reference semantics of the filter, shared by every index backend.
    pub fn matches(&self, product: &ProductRecord) -> bool {
        if product.min_amount > self.amount {
            return false;
        }
        if product.horizon != self.horizon || product.risk != self.risk {
            return false;
        }
        match self.cost {
            Some(cost) => product.cost == Some(cost),
            None => true,
        }
    }
}

/// One retrievable text chunk belonging to a single product document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductChunk {
    pub product_id: ProductId,
    pub seq: u32,
    pub content: String,
}

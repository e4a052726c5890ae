//! Demonstration product catalog.
//!
//! A small set of products covering each horizon and risk band, used by the
//! `seed` command and by end-to-end tests. Each entry mirrors what the
//! offline ingestion pipeline would produce from a real factsheet: metadata
//! for filtering plus the factsheet text split into chunks.

use advisor_core::domain::product::{ProductId, ProductRecord};
use advisor_core::domain::profile::{Horizon, Preference, RiskTolerance};

use crate::repositories::{DocumentIndex, IndexError};

pub struct DemoCatalog;

struct DemoProduct {
    record: ProductRecord,
    chunks: &'static [&'static str],
}

fn demo_products() -> Vec<DemoProduct> {
    vec![
        DemoProduct {
            record: ProductRecord {
                id: ProductId(10_400_552),
                name: "Daily Deposit Account".to_string(),
                min_amount: 0,
                horizon: Horizon::ShortTerm,
                risk: RiskTolerance::NoRisk,
                cost: Some(Preference::No),
                sustainable: false,
                source_file: "daily_deposit_account.pdf".to_string(),
            },
            chunks: &[
                "The Daily Deposit Account is a call money account with no \
                 minimum investment and daily availability. Deposits are \
                 covered by the statutory deposit guarantee scheme.",
                "There are no account management fees and no custody costs. \
                 Interest is credited quarterly at a variable rate.",
            ],
        },
        DemoProduct {
            record: ProductRecord {
                id: ProductId(10_400_553),
                name: "Green Savings Deposit".to_string(),
                min_amount: 500,
                horizon: Horizon::ShortTerm,
                risk: RiskTolerance::NoRisk,
                cost: Some(Preference::No),
                sustainable: true,
                source_file: "green_savings_deposit.pdf".to_string(),
            },
            chunks: &[
                "The Green Savings Deposit channels customer deposits into \
                 refinancing loans for renewable energy and energy-efficient \
                 housing. The minimum deposit is 500 euros.",
                "The deposit is free of fees. Funds are available with a \
                 notice period of three months.",
            ],
        },
        DemoProduct {
            record: ProductRecord {
                id: ProductId(10_400_554),
                name: "Balanced Portfolio Fund".to_string(),
                min_amount: 2_500,
                horizon: Horizon::MediumTerm,
                risk: RiskTolerance::MediumRisk,
                cost: Some(Preference::Yes),
                sustainable: false,
                source_file: "balanced_portfolio_fund.pdf".to_string(),
            },
            chunks: &[
                "The Balanced Portfolio Fund invests roughly half in global \
                 equities and half in investment-grade bonds. The recommended \
                 holding period is three to seven years.",
                "The fund charges an ongoing fee of 1.2 percent per year plus \
                 a one-off front-end load of 2 percent.",
                "The value of the fund fluctuates with the markets. Interim \
                 losses of 10 to 20 percent are possible.",
            ],
        },
        DemoProduct {
            record: ProductRecord {
                id: ProductId(10_400_555),
                name: "Sustainable Balanced Fund".to_string(),
                min_amount: 2_500,
                horizon: Horizon::MediumTerm,
                risk: RiskTolerance::MediumRisk,
                cost: Some(Preference::Yes),
                sustainable: true,
                source_file: "sustainable_balanced_fund.pdf".to_string(),
            },
            chunks: &[
                "The Sustainable Balanced Fund applies a strict \
                 environmental, social and governance screen to its equity \
                 and bond universe. Issuers active in coal, weapons or \
                 tobacco are excluded.",
                "The fund charges an ongoing fee of 1.4 percent per year. \
                 The minimum investment is 2,500 euros.",
            ],
        },
        DemoProduct {
            record: ProductRecord {
                id: ProductId(10_400_556),
                name: "Global Equity Opportunities".to_string(),
                min_amount: 10_000,
                horizon: Horizon::LongTerm,
                risk: RiskTolerance::HighRisk,
                cost: Some(Preference::Yes),
                sustainable: false,
                source_file: "global_equity_opportunities.pdf".to_string(),
            },
            chunks: &[
                "Global Equity Opportunities is a concentrated equity fund \
                 holding 30 to 40 growth companies worldwide. The recommended \
                 holding period is at least eight years.",
                "The fund is suitable only for investors who can tolerate \
                 pronounced price swings, including interim losses of more \
                 than 40 percent.",
                "The ongoing fee is 1.8 percent per year plus a performance \
                 fee of 10 percent above the benchmark.",
            ],
        },
    ]
}

impl DemoCatalog {
    /// Number of products the catalog seeds.
    pub fn product_count() -> usize {
        demo_products().len()
    }

    /// Writes every demo product and its chunks into the index. Idempotent:
    /// re-running replaces earlier copies.
    pub async fn load(index: &dyn DocumentIndex) -> Result<(), IndexError> {
        for demo in demo_products() {
            let chunks: Vec<String> = demo.chunks.iter().map(|chunk| chunk.to_string()).collect();
            index.upsert_product(&demo.record, &chunks).await?;
        }
        Ok(())
    }

    /// Confirms every demo product is present with at least one chunk.
    /// Returns the ids that failed the check.
    pub async fn verify(index: &dyn DocumentIndex) -> Result<Vec<ProductId>, IndexError> {
        let mut missing = Vec::new();
        for demo in demo_products() {
            let id = demo.record.id;
            let present = index.find_by_id(id).await?.is_some();
            let has_chunks = !index.chunks_for_product(id).await?.is_empty();
            if !present || !has_chunks {
                missing.push(id);
            }
        }
        Ok(missing)
    }
}

#[cfg(test)]
mod tests {
    use advisor_core::domain::product::ProductFilter;
    use advisor_core::domain::profile::{Horizon, RiskTolerance};

    use super::DemoCatalog;
    use crate::repositories::{DocumentIndex, InMemoryDocumentIndex};

    #[tokio::test]
    async fn demo_catalog_loads_and_verifies() {
        let index = InMemoryDocumentIndex::new();
        DemoCatalog::load(&index).await.expect("load");

        let missing = DemoCatalog::verify(&index).await.expect("verify");
        assert!(missing.is_empty(), "unverified products: {missing:?}");
    }

    #[tokio::test]
    async fn demo_catalog_covers_the_cautious_saver() {
        let index = InMemoryDocumentIndex::new();
        DemoCatalog::load(&index).await.expect("load");

        let filter = ProductFilter {
            amount: 4_000,
            horizon: Horizon::ShortTerm,
            risk: RiskTolerance::NoRisk,
            cost: None,
        };
        let candidates = index.find_matching(&filter).await.expect("query");
        assert_eq!(candidates.len(), 2);
        assert!(candidates.iter().any(|candidate| candidate.sustainable));
    }
}

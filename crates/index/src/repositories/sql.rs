use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row};

use advisor_core::domain::product::{ProductChunk, ProductFilter, ProductId, ProductRecord};
use advisor_core::domain::profile::{Horizon, Preference, RiskTolerance};

use super::{DocumentIndex, IndexError};
use crate::DbPool;

pub struct SqlDocumentIndex {
    pool: DbPool,
}

impl SqlDocumentIndex {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn decode_product(row: &SqliteRow) -> Result<ProductRecord, IndexError> {
    let horizon: String = row.get("horizon");
    let risk: String = row.get("risk");
    let cost: Option<String> = row.get("cost");
    let min_amount: i64 = row.get("min_amount");

    Ok(ProductRecord {
        id: ProductId(row.get("id")),
        name: row.get("name"),
        min_amount: u64::try_from(min_amount)
            .map_err(|_| IndexError::Decode(format!("negative min_amount: {min_amount}")))?,
        horizon: horizon
            .parse::<Horizon>()
            .map_err(|error| IndexError::Decode(error.to_string()))?,
        risk: risk
            .parse::<RiskTolerance>()
            .map_err(|error| IndexError::Decode(error.to_string()))?,
        cost: cost
            .map(|value| value.parse::<Preference>())
            .transpose()
            .map_err(|error| IndexError::Decode(error.to_string()))?,
        sustainable: row.get::<i64, _>("sustainable") != 0,
        source_file: row.get("source_file"),
    })
}

#[async_trait]
impl DocumentIndex for SqlDocumentIndex {
    async fn find_matching(
        &self,
        filter: &ProductFilter,
    ) -> Result<Vec<ProductRecord>, IndexError> {
        let mut builder = QueryBuilder::new(
            "SELECT id, name, min_amount, horizon, risk, cost, sustainable, source_file \
             FROM product WHERE min_amount <= ",
        );
        builder.push_bind(filter.amount as i64);
        builder.push(" AND horizon = ");
        builder.push_bind(filter.horizon.as_str());
        builder.push(" AND risk = ");
        builder.push_bind(filter.risk.as_str());
        if let Some(cost) = filter.cost {
            builder.push(" AND cost = ");
            builder.push_bind(cost.as_str());
        }
        builder.push(" ORDER BY id");

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(decode_product).collect()
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<ProductRecord>, IndexError> {
        let row = sqlx::query(
            "SELECT id, name, min_amount, horizon, risk, cost, sustainable, source_file \
             FROM product WHERE id = ?1",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(decode_product).transpose()
    }

    async fn chunks_for_product(&self, id: ProductId) -> Result<Vec<ProductChunk>, IndexError> {
        let rows = sqlx::query(
            "SELECT product_id, seq, content FROM product_chunk \
             WHERE product_id = ?1 ORDER BY seq",
        )
        .bind(id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let seq: i64 = row.get("seq");
                Ok(ProductChunk {
                    product_id: ProductId(row.get("product_id")),
                    seq: u32::try_from(seq)
                        .map_err(|_| IndexError::Decode(format!("negative chunk seq: {seq}")))?,
                    content: row.get("content"),
                })
            })
            .collect()
    }

    async fn upsert_product(
        &self,
        product: &ProductRecord,
        chunks: &[String],
    ) -> Result<(), IndexError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO product (id, name, min_amount, horizon, risk, cost, sustainable, source_file) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) \
             ON CONFLICT (id) DO UPDATE SET \
                 name = excluded.name, \
                 min_amount = excluded.min_amount, \
                 horizon = excluded.horizon, \
                 risk = excluded.risk, \
                 cost = excluded.cost, \
                 sustainable = excluded.sustainable, \
                 source_file = excluded.source_file",
        )
        .bind(product.id.0)
        .bind(&product.name)
        .bind(product.min_amount as i64)
        .bind(product.horizon.as_str())
        .bind(product.risk.as_str())
        .bind(product.cost.map(|cost| cost.as_str()))
        .bind(i64::from(product.sustainable))
        .bind(&product.source_file)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM product_chunk WHERE product_id = ?1")
            .bind(product.id.0)
            .execute(&mut *tx)
            .await?;

        for (seq, content) in chunks.iter().enumerate() {
            sqlx::query(
                "INSERT INTO product_chunk (product_id, seq, content) VALUES (?1, ?2, ?3)",
            )
            .bind(product.id.0)
            .bind(seq as i64)
            .bind(content)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use advisor_core::domain::product::{ProductFilter, ProductId, ProductRecord};
    use advisor_core::domain::profile::{Horizon, Preference, RiskTolerance};

    use crate::repositories::{DocumentIndex, SqlDocumentIndex};
    use crate::{connect_with_settings, migrations};

    async fn seeded_index() -> SqlDocumentIndex {
        // A single connection keeps the in-memory database alive for the test.
        let pool = connect_with_settings("sqlite::memory:", 1, 5)
            .await
            .expect("pool should connect");
        migrations::run_pending(&pool).await.expect("migrations should apply");

        let index = SqlDocumentIndex::new(pool);
        for product in [
            ProductRecord {
                id: ProductId(1),
                name: "Daily Deposit".to_string(),
                min_amount: 0,
                horizon: Horizon::ShortTerm,
                risk: RiskTolerance::NoRisk,
                cost: Some(Preference::No),
                sustainable: false,
                source_file: "daily_deposit.pdf".to_string(),
            },
            ProductRecord {
                id: ProductId(2),
                name: "Green Deposit".to_string(),
                min_amount: 500,
                horizon: Horizon::ShortTerm,
                risk: RiskTolerance::NoRisk,
                cost: Some(Preference::No),
                sustainable: true,
                source_file: "green_deposit.pdf".to_string(),
            },
            ProductRecord {
                id: ProductId(3),
                name: "Equity Opportunities".to_string(),
                min_amount: 10_000,
                horizon: Horizon::LongTerm,
                risk: RiskTolerance::HighRisk,
                cost: Some(Preference::Yes),
                sustainable: false,
                source_file: "equity_opportunities.pdf".to_string(),
            },
        ] {
            index
                .upsert_product(
                    &product,
                    &[
                        format!("{} factsheet, part one.", product.name),
                        format!("{} factsheet, part two.", product.name),
                    ],
                )
                .await
                .expect("seed product");
        }
        index
    }

    #[tokio::test]
    async fn conjunctive_filter_respects_every_predicate() {
        let index = seeded_index().await;

        let filter = ProductFilter {
            amount: 4000,
            horizon: Horizon::ShortTerm,
            risk: RiskTolerance::NoRisk,
            cost: None,
        };
        let candidates = index.find_matching(&filter).await.expect("query");
        assert_eq!(
            candidates.iter().map(|candidate| candidate.id).collect::<Vec<_>>(),
            vec![ProductId(1), ProductId(2)]
        );

        // The product's own minimum must not exceed the customer amount.
        let small = ProductFilter { amount: 100, ..filter };
        let candidates = index.find_matching(&small).await.expect("query");
        assert_eq!(
            candidates.iter().map(|candidate| candidate.id).collect::<Vec<_>>(),
            vec![ProductId(1)]
        );

        let cost_sensitive = ProductFilter { cost: Some(Preference::Yes), ..filter };
        let candidates = index.find_matching(&cost_sensitive).await.expect("query");
        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn chunks_are_scoped_to_one_product() {
        let index = seeded_index().await;

        let chunks = index.chunks_for_product(ProductId(2)).await.expect("chunks");
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|chunk| chunk.product_id == ProductId(2)));
        assert_eq!(chunks[0].seq, 0);
        assert_eq!(chunks[1].seq, 1);
    }

    #[tokio::test]
    async fn upsert_replaces_metadata_and_chunks() {
        let index = seeded_index().await;

        let updated = ProductRecord {
            id: ProductId(1),
            name: "Daily Deposit Plus".to_string(),
            min_amount: 1000,
            horizon: Horizon::ShortTerm,
            risk: RiskTolerance::NoRisk,
            cost: Some(Preference::No),
            sustainable: true,
            source_file: "daily_deposit_plus.pdf".to_string(),
        };
        index
            .upsert_product(&updated, &["Only one chunk now.".to_string()])
            .await
            .expect("upsert");

        let found = index.find_by_id(ProductId(1)).await.expect("query").expect("present");
        assert_eq!(found, updated);

        let chunks = index.chunks_for_product(ProductId(1)).await.expect("chunks");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "Only one chunk now.");
    }
}

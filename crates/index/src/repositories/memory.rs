use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use advisor_core::domain::product::{ProductChunk, ProductFilter, ProductId, ProductRecord};

use super::{DocumentIndex, IndexError};

/// Index kept entirely in process memory. Used by tests and by the demo
/// commands that should not touch a database file.
///
/// A `BTreeMap` keyed by product id gives the same stable ordering the
/// SQL index produces with `ORDER BY id`.
#[derive(Default)]
pub struct InMemoryDocumentIndex {
    products: RwLock<BTreeMap<i64, (ProductRecord, Vec<ProductChunk>)>>,
}

impl InMemoryDocumentIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentIndex for InMemoryDocumentIndex {
    async fn find_matching(
        &self,
        filter: &ProductFilter,
    ) -> Result<Vec<ProductRecord>, IndexError> {
        let products = self.products.read().await;
        Ok(products
            .values()
            .filter(|(product, _)| filter.matches(product))
            .map(|(product, _)| product.clone())
            .collect())
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<ProductRecord>, IndexError> {
        let products = self.products.read().await;
        Ok(products.get(&id.0).map(|(product, _)| product.clone()))
    }

    async fn chunks_for_product(&self, id: ProductId) -> Result<Vec<ProductChunk>, IndexError> {
        let products = self.products.read().await;
        Ok(products.get(&id.0).map(|(_, chunks)| chunks.clone()).unwrap_or_default())
    }

    async fn upsert_product(
        &self,
        product: &ProductRecord,
        chunks: &[String],
    ) -> Result<(), IndexError> {
        let stored_chunks = chunks
            .iter()
            .enumerate()
            .map(|(seq, content)| ProductChunk {
                product_id: product.id,
                seq: seq as u32,
                content: content.clone(),
            })
            .collect();
        let mut products = self.products.write().await;
        products.insert(product.id.0, (product.clone(), stored_chunks));
        Ok(())
    }
}

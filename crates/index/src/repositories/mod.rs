use async_trait::async_trait;
use thiserror::Error;

use advisor_core::domain::product::{ProductChunk, ProductFilter, ProductId, ProductRecord};

pub mod memory;
pub mod sql;

pub use memory::InMemoryDocumentIndex;
pub use sql::SqlDocumentIndex;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// The document index seen by the advisory workflow: a metadata-filtered
/// store of product documents and their text chunks.
///
/// Advisory sessions only read; writes happen through the offline ingestion
/// path (`upsert_product`). Implementations must be safe for concurrent use
/// by many sessions.
#[async_trait]
pub trait DocumentIndex: Send + Sync {
    /// Returns every product satisfying the conjunctive filter, in stable
    /// index order. All candidates are needed because a secondary
    /// preference is applied after the hard filter.
    async fn find_matching(&self, filter: &ProductFilter)
        -> Result<Vec<ProductRecord>, IndexError>;

    async fn find_by_id(&self, id: ProductId) -> Result<Option<ProductRecord>, IndexError>;

    /// Text chunks scoped to exactly one product, in document order.
    async fn chunks_for_product(&self, id: ProductId) -> Result<Vec<ProductChunk>, IndexError>;

    /// Ingestion entry point: stores the product metadata and replaces its
    /// chunk set.
    async fn upsert_product(
        &self,
        product: &ProductRecord,
        chunks: &[String],
    ) -> Result<(), IndexError>;
}

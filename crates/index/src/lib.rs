//! Product document index: SQLite-backed storage of product metadata and
//! factsheet chunks, behind the [`repositories::DocumentIndex`] trait.

pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;

pub use connection::{connect, connect_with_settings, DbPool};
pub use fixtures::DemoCatalog;
pub use repositories::{DocumentIndex, InMemoryDocumentIndex, IndexError, SqlDocumentIndex};

//! Loading and cleaning of raw quote files

pub mod canonicalize;
pub mod dates;
pub mod headers;
pub mod ingest;
pub mod schema;
pub mod table;
pub mod text;

pub use canonicalize::Canonicalizer;
pub use dates::{DateColumnOutcome, DateLayout, DateNormalization, DateNormalizer, DateParsePolicy};
pub use headers::{canonical_name, normalize_headers};
pub use ingest::{DataError, DataIngestor};
pub use schema::{QuoteSchema, SchemaError};
pub use table::{ColumnKind, Snapshot};
pub use text::{normalize_text, NullTokens, NULL_MARKER};

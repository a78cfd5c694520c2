//! Bulk CSV ingestion for the Ranger observation store.
//!
//! Pipeline, per row of the spreadsheet export:
//!   csv::StringRecord
//!     └─ width check              → MalformedRow on under-width rows
//!          └─ ReferenceCache       → resolve site/species, create on miss
//!               └─ row parsers     → typed NewSite / NewSpecies / NewObservation
//!                    └─ batch      → bulk insert every BATCH_SIZE rows
//!
//! Ingestion is strictly fail-fast: the first error aborts the run, enriched
//! with its 1-based row index and phase. Already-flushed batches are not
//! rolled back — a partial import survives a failed run, and re-running after
//! a fix may duplicate fact rows. Best-effort, not atomic.

pub mod cache;
pub mod error;
pub mod importer;
pub mod row;

pub use error::{FieldError, ImportError, Phase};
pub use importer::{import_file, import_reader, ImportOptions, BATCH_SIZE};

#[cfg(test)]
mod tests;

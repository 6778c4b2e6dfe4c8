//! Business logic services for supply-chain traceability.
//!
//! Services orchestrate repositories and handle business rules,
//! resolved from the [`Context`](crate::context::Context) via `FromRef`.

mod catalog;
mod lineage;
mod validation;

pub use catalog::{CatalogService, TransferFilter};
pub use lineage::LineageService;
pub use validation::{IssueKind, ValidationIssue, ValidationReport, ValidationService};

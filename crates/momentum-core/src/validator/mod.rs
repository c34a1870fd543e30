//! Structural validation of AI-generated plans.
//!
//! A model response is fence-stripped, parsed into a `serde_json::Value`,
//! and walked against a declarative [`Schema`]. The result is a
//! [`CompletenessReport`] with a [`RecoveryStrategy`]; nothing here
//! returns an error, callers branch on the report.

mod fences;
mod report;
mod schema;
mod walk;

pub use fences::strip_code_fences;
pub use report::{CompletenessReport, RecoveryStrategy, PARSE_FAILURE_FIELD};
pub use schema::{FieldSpec, Schema, SchemaNode};
pub use walk::{apply_defaults, parse_and_validate, validate_response, validate_value};

pub mod submission;

pub use submission::{FieldSet, SchemaError, SubmissionPayload};

//! Extractors whose rejections use the shared error envelope.

pub mod json;
pub mod query;
pub mod uuid_path;
pub mod validated_json;

pub use json::AppJson;
pub use query::AppQuery;
pub use uuid_path::UuidPath;
pub use validated_json::ValidatedJson;

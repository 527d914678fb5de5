use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;

/// A cheaply cloneable, immutable string.
pub type ArcStr = Arc<str>;

/// A cheaply cloneable, immutable filesystem path.
pub type ArcPath = Arc<Path>;

/// A cheaply cloneable, immutable OS string, used for environment variable names.
pub type ArcOsStr = Arc<OsStr>;

/// A cheaply cloneable, immutable slice.
pub type ArcSlice<T> = Arc<[T]>;

/// A shared handle to an open file. The lock serializes writers.
pub type ArcFile = Arc<tokio::sync::RwLock<tokio::fs::File>>;

/// The unique identifier of an issue in the tracker.
pub type IssueId = u64;

/// The string identifier of a tracked issue field (e.g. "summary").
pub type FieldId = ArcStr;

/// An opaque field value as reported by the tracker.
pub type FieldValue = serde_json::Value;

/// The field values of one issue, keyed by field identifier.
pub type FieldValues = HashMap<FieldId, FieldValue>;

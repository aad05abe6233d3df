pub mod error;
pub mod record;
pub mod structure;

pub use error::{ImportError, Result};
pub use record::{FieldValue, RawTable, Record, Records};
pub use structure::{ColumnRef, FieldSpec, FieldType, StructureDescriptor};

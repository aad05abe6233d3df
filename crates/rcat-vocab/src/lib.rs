pub mod binder;
pub mod store;

pub use binder::{BindReport, bind};
pub use store::{Vocabulary, VocabularyStore};

pub mod core;
pub mod loader;
pub mod selector;

// Re-export the main types for convenience
pub use core::{BinLabel, Catalog, CatalogItem};
pub use loader::{CatalogSource, EmbeddedCatalog, FileCatalog};
pub use selector::{NoRepeatPicker, RoundPicker, SequencePicker};

//! Loading of externally produced symbol indexes

pub mod loader;
pub mod model;
pub mod warnings;

pub use loader::{load_index, load_index_reader, load_index_str, IndexData};
pub use model::{
    module_is_under, module_path_for, File, Occurrence, Range, Relationship, RelationshipKind,
    SymbolInformation, SymbolRoles,
};
pub use warnings::{LoadReport, LoadWarning, WarningCollector, WarningStage};

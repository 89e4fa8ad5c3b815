//! Editable, column-reorderable table state and its save contract

mod column;
mod filter;
mod pagination;
mod save;
mod state;

pub use column::ColumnBehavior;
pub use column::ColumnDef;
pub use column::FieldBehavior;
pub use column::PathBehavior;
pub use filter::FilterSet;
pub use pagination::*;
pub use save::*;
pub use state::*;

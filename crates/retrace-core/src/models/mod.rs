pub mod collection;
pub mod edge;
pub mod tuple;
pub mod window;

pub use collection::{CollectionKind, CollectionSpec, ColumnSpec, LineageSpec, SqlType};
pub use edge::LineageEdge;
pub use tuple::{TupleId, TupleRow, Value};
pub use window::ValidityWindow;

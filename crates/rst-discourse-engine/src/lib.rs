pub mod io;
pub mod models;
pub mod parsing;

// Re-export key types for easier usage
pub use io::{DocumentLoadResult, IoError, LoadError};
pub use models::{
    Document, DocumentMeta, Group, Node, NodeId, NodeKind, Relation, RelationKind,
    RelationRegistry, Segment, Signal,
};
pub use parsing::{BuildError, ParseError, ReadError, Rs3Records};

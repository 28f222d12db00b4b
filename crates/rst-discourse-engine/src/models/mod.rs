pub mod document;
pub mod node;
pub mod relation;
pub mod signal;

pub use document::{Document, DocumentMeta};
pub use node::{Group, Node, NodeId, NodeKind, Segment};
pub use relation::{
    Relation, RelationKind, RelationRegistry, MULTINUCLEAR_RELATIONS, SAME_UNIT_RELATION,
    SPAN_RELATION,
};
pub use signal::Signal;

//! The sequential document pipeline: RS3 XML → structural records → linked
//! tree → sentence/token assignment → intra-sentential classification.

pub mod builder;
pub mod classify;
pub mod reader;
pub(crate) mod sentence;

use thiserror::Error;

pub use builder::{build, BuildError};
pub use classify::is_intra_sentential;
pub use reader::{
    read_rs3, GroupRecord, ReadError, RelationRecord, Rs3Records, SegmentRecord, SignalRecord,
};

/// Any failure turning raw RS3 XML into a document.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error(transparent)]
    Build(#[from] BuildError),
}

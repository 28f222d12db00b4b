use serde::Serialize;

use super::node::NodeId;

/// An annotated discourse cue anchored to a token span.
///
/// Token IDs reference the document's global token numbering; resolving them
/// to token strings goes through the document's `signal_tokens`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Signal {
    /// Input index of the signal within the document (0-based).
    pub id: usize,
    /// ID of the node this signal is attached to.
    pub source: NodeId,
    /// RS3 `type` attribute (e.g. "dm", "syntactic").
    pub signal_type: String,
    /// RS3 `subtype` attribute.
    pub subtype: String,
    /// Global token IDs covered by the cue, as listed in the file.
    pub token_ids: Vec<u32>,
}

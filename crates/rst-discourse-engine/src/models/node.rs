use serde::Serialize;

use super::relation::MULTINUCLEAR_RELATIONS;

/// Identifier of a node within one document.
///
/// Segments and groups share a single ID space; the RS3 file assigns them.
pub type NodeId = u32;

/// Sort key for a group with no descendant segments.
///
/// Such groups carry no text and sort after every real segment.
pub(crate) const NO_ORDER: usize = usize::MAX;

/// A leaf discourse unit carrying literal text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    /// Raw trimmed text of the segment.
    pub text: String,
    /// 1-based sentence number, assigned by the sentence pass.
    pub sentence_id: u32,
    /// 1-based global ID of the segment's first token.
    pub initial_token_id: u32,
}

/// An internal discourse unit aggregating children under a relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    /// Free-form RS3 `type` attribute (e.g. "span", "multinuc");
    /// not interpreted by the engine.
    pub group_type: String,
}

/// Variant payload of a tree node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    Segment(Segment),
    Group(Group),
}

/// One node of the discourse tree.
///
/// Nodes live in the document's arena; `parent` and `children` are ID
/// references into it, never owning pointers, so the parent/child cycle
/// costs nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub id: NodeId,
    /// `None` only for the root.
    pub parent: Option<NodeId>,
    /// Name of the relation connecting this node to its parent, validated
    /// against the document's registry. `None` for the root.
    pub relation: Option<String>,
    /// Child node IDs, sorted by each child's `order`.
    pub children: Vec<NodeId>,
    /// Indices into the document's signal list, in signal input order.
    pub signals: Vec<usize>,
    /// Document-wide reading-order key: a segment's input index, a group's
    /// minimum descendant-segment order (cached after linking).
    pub order: usize,
    pub kind: NodeKind,
}

impl Node {
    pub fn is_segment(&self) -> bool {
        matches!(self.kind, NodeKind::Segment(_))
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group(_))
    }

    pub fn as_segment(&self) -> Option<&Segment> {
        match &self.kind {
            NodeKind::Segment(segment) => Some(segment),
            NodeKind::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match &self.kind {
            NodeKind::Group(group) => Some(group),
            NodeKind::Segment(_) => None,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Whether this node's relation is multinuclear.
    ///
    /// Decided by the fixed corpus name set, not by the header declaration;
    /// a node with no relation (the root) counts as multinuclear.
    pub fn is_multinuclear(&self) -> bool {
        match self.relation.as_deref() {
            Some(name) => MULTINUCLEAR_RELATIONS.contains(&name),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn segment_node(relation: Option<&str>) -> Node {
        Node {
            id: 1,
            parent: Some(2),
            relation: relation.map(str::to_string),
            children: vec![],
            signals: vec![],
            order: 0,
            kind: NodeKind::Segment(Segment {
                text: "text".to_string(),
                sentence_id: 1,
                initial_token_id: 1,
            }),
        }
    }

    #[rstest]
    #[case("sequence", true)]
    #[case("same-unit", true)]
    #[case("list", true)]
    #[case("contrast", true)]
    #[case("joint", true)]
    #[case("other-rel", true)]
    #[case("elaboration", false)]
    #[case("span", false)]
    fn multinuclear_membership(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(segment_node(Some(name)).is_multinuclear(), expected);
    }

    #[test]
    fn missing_relation_is_multinuclear() {
        assert!(segment_node(None).is_multinuclear());
    }

    #[test]
    fn variant_accessors() {
        let node = segment_node(None);
        assert!(node.is_segment());
        assert!(!node.is_group());
        assert_eq!(node.as_segment().unwrap().text, "text");
        assert!(node.as_group().is_none());
    }
}

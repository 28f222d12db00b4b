use crate::models::document::Document;
use crate::models::node::{Node, NodeId};
use crate::models::relation::{SAME_UNIT_RELATION, SPAN_RELATION};

/// Decide whether a node's relation is intra-sentential.
///
/// Rules, in order:
/// 1. No relation, or the structural `"span"` relation: never counted.
/// 2. Multinuclear relation: `"same-unit"` counts only at its leftmost
///    sibling; any other multinuclear node pairs its parent with the next
///    sibling of the same relation (the last sibling has no right neighbor
///    and is not counted).
/// 3. Mononuclear relation: the node is paired with its parent.
/// A pair counts when the segments of both members share one sentence,
/// where a segment member stands for itself and a group member for all
/// its descendant segments.
pub fn is_intra_sentential(doc: &Document, id: NodeId) -> bool {
    let Some(node) = doc.node(id) else {
        return false;
    };
    let Some(relation) = node.relation.as_deref() else {
        return false;
    };
    if relation == SPAN_RELATION {
        return false;
    }

    if node.is_multinuclear() {
        let siblings = siblings_of_same_relation(doc, node);
        if relation == SAME_UNIT_RELATION {
            // A same-unit span is one discourse unit spread over siblings;
            // count it once, at its leftmost member.
            return siblings.first() == Some(&node.id);
        }
        let Some(position) = siblings.iter().position(|&sibling| sibling == node.id) else {
            return false;
        };
        let Some(&right) = siblings.get(position + 1) else {
            return false;
        };
        return spans_one_sentence(doc, [node.parent, Some(right)]);
    }

    spans_one_sentence(doc, [node.parent, Some(node.id)])
}

/// Every node for which [`is_intra_sentential`] holds, in reading order.
pub(crate) fn intra_sentential_nodes(doc: &Document) -> Vec<NodeId> {
    let mut ids: Vec<NodeId> = doc
        .nodes()
        .filter(|node| is_intra_sentential(doc, node.id))
        .map(|node| node.id)
        .collect();
    ids.sort_by_key(|&id| (doc.node(id).map_or(usize::MAX, |node| node.order), id));
    ids
}

/// The parent's children sharing this node's relation name (including the
/// node itself), in child order.
fn siblings_of_same_relation(doc: &Document, node: &Node) -> Vec<NodeId> {
    let Some(parent) = node.parent.and_then(|id| doc.node(id)) else {
        return vec![];
    };
    parent
        .children
        .iter()
        .copied()
        .filter(|&child| {
            doc.node(child)
                .and_then(|sibling| sibling.relation.as_deref())
                == node.relation.as_deref()
        })
        .collect()
}

/// Whether the segments of all given members share one sentence.
///
/// A member that is itself a segment contributes only its own sentence; its
/// satellite children do not pull their sentences in. A group member
/// contributes every descendant segment. Empty and singleton segment sets
/// pass trivially.
fn spans_one_sentence(doc: &Document, members: [Option<NodeId>; 2]) -> bool {
    let mut sentence = None;
    let mut shares = |sentence_id: u32| -> bool {
        match sentence {
            None => {
                sentence = Some(sentence_id);
                true
            }
            Some(seen) => seen == sentence_id,
        }
    };
    for member in members.into_iter().flatten() {
        let Some(node) = doc.node(member) else {
            continue;
        };
        if let Some(segment) = node.as_segment() {
            if !shares(segment.sentence_id) {
                return false;
            }
            continue;
        }
        for descendant in doc.subtree_segments(member) {
            if let Some(segment) = descendant.as_segment()
                && !shares(segment.sentence_id)
            {
                return false;
            }
        }
    }
    true
}

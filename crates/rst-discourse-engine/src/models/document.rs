use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::parsing::{self, classify, BuildError, ParseError, Rs3Records};

use super::node::{Node, NodeId};
use super::relation::{Relation, RelationRegistry};
use super::signal::Signal;

/// Document identity, derived from the file name by the loader.
/// Empty when a document is built straight from XML text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentMeta {
    pub name: String,
    pub code: String,
    pub path: PathBuf,
}

/// A fully analyzed RS3 document.
///
/// Built once by the sequential pipeline (records → tree → sentence/token
/// assignment → intra-sentential classification) and immutable afterwards:
/// every accessor is read-only and the document can be shared freely across
/// threads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub(crate) meta: DocumentMeta,
    pub(crate) relations: RelationRegistry,
    pub(crate) nodes: BTreeMap<NodeId, Node>,
    pub(crate) signals: Vec<Signal>,
    pub(crate) root: NodeId,
    /// Global token ID → token string, numbered from 1 in reading order.
    pub(crate) tokens: BTreeMap<u32, String>,
    /// Nodes with an intra-sentential relation, in reading order.
    pub(crate) intra_sentential: Vec<NodeId>,
}

impl Document {
    /// Build a document from structural records.
    pub fn from_records(records: Rs3Records) -> Result<Self, BuildError> {
        parsing::builder::build(records)
    }

    /// Parse raw RS3 XML text and build a document from it.
    pub fn from_xml(xml: &str) -> Result<Self, ParseError> {
        let records = parsing::read_rs3(xml)?;
        Ok(Self::from_records(records)?)
    }

    /// Attach identity metadata; used by the loader before the document is
    /// handed out.
    pub fn with_meta(mut self, meta: DocumentMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn meta(&self) -> &DocumentMeta {
        &self.meta
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn code(&self) -> &str {
        &self.meta.code
    }

    /// All registered relations, sorted by name.
    pub fn relations(&self) -> impl Iterator<Item = &Relation> {
        self.relations.iter()
    }

    pub fn relation(&self, name: &str) -> Option<&Relation> {
        self.relations.get(name)
    }

    /// All nodes, by ascending ID.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn root(&self) -> &Node {
        &self.nodes[&self.root]
    }

    /// All segments, in reading order.
    pub fn segments(&self) -> Vec<&Node> {
        let mut segments: Vec<&Node> = self.nodes.values().filter(|n| n.is_segment()).collect();
        segments.sort_by_key(|node| node.order);
        segments
    }

    /// All groups, by ascending ID.
    pub fn groups(&self) -> Vec<&Node> {
        self.nodes.values().filter(|n| n.is_group()).collect()
    }

    /// All signals, in input order.
    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    /// Nodes whose relation is intra-sentential, in reading order.
    pub fn intra_sentential_relations(&self) -> Vec<&Node> {
        self.intra_sentential
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .collect()
    }

    /// Relation name → number of intra-sentential nodes carrying it.
    pub fn intra_sentential_relation_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for node in self.intra_sentential_relations() {
            if let Some(name) = node.relation.as_deref() {
                *counts.entry(name).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Whether the given node's relation is intra-sentential.
    pub fn is_intra_sentential(&self, id: NodeId) -> bool {
        classify::is_intra_sentential(self, id)
    }

    /// Whitespace-joined token stream of the whole document.
    pub fn text(&self) -> String {
        self.text_of(self.root)
    }

    /// Global token ID → token string.
    pub fn token_dictionary(&self) -> &BTreeMap<u32, String> {
        &self.tokens
    }

    pub fn token(&self, id: u32) -> Option<&str> {
        self.tokens.get(&id).map(String::as_str)
    }

    /// Every descendant segment of a node, in reading order. A segment
    /// counts itself.
    pub fn subtree_segments(&self, id: NodeId) -> Vec<&Node> {
        let mut segments = vec![];
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get(&current) {
                if node.is_segment() {
                    segments.push(node);
                }
                stack.extend(node.children.iter().copied());
            }
        }
        segments.sort_by_key(|node| node.order);
        segments
    }

    /// Whitespace-joined token stream of a node's subtree.
    pub fn text_of(&self, id: NodeId) -> String {
        let mut tokens = vec![];
        for node in self.subtree_segments(id) {
            if let Some(segment) = node.as_segment() {
                tokens.extend(parsing::sentence::tokenize(&segment.text));
            }
        }
        tokens.join(" ")
    }

    /// The global ID of a node's first token: a segment's own, a group's
    /// minimum over its descendant segments. `None` for a group with no
    /// descendant segments.
    pub fn initial_token_id(&self, id: NodeId) -> Option<u32> {
        self.subtree_segments(id)
            .iter()
            .filter_map(|node| node.as_segment())
            .map(|segment| segment.initial_token_id)
            .min()
    }

    /// The node's (token ID, token) pairs, ascending by token ID.
    pub fn tokens_of(&self, id: NodeId) -> Vec<(u32, &str)> {
        let Some(start) = self.initial_token_id(id) else {
            return vec![];
        };
        let mut out = vec![];
        for node in self.subtree_segments(id) {
            if let Some(segment) = node.as_segment() {
                for token in parsing::sentence::tokenize(&segment.text) {
                    out.push((start + out.len() as u32, token));
                }
            }
        }
        out
    }

    /// Resolve a signal's token IDs against the token dictionary, ascending;
    /// IDs outside the dictionary are skipped.
    pub fn signal_tokens(&self, signal: &Signal) -> Vec<&str> {
        let mut ids = signal.token_ids.clone();
        ids.sort_unstable();
        ids.iter().filter_map(|id| self.token(*id)).collect()
    }

    pub fn signal_text(&self, signal: &Signal) -> String {
        self.signal_tokens(signal).join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::relation::RelationKind;
    use crate::parsing::reader::{GroupRecord, RelationRecord, SegmentRecord, SignalRecord};
    use pretty_assertions::assert_eq;

    /// `[Alice went home] [because she was tired.] [Then she slept.]`
    /// Root group 10 holds group 11 (segments 1, 2) and segment 3.
    fn sample_document() -> Document {
        let records = Rs3Records {
            relations: vec![
                RelationRecord {
                    name: "elaboration".to_string(),
                    kind: RelationKind::Mononuclear,
                },
                RelationRecord {
                    name: "sequence".to_string(),
                    kind: RelationKind::Multinuclear,
                },
            ],
            segments: vec![
                SegmentRecord {
                    id: 1,
                    parent: Some(11),
                    relname: Some("span".to_string()),
                    text: "Alice went home".to_string(),
                },
                SegmentRecord {
                    id: 2,
                    parent: Some(11),
                    relname: Some("elaboration".to_string()),
                    text: "because she was tired.".to_string(),
                },
                SegmentRecord {
                    id: 3,
                    parent: Some(10),
                    relname: Some("span".to_string()),
                    text: "Then she slept.".to_string(),
                },
            ],
            groups: vec![
                GroupRecord {
                    id: 10,
                    parent: None,
                    relname: None,
                    group_type: "span".to_string(),
                },
                GroupRecord {
                    id: 11,
                    parent: Some(10),
                    relname: Some("span".to_string()),
                    group_type: "span".to_string(),
                },
            ],
            signals: vec![SignalRecord {
                source: 2,
                signal_type: "dm".to_string(),
                subtype: "dm".to_string(),
                token_ids: vec![4],
            }],
        };
        Document::from_records(records).unwrap()
    }

    #[test]
    fn text_joins_all_tokens_in_reading_order() {
        let doc = sample_document();
        assert_eq!(
            doc.text(),
            "Alice went home because she was tired. Then she slept."
        );
    }

    #[test]
    fn token_dictionary_is_contiguous_from_one() {
        let doc = sample_document();
        let ids: Vec<u32> = doc.token_dictionary().keys().copied().collect();
        assert_eq!(ids, (1..=10).collect::<Vec<u32>>());
        assert_eq!(doc.token(1), Some("Alice"));
        assert_eq!(doc.token(4), Some("because"));
        assert_eq!(doc.token(10), Some("slept."));
        assert_eq!(doc.token(11), None);
    }

    #[test]
    fn token_dictionary_lines_up_with_initial_token_ids() {
        let doc = sample_document();
        for node in doc.segments() {
            let segment = node.as_segment().unwrap();
            for (offset, token) in
                crate::parsing::sentence::tokenize(&segment.text).enumerate()
            {
                assert_eq!(doc.token(segment.initial_token_id + offset as u32), Some(token));
            }
        }
    }

    #[test]
    fn tokens_of_group_aggregates_descendants() {
        let doc = sample_document();
        let pairs = doc.tokens_of(11);
        assert_eq!(
            pairs,
            vec![
                (1, "Alice"),
                (2, "went"),
                (3, "home"),
                (4, "because"),
                (5, "she"),
                (6, "was"),
                (7, "tired.")
            ]
        );
    }

    #[test]
    fn tokens_of_segment_starts_at_its_initial_token() {
        let doc = sample_document();
        assert_eq!(
            doc.tokens_of(3),
            vec![(8, "Then"), (9, "she"), (10, "slept.")]
        );
    }

    #[test]
    fn subtree_segments_of_root_cover_all_segments_in_order() {
        let doc = sample_document();
        let ids: Vec<NodeId> = doc.subtree_segments(10).iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn segment_orders_form_a_permutation() {
        let doc = sample_document();
        let orders: Vec<usize> = doc.segments().iter().map(|n| n.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn signal_tokens_resolve_through_dictionary() {
        let doc = sample_document();
        let signal = &doc.signals()[0];
        assert_eq!(doc.signal_tokens(signal), vec!["because"]);
        assert_eq!(doc.signal_text(signal), "because");
    }

    #[test]
    fn signal_tokens_skip_unresolvable_ids_and_sort() {
        let doc = sample_document();
        let signal = Signal {
            id: 9,
            source: 2,
            signal_type: "dm".to_string(),
            subtype: "dm".to_string(),
            token_ids: vec![5, 99, 4],
        };
        assert_eq!(doc.signal_tokens(&signal), vec!["because", "she"]);
    }

    #[test]
    fn initial_token_id_of_group_is_min_of_descendants() {
        let doc = sample_document();
        assert_eq!(doc.initial_token_id(11), Some(1));
        assert_eq!(doc.initial_token_id(3), Some(8));
    }

    #[test]
    fn meta_defaults_empty_and_with_meta_attaches_identity() {
        let doc = sample_document();
        assert_eq!(doc.name(), "");
        let doc = doc.with_meta(DocumentMeta {
            name: "D1_C1_story.rs3".to_string(),
            code: "D1_C1".to_string(),
            path: PathBuf::from("/corpus/D1_C1_story.rs3"),
        });
        assert_eq!(doc.code(), "D1_C1");
        assert_eq!(doc.name(), "D1_C1_story.rs3");
    }

    #[test]
    fn intra_sentential_counts_group_by_relation_name() {
        let doc = sample_document();
        // Segment 2 (elaboration) shares sentence 1 with its parent's span.
        let counts = doc.intra_sentential_relation_counts();
        assert_eq!(counts.get("elaboration"), Some(&1));
        assert_eq!(counts.get("span"), None);
    }
}

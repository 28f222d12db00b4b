use std::collections::BTreeMap;
use thiserror::Error;

use crate::models::document::{Document, DocumentMeta};
use crate::models::node::{Group, Node, NodeId, NodeKind, Segment, NO_ORDER};
use crate::models::relation::RelationRegistry;
use crate::models::signal::Signal;
use crate::parsing::classify;
use crate::parsing::reader::Rs3Records;
use crate::parsing::sentence::{tokenize, SentenceAssigner};

/// A violated structural invariant. Any of these aborts the whole document
/// build; no partial document is ever returned.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("node {node} references unknown relation `{name}`")]
    UnknownRelation { node: NodeId, name: String },
    #[error("duplicate node id {0}")]
    DuplicateId(NodeId),
    #[error("node {node} references missing parent {parent}")]
    DanglingParent { node: NodeId, parent: NodeId },
    #[error("document has no root node")]
    NoRoot,
    #[error("document has multiple root nodes (at least {first} and {second})")]
    MultipleRoots { first: NodeId, second: NodeId },
    #[error("signal {signal} references missing source node {source_id}")]
    UnknownSignalSource { signal: usize, source_id: NodeId },
}

/// Build a complete, analyzed document from structural records.
///
/// Runs the whole sequential pipeline: registry, node instantiation,
/// parent/child linking, root discovery, signal attachment, sentence/token
/// assignment, token dictionary, intra-sentential precomputation.
pub fn build(records: Rs3Records) -> Result<Document, BuildError> {
    let mut registry = RelationRegistry::new();
    for relation in records.relations {
        registry.register(relation.name, relation.kind);
    }

    let mut nodes: BTreeMap<NodeId, Node> = BTreeMap::new();
    for (order, record) in records.segments.into_iter().enumerate() {
        let id = record.id;
        let node = Node {
            id,
            parent: record.parent,
            relation: record.relname,
            children: vec![],
            signals: vec![],
            order,
            kind: NodeKind::Segment(Segment {
                text: record.text,
                sentence_id: 0,
                initial_token_id: 0,
            }),
        };
        if nodes.insert(id, node).is_some() {
            return Err(BuildError::DuplicateId(id));
        }
    }
    for record in records.groups {
        let id = record.id;
        let node = Node {
            id,
            parent: record.parent,
            relation: record.relname,
            children: vec![],
            signals: vec![],
            order: NO_ORDER,
            kind: NodeKind::Group(Group {
                group_type: record.group_type,
            }),
        };
        if nodes.insert(id, node).is_some() {
            return Err(BuildError::DuplicateId(id));
        }
    }

    for node in nodes.values() {
        if let Some(name) = node.relation.as_deref()
            && !registry.contains(name)
        {
            return Err(BuildError::UnknownRelation {
                node: node.id,
                name: name.to_string(),
            });
        }
    }

    let links: Vec<(NodeId, NodeId)> = nodes
        .values()
        .filter_map(|node| node.parent.map(|parent| (node.id, parent)))
        .collect();
    for (child, parent) in links {
        if !nodes.contains_key(&parent) {
            return Err(BuildError::DanglingParent {
                node: child,
                parent,
            });
        }
        if let Some(parent_node) = nodes.get_mut(&parent) {
            parent_node.children.push(child);
        }
    }

    let root = find_root(&nodes)?;
    cache_group_orders(&mut nodes, root);
    sort_children(&mut nodes);

    let mut signals = Vec::with_capacity(records.signals.len());
    for (index, record) in records.signals.into_iter().enumerate() {
        let Some(source) = nodes.get_mut(&record.source) else {
            return Err(BuildError::UnknownSignalSource {
                signal: index,
                source_id: record.source,
            });
        };
        source.signals.push(index);
        signals.push(Signal {
            id: index,
            source: record.source,
            signal_type: record.signal_type,
            subtype: record.subtype,
            token_ids: record.token_ids,
        });
    }

    let tokens = assign_sentences_and_tokens(&mut nodes);

    let mut document = Document {
        meta: DocumentMeta::default(),
        relations: registry,
        nodes,
        signals,
        root,
        tokens,
        intra_sentential: vec![],
    };
    document.intra_sentential = classify::intra_sentential_nodes(&document);
    Ok(document)
}

fn find_root(nodes: &BTreeMap<NodeId, Node>) -> Result<NodeId, BuildError> {
    let mut root = None;
    for node in nodes.values().filter(|node| node.is_root()) {
        match root {
            None => root = Some(node.id),
            Some(first) => {
                return Err(BuildError::MultipleRoots {
                    first,
                    second: node.id,
                });
            }
        }
    }
    root.ok_or(BuildError::NoRoot)
}

/// Cache each group's derived order (minimum descendant-segment order).
///
/// Children carry final orders before their parent is visited, so one
/// post-order pass from the root suffices. Groups with no descendant
/// segments keep the sorts-last placeholder.
fn cache_group_orders(nodes: &mut BTreeMap<NodeId, Node>, root: NodeId) {
    let mut visit_order = vec![];
    collect_post_order(nodes, root, &mut visit_order);
    for id in visit_order {
        let Some(node) = nodes.get(&id) else { continue };
        if node.is_group() {
            let min_child_order = node
                .children
                .iter()
                .filter_map(|child| nodes.get(child))
                .map(|child| child.order)
                .min()
                .unwrap_or(NO_ORDER);
            if let Some(node) = nodes.get_mut(&id) {
                node.order = min_child_order;
            }
        }
    }
}

fn collect_post_order(nodes: &BTreeMap<NodeId, Node>, id: NodeId, out: &mut Vec<NodeId>) {
    if let Some(node) = nodes.get(&id) {
        for &child in &node.children {
            collect_post_order(nodes, child, out);
        }
    }
    out.push(id);
}

fn sort_children(nodes: &mut BTreeMap<NodeId, Node>) {
    let orders: BTreeMap<NodeId, usize> =
        nodes.values().map(|node| (node.id, node.order)).collect();
    for node in nodes.values_mut() {
        node.children
            .sort_by_key(|child| (orders.get(child).copied().unwrap_or(NO_ORDER), *child));
    }
}

/// Single linear pass over segments in reading order: sentence IDs, initial
/// token IDs, and the global token dictionary.
fn assign_sentences_and_tokens(nodes: &mut BTreeMap<NodeId, Node>) -> BTreeMap<u32, String> {
    let mut segment_ids: Vec<NodeId> = nodes
        .values()
        .filter(|node| node.is_segment())
        .map(|node| node.id)
        .collect();
    segment_ids.sort_by_key(|id| nodes.get(id).map_or(NO_ORDER, |node| node.order));

    let mut assigner = SentenceAssigner::new();
    let mut tokens = BTreeMap::new();
    let mut next_token_id = 1u32;
    for id in segment_ids {
        let Some(node) = nodes.get_mut(&id) else { continue };
        if let NodeKind::Segment(segment) = &mut node.kind {
            let (sentence_id, initial_token_id) = assigner.assign(&segment.text);
            segment.sentence_id = sentence_id;
            segment.initial_token_id = initial_token_id;
            for token in tokenize(&segment.text) {
                tokens.insert(next_token_id, token.to_string());
                next_token_id += 1;
            }
        }
    }
    tokens
}

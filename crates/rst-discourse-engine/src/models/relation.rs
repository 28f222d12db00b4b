use serde::Serialize;
use std::collections::BTreeMap;

/// Relation name used for purely structural span edges.
///
/// Span edges connect a nucleus segment to the group that represents its
/// whole span; they carry no rhetorical content and are excluded from
/// relation counting.
pub const SPAN_RELATION: &str = "span";

/// Multinuclear relation tying the pieces of one discontinuous discourse
/// unit together; counted once, at its leftmost member.
pub const SAME_UNIT_RELATION: &str = "same-unit";

/// Relation names that are multinuclear in this corpus.
///
/// A node with no relation at all (the root) is also treated as multinuclear
/// by convention.
pub const MULTINUCLEAR_RELATIONS: [&str; 6] = [
    "sequence",
    "same-unit",
    "list",
    "contrast",
    "joint",
    "other-rel",
];

/// Nuclearity of a relation, as declared in the RS3 header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RelationKind {
    /// One nucleus, one satellite (`type="rst"`).
    Mononuclear,
    /// A symmetric set of nuclei (`type="multinuc"`).
    Multinuclear,
}

impl RelationKind {
    /// Map the RS3 header `type` attribute to a kind.
    ///
    /// `"multinuc"` is multinuclear; anything else (normally `"rst"`) is
    /// mononuclear.
    pub fn from_rs3_type(raw: &str) -> Self {
        if raw == "multinuc" {
            RelationKind::Multinuclear
        } else {
            RelationKind::Mononuclear
        }
    }
}

/// A named rhetorical relation. Identity is the name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relation {
    pub name: String,
    pub kind: RelationKind,
}

/// Registry of the relations a document declares in its header.
///
/// Append-only while the document is being built, frozen afterwards.
/// Iteration order is name-sorted so that consumers see a deterministic
/// sequence regardless of declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationRegistry {
    relations: BTreeMap<String, Relation>,
}

impl RelationRegistry {
    /// Create a registry pre-seeded with the implicit `"span"` relation.
    ///
    /// A header that declares `"span"` explicitly overrides the seed
    /// (last write wins per name).
    pub fn new() -> Self {
        let mut registry = Self {
            relations: BTreeMap::new(),
        };
        registry.register(SPAN_RELATION.to_string(), RelationKind::Multinuclear);
        registry
    }

    pub fn register(&mut self, name: String, kind: RelationKind) {
        self.relations.insert(name.clone(), Relation { name, kind });
    }

    pub fn get(&self, name: &str) -> Option<&Relation> {
        self.relations.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.relations.contains_key(name)
    }

    /// All registered relations, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &Relation> {
        self.relations.values()
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}

impl Default for RelationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

use thiserror::Error;

use crate::models::node::NodeId;
use crate::models::relation::RelationKind;

/// Structural shape errors in the RS3 XML, surfaced before tree building.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("invalid XML: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("<{element}> is missing required attribute `{attribute}`")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
    #[error("<{element}> attribute `{attribute}` is not a number: `{value}`")]
    InvalidNumber {
        element: &'static str,
        attribute: &'static str,
        value: String,
    },
}

/// A relation declared in the RS3 header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationRecord {
    pub name: String,
    pub kind: RelationKind,
}

/// A `<segment>` element. Order in the file is meaningful: it is the
/// segment's document-wide reading order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentRecord {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub relname: Option<String>,
    pub text: String,
}

/// A `<group>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRecord {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub relname: Option<String>,
    pub group_type: String,
}

/// A `<signal>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalRecord {
    pub source: NodeId,
    pub signal_type: String,
    pub subtype: String,
    pub token_ids: Vec<u32>,
}

/// The structural content of one RS3 file, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rs3Records {
    pub relations: Vec<RelationRecord>,
    pub segments: Vec<SegmentRecord>,
    pub groups: Vec<GroupRecord>,
    pub signals: Vec<SignalRecord>,
}

/// Parse raw RS3 XML text into structural records.
///
/// Only shape is validated here; referential integrity (parents, relation
/// names, signal sources) is the tree builder's job.
pub fn read_rs3(xml: &str) -> Result<Rs3Records, ReadError> {
    let doc = roxmltree::Document::parse(xml)?;
    let mut records = Rs3Records::default();

    for node in doc.descendants().filter(roxmltree::Node::is_element) {
        match node.tag_name().name() {
            "rel" => records.relations.push(read_rel(&node)?),
            "segment" => records.segments.push(read_segment(&node)?),
            "group" => records.groups.push(read_group(&node)?),
            "signal" => records.signals.push(read_signal(&node)?),
            _ => {}
        }
    }

    Ok(records)
}

fn read_rel(node: &roxmltree::Node) -> Result<RelationRecord, ReadError> {
    let name = require_attribute(node, "rel", "name")?;
    let raw_type = require_attribute(node, "rel", "type")?;
    Ok(RelationRecord {
        name: name.to_string(),
        kind: RelationKind::from_rs3_type(raw_type),
    })
}

fn read_segment(node: &roxmltree::Node) -> Result<SegmentRecord, ReadError> {
    Ok(SegmentRecord {
        id: require_id(node, "segment", "id")?,
        parent: optional_id(node, "segment", "parent")?,
        relname: non_empty(node.attribute("relname")),
        text: node.text().map(str::trim).unwrap_or_default().to_string(),
    })
}

fn read_group(node: &roxmltree::Node) -> Result<GroupRecord, ReadError> {
    Ok(GroupRecord {
        id: require_id(node, "group", "id")?,
        parent: optional_id(node, "group", "parent")?,
        relname: non_empty(node.attribute("relname")),
        group_type: require_attribute(node, "group", "type")?.to_string(),
    })
}

fn read_signal(node: &roxmltree::Node) -> Result<SignalRecord, ReadError> {
    let tokens = match non_empty(node.attribute("tokens")) {
        Some(raw) => raw
            .split(',')
            .map(|part| {
                part.trim().parse::<u32>().map_err(|_| ReadError::InvalidNumber {
                    element: "signal",
                    attribute: "tokens",
                    value: part.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?,
        None => vec![],
    };
    Ok(SignalRecord {
        source: require_id(node, "signal", "source")?,
        signal_type: require_attribute(node, "signal", "type")?.to_string(),
        subtype: require_attribute(node, "signal", "subtype")?.to_string(),
        token_ids: tokens,
    })
}

fn require_attribute<'a>(
    node: &roxmltree::Node<'a, '_>,
    element: &'static str,
    attribute: &'static str,
) -> Result<&'a str, ReadError> {
    node.attribute(attribute)
        .ok_or(ReadError::MissingAttribute { element, attribute })
}

fn require_id(
    node: &roxmltree::Node,
    element: &'static str,
    attribute: &'static str,
) -> Result<NodeId, ReadError> {
    let raw = require_attribute(node, element, attribute)?;
    raw.parse::<NodeId>().map_err(|_| ReadError::InvalidNumber {
        element,
        attribute,
        value: raw.to_string(),
    })
}

fn optional_id(
    node: &roxmltree::Node,
    element: &'static str,
    attribute: &'static str,
) -> Result<Option<NodeId>, ReadError> {
    match non_empty(node.attribute(attribute)) {
        Some(raw) => raw
            .parse::<NodeId>()
            .map(Some)
            .map_err(|_| ReadError::InvalidNumber {
                element,
                attribute,
                value: raw.to_string(),
            }),
        None => Ok(None),
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SMALL_RS3: &str = r#"<rst>
  <header>
    <relations>
      <rel name="elaboration" type="rst" />
      <rel name="sequence" type="multinuc" />
    </relations>
  </header>
  <body>
    <segment id="1" parent="3" relname="span">First part.</segment>
    <segment id="2" parent="3" relname="elaboration">second part</segment>
    <group id="3" type="span" />
    <signals>
      <signal source="2" type="dm" subtype="dm" tokens="3,4" />
      <signal source="1" type="syntactic" subtype="modifier" />
    </signals>
  </body>
</rst>"#;

    #[test]
    fn reads_all_record_kinds_in_file_order() {
        let records = read_rs3(SMALL_RS3).unwrap();

        assert_eq!(records.relations.len(), 2);
        assert_eq!(records.relations[0].name, "elaboration");
        assert_eq!(records.relations[0].kind, RelationKind::Mononuclear);
        assert_eq!(records.relations[1].kind, RelationKind::Multinuclear);

        assert_eq!(records.segments.len(), 2);
        assert_eq!(records.segments[0].id, 1);
        assert_eq!(records.segments[0].parent, Some(3));
        assert_eq!(records.segments[0].relname.as_deref(), Some("span"));
        assert_eq!(records.segments[0].text, "First part.");

        assert_eq!(records.groups.len(), 1);
        assert_eq!(records.groups[0].id, 3);
        assert_eq!(records.groups[0].parent, None);
        assert_eq!(records.groups[0].relname, None);
        assert_eq!(records.groups[0].group_type, "span");

        assert_eq!(records.signals.len(), 2);
        assert_eq!(records.signals[0].source, 2);
        assert_eq!(records.signals[0].token_ids, vec![3, 4]);
        assert_eq!(records.signals[1].token_ids, Vec::<u32>::new());
    }

    #[test]
    fn segment_text_is_trimmed() {
        let records = read_rs3(
            r#"<rst><body><segment id="1">  padded text  </segment></body></rst>"#,
        )
        .unwrap();
        assert_eq!(records.segments[0].text, "padded text");
    }

    #[test]
    fn segment_without_text_is_empty() {
        let records = read_rs3(r#"<rst><body><segment id="1"/></body></rst>"#).unwrap();
        assert_eq!(records.segments[0].text, "");
    }

    #[test]
    fn missing_required_attribute_is_an_error() {
        let err = read_rs3(r#"<rst><body><segment parent="3">x</segment></body></rst>"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ReadError::MissingAttribute {
                element: "segment",
                attribute: "id",
            }
        ));
    }

    #[test]
    fn non_numeric_id_is_an_error() {
        let err =
            read_rs3(r#"<rst><body><segment id="abc">x</segment></body></rst>"#).unwrap_err();
        assert!(matches!(
            err,
            ReadError::InvalidNumber {
                element: "segment",
                attribute: "id",
                ..
            }
        ));
    }

    #[test]
    fn non_numeric_signal_token_is_an_error() {
        let xml = r#"<rst><body>
            <segment id="1">x</segment>
            <signals><signal source="1" type="dm" subtype="dm" tokens="1,zap"/></signals>
        </body></rst>"#;
        let err = read_rs3(xml).unwrap_err();
        assert!(matches!(
            err,
            ReadError::InvalidNumber {
                element: "signal",
                attribute: "tokens",
                ..
            }
        ));
    }

    #[test]
    fn malformed_xml_is_an_error() {
        assert!(matches!(
            read_rs3("<rst><body>").unwrap_err(),
            ReadError::Xml(_)
        ));
    }
}

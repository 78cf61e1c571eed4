use roxmltree::Document;

use crate::PackageError;

/// One `<Relationship>` element from a `.rels` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub target_mode: Option<String>,
}

impl Relationship {
    pub fn is_external(&self) -> bool {
        self.target_mode
            .as_deref()
            .is_some_and(|mode| mode.trim().eq_ignore_ascii_case("External"))
    }
}

/// Parsed relationships part, in document order.
#[derive(Debug, Clone, Default)]
pub struct RelationshipSet {
    rels: Vec<Relationship>,
}

impl RelationshipSet {
    pub fn parse(xml: &[u8]) -> Result<Self, PackageError> {
        let xml = std::str::from_utf8(xml)?;
        let doc = Document::parse(xml)?;
        let mut rels = Vec::new();
        for node in doc.descendants().filter(|n| n.is_element()) {
            if node.tag_name().name() != "Relationship" {
                continue;
            }
            let Some(id) = node.attribute("Id") else {
                continue;
            };
            rels.push(Relationship {
                id: id.to_string(),
                rel_type: node.attribute("Type").unwrap_or_default().to_string(),
                target: node.attribute("Target").unwrap_or_default().to_string(),
                target_mode: node.attribute("TargetMode").map(str::to_string),
            });
        }
        Ok(Self { rels })
    }

    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.rels.iter().find(|rel| rel.id == id)
    }

    /// Target of a package-internal relationship, if `id` resolves to one.
    /// External-mode relationships and empty targets yield `None`.
    pub fn internal_target(&self, id: &str) -> Option<&str> {
        let rel = self.get(id)?;
        if rel.is_external() || rel.target.is_empty() {
            return None;
        }
        Some(rel.target.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.rels.iter()
    }

    pub fn len(&self) -> usize {
        self.rels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }
}

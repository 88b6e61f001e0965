//! Triplet module - one extracted relation

use serde::{Deserialize, Serialize};

/// A typed relation triplet extracted from text.
///
/// All five fields are opaque strings; the extraction model is the source of
/// truth for their vocabulary and the pipeline never inspects them.
///
/// The relation field serializes as `"type"` to keep the persisted record
/// compatible with downstream tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triplet {
    /// Head (subject) entity surface form
    pub head: String,

    /// Entity type of the head
    pub head_type: String,

    /// Relation label
    #[serde(rename = "type")]
    pub relation_type: String,

    /// Tail (object) entity surface form
    pub tail: String,

    /// Entity type of the tail
    pub tail_type: String,
}

impl Triplet {
    /// Create a triplet.
    pub fn new(
        head: impl Into<String>,
        head_type: impl Into<String>,
        relation_type: impl Into<String>,
        tail: impl Into<String>,
        tail_type: impl Into<String>,
    ) -> Self {
        Self {
            head: head.into(),
            head_type: head_type.into(),
            relation_type: relation_type.into(),
            tail: tail.into(),
            tail_type: tail_type.into(),
        }
    }

    /// Whether every field is non-empty.
    ///
    /// The extraction model occasionally emits truncated triplets at the end
    /// of generation; callers drop those rather than persist partial data.
    pub fn is_complete(&self) -> bool {
        !self.head.is_empty()
            && !self.head_type.is_empty()
            && !self.relation_type.is_empty()
            && !self.tail.is_empty()
            && !self.tail_type.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_field_serializes_as_type() {
        let triplet = Triplet::new("Apple Inc.", "ORG", "headquarters location", "Cupertino", "LOC");
        let json = serde_json::to_value(&triplet).unwrap();

        assert_eq!(json["head"], "Apple Inc.");
        assert_eq!(json["type"], "headquarters location");
        assert!(json.get("relation_type").is_none());
    }

    #[test]
    fn test_roundtrip() {
        let triplet = Triplet::new("Tesla", "ORG", "founded by", "Elon Musk", "PER");
        let json = serde_json::to_string(&triplet).unwrap();
        let parsed: Triplet = serde_json::from_str(&json).unwrap();
        assert_eq!(triplet, parsed);
    }

    #[test]
    fn test_is_complete() {
        let complete = Triplet::new("a", "b", "c", "d", "e");
        assert!(complete.is_complete());

        let partial = Triplet::new("a", "", "c", "d", "e");
        assert!(!partial.is_complete());
    }
}

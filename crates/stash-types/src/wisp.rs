use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Result, WispError};
use crate::metadata::Metadata;
use crate::path::{is_valid_local_id, is_valid_path, LocalId, WispPath};
use crate::validate::assert_valid;

/// The payload of a Wisp, which also decides its variant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WispContent {
    /// Opaque text of a content (leaf) Wisp.
    Text(String),
    /// Ordered child ids of a group (node) Wisp.
    Group(Vec<LocalId>),
}

/// A hierarchically addressed unit of content.
///
/// Serialized as `{"path": .., "content": .., "metadata": ..}` with
/// `metadata` omitted when absent. Deserialization validates the path and
/// every child id, and follows [`assert_valid`] in rejecting an explicit
/// `null` for `metadata`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wisp {
    pub path: WispPath,
    pub content: WispContent,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_metadata"
    )]
    pub metadata: Option<Metadata>,
}

/// Absent metadata is `None` via `default`; a present value must be a map.
fn present_metadata<'de, D>(deserializer: D) -> std::result::Result<Option<Metadata>, D::Error>
where
    D: Deserializer<'de>,
{
    Metadata::deserialize(deserializer).map(Some)
}

impl Wisp {
    /// Create a content Wisp without metadata.
    pub fn content(path: WispPath, text: impl Into<String>) -> Self {
        Self {
            path,
            content: WispContent::Text(text.into()),
            metadata: None,
        }
    }

    /// Create a group Wisp without metadata.
    pub fn group(path: WispPath, children: Vec<LocalId>) -> Self {
        Self {
            path,
            content: WispContent::Group(children),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn is_content(&self) -> bool {
        matches!(self.content, WispContent::Text(_))
    }

    pub fn is_group(&self) -> bool {
        matches!(self.content, WispContent::Group(_))
    }

    /// Text payload, if this is a content Wisp.
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            WispContent::Text(text) => Some(text),
            WispContent::Group(_) => None,
        }
    }

    /// Child ids, if this is a group Wisp.
    pub fn children(&self) -> Option<&[LocalId]> {
        match &self.content {
            WispContent::Group(children) => Some(children),
            WispContent::Text(_) => None,
        }
    }

    /// Absolute paths of the declared children (empty for content Wisps).
    pub fn child_paths(&self) -> Vec<WispPath> {
        self.children()
            .map(|ids| ids.iter().map(|id| self.path.child(id)).collect())
            .unwrap_or_default()
    }

    /// This Wisp's id inside its parent group.
    pub fn local_id(&self) -> &str {
        self.path.local_id()
    }

    /// Re-check the path and content rules on a typed Wisp.
    ///
    /// The path is checked before the content. Metadata is shallow by
    /// construction of [`Metadata`].
    pub fn validate(&self) -> Result<()> {
        if !is_valid_path(self.path.as_str()) {
            return Err(WispError::MalformedPath {
                path: self.path.to_string(),
            });
        }
        if let WispContent::Group(children) = &self.content {
            if let Some(bad) = children.iter().find(|id| !is_valid_local_id(id.as_str())) {
                return Err(WispError::MalformedWisp(format!(
                    "Wisp<{}> has invalid child id {:?}",
                    self.path,
                    bad.as_str()
                )));
            }
        }
        Ok(())
    }

    /// Validate an untyped candidate with [`assert_valid`] and convert it.
    pub fn from_value(value: Value) -> Result<Self> {
        assert_valid(&value)?;
        serde_json::from_value(value).map_err(|e| WispError::MalformedWisp(e.to_string()))
    }

    pub fn to_value(&self) -> Value {
        // Every field serializes to plain JSON, so this cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Returns `true` if any term occurs in the local id, the serialized
    /// metadata, or (content Wisps only) the text.
    pub fn matches_terms(&self, terms: &[&str]) -> bool {
        let metadata = self
            .metadata
            .as_ref()
            .and_then(|m| serde_json::to_string(m).ok())
            .unwrap_or_default();
        let local_id = self.local_id();

        if terms
            .iter()
            .any(|term| local_id.contains(term) || metadata.contains(term))
        {
            return true;
        }

        match self.text() {
            Some(text) => terms.iter().any(|term| text.contains(term)),
            None => false,
        }
    }
}

/// Returns `true` if `wisp` is a content (leaf) Wisp.
pub fn is_content_type(wisp: &Wisp) -> bool {
    wisp.is_content()
}

/// Returns `true` if `wisp` is a group (node) Wisp.
pub fn is_group_type(wisp: &Wisp) -> bool {
    wisp.is_group()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::MetadataValue;
    use serde_json::json;

    fn path(s: &str) -> WispPath {
        WispPath::parse(s).unwrap()
    }

    fn ids(list: &[&str]) -> Vec<LocalId> {
        list.iter().map(|id| LocalId::parse(*id).unwrap()).collect()
    }

    #[test]
    fn variants_are_discriminated_by_content() {
        let leaf = Wisp::content(path("/docs/intro"), "hello");
        let node = Wisp::group(path("/docs"), ids(&["intro"]));

        assert!(is_content_type(&leaf));
        assert!(!is_group_type(&leaf));
        assert!(is_group_type(&node));
        assert!(!is_content_type(&node));
        assert_eq!(leaf.text(), Some("hello"));
        assert_eq!(node.children().map(|c| c.len()), Some(1));
    }

    #[test]
    fn child_paths_follow_content_order() {
        let node = Wisp::group(path("/docs"), ids(&["b", "a", "c"]));
        assert_eq!(
            node.child_paths(),
            vec![path("/docs/b"), path("/docs/a"), path("/docs/c")]
        );
        assert!(Wisp::content(path("/x"), "").child_paths().is_empty());
    }

    #[test]
    fn serializes_without_absent_metadata() {
        let leaf = Wisp::content(path("/docs/intro"), "hello");
        assert_eq!(
            leaf.to_value(),
            json!({ "path": "/docs/intro", "content": "hello" })
        );
    }

    #[test]
    fn from_value_builds_both_variants() {
        let leaf = Wisp::from_value(json!({ "path": "/a", "content": "text" })).unwrap();
        assert_eq!(leaf, Wisp::content(path("/a"), "text"));

        let node = Wisp::from_value(json!({
            "path": "/g",
            "content": ["one", "two"],
            "metadata": { "title": "Group", "tags": ["x"] }
        }))
        .unwrap();
        assert!(node.is_group());
        let metadata = node.metadata.as_ref().unwrap();
        assert_eq!(metadata["title"], MetadataValue::from("Group"));
    }

    #[test]
    fn empty_group_is_a_group() {
        let node = Wisp::from_value(json!({ "path": "/g", "content": [] })).unwrap();
        assert!(node.is_group());
        assert_eq!(node.children(), Some(&[][..]));
    }

    #[test]
    fn from_value_checks_path_first() {
        let err = Wisp::from_value(json!({ "path": "/", "content": 42 })).unwrap_err();
        assert!(matches!(err, WispError::MalformedPath { .. }));
    }

    #[test]
    fn from_value_rejects_bad_content() {
        let err = Wisp::from_value(json!({ "path": "/a", "content": ["ok", "not ok"] }))
            .unwrap_err();
        assert!(matches!(err, WispError::MalformedWisp(_)));
    }

    #[test]
    fn typed_wisps_validate() {
        assert!(Wisp::content(path("/a"), "x").validate().is_ok());
        assert!(Wisp::group(path("/g"), ids(&["a", "b_2"])).validate().is_ok());
    }

    #[test]
    fn deserialize_rejects_nested_metadata() {
        let result: std::result::Result<Wisp, _> = serde_json::from_value(json!({
            "path": "/a",
            "content": "x",
            "metadata": { "deep": { "er": 1 } }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn null_metadata_is_rejected_like_assert_valid() {
        let candidate = json!({ "path": "/a", "content": "x", "metadata": null });
        assert!(assert_valid(&candidate).is_err());

        let typed: std::result::Result<Wisp, _> = serde_json::from_value(candidate.clone());
        assert!(typed.is_err());
        assert!(matches!(
            Wisp::from_value(candidate),
            Err(WispError::MalformedWisp(_))
        ));

        let absent: Wisp =
            serde_json::from_value(json!({ "path": "/a", "content": "x" })).unwrap();
        assert_eq!(absent.metadata, None);
    }

    #[test]
    fn term_matching() {
        let mut metadata = Metadata::new();
        metadata.insert("title".into(), MetadataValue::from("Getting Started"));
        let leaf = Wisp::content(path("/docs/intro"), "hello world").with_metadata(metadata);

        assert!(leaf.matches_terms(&["intro"]));
        assert!(leaf.matches_terms(&["Started"]));
        assert!(leaf.matches_terms(&["nope", "world"]));
        assert!(!leaf.matches_terms(&["missing"]));
        assert!(!leaf.matches_terms(&[]));

        // Group ids are not searched as text.
        let node = Wisp::group(path("/docs"), ids(&["secret"]));
        assert!(!node.matches_terms(&["secret"]));
    }
}

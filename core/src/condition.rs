//! Condition model
//!
//! A condition is an immutable record describing a signaled event:
//! - `message`: human readable text
//! - `context`: opaque description of the call site that raised it
//! - `classes`: ordered tags, most specific first, always ending in `condition`
//! - `payload`: extension fields for custom condition kinds
//!
//! Every constructor normalizes `classes`, so the universal tag is present
//! exactly once and always last.

use crate::classes::{self, Family};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/* ===================== Tags ===================== */

/// Class tag carried by a condition and matched by handler entries
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(Cow<'static, str>);

impl Tag {
    pub const fn from_static(name: &'static str) -> Self {
        Tag(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<String>) -> Self {
        Tag(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for Tag {
    fn from(name: &'static str) -> Self {
        Tag::from_static(name)
    }
}

impl From<String> for Tag {
    fn from(name: String) -> Self {
        Tag::new(name)
    }
}

impl From<Family> for Tag {
    fn from(family: Family) -> Self {
        family.tag()
    }
}

impl PartialEq<str> for Tag {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Tag {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Built-in tags
pub mod tags {
    use super::Tag;

    /// Universal tag; every condition ends with it
    pub const CONDITION: Tag = Tag::from_static("condition");
    pub const ERROR: Tag = Tag::from_static("error");
    pub const WARNING: Tag = Tag::from_static("warning");
    pub const MESSAGE: Tag = Tag::from_static("message");
    pub const INTERRUPT: Tag = Tag::from_static("interrupt");

    /// Raised when `invoke_restart` names a restart that is not visible
    pub const RESTART_NOT_FOUND: Tag = Tag::from_static("restart-not-found");

    /// Error raised in place of an unhandled warning under the escalate policy
    pub const ESCALATED_WARNING: Tag = Tag::from_static("escalated-warning");

    /// Raised when a calling handler drops an unwind and the scan cannot resume
    pub const DISCARDED_UNWIND: Tag = Tag::from_static("discarded-unwind");
}

/* ===================== Condition ===================== */

/// Immutable signal record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ConditionRecord")]
pub struct Condition {
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    context: Option<String>,
    classes: Vec<Tag>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    payload: BTreeMap<String, Value>,
}

/// Wire shape; normalized on the way in
#[derive(Deserialize)]
struct ConditionRecord {
    message: String,
    #[serde(default)]
    context: Option<String>,
    #[serde(default)]
    classes: Vec<Tag>,
    #[serde(default)]
    payload: BTreeMap<String, Value>,
}

impl From<ConditionRecord> for Condition {
    fn from(record: ConditionRecord) -> Self {
        Condition {
            message: record.message,
            context: record.context,
            classes: normalize(record.classes),
            payload: record.payload,
        }
    }
}

impl Condition {
    /// Create a condition from ordered class tags
    ///
    /// The universal tag is appended when absent and moved to the end when
    /// supplied anywhere else.
    pub fn new<I, T>(classes: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Tag>,
    {
        Condition {
            message: message.into(),
            context: None,
            classes: normalize(classes.into_iter().map(Into::into).collect()),
            payload: BTreeMap::new(),
        }
    }

    /// Custom condition: `tags` are placed ahead of the family tag
    pub fn custom<I, T>(tags: I, family: Family, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Tag>,
    {
        let mut classes: Vec<Tag> = tags.into_iter().map(Into::into).collect();
        classes.push(family.tag());
        Condition::new(classes, message)
    }

    pub fn simple_error(message: impl Into<String>) -> Self {
        Condition::new([tags::ERROR], message)
    }

    pub fn simple_warning(message: impl Into<String>) -> Self {
        Condition::new([tags::WARNING], message)
    }

    pub fn simple_message(message: impl Into<String>) -> Self {
        Condition::new([tags::MESSAGE], message)
    }

    pub fn simple_interrupt(message: impl Into<String>) -> Self {
        Condition::new([tags::INTERRUPT], message)
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(name.into(), value.into());
        self
    }

    pub fn with_payload(mut self, payload: BTreeMap<String, Value>) -> Self {
        self.payload.extend(payload);
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Ordered class tags, most specific first
    pub fn classes(&self) -> &[Tag] {
        &self.classes
    }

    pub fn payload(&self) -> &BTreeMap<String, Value> {
        &self.payload
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.payload.get(name)
    }

    /// Whether `tag` appears anywhere in this condition's classes
    pub fn inherits(&self, tag: &Tag) -> bool {
        classes::matches(tag, self)
    }

    /// Built-in family deciding the default action, if any
    pub fn family(&self) -> Option<Family> {
        classes::family_of(self)
    }

    /// Message plus call site, for reports
    pub fn describe(&self) -> String {
        match &self.context {
            Some(context) => format!("{} (in {})", self.message, context),
            None => self.message.clone(),
        }
    }

    pub(crate) fn has_context(&self) -> bool {
        self.context.is_some()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Build a condition from tags, message and payload
pub fn make_condition<I, T>(tags: I, message: impl Into<String>, payload: BTreeMap<String, Value>) -> Condition
where
    I: IntoIterator<Item = T>,
    T: Into<Tag>,
{
    Condition::new(tags, message).with_payload(payload)
}

/// Ordered class tags of `condition`
pub fn classes_of(condition: &Condition) -> &[Tag] {
    condition.classes()
}

fn normalize(tags: Vec<Tag>) -> Vec<Tag> {
    let mut classes: Vec<Tag> = tags
        .into_iter()
        .filter(|tag| *tag != tags::CONDITION)
        .collect();
    classes.push(tags::CONDITION);
    classes
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::btreemap;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_universal_tag_appended() {
        let c = Condition::new(["bad-argument", "error"], "boom");
        assert_eq!(c.classes(), &[Tag::new("bad-argument"), tags::ERROR, tags::CONDITION]);
    }

    #[test]
    fn test_empty_tags_become_universal() {
        let c = Condition::new(Vec::<Tag>::new(), "bare");
        assert_eq!(classes_of(&c), &[tags::CONDITION]);
        assert_eq!(c.family(), None);
    }

    #[test]
    fn test_misplaced_universal_tag_moves_last() {
        let c = Condition::new(["condition", "warning", "condition"], "w");
        assert_eq!(c.classes(), &[tags::WARNING, tags::CONDITION]);
    }

    #[test]
    fn test_custom_condition_layers_ahead_of_family() {
        let c = Condition::custom(["bad-argument"], Family::Error, "bad x")
            .with_field("argument", "x");
        assert_eq!(c.classes()[0], "bad-argument");
        assert_eq!(c.classes()[1], "error");
        assert_eq!(c.family(), Some(Family::Error));
        assert_eq!(c.field("argument"), Some(&json!("x")));
        assert!(c.inherits(&Tag::new("bad-argument")));
    }

    #[test]
    fn test_make_condition_keeps_payload() {
        let payload = btreemap! {
            "code".to_string() => json!(42),
            "path".to_string() => json!("/tmp/x"),
        };
        let c = make_condition(["io-failure", "warning"], "cannot read", payload.clone());
        assert_eq!(c.payload(), &payload);
        assert_eq!(c.message(), "cannot read");
    }

    #[test]
    fn test_deserialized_condition_is_normalized() {
        let c: Condition =
            serde_json::from_str(r#"{"message": "m", "classes": ["message"]}"#).unwrap();
        assert_eq!(c.classes(), &[tags::MESSAGE, tags::CONDITION]);

        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["classes"], json!(["message", "condition"]));
        assert!(json.get("payload").is_none());
    }

    #[test]
    fn test_describe_includes_context() {
        let c = Condition::simple_error("failed").with_context("parse_header()");
        assert_eq!(c.describe(), "failed (in parse_header())");
        assert_eq!(c.to_string(), "failed");
    }

    proptest! {
        #[test]
        fn prop_classes_never_empty_and_end_universal(
            names in proptest::collection::vec("[a-z-]{1,12}", 0..6)
        ) {
            let c = Condition::new(names.into_iter().map(Tag::new), "m");
            let classes = classes_of(&c);
            prop_assert!(!classes.is_empty());
            prop_assert_eq!(classes.last(), Some(&tags::CONDITION));
            prop_assert_eq!(classes.iter().filter(|t| **t == tags::CONDITION).count(), 1);
        }
    }
}

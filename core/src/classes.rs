//! Class registry
//!
//! Decides whether a handler entry applies to a condition. Matching is plain
//! containment of a tag in the condition's class list. Within one frame the
//! entries are scanned in declared order and the first match wins, so a
//! general tag listed before a specific one shadows it.

use crate::condition::{tags, Condition, Tag};
use serde::{Deserialize, Serialize};
use std::fmt;

/* ===================== Families ===================== */

/// Built-in condition family; selects the default action when no handler matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Error,
    Warning,
    Message,
    Interrupt,
}

impl Family {
    pub fn tag(self) -> Tag {
        match self {
            Family::Error => tags::ERROR,
            Family::Warning => tags::WARNING,
            Family::Message => tags::MESSAGE,
            Family::Interrupt => tags::INTERRUPT,
        }
    }

    pub fn from_tag(tag: &Tag) -> Option<Family> {
        match tag.as_str() {
            "error" => Some(Family::Error),
            "warning" => Some(Family::Warning),
            "message" => Some(Family::Message),
            "interrupt" => Some(Family::Interrupt),
            _ => None,
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag().as_str())
    }
}

/* ===================== Matching ===================== */

/// True iff `tag` appears anywhere in the condition's classes
pub fn matches(tag: &Tag, condition: &Condition) -> bool {
    condition.classes().iter().any(|class| class == tag)
}

/// First entry, in declared order, whose tag matches the condition
///
/// Returns the entry's index together with its payload.
pub fn first_match<'e, H>(entries: &'e [(Tag, H)], condition: &Condition) -> Option<(usize, &'e H)> {
    entries
        .iter()
        .enumerate()
        .find(|(_, (tag, _))| matches(tag, condition))
        .map(|(index, (_, handler))| (index, handler))
}

/// Family of the most specific built-in family tag in the classes
pub fn family_of(condition: &Condition) -> Option<Family> {
    condition.classes().iter().find_map(Family::from_tag)
}

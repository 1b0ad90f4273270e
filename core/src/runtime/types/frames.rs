//! Handler and restart frames

use super::control::{Flow, FrameId};
use crate::classes;
use crate::condition::{Condition, Tag};
use crate::runtime::Dispatcher;
use serde::Serialize;
use std::fmt;
use std::rc::Rc;

/// Calling handler as stored on the handler stack
pub(crate) type CallingFn = Rc<dyn Fn(&mut Dispatcher, &Condition) -> Flow<()>>;

/* ===================== Handler Frames ===================== */

/// How a matched frame returns control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerKind {
    /// Unwind to the establishing construct and return the handler's value there
    Exiting,
    /// Run in place; the raiser continues unless the handler transfers control
    Calling,
}

/// Entries of one frame, in declared order
///
/// Exiting handlers stay with their construct; only the tags live here.
pub(crate) enum Entries {
    Exiting(Vec<(Tag, ())>),
    Calling(Vec<(Tag, CallingFn)>),
}

pub(crate) struct HandlerFrame {
    pub id: FrameId,
    /// Position in the handler stack at establishment
    pub depth: usize,
    pub entries: Entries,
}

impl HandlerFrame {
    pub fn kind(&self) -> HandlerKind {
        match self.entries {
            Entries::Exiting(_) => HandlerKind::Exiting,
            Entries::Calling(_) => HandlerKind::Calling,
        }
    }

    /// Index of the first entry matching the condition
    pub fn match_entry(&self, condition: &Condition) -> Option<usize> {
        match &self.entries {
            Entries::Exiting(entries) => classes::first_match(entries, condition).map(|(i, _)| i),
            Entries::Calling(entries) => classes::first_match(entries, condition).map(|(i, _)| i),
        }
    }

    pub fn tags(&self) -> Vec<Tag> {
        match &self.entries {
            Entries::Exiting(entries) => entries.iter().map(|(tag, _)| tag.clone()).collect(),
            Entries::Calling(entries) => entries.iter().map(|(tag, _)| tag.clone()).collect(),
        }
    }

    pub fn info(&self) -> HandlerInfo {
        HandlerInfo {
            kind: self.kind(),
            tags: self.tags(),
            depth: self.depth,
        }
    }
}

impl fmt::Debug for HandlerFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerFrame")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .field("tags", &self.tags())
            .field("depth", &self.depth)
            .finish()
    }
}

/// Read-only view of a visible handler frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerInfo {
    pub kind: HandlerKind,
    pub tags: Vec<Tag>,
    pub depth: usize,
}

/* ===================== Restart Frames ===================== */

#[derive(Debug, Clone)]
pub(crate) struct RestartFrame {
    /// Construct that established the restart
    pub owner: FrameId,
    /// Declared position inside the owning construct
    pub index: usize,
    pub name: String,
    pub description: Option<String>,
    /// Position in the restart stack at establishment
    pub depth: usize,
}

impl RestartFrame {
    pub fn info(&self) -> RestartInfo {
        RestartInfo {
            name: self.name.clone(),
            description: self.description.clone(),
            depth: self.depth,
        }
    }
}

/// Read-only view of a visible restart
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestartInfo {
    pub name: String,
    pub description: Option<String>,
    pub depth: usize,
}

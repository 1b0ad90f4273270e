//! Dispatcher state
//!
//! The dispatcher owns the explicit dynamic scope of one top-level invocation:
//! - handlers: stack of handler frames, innermost last
//! - restarts: stack of restart frames, innermost last
//! - deferred: warnings waiting for the end of the invocation

use super::types::{DeferredWarning, Entries, FrameId, HandlerFrame, HandlerInfo, RestartFrame, RestartInfo};
use crate::config::WarningSettings;
use crate::sink::DiagnosticSink;
use std::rc::Rc;
use tracing::trace;

/* ===================== Dispatcher ===================== */

#[derive(Debug)]
pub struct Dispatcher {
    pub(crate) handlers: Vec<HandlerFrame>,
    pub(crate) restarts: Vec<RestartFrame>,
    pub(crate) deferred: Vec<DeferredWarning>,
    pub(crate) dropped_warnings: usize,
    pub(crate) settings: WarningSettings,
    pub(crate) sink: Rc<dyn DiagnosticSink>,
    last_id: FrameId,
}

impl Dispatcher {
    pub(crate) fn new(settings: WarningSettings, sink: Rc<dyn DiagnosticSink>) -> Self {
        Dispatcher {
            handlers: Vec::new(),
            restarts: Vec::new(),
            deferred: Vec::new(),
            dropped_warnings: 0,
            settings,
            sink,
            last_id: FrameId::ROOT,
        }
    }

    /* ===================== Introspection ===================== */

    /// Number of visible handler frames
    pub fn handler_depth(&self) -> usize {
        self.handlers.len()
    }

    /// Number of visible restarts
    pub fn restart_depth(&self) -> usize {
        self.restarts.len()
    }

    /// Visible handler frames, innermost first
    pub fn handlers(&self) -> Vec<HandlerInfo> {
        self.handlers.iter().rev().map(HandlerFrame::info).collect()
    }

    /// Visible restarts, innermost first
    pub fn available_restarts(&self) -> Vec<RestartInfo> {
        self.restarts.iter().rev().map(RestartFrame::info).collect()
    }

    pub fn find_restart(&self, name: &str) -> Option<RestartInfo> {
        self.restarts
            .iter()
            .rev()
            .find(|frame| frame.name == name)
            .map(RestartFrame::info)
    }

    /// Warnings deferred so far in this invocation
    pub fn deferred_warnings(&self) -> &[DeferredWarning] {
        &self.deferred
    }

    pub fn warning_settings(&self) -> &WarningSettings {
        &self.settings
    }

    /* ===================== Frame Management ===================== */

    fn next_frame_id(&mut self) -> FrameId {
        self.last_id = self.last_id.next();
        self.last_id
    }

    pub(crate) fn push_handler(&mut self, entries: Entries) -> FrameId {
        let id = self.next_frame_id();
        let frame = HandlerFrame {
            id,
            depth: self.handlers.len(),
            entries,
        };
        trace!(frame = %id, kind = ?frame.kind(), depth = frame.depth, "push handler frame");
        self.handlers.push(frame);
        id
    }

    /// Pop the frame `id` and anything left above it
    ///
    /// A no-op when an unwind already abandoned the frame.
    pub(crate) fn pop_handler(&mut self, id: FrameId) {
        if let Some(pos) = self.handlers.iter().rposition(|frame| frame.id == id) {
            trace!(frame = %id, "pop handler frame");
            self.handlers.truncate(pos);
        }
    }

    /// Push one construct's restarts; the first declared ends up innermost
    pub(crate) fn push_restarts(&mut self, restarts: Vec<(String, Option<String>)>) -> FrameId {
        let owner = self.next_frame_id();
        for (index, (name, description)) in restarts.into_iter().enumerate().rev() {
            trace!(frame = %owner, restart = %name, "push restart");
            self.restarts.push(RestartFrame {
                owner,
                index,
                name,
                description,
                depth: self.restarts.len(),
            });
        }
        owner
    }

    pub(crate) fn pop_restarts(&mut self, owner: FrameId) {
        if let Some(pos) = self.restarts.iter().position(|frame| frame.owner == owner) {
            trace!(frame = %owner, "pop restarts");
            self.restarts.truncate(pos);
        }
    }

    /// Drop every handler and restart frame established at or after `cutoff`
    pub(crate) fn abandon(&mut self, cutoff: FrameId) {
        self.handlers.retain(|frame| frame.id < cutoff);
        self.restarts.retain(|frame| frame.owner < cutoff);
    }

    /* ===================== Deferred Warnings ===================== */

    pub(crate) fn defer_warning(&mut self, warning: DeferredWarning) {
        if self.deferred.len() < self.settings.max_deferred {
            self.deferred.push(warning);
        } else {
            self.dropped_warnings += 1;
        }
    }

    /// Empty the deferred buffer, returning its contents and the overflow count
    pub(crate) fn take_deferred(&mut self) -> (Vec<DeferredWarning>, usize) {
        let dropped = std::mem::take(&mut self.dropped_warnings);
        (std::mem::take(&mut self.deferred), dropped)
    }
}

//! Signal dispatch
//!
//! `raise` walks the handler stack from the innermost frame outward:
//! 1. Exiting frame matched: abandon everything from that frame up and
//!    return an `Unwind::Exit` addressed to it.
//! 2. Calling frame matched: run the handler in place with its frame (and
//!    everything inside it) hidden, then keep scanning outward.
//! 3. Nothing left: run the default action of the condition's family.

use super::dispatcher::Dispatcher;
use super::types::{CallingFn, DeferredWarning, Entries, Flow, FrameId, Signal, Unwind};
use crate::classes::Family;
use crate::condition::{tags, Condition};
use crate::config::WarningPolicy;
use serde_json::Value;
use std::rc::Rc;
use tracing::{debug, warn};

impl Dispatcher {
    /// Signal `condition` through the current dynamic scope
    ///
    /// Returns `Ok` when the raiser may continue (calling handlers declined and
    /// the default action does not diverge). Returns `Err` when an exiting
    /// handler, a restart or a diverging default action takes control; the
    /// error must be propagated.
    pub fn raise(&mut self, condition: Condition) -> Flow<Signal> {
        debug!(
            class = %condition.classes()[0],
            message = condition.message(),
            "raise"
        );

        let mut cursor = self.handlers.len();
        while let Some((index, entry)) = self.find_handler(cursor, &condition) {
            let frame = &self.handlers[index];
            match &frame.entries {
                Entries::Exiting(_) => {
                    let target = frame.id;
                    debug!(frame = %target, entry, "exiting handler matched, unwinding");
                    self.abandon(target);
                    return Err(Unwind::Exit {
                        frame: target,
                        entry,
                        condition,
                    });
                }
                Entries::Calling(entries) => {
                    let callback = Rc::clone(&entries[entry].1);
                    debug!(frame = %frame.id, entry, "calling handler matched");
                    self.run_calling(index, &callback, &condition)?;
                    cursor = index;
                }
            }
        }

        self.default_action(condition)
    }

    /// Innermost frame below `cursor` with a matching entry
    fn find_handler(&self, cursor: usize, condition: &Condition) -> Option<(usize, usize)> {
        self.handlers[..cursor]
            .iter()
            .enumerate()
            .rev()
            .find_map(|(index, frame)| frame.match_entry(condition).map(|entry| (index, entry)))
    }

    /// Run a calling handler with frames `index..` hidden
    ///
    /// The hidden frames stay invisible to every raise made by the handler
    /// until it returns. Restarts stay visible.
    ///
    /// A handler that drops an unwind it started returns `Ok` with the frames
    /// outside it already abandoned. The scan cannot resume from there, so the
    /// invocation ends with a `discarded-unwind` abort.
    fn run_calling(&mut self, index: usize, callback: &CallingFn, condition: &Condition) -> Flow<()> {
        let frame = self.handlers[index].id;
        let outer = index.checked_sub(1).map(|below| self.handlers[below].id);

        let hidden = self.handlers.split_off(index);
        let outcome = callback(self, condition);

        let intact = self.handlers.len() >= index
            && outer.map_or(true, |outer| self.handlers[index - 1].id == outer);
        self.handlers.truncate(index);
        self.handlers.extend(hidden);

        match outcome {
            Err(unwind) => {
                self.abandon(unwind.cutoff());
                Err(unwind)
            }
            Ok(()) if intact => Ok(()),
            Ok(()) => Err(self.discarded_unwind(frame, condition)),
        }
    }

    fn discarded_unwind(&mut self, frame: FrameId, condition: &Condition) -> Unwind {
        warn!(frame = %frame, message = condition.message(), "calling handler discarded an unwind");
        self.abandon(FrameId::ROOT);

        let discarded = Condition::new(
            [tags::DISCARDED_UNWIND, tags::ERROR],
            format!(
                "calling handler {} discarded a non-local exit while handling '{}'",
                frame,
                condition.message()
            ),
        )
        .with_field("frame", frame.get());
        Unwind::Abort(match condition.context() {
            Some(context) => discarded.with_context(context),
            None => discarded,
        })
    }

    /* ===================== Default Actions ===================== */

    fn default_action(&mut self, condition: Condition) -> Flow<Signal> {
        match condition.family() {
            Some(Family::Error) => {
                debug!(message = condition.message(), "unhandled error, aborting invocation");
                self.abandon(FrameId::ROOT);
                Err(Unwind::Abort(condition))
            }
            Some(Family::Interrupt) => {
                debug!("unhandled interrupt, aborting invocation");
                self.abandon(FrameId::ROOT);
                Err(Unwind::Interrupt(condition))
            }
            Some(Family::Warning) => self.default_warning(condition),
            Some(Family::Message) => {
                self.sink.message(&condition);
                Ok(Signal::NoOverride)
            }
            None => Ok(Signal::NoOverride),
        }
    }

    fn default_warning(&mut self, condition: Condition) -> Flow<Signal> {
        match self.settings.policy {
            WarningPolicy::Defer => {
                self.defer_warning(DeferredWarning::from(&condition));
                Ok(Signal::NoOverride)
            }
            WarningPolicy::Immediate => {
                self.sink.warning(&DeferredWarning::from(&condition));
                Ok(Signal::NoOverride)
            }
            WarningPolicy::Escalate => self.raise(escalate(&condition)),
            WarningPolicy::Ignore => Ok(Signal::NoOverride),
        }
    }
}

/// Error raised in place of an unhandled warning
fn escalate(warning: &Condition) -> Condition {
    let original: Vec<Value> = warning
        .classes()
        .iter()
        .map(|tag| Value::from(tag.as_str()))
        .collect();
    let escalated = Condition::new(
        [tags::ESCALATED_WARNING, tags::ERROR],
        format!("(converted from warning) {}", warning.message()),
    )
    .with_payload(warning.payload().clone())
    .with_field("original_classes", original);

    match warning.context() {
        Some(context) => escalated.with_context(context),
        None => escalated,
    }
}

//! Scoped constructs
//!
//! Each construct pushes its frame, runs the body, pops the frame on every
//! exit path and then decides whether the unwind coming out of the body (if
//! any) is addressed to it.

use super::dispatcher::Dispatcher;
use super::types::{CallingFn, Entries, Flow, FrameId, Unwind};
use crate::classes::Family;
use crate::condition::{tags, Condition, Tag};
use serde_json::Value;
use std::rc::Rc;
use tracing::debug;

/* ===================== Handler Sets ===================== */

type ExitingFn<'a, T> = Box<dyn FnOnce(&mut Dispatcher, Condition) -> Flow<T> + 'a>;
type RecoveryFn<'a, T> = Box<dyn FnOnce(&mut Dispatcher, Vec<Value>) -> Flow<T> + 'a>;

/// Ordered entries for an exiting frame
///
/// Declaration order decides precedence: list specific tags before general ones.
pub struct Exiting<'a, T> {
    entries: Vec<(Tag, ExitingFn<'a, T>)>,
}

impl<'a, T> Exiting<'a, T> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Add an entry; the handler runs after unwinding and supplies the construct's value
    pub fn on<F>(mut self, tag: impl Into<Tag>, handler: F) -> Self
    where
        F: FnOnce(&mut Dispatcher, Condition) -> Flow<T> + 'a,
    {
        self.entries.push((tag.into(), Box::new(handler)));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for Exiting<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Ordered entries for a calling frame
///
/// Handlers run in place from inside `raise`. Returning `Ok(())` declines and
/// lets the search continue outward.
#[derive(Default)]
pub struct Calling {
    entries: Vec<(Tag, CallingFn)>,
}

impl Calling {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(mut self, tag: impl Into<Tag>, handler: F) -> Self
    where
        F: Fn(&mut Dispatcher, &Condition) -> Flow<()> + 'static,
    {
        self.entries.push((tag.into(), Rc::new(handler)));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct RestartEntry<'a, T> {
    name: String,
    description: Option<String>,
    recovery: RecoveryFn<'a, T>,
}

/// Restarts established together by one construct
pub struct Restarts<'a, T> {
    entries: Vec<RestartEntry<'a, T>>,
}

impl<'a, T> Restarts<'a, T> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn add<F>(self, name: impl Into<String>, recovery: F) -> Self
    where
        F: FnOnce(&mut Dispatcher, Vec<Value>) -> Flow<T> + 'a,
    {
        self.push(name.into(), None, Box::new(recovery))
    }

    pub fn add_described<F>(self, name: impl Into<String>, description: impl Into<String>, recovery: F) -> Self
    where
        F: FnOnce(&mut Dispatcher, Vec<Value>) -> Flow<T> + 'a,
    {
        self.push(name.into(), Some(description.into()), Box::new(recovery))
    }

    fn push(mut self, name: String, description: Option<String>, recovery: RecoveryFn<'a, T>) -> Self {
        self.entries.push(RestartEntry {
            name,
            description,
            recovery,
        });
        self
    }
}

impl<T> Default for Restarts<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}

/* ===================== Constructs ===================== */

impl Dispatcher {
    /// Run `body` under an exiting frame
    ///
    /// Returns the body's value, or the value of the matched handler after the
    /// body was abandoned.
    pub fn establish_exiting<T, B>(&mut self, handlers: Exiting<'_, T>, body: B) -> Flow<T>
    where
        B: FnOnce(&mut Dispatcher) -> Flow<T>,
    {
        let Exiting { entries } = handlers;
        let tags = entries.iter().map(|(tag, _)| (tag.clone(), ())).collect();
        let id = self.push_handler(Entries::Exiting(tags));

        let outcome = body(self);
        self.pop_handler(id);

        match outcome {
            Err(Unwind::Exit {
                frame,
                entry,
                condition,
            }) if frame == id => match entries.into_iter().nth(entry) {
                Some((_, handler)) => {
                    debug!(frame = %id, entry, "running exiting handler");
                    handler(self, condition)
                }
                None => Err(Unwind::Abort(condition)),
            },
            other => other,
        }
    }

    /// Run `body` under a calling frame; always yields the body's own outcome
    pub fn establish_calling<T, B>(&mut self, handlers: Calling, body: B) -> Flow<T>
    where
        B: FnOnce(&mut Dispatcher) -> Flow<T>,
    {
        let id = self.push_handler(Entries::Calling(handlers.entries));
        let outcome = body(self);
        self.pop_handler(id);
        outcome
    }

    /// Run `body` with several restarts visible
    ///
    /// Invoking one of them resumes here: the recovery's value becomes this
    /// call's value.
    pub fn with_restarts<T, B>(&mut self, restarts: Restarts<'_, T>, body: B) -> Flow<T>
    where
        B: FnOnce(&mut Dispatcher) -> Flow<T>,
    {
        let Restarts { entries } = restarts;
        let owner = self.push_restarts(
            entries
                .iter()
                .map(|entry| (entry.name.clone(), entry.description.clone()))
                .collect(),
        );

        let outcome = body(self);
        self.pop_restarts(owner);

        match outcome {
            Err(Unwind::Restart {
                owner: target,
                index,
                name,
                args,
            }) if target == owner => match entries.into_iter().nth(index) {
                Some(entry) => {
                    debug!(frame = %owner, restart = %name, "running restart recovery");
                    (entry.recovery)(self, args)
                }
                None => Err(self.restart_not_found(&name)),
            },
            other => other,
        }
    }

    /// Run `body` with a single named restart visible
    pub fn establish_restart<T, R, B>(&mut self, name: impl Into<String>, recovery: R, body: B) -> Flow<T>
    where
        R: FnOnce(&mut Dispatcher, Vec<Value>) -> Flow<T>,
        B: FnOnce(&mut Dispatcher) -> Flow<T>,
    {
        self.with_restarts(Restarts::new().add(name, recovery), body)
    }

    /// Transfer control to the innermost visible restart called `name`
    ///
    /// Never returns `Ok`. When no such restart is visible a
    /// `restart-not-found` error is raised instead.
    pub fn invoke_restart<T>(&mut self, name: &str, args: Vec<Value>) -> Flow<T> {
        let found = self
            .restarts
            .iter()
            .rev()
            .find(|frame| frame.name == name)
            .map(|frame| (frame.owner, frame.index));
        let Some((owner, index)) = found else {
            return Err(self.restart_not_found(name));
        };
        debug!(restart = name, frame = %owner, "invoking restart");
        self.abandon(owner);
        Err(Unwind::Restart {
            owner,
            index,
            name: name.to_string(),
            args,
        })
    }

    /// Invoke `name` if it is visible, otherwise do nothing
    pub fn try_invoke_restart(&mut self, name: &str, args: Vec<Value>) -> Flow<()> {
        if self.find_restart(name).is_some() {
            self.invoke_restart(name, args)
        } else {
            Ok(())
        }
    }

    fn restart_not_found(&mut self, name: &str) -> Unwind {
        let condition = Condition::custom(
            [tags::RESTART_NOT_FOUND],
            Family::Error,
            format!("no restart '{}' found", name),
        )
        .with_field("restart", name);

        match self.raise(condition.clone()) {
            Err(unwind) => unwind,
            Ok(_) => {
                self.abandon(FrameId::ROOT);
                Unwind::Abort(condition)
            }
        }
    }

    /// Run `cleanup` exactly once after `body`, however `body` exits
    ///
    /// An unwind started by the cleanup itself replaces the body's outcome.
    pub fn with_finally<T, B, C>(&mut self, body: B, cleanup: C) -> Flow<T>
    where
        B: FnOnce(&mut Dispatcher) -> Flow<T>,
        C: FnOnce(&mut Dispatcher) -> Flow<()>,
    {
        let outcome = body(self);
        cleanup(self)?;
        outcome
    }

    /// First condition raised by `body`, or `None` if it completes without raising
    ///
    /// Nothing after the raise point inside `body` runs.
    pub fn capture_first<R, B>(&mut self, body: B) -> Flow<Option<Condition>>
    where
        B: FnOnce(&mut Dispatcher) -> Flow<R>,
    {
        self.establish_exiting(
            Exiting::new().on(tags::CONDITION, |_, condition| Ok(Some(condition))),
            |d| body(d).map(|_| None),
        )
    }
}

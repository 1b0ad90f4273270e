//! Conveniences composed from the scoped constructs

use super::{MUFFLE_MESSAGE, MUFFLE_WARNING};
use crate::condition::{tags, Condition};
use crate::runtime::{Calling, Dispatcher, Exiting, Flow};

/// `body`'s value, or `default` if it raises an error
pub fn try_or<T, B>(d: &mut Dispatcher, default: T, body: B) -> Flow<T>
where
    B: FnOnce(&mut Dispatcher) -> Flow<T>,
{
    d.establish_exiting(Exiting::new().on(tags::ERROR, move |_, _| Ok(default)), body)
}

/// `body`'s value, or the error condition it raised
pub fn try_condition<T, B>(d: &mut Dispatcher, body: B) -> Flow<Result<T, Condition>>
where
    B: FnOnce(&mut Dispatcher) -> Flow<T>,
{
    d.establish_exiting(
        Exiting::new().on(tags::ERROR, |_, condition| Ok(Err(condition))),
        |d| body(d).map(Ok),
    )
}

/// Run `body` with warnings muffled where they offer the restart
pub fn suppress_warnings<T, B>(d: &mut Dispatcher, body: B) -> Flow<T>
where
    B: FnOnce(&mut Dispatcher) -> Flow<T>,
{
    d.establish_calling(
        Calling::new().on(tags::WARNING, |d, _| d.try_invoke_restart(MUFFLE_WARNING, Vec::new())),
        body,
    )
}

/// Run `body` with messages muffled where they offer the restart
pub fn suppress_messages<T, B>(d: &mut Dispatcher, body: B) -> Flow<T>
where
    B: FnOnce(&mut Dispatcher) -> Flow<T>,
{
    d.establish_calling(
        Calling::new().on(tags::MESSAGE, |d, _| d.try_invoke_restart(MUFFLE_MESSAGE, Vec::new())),
        body,
    )
}

/// Run `body` with both warnings and messages muffled
pub fn quietly<T, B>(d: &mut Dispatcher, body: B) -> Flow<T>
where
    B: FnOnce(&mut Dispatcher) -> Flow<T>,
{
    suppress_warnings(d, |d| suppress_messages(d, body))
}

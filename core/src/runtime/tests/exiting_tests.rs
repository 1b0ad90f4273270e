//! Tests for exiting handlers and capture_first

use super::helpers::{memory_runtime, EventLog};
use crate::condition::{tags, Condition};
use crate::runtime::stdlib::{message, signal, stop, warning};
use crate::runtime::{Calling, Exiting};

#[test]
fn test_first_listed_entry_wins() {
    let (runtime, _) = memory_runtime();

    let value = runtime
        .invoke(|d| {
            d.establish_exiting(
                Exiting::new()
                    .on(tags::ERROR, |_, _| Ok("h1"))
                    .on(tags::CONDITION, |_, _| Ok("h2")),
                |d| stop(d, "boom"),
            )
        })
        .unwrap()
        .value;
    assert_eq!(value, "h1");
}

#[test]
fn test_general_entry_listed_first_shadows_specific() {
    let (runtime, _) = memory_runtime();

    let value = runtime
        .invoke(|d| {
            d.establish_exiting(
                Exiting::new()
                    .on(tags::CONDITION, |_, _| Ok("h2"))
                    .on(tags::ERROR, |_, _| Ok("h1")),
                |d| stop(d, "boom"),
            )
        })
        .unwrap()
        .value;
    assert_eq!(value, "h2");
}

#[test]
fn test_body_value_when_nothing_raised() {
    let (runtime, _) = memory_runtime();

    let value = runtime
        .invoke(|d| {
            d.establish_exiting(Exiting::new().on(tags::ERROR, |_, _| Ok(0)), |_| Ok(5))
        })
        .unwrap()
        .value;
    assert_eq!(value, 5);
}

#[test]
fn test_code_after_raise_is_skipped() {
    let (runtime, _) = memory_runtime();
    let log = EventLog::default();

    let value = runtime
        .invoke(|d| {
            d.establish_exiting(
                Exiting::new().on(tags::ERROR, |_, condition| {
                    log.push(format!("handler: {}", condition.message()));
                    Ok(-1)
                }),
                |d| {
                    log.push("before");
                    stop::<()>(d, "bad input")?;
                    log.push("after");
                    Ok(1)
                },
            )
        })
        .unwrap()
        .value;

    assert_eq!(value, -1);
    assert_eq!(log.events(), vec!["before", "handler: bad input"]);
}

#[test]
fn test_handler_runs_after_frame_is_gone() {
    let (runtime, _) = memory_runtime();

    let depths = runtime
        .invoke(|d| {
            let outside = d.handler_depth();
            let inside = d.establish_exiting(
                Exiting::new().on(tags::ERROR, |d, _| Ok(d.handler_depth())),
                |d| stop(d, "boom"),
            )?;
            Ok((outside, inside, d.handler_depth()))
        })
        .unwrap()
        .value;
    assert_eq!(depths, (0, 0, 0));
}

#[test]
fn test_unmatched_class_passes_to_outer_frame() {
    let (runtime, _) = memory_runtime();

    let value = runtime
        .invoke(|d| {
            d.establish_exiting(
                Exiting::new().on(tags::ERROR, |_, condition| Ok(format!("outer: {}", condition.message()))),
                |d| {
                    d.establish_exiting(
                        Exiting::new().on(tags::WARNING, |_, _| Ok("inner".to_string())),
                        |d| stop(d, "disk full"),
                    )
                },
            )
        })
        .unwrap()
        .value;
    assert_eq!(value, "outer: disk full");
}

#[test]
fn test_inner_frame_takes_precedence() {
    let (runtime, _) = memory_runtime();

    let value = runtime
        .invoke(|d| {
            d.establish_exiting(Exiting::new().on(tags::ERROR, |_, _| Ok("outer")), |d| {
                d.establish_exiting(Exiting::new().on(tags::ERROR, |_, _| Ok("inner")), |d| {
                    stop(d, "boom")
                })
            })
        })
        .unwrap()
        .value;
    assert_eq!(value, "inner");
}

#[test]
fn test_error_from_handler_goes_outward() {
    let (runtime, _) = memory_runtime();

    let value = runtime
        .invoke(|d| {
            d.establish_exiting(
                Exiting::new().on(tags::ERROR, |_, condition| Ok(condition.message().to_string())),
                |d| {
                    d.establish_exiting(
                        Exiting::new().on(tags::ERROR, |d, _| stop(d, "rethrown")),
                        |d| stop(d, "original"),
                    )
                },
            )
        })
        .unwrap()
        .value;
    assert_eq!(value, "rethrown");
}

#[test]
fn test_custom_class_matched_by_tag() {
    let (runtime, _) = memory_runtime();

    let value = runtime
        .invoke(|d| {
            d.establish_exiting(
                Exiting::new()
                    .on("http-timeout", |_, condition| {
                        Ok(condition.field("seconds").and_then(|v| v.as_u64()))
                    })
                    .on(tags::ERROR, |_, _| Ok(None)),
                |d| {
                    let timeout = Condition::custom(["http-timeout"], crate::Family::Error, "timed out")
                        .with_field("seconds", 30);
                    crate::runtime::stdlib::abort(d, timeout)
                },
            )
        })
        .unwrap()
        .value;
    assert_eq!(value, Some(30));
}

#[test]
fn test_exit_through_calling_frame_restores_stack() {
    let (runtime, _) = memory_runtime();
    let log = EventLog::default();
    let seen = log.clone();

    let depth = runtime
        .invoke(|d| {
            d.establish_exiting(Exiting::new().on(tags::WARNING, |d, _| Ok(d.handler_depth())), |d| {
                d.establish_calling(
                    Calling::new().on(tags::WARNING, move |_, condition| {
                        seen.push(condition.message());
                        Ok(())
                    }),
                    |d| {
                        warning(d, "careful")?;
                        Ok(99)
                    },
                )
            })
        })
        .unwrap()
        .value;

    assert_eq!(depth, 0);
    assert_eq!(log.events(), vec!["careful"]);
}

#[test]
fn test_exit_abandons_muffle_restart() {
    let (runtime, _) = memory_runtime();

    let restarts = runtime
        .invoke(|d| {
            d.establish_exiting(Exiting::new().on(tags::WARNING, |_, _| Ok(())), |d| {
                warning(d, "w")?;
                Ok(())
            })?;
            Ok(d.restart_depth())
        })
        .unwrap()
        .value;
    assert_eq!(restarts, 0);
}

#[test]
fn test_capture_first_returns_first_condition() {
    let (runtime, _) = memory_runtime();
    let log = EventLog::default();

    let completion = runtime
        .invoke(|d| {
            d.capture_first(|d| {
                warning(d, "First")?;
                log.push("between");
                warning(d, "Second")?;
                Ok(())
            })
        })
        .unwrap();

    let captured = completion.value.unwrap();
    assert_eq!(captured.message(), "First");
    assert!(captured.inherits(&tags::WARNING));
    assert!(log.events().is_empty());
    assert!(completion.warnings.is_empty());
}

#[test]
fn test_capture_first_skips_message_default_action() {
    let (runtime, sink) = memory_runtime();

    let captured = runtime
        .invoke(|d| d.capture_first(|d| message(d, "hello")))
        .unwrap()
        .value
        .unwrap();
    assert!(captured.inherits(&tags::MESSAGE));
    assert!(sink.messages().is_empty());
}

#[test]
fn test_capture_first_none_without_raise() {
    let (runtime, _) = memory_runtime();

    let captured = runtime
        .invoke(|d| d.capture_first(|_| Ok(3)))
        .unwrap()
        .value;
    assert!(captured.is_none());
}

#[test]
fn test_capture_first_catches_bare_condition() {
    let (runtime, _) = memory_runtime();

    let captured = runtime
        .invoke(|d| d.capture_first(|d| signal(d, Condition::new(["progress"], "50%"))))
        .unwrap()
        .value
        .unwrap();
    assert_eq!(captured.classes()[0], "progress");
    assert_eq!(captured.classes()[1], tags::CONDITION);
}

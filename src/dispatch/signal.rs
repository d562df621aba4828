use super::{AbortUnwind, unwind_to};
use crate::cx::{self, FinalizerGuard, establish_finalizer};
use crate::diagnostics;
use crate::error::Error;
use crate::tracing_compat::{debug, trace};
use crate::types::{Condition, FrameId, InvalidVerdict, Location, Verdict};
use std::panic;
use std::rc::Rc;

/// Signals a condition on the current thread.
///
/// Matching handlers are consulted most recent first. When one answers
/// [`Verdict::Handled`] this function returns normally. When one answers
/// [`Verdict::Abort`], finalizers registered after that handler run in
/// reverse registration order and control resumes at the handler's
/// [`protect`](crate::HandlerGuard::protect) call; this function does not
/// return.
///
/// When no handler handles or aborts, the condition is rendered to the
/// diagnostic sink and the thread's
/// [`FatalAction`](crate::config::FatalAction) runs (by default the process
/// exits with status 1). A handler answering with an invalid verdict code is
/// fatal in the same way.
pub fn signal(name: impl Into<String>, message: impl Into<String>, location: Location) {
    let condition = Rc::new(Condition::new(name, message, location));
    debug!(condition = %condition, "condition signaled");

    // The release finalizer is the condition's owner on the stack: it fires
    // on every exit path, and it bounds the handler search from above.
    let release = hold_condition(&condition);
    let mut below = release.id();

    while let Some((frame, handler)) = cx::find_handler(condition.name(), below) {
        let verdict = handler.handle(&condition);
        trace!(frame = %frame, verdict = ?verdict, "handler consulted");
        match verdict {
            Ok(Verdict::Handled) => {
                release.release();
                return;
            }
            Ok(Verdict::Pass) => below = frame,
            Ok(Verdict::Abort) => abort(frame, condition),
            Err(InvalidVerdict { code }) => {
                release.release();
                fatal(Error::InvalidVerdict {
                    code,
                    condition: Rc::unwrap_or_clone(condition),
                });
            }
        }
    }

    release.release();
    fatal(Error::Unhandled {
        condition: Rc::unwrap_or_clone(condition),
    });
}

fn hold_condition(condition: &Rc<Condition>) -> FinalizerGuard {
    let held = Rc::clone(condition);
    establish_finalizer(move || {
        trace!(condition = %held.name(), "condition released");
        drop(held);
    })
}

fn abort(target: FrameId, condition: Rc<Condition>) -> ! {
    if !cx::is_armed(target) {
        fatal(Error::NoResumption {
            frame: target,
            condition: Rc::unwrap_or_clone(condition),
        });
    }
    unwind_to(target);
    let condition = Rc::unwrap_or_clone(condition);
    panic::resume_unwind(Box::new(AbortUnwind { target, condition }))
}

fn fatal(err: Error) -> ! {
    let config = cx::config();
    diagnostics::terminate(config.sink(), config.fatal_action(), err)
}

#[cfg(test)]
mod tests {
    use crate::config::{ConditionConfig, FatalAction};
    use crate::cx::{configure, establish_finalizer, establish_handler, handler_case, scope_depth};
    use crate::diagnostics::DiagnosticSink;
    use crate::dispatch::Exit;
    use crate::error::Error;
    use crate::test_utils::init_test_logging;
    use crate::types::{Condition, Verdict};
    use std::cell::{Cell, RefCell};
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::rc::Rc;

    fn init_test(name: &str) -> crate::diagnostics::SharedBuffer {
        init_test_logging();
        crate::test_phase!(name);
        let (sink, buffer) = DiagnosticSink::buffer();
        configure(
            ConditionConfig::new()
                .with_fatal_action(FatalAction::Panic)
                .with_sink(sink),
        );
        buffer
    }

    fn fatal_error(body: impl FnOnce()) -> Error {
        let result: std::thread::Result<()> = catch_unwind(AssertUnwindSafe(body));
        *result.unwrap_err().downcast::<Error>().unwrap()
    }

    #[test]
    fn handled_returns_to_signal_site() {
        init_test("handled_returns_to_signal_site");
        let after = Rc::new(Cell::new(false));
        let _h = establish_handler("x", |_: &Condition| Verdict::Handled);
        crate::signal!("x", "m");
        after.set(true);
        assert!(after.get());
        assert_eq!(scope_depth(), 1);
        crate::test_complete!("handled_returns_to_signal_site");
    }

    #[test]
    fn pass_falls_back_to_older_handler() {
        init_test("pass_falls_back_to_older_handler");
        let order = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&order);
        let _outer = establish_handler("x", move |_: &Condition| {
            log.borrow_mut().push("outer");
            Verdict::Handled
        });
        let log = Rc::clone(&order);
        let _unrelated = establish_handler("y", move |_: &Condition| {
            log.borrow_mut().push("unrelated");
            Verdict::Handled
        });
        let log = Rc::clone(&order);
        let _inner = establish_handler("x", move |_: &Condition| {
            log.borrow_mut().push("inner");
            Verdict::Pass
        });
        crate::signal!("x", "m");
        assert_eq!(*order.borrow(), vec!["inner", "outer"]);
        crate::test_complete!("pass_falls_back_to_older_handler");
    }

    #[test]
    fn abort_lands_at_establishment_point() {
        init_test("abort_lands_at_establishment_point");
        let reached = Rc::new(Cell::new(false));
        let flag = Rc::clone(&reached);
        let exit = handler_case("x", |_: &Condition| Verdict::Abort, move || {
            crate::signal!("x", "bail out");
            flag.set(true);
        });
        assert!(!reached.get());
        let cond = exit.aborted().unwrap();
        assert_eq!(cond.name(), "x");
        assert_eq!(cond.message(), "bail out");
        assert_eq!(scope_depth(), 0);
        crate::test_complete!("abort_lands_at_establishment_point");
    }

    #[test]
    fn abort_runs_intervening_finalizers_innermost_first() {
        init_test("abort_runs_intervening_finalizers_innermost_first");
        let order = Rc::new(RefCell::new(Vec::new()));
        let outside = Rc::clone(&order);
        let _before = establish_finalizer(move || outside.borrow_mut().push("outside"));
        let log = Rc::clone(&order);
        let exit = handler_case("x", |_: &Condition| Verdict::Abort, move || {
            let first = Rc::clone(&log);
            let _f1 = establish_finalizer(move || first.borrow_mut().push("f1"));
            let second = Rc::clone(&log);
            let _f2 = establish_finalizer(move || second.borrow_mut().push("f2"));
            crate::signal!("x", "m");
        });
        assert!(exit.is_aborted());
        assert_eq!(*order.borrow(), vec!["f2", "f1"]);
        assert_eq!(scope_depth(), 1);
        crate::test_complete!("abort_runs_intervening_finalizers_innermost_first");
    }

    #[test]
    fn unhandled_condition_is_fatal_with_one_diagnostic() {
        let buffer = init_test("unhandled_condition_is_fatal_with_one_diagnostic");
        let err = fatal_error(|| {
            crate::dispatch::signal("nobody", "listens", crate::types::Location::new("a.rs", 9));
        });
        assert!(matches!(err, Error::Unhandled { .. }));
        assert_eq!(buffer.lines(), vec!["Fatal condition: a.rs:9: nobody:listens"]);
        assert_eq!(scope_depth(), 0);
        crate::test_complete!("unhandled_condition_is_fatal_with_one_diagnostic");
    }

    #[test]
    fn all_handlers_passing_is_fatal() {
        let buffer = init_test("all_handlers_passing_is_fatal");
        let _h = establish_handler("x", |_: &Condition| Verdict::Pass);
        let err = fatal_error(|| crate::signal!("x", "m"));
        assert!(matches!(err, Error::Unhandled { .. }));
        assert_eq!(buffer.lines().len(), 1);
        crate::test_complete!("all_handlers_passing_is_fatal");
    }

    #[test]
    fn invalid_verdict_is_fatal() {
        let buffer = init_test("invalid_verdict_is_fatal");
        let _h = establish_handler("x", |_: &Condition| 17);
        let err = fatal_error(|| crate::signal!("x", "m"));
        assert!(matches!(err, Error::InvalidVerdict { code: 17, .. }));
        assert_eq!(buffer.lines(), vec!["Invalid handler option: 17"]);
        crate::test_complete!("invalid_verdict_is_fatal");
    }

    #[test]
    fn abort_without_protect_is_fatal() {
        let buffer = init_test("abort_without_protect_is_fatal");
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let _h = establish_handler("x", |_: &Condition| Verdict::Abort);
        let _f = establish_finalizer(move || counter.set(counter.get() + 1));
        let err = fatal_error(|| crate::signal!("x", "m"));
        assert!(matches!(err, Error::NoResumption { .. }));
        // No frame was unwound before the error was detected.
        assert_eq!(hits.get(), 0);
        assert_eq!(scope_depth(), 2);
        assert_eq!(buffer.lines().len(), 1);
        crate::test_complete!("abort_without_protect_is_fatal");
    }

    #[test]
    fn handler_signaling_inside_handler() {
        init_test("handler_signaling_inside_handler");
        let inner_seen = Rc::new(Cell::new(false));
        let flag = Rc::clone(&inner_seen);
        let _inner = establish_handler("inner", move |_: &Condition| {
            flag.set(true);
            Verdict::Handled
        });
        let _outer = establish_handler("outer", |_: &Condition| {
            crate::signal!("inner", "nested");
            Verdict::Handled
        });
        crate::signal!("outer", "m");
        assert!(inner_seen.get());
        assert_eq!(scope_depth(), 2);
        crate::test_complete!("handler_signaling_inside_handler");
    }

    #[test]
    fn handlers_registered_by_a_handler_do_not_see_the_condition() {
        init_test("handlers_registered_by_a_handler_do_not_see_the_condition");
        let late_calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&late_calls);
        let _h = establish_handler("x", move |_: &Condition| {
            let counter = Rc::clone(&counter);
            // Leaked on purpose so it outlives this callback.
            std::mem::forget(establish_handler("x", move |_: &Condition| {
                counter.set(counter.get() + 1);
                Verdict::Handled
            }));
            Verdict::Handled
        });
        crate::signal!("x", "m");
        assert_eq!(late_calls.get(), 0);
        crate::test_complete!("handlers_registered_by_a_handler_do_not_see_the_condition");
    }

    #[test]
    fn abort_passes_through_inner_protect() {
        init_test("abort_passes_through_inner_protect");
        let exit: Exit<()> = handler_case("outer", |_: &Condition| Verdict::Abort, || {
            let inner = handler_case("inner", |_: &Condition| Verdict::Abort, || {
                crate::signal!("outer", "skip inner");
            });
            unreachable!("inner protect must re-raise: {inner:?}");
        });
        assert_eq!(
            exit.aborted().map(|c| c.message().to_string()),
            Some("skip inner".to_string())
        );
        assert_eq!(scope_depth(), 0);
        crate::test_complete!("abort_passes_through_inner_protect");
    }

    #[test]
    fn signal_warning_uses_warning_name() {
        init_test("signal_warning_uses_warning_name");
        let seen = Rc::new(RefCell::new(String::new()));
        let log = Rc::clone(&seen);
        let _h = establish_handler(crate::dispatch::WARNING, move |c: &Condition| {
            log.borrow_mut().push_str(c.message());
            Verdict::Handled
        });
        crate::signal_warning!("low {}", "memory");
        assert_eq!(*seen.borrow(), "low memory");
        crate::test_complete!("signal_warning_uses_warning_name");
    }

    #[test]
    fn exit_value_flows_back() {
        init_test("exit_value_flows_back");
        let exit = handler_case("x", |_: &Condition| Verdict::Abort, || 40 + 2);
        assert_eq!(exit, Exit::Completed(42));
        crate::test_complete!("exit_value_flows_back");
    }
}

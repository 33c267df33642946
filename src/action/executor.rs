//! # Action Executor
//!
//! The dispatch engine. Takes the resolved actions for one notification,
//! invokes each through the callback invoker, stages any returned
//! read/write effects on a shared stack, and drains the stack in
//! read-then-write passes.
//!
//! The stack is shared across nested `execute` calls: a write effect that
//! fires a further notification re-enters the executor, which detects the
//! re-entrancy and only appends. Draining belongs exclusively to the
//! outermost call; a pass snapshots the stack length, runs every pending
//! read in order, then every pending write, and entries pushed while a
//! pass runs are picked up by the next pass. After the final pass the
//! stack is cleared and the re-entrancy flag reset, whatever happened in
//! between.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use serde_json::Value;

use super::{invoker, Action, ActionOutcome, EffectFn};
use crate::app::App;

/// Type alias for the per-entry outcome observer to reduce complexity.
pub type OutcomeObserver<'a> = &'a mut dyn FnMut(usize, &ActionOutcome);

/// One staged read/write pair awaiting its drain pass.
struct StagedAction {
    /// Originating notification key, recorded in debug mode.
    origin: Option<String>,
    read: Option<EffectFn>,
    write: Option<EffectFn>,
}

/// The dispatch stack and its re-entrancy guard.
pub struct Dispatcher {
    stack: Mutex<Vec<StagedAction>>,
    draining: AtomicBool,
    debug: bool,
}

impl Dispatcher {
    pub fn new(debug: bool) -> Self {
        Self {
            stack: Mutex::new(Vec::new()),
            draining: AtomicBool::new(false),
            debug,
        }
    }

    /// Execute the resolved actions for one notification.
    ///
    /// Actions are invoked in order with `(key, data)`. The optional
    /// `observer` is called with `(index, outcome)` for every non-empty
    /// outcome before it is staged. If this call is nested inside an
    /// in-flight drain, the staged effects are left for the outer call's
    /// next pass; otherwise this call drains until the stack is exhausted.
    pub fn execute(
        &self,
        app: &App,
        actions: Vec<Action>,
        key: &str,
        data: &Value,
        mut observer: Option<OutcomeObserver<'_>>,
    ) {
        let nested = self.draining.swap(true, Ordering::SeqCst);

        for (index, action) in actions.into_iter().enumerate() {
            let outcome = invoker::invoke(app, action, key, data);
            if !outcome.is_none() {
                if let Some(observe) = observer.as_mut() {
                    observe(index, &outcome);
                }
            }
            let staged = match outcome {
                ActionOutcome::None => continue,
                ActionOutcome::Write(write) => StagedAction {
                    origin: self.origin(key),
                    read: None,
                    write: Some(write),
                },
                ActionOutcome::ReadWrite { read, write } => StagedAction {
                    origin: self.origin(key),
                    read,
                    write: Some(write),
                },
            };
            self.lock_stack().push(staged);
        }

        if nested {
            return;
        }

        self.drain(app);

        self.lock_stack().clear();
        self.draining.store(false, Ordering::SeqCst);
    }

    /// Run read-then-write passes until no new entries appear.
    ///
    /// The stack mutex is never held while an effect runs: effects may
    /// notify, which re-enters `execute` and appends.
    fn drain(&self, app: &App) {
        let mut cursor = 0usize;
        loop {
            let end = self.lock_stack().len();
            if end <= cursor {
                break;
            }
            if self.debug {
                tracing::debug!(from = cursor, to = end, "drain pass");
            }
            for index in cursor..end {
                let (origin, read) = {
                    let mut stack = self.lock_stack();
                    (stack[index].origin.clone(), stack[index].read.take())
                };
                if let Some(effect) = read {
                    if self.debug {
                        tracing::debug!(index, origin = origin.as_deref(), "read");
                    }
                    effect(app);
                }
            }
            for index in cursor..end {
                let (origin, write) = {
                    let mut stack = self.lock_stack();
                    (stack[index].origin.clone(), stack[index].write.take())
                };
                if let Some(effect) = write {
                    if self.debug {
                        tracing::debug!(index, origin = origin.as_deref(), "write");
                    }
                    effect(app);
                }
            }
            cursor = end;
        }
    }

    fn origin(&self, key: &str) -> Option<String> {
        self.debug.then(|| key.to_string())
    }

    fn lock_stack(&self) -> std::sync::MutexGuard<'_, Vec<StagedAction>> {
        self.stack.lock().expect("dispatch stack poisoned")
    }

    /// Number of staged entries (diagnostics and tests).
    pub fn pending(&self) -> usize {
        self.lock_stack().len()
    }

    /// Originating notification key of each staged entry. Tags are only
    /// recorded in debug mode; otherwise every slot is `None`.
    pub fn staged_origins(&self) -> Vec<Option<String>> {
        self.lock_stack()
            .iter()
            .map(|staged| staged.origin.clone())
            .collect()
    }

    /// Whether a drain is currently in flight.
    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::Value;

    use super::*;
    use crate::action::ActionOutcome;
    use crate::app::App;
    use crate::config::AppConfig;

    type Log = Arc<Mutex<Vec<String>>>;

    fn test_app() -> App {
        App::builder().build()
    }

    fn record(log: &Log, entry: &str) {
        log.lock().unwrap().push(entry.to_string());
    }

    fn read_write_action(log: Log, tag: &'static str) -> Action {
        let read_log = log.clone();
        Action::Ready(ActionOutcome::read_write(
            move |_| record(&read_log, &format!("read:{tag}")),
            move |_| record(&log, &format!("write:{tag}")),
        ))
    }

    #[test]
    fn execute_should_run_reads_before_writes_within_a_pass() {
        let app = test_app();
        let log: Log = Arc::new(Mutex::new(Vec::new()));

        let actions = vec![
            read_write_action(log.clone(), "a"),
            read_write_action(log.clone(), "b"),
        ];
        app.dispatcher().execute(&app, actions, "test", &Value::Null, None);

        assert_eq!(
            *log.lock().unwrap(),
            vec!["read:a", "read:b", "write:a", "write:b"]
        );
    }

    #[test]
    fn execute_should_wrap_bare_write() {
        let app = test_app();
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let write_log = log.clone();

        let actions = vec![Action::Ready(ActionOutcome::write(move |_| {
            record(&write_log, "write:only");
        }))];
        app.dispatcher().execute(&app, actions, "test", &Value::Null, None);

        assert_eq!(*log.lock().unwrap(), vec!["write:only"]);
    }

    #[test]
    fn entries_pushed_during_a_pass_should_run_in_the_next_pass() {
        let app = test_app();
        let log: Log = Arc::new(Mutex::new(Vec::new()));

        // The write of the first wave notifies again, staging a second
        // wave; its effects must not interleave with the first pass.
        let wave_log = log.clone();
        let first_wave = Action::Ready(ActionOutcome::read_write(
            {
                let log = log.clone();
                move |_| record(&log, "read:1")
            },
            move |app: &App| {
                record(&wave_log, "write:1");
                let inner = wave_log.clone();
                app.dispatcher().execute(
                    app,
                    vec![Action::Ready(ActionOutcome::read_write(
                        {
                            let log = inner.clone();
                            move |_| record(&log, "read:2")
                        },
                        move |_| record(&inner, "write:2"),
                    ))],
                    "nested",
                    &Value::Null,
                    None,
                );
            },
        ));

        app.dispatcher()
            .execute(&app, vec![first_wave], "test", &Value::Null, None);

        assert_eq!(
            *log.lock().unwrap(),
            vec!["read:1", "write:1", "read:2", "write:2"]
        );
    }

    #[test]
    fn nested_execute_should_only_append() {
        let app = test_app();
        let log: Log = Arc::new(Mutex::new(Vec::new()));

        let outer_log = log.clone();
        let outer = Action::Ready(ActionOutcome::write(move |app: &App| {
            record(&outer_log, "outer");
            let inner_log = outer_log.clone();
            app.dispatcher().execute(
                app,
                vec![Action::Ready(ActionOutcome::write(move |_| {
                    record(&inner_log, "inner");
                }))],
                "nested",
                &Value::Null,
                None,
            );
            // The nested call must not have drained anything itself.
            assert_eq!(app.dispatcher().pending(), 2);
            assert!(app.dispatcher().is_draining());
        }));

        app.dispatcher()
            .execute(&app, vec![outer], "test", &Value::Null, None);

        assert_eq!(*log.lock().unwrap(), vec!["outer", "inner"]);
        assert_eq!(app.dispatcher().pending(), 0);
        assert!(!app.dispatcher().is_draining());
    }

    #[test]
    fn stack_and_flag_should_reset_after_outer_call() {
        let app = test_app();
        let actions = vec![
            Action::Ready(ActionOutcome::write(|_| {})),
            Action::Ready(ActionOutcome::read_write(|_| {}, |_| {})),
        ];
        app.dispatcher().execute(&app, actions, "test", &Value::Null, None);

        assert_eq!(app.dispatcher().pending(), 0);
        assert!(!app.dispatcher().is_draining());
    }

    #[test]
    fn debug_mode_should_tag_staged_actions_with_their_key() {
        let app = App::builder()
            .with_config(AppConfig {
                debug: true,
                ..AppConfig::default()
            })
            .build();

        // The stack still holds the entry while its own write runs, so
        // the tag is observable from inside the effect.
        let seen: Arc<Mutex<Vec<Option<String>>>> = Arc::new(Mutex::new(Vec::new()));
        let capture = seen.clone();
        let actions = vec![Action::Ready(ActionOutcome::write(move |app: &App| {
            *capture.lock().unwrap() = app.dispatcher().staged_origins();
        }))];
        app.dispatcher()
            .execute(&app, actions, "user.signedIn", &Value::Null, None);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![Some("user.signedIn".to_string())]
        );
    }

    #[test]
    fn origins_should_stay_untagged_without_debug() {
        let app = test_app();

        let seen: Arc<Mutex<Vec<Option<String>>>> = Arc::new(Mutex::new(Vec::new()));
        let capture = seen.clone();
        let actions = vec![Action::Ready(ActionOutcome::write(move |app: &App| {
            *capture.lock().unwrap() = app.dispatcher().staged_origins();
        }))];
        app.dispatcher()
            .execute(&app, actions, "user.signedIn", &Value::Null, None);

        assert_eq!(*seen.lock().unwrap(), vec![None]);
    }

    #[test]
    fn observer_should_see_non_empty_outcomes_only() {
        let app = test_app();
        let mut seen = Vec::new();

        let actions = vec![
            Action::Ready(ActionOutcome::None),
            Action::Ready(ActionOutcome::write(|_| {})),
            Action::Ready(ActionOutcome::read_write(|_| {}, |_| {})),
        ];
        let mut observer = |index: usize, outcome: &ActionOutcome| {
            seen.push((index, format!("{outcome:?}")));
        };
        app.dispatcher()
            .execute(&app, actions, "test", &Value::Null, Some(&mut observer));

        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, 1);
        assert_eq!(seen[1].0, 2);
    }
}

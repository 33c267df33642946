//! # Callback Invoker
//!
//! The single choke point through which every resolved action is called.
//! Handler failures stop here: an `Err` is logged with its message and the
//! originating key, then reduced to a no-op outcome, so one failing handler
//! never takes down its siblings or an in-flight drain pass.

use serde_json::Value;

use super::{Action, ActionOutcome};
use crate::app::App;

/// Invoke one action entry with the notification key and data bag.
///
/// `Ready` entries are already-resolved outcomes and pass through
/// unchanged. `Handler` entries are called; a handler error is logged and
/// converted to [`ActionOutcome::None`].
pub fn invoke(app: &App, action: Action, key: &str, data: &Value) -> ActionOutcome {
    match action {
        Action::Ready(outcome) => outcome,
        Action::Handler(handler) => match handler(app, key, data) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(key, error = %err, "action handler failed");
                ActionOutcome::None
            }
        },
    }
}

//! # Mediator
//!
//! The page-transition state machine. Exactly one transition may be in
//! flight at a time, enforced by a single loading guard; the current-page
//! pointer is empty only between the completion of the outgoing page's
//! `leave` and the completion of the destination's `enter`.
//!
//! A transition runs: guard checks, route resolution, optional fetch and
//! graft of the destination's content, then the leave/enter sequence. The
//! leave and enter halves are independent continuations run concurrently;
//! neither waits for the other to finish, which lets leave and enter
//! animations overlap. Every terminal failure releases the loading guard
//! and is reported as a notification, never as an error value.

use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use crate::app::App;
use crate::notification;
use crate::page::{PageData, PageInstance};

/// Options for a `goto` request.
pub struct GotoOptions {
    /// URL popped from history when the transition was driven by
    /// back/forward navigation; suppresses the history push.
    pub popped_url: Option<String>,
    /// Data bag handed to the destination's `enter`.
    pub page_data: Option<PageData>,
    /// Whether to push a history entry for the transition.
    pub change_url: bool,
}

impl Default for GotoOptions {
    fn default() -> Self {
        Self {
            popped_url: None,
            page_data: None,
            change_url: true,
        }
    }
}

#[derive(Default)]
struct MediatorState {
    current: Option<Arc<PageInstance>>,
    previous: Option<Arc<PageInstance>>,
    previous_url: String,
    loading: bool,
}

/// Owner of the current/previous page pointers and the transition guard.
pub struct Mediator {
    state: Mutex<MediatorState>,
}

impl Mediator {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MediatorState::default()),
        }
    }

    /// The current page, or `None` while a transition is between its
    /// leave and enter completions.
    pub fn current_page(&self) -> Option<Arc<PageInstance>> {
        self.lock().current.clone()
    }

    /// The page left by the most recent completed transition.
    pub fn previous_page(&self) -> Option<Arc<PageInstance>> {
        self.lock().previous.clone()
    }

    /// The URL associated with the previous page.
    pub fn previous_url(&self) -> String {
        self.lock().previous_url.clone()
    }

    /// Whether a transition is in flight.
    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    /// Escape hatch assigning the current page directly. Used by
    /// application bootstrap and tests; everything else goes through
    /// [`goto`](Self::goto).
    pub fn reset_current(&self, page: Option<Arc<PageInstance>>) {
        let mut state = self.lock();
        state.current = page;
        state.loading = false;
    }

    /// Run one page transition.
    pub(crate) async fn goto(&self, app: &App, target: &str, options: GotoOptions) {
        // Guards: one transition at a time, and the current page must
        // agree to be left.
        {
            let state = self.lock();
            if state.loading {
                tracing::warn!(route = target, "transition already in flight, goto rejected");
                return;
            }
            if let Some(current) = &state.current {
                if !current.can_leave() {
                    tracing::debug!(page = current.key(), "current page refuses to leave");
                    return;
                }
            }
        }

        let Some(destination) = app.pages().find_page(target) else {
            tracing::warn!(route = target, "no model claims route");
            app.notify(
                notification::PAGE_ROUTE_NOT_FOUND,
                &json!({ "route": target }),
            );
            return;
        };

        if !destination.can_enter() {
            tracing::debug!(page = destination.key(), "destination refuses entry");
            return;
        }

        if let Some(current) = self.current_page() {
            if Arc::ptr_eq(&current, &destination) || current.key() == destination.key() {
                app.notify(
                    notification::PAGE_NAVIGATE_TO_CURRENT,
                    &json!({ "route": target }),
                );
                return;
            }
        }

        self.lock().loading = true;
        if options.change_url && options.popped_url.is_none() {
            app.history().push_state(target);
        }

        if !app.dom().has_node(destination.selector()) {
            if !self.fetch_and_graft(app, target, &destination).await {
                return;
            }
        }

        let data = options
            .page_data
            .unwrap_or_else(|| PageData::new(destination.key()));
        self.swap(app, destination, data, options.popped_url).await;
    }

    /// Fetch the destination's content and graft it into the application
    /// root. `false` aborts the transition; the guard is released on
    /// every failure path.
    async fn fetch_and_graft(
        &self,
        app: &App,
        target: &str,
        destination: &Arc<PageInstance>,
    ) -> bool {
        let loaded = match app.loader().load(target).await {
            Ok(loaded) => loaded,
            Err(err) => {
                self.lock().loading = false;
                app.notify(
                    notification::PAGE_LOAD_ERROR,
                    &json!({ "route": target, "error": err.to_string() }),
                );
                return false;
            }
        };

        match app
            .dom()
            .graft_hidden(&loaded.body, destination.selector(), &app.config().app_root)
        {
            Err(err) => {
                tracing::error!(route = target, error = %err, "fetched content failed to parse");
                self.lock().loading = false;
                app.notify(
                    notification::PAGE_PARSE_ERROR,
                    &json!({ "route": target, "error": err.to_string() }),
                );
                false
            }
            Ok(false) => {
                tracing::warn!(
                    route = target,
                    selector = destination.selector(),
                    "content node missing from fetched payload"
                );
                self.lock().loading = false;
                app.notify(notification::PAGE_NOT_FOUND, &json!({ "route": target }));
                false
            }
            Ok(true) => {
                app.notify(
                    notification::PAGE_LOADED,
                    &json!({
                        "route": target,
                        "url": loaded.url,
                        "status": loaded.status,
                        "redirected": loaded.redirected,
                    }),
                );
                true
            }
        }
    }

    /// The leave/enter sequence. The two halves are started together and
    /// each closes out its own side of the transition when its page's
    /// continuation completes.
    async fn swap(
        &self,
        app: &App,
        destination: Arc<PageInstance>,
        mut data: PageData,
        popped_url: Option<String>,
    ) {
        if destination.mark_initialized() {
            destination.lifecycle().init(app);
            data.set_flag("firstTime", true);
        }

        let outgoing = self.current_page();
        let payload = transition_payload(outgoing.as_deref(), &destination);

        app.notify(notification::PAGE_LEAVING, &payload);

        let leave_half = async {
            if let Some(out) = &outgoing {
                out.lifecycle().leave(app).await;
            }
            {
                let mut state = self.lock();
                // The enter half may already have completed; only clear
                // the pointer while it still names the outgoing page.
                let still_outgoing = match (&state.current, &outgoing) {
                    (Some(current), Some(out)) => Arc::ptr_eq(current, out),
                    _ => false,
                };
                if still_outgoing {
                    state.current = None;
                }
                state.previous_url = match (&popped_url, &outgoing) {
                    (Some(popped), _) => popped.clone(),
                    (None, Some(out)) => out.key().to_string(),
                    (None, None) => String::new(),
                };
                state.previous = outgoing.clone();
            }
            app.notify(notification::PAGE_LEAVE, &payload);
        };

        let enter_half = async {
            app.notify(notification::PAGE_ENTERING, &payload);
            destination.lifecycle().enter(app, &data).await;
            {
                let mut state = self.lock();
                state.current = Some(destination.clone());
                state.loading = false;
            }
            app.notify(notification::PAGE_ENTER, &payload);
        };

        tokio::join!(leave_half, enter_half);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MediatorState> {
        self.state.lock().expect("mediator state poisoned")
    }
}

impl Default for Mediator {
    fn default() -> Self {
        Self::new()
    }
}

fn transition_payload(outgoing: Option<&PageInstance>, destination: &PageInstance) -> Value {
    json!({
        "from": outgoing.map(PageInstance::key),
        "to": destination.key(),
    })
}

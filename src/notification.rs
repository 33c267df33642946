//! Notification keys fired by the framework itself.
//!
//! Every transition outcome, success or failure, is reported as a
//! notification rather than an error value, so that any page or module
//! listening on these keys can react (show a 404, kick off an animation,
//! record analytics). Dotted keys resolve through nested handler bags, so a
//! module may register either a flat `"page.enter"` entry or a `"page"`
//! group with an `"enter"` member.

/// Fired once at the end of [`App::start`](crate::app::App::start).
pub const APP_INIT: &str = "app.init";

/// The outgoing page's `leave` is about to be invoked.
pub const PAGE_LEAVING: &str = "page.leaving";

/// The outgoing page finished leaving; `current_page` is now empty.
pub const PAGE_LEAVE: &str = "page.leave";

/// The destination page's `enter` is about to be invoked.
pub const PAGE_ENTERING: &str = "page.entering";

/// The destination page finished entering and is now current.
pub const PAGE_ENTER: &str = "page.enter";

/// Fetched content was grafted into the application root.
pub const PAGE_LOADED: &str = "page.loaded";

/// The network fetch for the destination page failed.
pub const PAGE_LOAD_ERROR: &str = "page.loadError";

/// The fetched payload parsed, but the destination's content node was not
/// in it.
pub const PAGE_NOT_FOUND: &str = "page.notFound";

/// The fetched payload could not be parsed as a document fragment.
pub const PAGE_PARSE_ERROR: &str = "page.parseError";

/// No registered model claims the requested route.
pub const PAGE_ROUTE_NOT_FOUND: &str = "page.routeNotFound";

/// A `goto` targeted the page that is already current.
pub const PAGE_NAVIGATE_TO_CURRENT: &str = "page.navigateToCurrent";

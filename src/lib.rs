//! # pageflow — SPA micro-framework core
//!
//! A client-side single-page-application core: one current page at a
//! time, transitions that fetch and graft content through injected
//! collaborators, and notification dispatch to handlers contributed by
//! the current page and by long-lived singleton modules.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐  notify(key, data)  ┌────────────────────────────┐
//! │   caller   │────────────────────▶│            App             │
//! └────────────┘                     │  resolver ── registries    │
//!        │ goto(target)              │      │                     │
//!        ▼                           │      ▼                     │
//! ┌────────────┐  leave/enter        │  Dispatcher                │
//! │  Mediator  │────────────────────▶│  (read/write stack,        │
//! │ (one page  │  notifications      │   re-entrancy guard)       │
//! │  in flight)│                     └────────────────────────────┘
//! └────────────┘
//!        │ fetch / graft / history
//!        ▼
//! ┌──────────────────────────────┐
//! │ collaborators (injected):    │
//! │ Loader · Dom · History ·     │
//! │ Storage                      │
//! └──────────────────────────────┘
//! ```
//!
//! Everything stateful hangs off one [`App`] instance; there are no
//! globals, so independent instances coexist freely (the property the
//! test suite leans on throughout).

pub mod action;
pub mod app;
pub mod collab;
pub mod config;
pub mod error;
pub mod mediator;
pub mod notification;
pub mod page;
pub mod registry;

pub use action::executor::Dispatcher;
pub use action::resolver::ActionResolver;
pub use action::{Action, ActionMap, ActionNode, ActionOutcome, BagBuilder, HandlerBag, HandlerFn};
pub use app::{App, AppBuilder};
pub use collab::{
    Dom, History, HistoryChange, HttpLoader, LoadedPage, Loader, MemoryDom, MemoryHistory,
    MemoryStorage, StaticLoader, Storage,
};
pub use config::AppConfig;
pub use error::{DomError, HandlerError, LoadError};
pub use mediator::{GotoOptions, Mediator};
pub use page::{DefaultPage, ModelSource, PageData, PageInstance, PageLifecycle};
pub use registry::{Module, ModuleRegistry, PageRegistry, RoutePattern};

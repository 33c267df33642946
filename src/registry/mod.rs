//! # Registries
//!
//! The two long-lived lookup structures of the framework: singleton
//! modules and page models/instances, plus the route-pattern matching the
//! page registry scans with.

pub mod modules;
pub mod pages;
pub mod routes;

pub use modules::{Module, ModuleRegistry};
pub use pages::PageRegistry;
pub use routes::{match_route, RoutePattern};

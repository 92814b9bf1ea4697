//! Terminal dashboard client for a tweet-archiver's JSON endpoints.
//!
//! The [`dashboard`] core holds widget state and never performs I/O; the
//! [`runtime`] executes its fetches through a [`client::Backend`] and feeds the
//! completions back in arrival order.

pub mod cli;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod logging;
pub mod pager;
pub mod refresher;
pub mod render;
pub mod runtime;
pub mod widgets;

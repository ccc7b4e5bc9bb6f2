//! # rtriage-helpers
//!
//! Helper operator framework for the rtriage ingestion core.
//!
//! A *helper* is a one-line declarative expression (`s_up`, `i_calc/sum/2`,
//! `r_ext/$msg/(\d+)`, …) that compiles into a reusable per-event
//! transformation [`Term`]. Compilation follows a strict two-tier model:
//!
//! - **Build time**: [`build_helper`] validates arity, parameter kinds and
//!   operator-specific constraints (regex syntax, trim sides, literal zero
//!   divisors). Invalid definitions fail here, as a structured
//!   [`BuildError`], and never reach the hot path.
//! - **Event time**: the compiled term applies its captured configuration
//!   to one [`Document`](rtriage_event::Document) and reports
//!   [`TermResult::Success`] or [`TermResult::Failure`] with a
//!   human-readable trace. Terms never panic on malformed events.
//!
//! Parameters are classified by a leading `$` sigil: `$user.name` is a
//! reference resolved against the event per application, anything else is a
//! literal captured at build time.
//!
//! ## Quick start
//!
//! ```rust
//! use rtriage_event::Document;
//! use rtriage_helpers::{Definition, build_helper};
//!
//! let def = Definition::new("out", "s_concat", &["$user.name", "@", "host1"]);
//! let term = build_helper(&def).unwrap();
//!
//! let mut event = Document::from_json_str(r#"{"user": {"name": "root"}}"#).unwrap();
//! assert!(term.apply(&mut event).is_success());
//! assert_eq!(event.get_string("/out"), Some("root@host1"));
//! ```

pub mod builder;
pub mod error;
mod ops;
pub mod param;
pub mod term;

pub use builder::{Definition, build_helper, helper_names};
pub use error::{BuildError, Result};
pub use param::{Parameter, to_pointer};
pub use term::{Operation, Term, TermResult};

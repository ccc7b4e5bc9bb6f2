//! # rtriage-event
//!
//! Event document model for the rtriage ingestion core.
//!
//! An event is a JSON tree addressed by pointer paths (`/user/login/name`).
//! [`Document`] wraps an owned [`serde_json::Value`] and provides the typed
//! accessors the routing and helper layers are built on: reads that return
//! `None` on a missing path *or* a type mismatch, writes that create
//! intermediate objects, array upsert-and-append, erase, and destructive
//! merge.
//!
//! ## Quick start
//!
//! ```rust
//! use rtriage_event::Document;
//!
//! let mut event = Document::from_json_str(r#"{"user": {"name": "root"}}"#).unwrap();
//! assert_eq!(event.get_string("/user/name"), Some("root"));
//!
//! event.set_int("/attempts", 3).unwrap();
//! event.append_string("/tags", "auth").unwrap();
//! assert!(event.erase("/user/name"));
//! assert_eq!(event.get_string("/user/name"), None);
//! ```

pub mod document;
pub mod error;

pub use document::{Document, ValueKind};
pub use error::{DocumentError, Result};

//! Replacements for the legacy intrusive-list container idioms (§4.1.2).
//!
//! Most "lists" in the data model (outline children, word/row lists) are
//! plain owning `Vec<T>` since no cyclic splice is required there. The one
//! place that genuinely needs ring splicing — a `TessLine`'s `EdgePoint`
//! ring, across chopping join/break — uses [`cycle_list::CycleList`].

pub mod cycle_list;

pub use cycle_list::{CycleList, Cursor, NodeId};

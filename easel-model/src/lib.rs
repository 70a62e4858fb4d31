//! # Easel Model
//!
//! Plain data types shared across the Easel image studio: the persisted
//! [`HistoryRecord`], the [`HistoryKind`] of operation that produced it, and
//! record id generation.
//!
//! This crate performs no I/O; the durable store and caches live in
//! `easel-core`.

#![cfg_attr(docsrs, feature(doc_cfg))]

/// History record types and record id generation.
pub mod history;

pub use history::{
    HistoryKind, HistoryRecord, ParseHistoryKindError, RecordParameters,
    generate_record_id,
};

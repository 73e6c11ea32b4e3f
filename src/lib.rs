//! AI Digest - a twice-daily AI news snapshot
//!
//! This crate fetches a fixed set of RSS/Atom feeds, keeps the items that are
//! about AI, removes duplicates, and writes the newest ones into the morning or
//! evening bucket of a JSON snapshot read by the site.

pub mod config;
pub mod dedup;
pub mod error;
pub mod fetcher;
pub mod filter;
pub mod normalize;
pub mod pipeline;
pub mod rank;
pub mod slot;
pub mod snapshot;

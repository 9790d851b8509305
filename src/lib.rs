//! sparkmon - live terminal sparklines for JSON metrics endpoints.
//!
//! Endpoints are polled by per-endpoint worker threads ([`fetcher`]), values
//! are kept in fixed-size ring buffers ([`series`]) and drawn as a grid of
//! sparkline panels ([`layout`], [`tui`]).

pub mod config;
pub mod fetcher;
pub mod fmt;
pub mod layout;
pub mod series;
pub mod tui;

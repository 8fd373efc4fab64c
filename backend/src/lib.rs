//! Chess Game API backend.
//!
//! Clients play against an automated opponent through a stateless HTTP
//! API: create a game, submit moves, read updated state, optionally get
//! commentary on the position. Sessions live in process memory; the
//! opponent is an external UCI engine, commentary an external HTTP
//! service.

pub mod api;
pub mod config;
pub mod engines;
pub mod error;
pub mod notation;
pub mod rules;
pub mod session;
pub mod view;

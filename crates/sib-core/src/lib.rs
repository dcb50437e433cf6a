//! Core types and trait definitions for the sib social-graph backend.
//!
//! This crate is deliberately free of HTTP and database dependencies. It
//! holds the domain model, the [`store::SocialStore`] trait implemented by
//! storage backends, and the services that own the domain invariants:
//! [`graph::FriendGraph`] (friendship edges and counters),
//! [`feed::FeedAggregator`] (visibility, pagination and the comments+tags
//! fan-out) and [`accounts::Accounts`] (registration and profile upkeep).

pub mod accounts;
pub mod error;
pub mod feed;
pub mod graph;
pub mod post;
pub mod query;
pub mod store;
pub mod user;

pub use error::{Error, ErrorKind, Result};

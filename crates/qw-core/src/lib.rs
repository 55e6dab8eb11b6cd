//! Core types for Questweave: packages, profiles, locations, and the narrow
//! host interfaces the engine talks to.
//!
//! This crate defines the data model shared by the script layer and the
//! runtime engine. It is independent of any host game server — worlds,
//! players, and chat are reached only through the traits in [`host`].

/// Block descriptions matched by selectors.
pub mod block;
/// Error types used throughout the workspace.
pub mod error;
/// Narrow interfaces to the host game server.
pub mod host;
/// World locations and block positions.
pub mod location;
/// Quest package namespaces.
pub mod package;
/// Player profile identifiers.
pub mod profile;
/// Legacy color/format code conversion.
pub mod text;

/// Re-export block types.
pub use block::Block;
/// Re-export error types.
pub use error::{ParseError, ParseResult, RuntimeError, RuntimeResult};
/// Re-export host interfaces.
pub use host::{GameQuery, JournalPointer, MessageSink, PlayerClass, PlayerDataStore};
/// Re-export location types.
pub use location::{BlockPos, WorldLocation};
/// Re-export package types.
pub use package::QuestPackage;
/// Re-export profile types.
pub use profile::ProfileId;

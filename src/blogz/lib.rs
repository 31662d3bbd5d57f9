//! # Blogz Architecture
//!
//! Blogz is a **UI-agnostic blog-post library** with a terminal client on top.
//! Posts are plain JSON files on local disk; an index file caches their
//! metadata for fast listing.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, renders output, runs the menu          │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Supplies config and data root                            │
//! │  - Returns structured Result types                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Business logic: create, update, search, stats, export    │
//! │  - Operates on Rust types, returns Rust types               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - DataStore trait, PostStore consistency logic             │
//! │  - FsBackend (production), MemBackend (testing)             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code takes regular Rust arguments and returns
//! `Result<CmdResult>`. It never prints and never exits; diagnostics go
//! through `tracing`, which the binary routes to stderr.
//!
//! ## Testing Strategy
//!
//! 1. **Commands** (`commands/*.rs`): unit tests of the business logic against
//!    [`store::InMemoryStore`]. Most tests live here.
//! 2. **Storage** (`store/`): reconciliation and failure tests on the memory
//!    backend, plus filesystem integration tests under `tests/`.
//! 3. **API** (`api.rs`): dispatch tests.
//! 4. **CLI**: end-to-end runs of the binary with `assert_cmd`.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Business logic for each command
//! - [`store`]: Storage abstraction and implementations
//! - [`model`]: The `Post` entity and its JSON form
//! - [`index`]: Index entries and the `index.json` codec
//! - [`slug`]: Id generation and filename sanitizing
//! - [`tags`]: Tag normalization
//! - [`config`]: User configuration
//! - [`init`]: Data root resolution and context setup
//! - [`editor`]: External editor integration
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod editor;
pub mod error;
pub mod index;
pub mod init;
pub mod model;
pub mod slug;
pub mod store;
pub mod tags;

//! Snipforge Engine
//!
//! Compile, cache and run embedded snippets of foreign source code, and get
//! back a structured value (or a structured error) instead of raw text.
//!
//! # Overview
//!
//! A snippet is a template: literal fragments of Rust or C++ interleaved
//! with interpolated values. The engine:
//!
//! 1. Assembles the template into one source string ([`snippet`])
//! 2. Wraps bare bodies in a reporting entry point ([`prepare`])
//! 3. Hashes the program into a cache key ([`hash`])
//! 4. Compiles it, unless an executable for that key already exists ([`build`])
//! 5. Runs the executable ([`runner`])
//! 6. Decodes its output through a delimited wire protocol ([`protocol`])
//!
//! # Build modes
//!
//! | Mode | Language | Tool | Selected when |
//! |------|----------|------|---------------|
//! | `rustc` | Rust | `rustc` | no `// cargo-deps:` directive |
//! | `cargo` | Rust | `cargo` | directive present |
//! | `cpp` | C++ | `g++`, then `clang++` | always for C++ |
//!
//! # Example
//!
//! ```ignore
//! use snipforge::{Engine, EngineConfig, Snippet};
//!
//! let engine = Engine::new(EngineConfig::new("."));
//! let snippet = Snippet::builder()
//!     .text("let xs: Vec<i64> = vec!")
//!     .value(vec![3, 1, 5])
//!     .text("; Ok::<i64, String>(xs.iter().sum())")
//!     .build();
//!
//! let sum = engine.rust(&snippet).unwrap();
//! assert_eq!(sum, serde_json::json!(9));
//! ```
//!
//! # Cache layout
//!
//! ```text
//! <project-root>/.cache/
//! ├── rust/<key>/{main.rs, main_bin}
//! ├── rust-cargo/<key>/{Cargo.toml, src/main.rs, target/release/snippet}
//! └── cpp/<key>/{main.cpp, main_bin}
//! ```
//!
//! Artifacts are never evicted. Changing a snippet produces a new key.
//!
//! # Trust
//!
//! Interpolated values are pasted in as raw text and snippets run with the
//! caller's privileges. Nothing here is a sandbox.

pub mod build;
pub mod config;
pub mod deps;
pub mod engine;
pub mod error;
pub mod hash;
pub mod lang;
pub mod prepare;
pub mod protocol;
pub mod result;
pub mod runner;
pub mod snippet;
pub mod toolchain;

// Re-export main types at crate root
pub use build::{BuildMode, BuildOutput, BuildRequest, BuildStrategy, DependencyResolved, DirectCompile};
pub use config::EngineConfig;
pub use deps::{Dependency, DependencySpec};
pub use engine::{Engine, Execution, Plan};
pub use error::{SnippetError, SnippetResult, Stage};
pub use hash::CacheKey;
pub use lang::Language;
pub use prepare::PreparedSource;
pub use protocol::Resolution;
pub use result::RunResult;
pub use runner::ExecutionOutcome;
pub use snippet::Snippet;

//! Snipforge End-to-End Test Infrastructure
//!
//! Integration tests for the snippet pipeline:
//!
//! - **Pipeline**: build, run and decode through fake toolchains
//! - **Caching**: one build per cache key, new keys for new inputs
//! - **Concurrency**: uncoordinated callers racing on a cold key
//! - **Toolchain**: real `rustc`, `cargo` and C++ compilers
//!
//! ## Running Tests
//!
//! ```bash
//! # Fake-toolchain tests, plus real rustc/C++ tests when those are on PATH
//! cargo test -p snipforge-tests
//!
//! # Cargo builds (fetch crates from the registry)
//! SNIPFORGE_RUN_CARGO_TESTS=1 cargo test -p snipforge-tests -- --ignored
//! ```
//!
//! ## Fake toolchains
//!
//! [`harness::FakeToolchain`] installs shell scripts named `rustc`, `cargo`
//! and `g++` into a private search path. They "compile" a snippet by reading
//! marker comments out of the generated source:
//!
//! | Marker | Effect |
//! |--------|--------|
//! | `//out TEXT` | built program prints `TEXT` on stdout |
//! | `//err TEXT` | built program prints `TEXT` on stderr |
//! | `//exit N` | built program exits with status `N` |
//! | `//compile-error` | the build itself fails |
//! | `//sleep N` | the build takes `N` seconds |
//! | `//write-slowly N` | a program exiting 7 sits at the output path for `N` seconds mid-build |

pub mod harness;

pub use harness::{is_tool_available, should_run_cargo_tests};

#[cfg(unix)]
pub use harness::FakeToolchain;

//! Turning assembled snippets into complete programs.
//!
//! A snippet that already declares an entry point is used as-is. Anything
//! else is treated as the body of a closure and wrapped in a generated
//! `main` that reports the closure's outcome through the wire protocol in
//! [`crate::protocol`].

use crate::build::BuildMode;
use crate::lang::Language;
use crate::protocol::{END_MARKER, START_ERR, START_OK};

/// Inner attribute prepended to every Rust source.
pub const RUST_HEADER: &str = "#![allow(unused)]\n";

/// A complete program ready to be written into an artifact directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedSource {
    language: Language,
    text: String,
    scaffolded: bool,
}

impl PreparedSource {
    /// The program text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Language of the program.
    pub fn language(&self) -> Language {
        self.language
    }

    /// Whether the snippet was wrapped in a generated entry point.
    pub fn is_scaffolded(&self) -> bool {
        self.scaffolded
    }
}

/// Prepares `snippet` for the given build mode.
pub fn prepare(mode: BuildMode, snippet: &str) -> PreparedSource {
    let language = mode.language();
    let scaffolded = !language.has_entry_point(snippet);

    let text = match (language, scaffolded) {
        (Language::Rust, false) => format!("{}{}", RUST_HEADER, snippet),
        (Language::Rust, true) => rust_scaffold(snippet, mode == BuildMode::Cargo),
        (Language::Cpp, false) => snippet.to_string(),
        (Language::Cpp, true) => cpp_scaffold(snippet),
    };

    PreparedSource {
        language,
        text,
        scaffolded,
    }
}

/// Wraps a Rust body returning `Result<T, E>` in a reporting `main`.
///
/// With `serialize`, the value is written with `serde_json` (falling back to
/// `{:?}`), which requires the `serde_json` crate to be linked.
fn rust_scaffold(body: &str, serialize: bool) -> String {
    let print_value: &[&str] = if serialize {
        &[
            "      match serde_json::to_string(&v) {",
            "        Ok(s) => println!(\"{}\", s),",
            "        Err(_) => println!(\"{:?}\", v),",
            "      }",
        ]
    } else {
        &["      println!(\"{:?}\", v);"]
    };

    let mut lines: Vec<String> = vec![
        "use std::process::ExitCode;".into(),
        "fn main() -> ExitCode {".into(),
        "  let __res = (|| {".into(),
        body.into(),
        "  })();".into(),
        "  match __res {".into(),
        "    Ok(v) => {".into(),
        format!("      println!(\"{}\");", START_OK),
    ];
    lines.extend(print_value.iter().map(|l| l.to_string()));
    lines.extend([
        format!("      println!(\"{}\");", END_MARKER),
        "      ExitCode::from(0)".into(),
        "    }".into(),
        "    Err(e) => {".into(),
        format!("      eprintln!(\"{}\");", START_ERR),
        "      eprintln!(\"{:?}\", e);".into(),
        format!("      eprintln!(\"{}\");", END_MARKER),
        "      ExitCode::from(1)".into(),
        "    }".into(),
        "  }".into(),
        "}".into(),
    ]);

    format!("{}{}\n", RUST_HEADER, lines.join("\n"))
}

/// Standard headers available to bare C++ bodies.
const CPP_INCLUDES: &[&str] = &[
    "algorithm",
    "exception",
    "iostream",
    "map",
    "numeric",
    "stdexcept",
    "string",
    "type_traits",
    "utility",
    "vector",
];

/// Wraps a C++ body in a lambda and reports its return value.
///
/// A `void` body reports the trivial return code `0`. Exceptions derived
/// from `std::exception` are reported on stderr with exit status 1.
fn cpp_scaffold(body: &str) -> String {
    let mut lines: Vec<String> = CPP_INCLUDES
        .iter()
        .map(|h| format!("#include <{}>", h))
        .collect();
    lines.extend([
        "using namespace std;".to_string(),
        "template <typename F>".into(),
        "static int snipforge_report(F&& body) {".into(),
        "  cout << boolalpha;".into(),
        "  if constexpr (is_void_v<invoke_result_t<F&>>) {".into(),
        "    body();".into(),
        format!(
            "    cout << \"\\n{}\\n\" << 0 << \"\\n{}\" << endl;",
            START_OK, END_MARKER
        ),
        "  } else {".into(),
        "    auto __res = body();".into(),
        format!(
            "    cout << \"\\n{}\\n\" << __res << \"\\n{}\" << endl;",
            START_OK, END_MARKER
        ),
        "  }".into(),
        "  return 0;".into(),
        "}".into(),
        "int main() {".into(),
        "  try {".into(),
        "    return snipforge_report([&]() {".into(),
        body.into(),
        "    });".into(),
        "  } catch (const exception& e) {".into(),
        format!(
            "    cerr << \"\\n{}\\n\" << e.what() << \"\\n{}\" << endl;",
            START_ERR, END_MARKER
        ),
        "    return 1;".into(),
        "  }".into(),
        "}".into(),
    ]);
    format!("{}\n", lines.join("\n"))
}

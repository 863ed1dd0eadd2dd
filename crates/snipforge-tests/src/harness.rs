//! Test harness utilities for driving the engine against fake and real toolchains.

use std::fs;
use std::path::{Path, PathBuf};

use snipforge::{Engine, EngineConfig, Snippet};

/// Check if `tool` is on `PATH`.
pub fn is_tool_available(tool: &str) -> bool {
    which::which(tool).is_ok()
}

/// Check if cargo tests should run based on environment variable.
pub fn should_run_cargo_tests() -> bool {
    std::env::var("SNIPFORGE_RUN_CARGO_TESTS")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Builds a snippet for a fake toolchain from marker comments.
///
/// The snippet has no entry point, so it is scaffolded like any bare body;
/// the fake compiler ignores everything but the markers.
pub fn fake_snippet(stdout: &[&str], stderr: &[&str], exit: i32) -> Snippet {
    let mut lines: Vec<String> = Vec::new();
    lines.extend(stdout.iter().map(|l| format!("//out {}", l)));
    lines.extend(stderr.iter().map(|l| format!("//err {}", l)));
    if exit != 0 {
        lines.push(format!("//exit {}", exit));
    }
    Snippet::from_source(lines.join("\n"))
}

/// A fake build script shared by every fake tool.
///
/// Outputs are written to temporary names and renamed into place, so a
/// concurrent reader never sees a half-written program. The one exception is
/// `//write-slowly N`: a stand-in program that exits 7 sits at the output path
/// for `N` seconds before the real one replaces it, like a compiler that
/// writes its output incrementally.
#[cfg(unix)]
const FAKE_BUILD: &str = r#"#!/bin/sh
tool="$1"; src="$2"; out="$3"; shift 3
echo "$tool $*" >> "@LOG@"
delay=$(sed -n 's|^[[:space:]]*//sleep \([0-9]*\).*|\1|p' "$src" | head -n 1)
if [ -n "$delay" ]; then sleep "$delay"; fi
if grep -q '//compile-error' "$src"; then
  echo "error: fake compile error in $src" >&2
  exit 1
fi
code=$(sed -n 's|^[[:space:]]*//exit \([0-9]*\).*|\1|p' "$src" | head -n 1)
mkdir -p "$(dirname "$out")"
slow=$(sed -n 's|^[[:space:]]*//write-slowly \([0-9]*\).*|\1|p' "$src" | head -n 1)
if [ -n "$slow" ]; then
  cat > "$out" <<'PARTIAL'
#!/bin/sh
exit 7
PARTIAL
  chmod +x "$out"
  sleep "$slow"
fi
tmp="$out.tmp.$$"
sed -n 's|^[[:space:]]*//out ||p' "$src" > "$tmp.stdout"
sed -n 's|^[[:space:]]*//err ||p' "$src" > "$tmp.stderr"
echo "${code:-0}" > "$tmp.code"
cat > "$tmp" <<'BIN'
#!/bin/sh
cat "$0.stdout"
cat "$0.stderr" >&2
exit "$(cat "$0.code")"
BIN
chmod +x "$tmp"
mv "$tmp.stdout" "$out.stdout"
mv "$tmp.stderr" "$out.stderr"
mv "$tmp.code" "$out.code"
mv "$tmp" "$out"
"#;

/// Fake `rustc`/`g++`/`clang++`: `<src> -o <out> ...` in any order.
#[cfg(unix)]
const FAKE_COMPILER: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then echo "@NAME@ 0.0.0-fake"; exit 0; fi
src=""; out=""; prev=""
for arg in "$@"; do
  if [ "$prev" = "-o" ]; then out="$arg"; fi
  case "$arg" in *.rs|*.cpp) src="$arg" ;; esac
  prev="$arg"
done
exec "@BUILD@" "@NAME@" "$src" "$out" "$@"
"#;

/// Fake `cargo build --manifest-path <m> --target-dir <t>`.
#[cfg(unix)]
const FAKE_CARGO: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then echo "cargo 0.0.0-fake"; exit 0; fi
manifest=""; target=""; prev=""
for arg in "$@"; do
  case "$prev" in
    --manifest-path) manifest="$arg" ;;
    --target-dir) target="$arg" ;;
  esac
  prev="$arg"
done
exec "@BUILD@" cargo "$(dirname "$manifest")/src/main.rs" "$target/release/snippet" "$@"
"#;

/// A private search path of fake build tools plus a project root.
///
/// ```text
/// <tmp>/
/// ├── bin/{rustc, cargo, g++}
/// ├── fake-build
/// ├── invocations.log
/// └── project/.cache/...
/// ```
#[cfg(unix)]
pub struct FakeToolchain {
    root: tempfile::TempDir,
}

#[cfg(unix)]
impl FakeToolchain {
    /// Installs fake `rustc`, `cargo` and `g++`.
    pub fn new() -> Self {
        Self::with_tools(&["rustc", "cargo", "g++"])
    }

    /// Installs only the named tools.
    pub fn with_tools(tools: &[&str]) -> Self {
        let root = tempfile::TempDir::new().expect("Failed to create fake toolchain dir");
        let fake = Self { root };
        fs::create_dir_all(fake.bin_dir()).expect("Failed to create bin dir");
        fs::create_dir_all(fake.project_root()).expect("Failed to create project dir");

        let build = fake.root.path().join("fake-build");
        let log = fake.log_path();
        install_script(
            &build,
            &FAKE_BUILD.replace("@LOG@", &log.display().to_string()),
        );

        for tool in tools {
            let template = if *tool == "cargo" {
                FAKE_CARGO
            } else {
                FAKE_COMPILER
            };
            let script = template
                .replace("@BUILD@", &build.display().to_string())
                .replace("@NAME@", tool);
            install_script(&fake.bin_dir().join(tool), &script);
        }
        fake
    }

    /// Directory holding the fake tools.
    pub fn bin_dir(&self) -> PathBuf {
        self.root.path().join("bin")
    }

    /// Project root handed to the engine.
    pub fn project_root(&self) -> PathBuf {
        self.root.path().join("project")
    }

    /// Default cache root under the project.
    pub fn cache_root(&self) -> PathBuf {
        self.project_root().join(".cache")
    }

    fn log_path(&self) -> PathBuf {
        self.root.path().join("invocations.log")
    }

    /// Engine config that only sees the fake tools.
    pub fn config(&self) -> EngineConfig {
        EngineConfig::new(self.project_root()).search_path(self.bin_dir())
    }

    /// Engine over [`config`](Self::config).
    pub fn engine(&self) -> Engine {
        Engine::new(self.config())
    }

    /// Every recorded tool invocation, as `<tool> <args...>`.
    pub fn invocations(&self) -> Vec<String> {
        fs::read_to_string(self.log_path())
            .map(|log| log.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Number of times `tool` ran a build.
    pub fn invocation_count(&self, tool: &str) -> usize {
        self.invocations()
            .iter()
            .filter(|line| line.split_whitespace().next() == Some(tool))
            .count()
    }
}

#[cfg(unix)]
impl Default for FakeToolchain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
fn install_script(path: &Path, contents: &str) {
    use std::os::unix::fs::PermissionsExt;

    fs::write(path, contents).expect("Failed to write fake tool");
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .expect("Failed to make fake tool executable");
}

/// Read a file from an artifact directory.
pub fn read_artifact(dir: &Path, rel_path: &str) -> String {
    fs::read_to_string(dir.join(rel_path))
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", dir.join(rel_path).display(), e))
}

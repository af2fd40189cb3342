//! Tests for settings read from the environment and `gn-rust-project.toml`.

use snapbox::str;

use crate::support::{graph, project};

const ONE_TARGET: &str =
    r#"{ "label": "//a:a", "output_type": "rust_library", "sources": ["//a/lib.rs"] }"#;

#[test]
fn config_file_in_the_working_directory() {
    let p = project()
        .file("graph.json", &graph(ONE_TARGET))
        .file(
            "gn-rust-project.toml",
            r#"
[rust-project]
root = "."
output = "ide/rust-project.json"
"#,
        )
        .build();

    p.gn_rust_project()
        .arg("graph.json")
        .assert()
        .success()
        .stderr_eq(str![[r#"
   Generated [ROOT]/out/ide/rust-project.json (1 crates)

"#]]);
}

#[test]
fn environment_wins_over_config_file() {
    let p = project()
        .file("graph.json", &graph(ONE_TARGET))
        .file(
            "gn-rust-project.toml",
            r#"
[rust-project]
root = "."
output = "from-file.json"
"#,
        )
        .build();

    p.gn_rust_project()
        .arg("graph.json")
        .env("GN_RUST_PROJECT_OUTPUT", "from-env.json")
        .assert()
        .success()
        .stderr_eq(str![[r#"
   Generated [ROOT]/out/from-env.json (1 crates)

"#]]);
}

#[test]
fn command_line_wins_over_environment() {
    let p = project().file("graph.json", &graph(ONE_TARGET)).build();

    p.gn_rust_project()
        .args(["graph.json", "--root", ".", "-o", "cli.json"])
        .env("GN_RUST_PROJECT_OUTPUT", "from-env.json")
        .env("GN_RUST_PROJECT_ROOT", "elsewhere")
        .assert()
        .success()
        .stderr_eq(str![[r#"
   Generated [ROOT]/out/cli.json (1 crates)

"#]]);
}

#[test]
fn explicit_config_path_is_relative_to_itself() {
    let p = project()
        .file("graph.json", &graph(ONE_TARGET))
        .file(
            "conf/ide.toml",
            r#"
[rust-project]
root = "../checkout"
build-dir = "//build/"
"#,
        )
        .build();

    p.gn_rust_project()
        .args(["graph.json", "--config", "conf/ide.toml"])
        .assert()
        .success()
        .stderr_eq(str![[r#"
   Generated [ROOT]/checkout/build/rust-project.json (1 crates)

"#]]);
}

#[test]
fn quiet_from_config_file() {
    let p = project()
        .file("graph.json", &graph(ONE_TARGET))
        .file("gn-rust-project.toml", "[rust-project]\nroot = \".\"\nquiet = true\n")
        .build();

    p.gn_rust_project()
        .arg("graph.json")
        .assert()
        .success()
        .stderr_eq(str![""]);

    // `--verbose` beats a quiet config.
    p.gn_rust_project()
        .args(["graph.json", "-v"])
        .assert()
        .success()
        .stderr_eq(str![[r#"
      Loaded [ROOT]/graph.json (1 targets)
       Fresh [ROOT]/out/rust-project.json (1 crates)

"#]]);
}

#[test]
fn unknown_config_key() {
    let p = project()
        .file("graph.json", &graph(ONE_TARGET))
        .file("gn-rust-project.toml", "[rust-project]\noutptu = \"x.json\"\n")
        .build();

    p.gn_rust_project()
        .arg("graph.json")
        .assert()
        .code(101)
        .stderr_eq(str![[r#"
error: could not parse config file `[ROOT]/gn-rust-project.toml`

Caused by:
...
"#]]);
}

#[test]
fn missing_explicit_config_file() {
    let p = project().file("graph.json", &graph(ONE_TARGET)).build();

    p.gn_rust_project()
        .args(["graph.json", "--config", "nope.toml"])
        .assert()
        .code(101)
        .stderr_eq(str![[r#"
error: failed to read `[ROOT]/nope.toml`

Caused by:
  [..]

"#]]);
}

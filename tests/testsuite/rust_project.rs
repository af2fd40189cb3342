//! Tests for the generated `rust-project.json`.

use snapbox::prelude::*;
use snapbox::{assert_data_eq, str};

use crate::support::{graph, project};

#[test]
#[cfg_attr(windows, ignore = "uses a unix source root")]
fn binary_with_library_behind_a_group() {
    let p = project()
        .file(
            "graph.json",
            &graph(
                r#"
        {
            "label": "//app:app",
            "output_type": "executable",
            "sources": ["//app/main.rs"],
            "rustflags": ["--edition=2021"],
            "rustenv": ["APP_NAME=demo"],
            "deps": ["//third_party:deps"]
        },
        {
            "label": "//third_party:deps",
            "output_type": "group",
            "public_deps": ["//third_party/log", "//third_party/zlib"]
        },
        {
            "label": "//third_party/log:log",
            "output_type": "rust_library",
            "sources": ["//third_party/log/src/lib.rs", "//third_party/log/src/macros.rs"],
            "rustflags": ["--cfg=feature=\"std\""]
        },
        {
            "label": "//third_party/zlib:zlib",
            "output_type": "static_library",
            "sources": ["//third_party/zlib/inflate.c"]
        }
        "#,
            ),
        )
        .build();

    p.generate("graph.json")
        .assert()
        .success()
        .stderr_eq(str![[r#"
   Generated [ROOT]/out.json (2 crates)

"#]]);

    assert_data_eq!(
        p.read_file("out.json"),
        str![[r#"
{
  "crates": [
    {
      "crate_id": 0,
      "root_module": "/checkout/third_party/log/src/lib.rs",
      "label": "//third_party/log:log",
      "source": {
        "include_dirs": [
          "/checkout/third_party/log/src",
          "/checkout/out/gen/third_party/log"
        ],
        "exclude_dirs": []
      },
      "compiler_args": [
        "--cfg=feature=\"std\""
      ],
      "deps": [],
      "edition": "2015",
      "cfg": [
        "test",
        "debug_assertions",
        "feature=\"std\"",
        "feature=\"std\""
      ]
    },
    {
      "crate_id": 1,
      "root_module": "/checkout/app/main.rs",
      "label": "//app:app",
      "source": {
        "include_dirs": [
          "/checkout/app",
          "/checkout/out/gen/app"
        ],
        "exclude_dirs": []
      },
      "compiler_args": [
        "--edition=2021"
      ],
      "deps": [
        {
          "crate": 0,
          "name": "log"
        }
      ],
      "edition": "2021",
      "cfg": [
        "test",
        "debug_assertions"
      ],
      "env": {
        "APP_NAME": "demo"
      }
    }
  ]
}
"#]]
        .is_json()
    );
}

#[test]
#[cfg_attr(windows, ignore = "uses a unix source root")]
fn dependencies_are_numbered_first() {
    let p = project()
        .file(
            "graph.json",
            &graph(
                r#"
        { "label": "//a:a", "output_type": "executable", "sources": ["//a/main.rs"],
          "deps": ["//b"] },
        { "label": "//b:b", "output_type": "rust_library", "sources": ["//b/lib.rs"],
          "deps": ["//c"] },
        { "label": "//c:c", "output_type": "rust_library", "sources": ["//c/lib.rs"] },
        { "label": "//z:z", "output_type": "rust_library", "sources": ["//z/lib.rs"] }
        "#,
            ),
        )
        .build();

    p.generate("graph.json").assert().success();

    let manifest = p.manifest("out.json");
    let labels: Vec<_> = manifest["crates"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, ["//c:c", "//b:b", "//a:a", "//z:z"]);
    assert_eq!(manifest["crates"][1]["deps"][0]["crate"], 0);
    assert_eq!(manifest["crates"][2]["deps"][0]["crate"], 1);
}

#[test]
#[cfg_attr(windows, ignore = "uses a unix source root")]
fn numbering_ignores_snapshot_order() {
    let targets = [
        r#"{ "label": "//q:q", "output_type": "rust_library", "sources": ["//q/lib.rs"] }"#,
        r#"{ "label": "//p:p", "output_type": "rust_library", "sources": ["//p/lib.rs"] }"#,
        r#"{ "label": "//r:r", "output_type": "rust_library", "sources": ["//r/lib.rs"] }"#,
    ];
    let forward = targets.join(",");
    let backward = targets.iter().rev().copied().collect::<Vec<_>>().join(",");
    let p = project()
        .file("forward.json", &graph(&forward))
        .file("backward.json", &graph(&backward))
        .build();

    p.generate("forward.json").assert().success();
    let first = p.read_file("out.json");
    p.generate("backward.json")
        .assert()
        .success()
        .stderr_eq(str![[r#"
       Fresh [ROOT]/out.json (3 crates)

"#]]);
    assert_eq!(first, p.read_file("out.json"));
}

#[test]
#[cfg_attr(windows, ignore = "uses a unix source root")]
fn variants_of_one_crate_are_merged() {
    let p = project()
        .file(
            "graph.json",
            r#"{
    "root_path": "/checkout",
    "build_dir": "//out/",
    "default_toolchain": "//build/toolchain:host",
    "toolchains": [
        { "label": "//build/toolchain:host" },
        { "label": "//build/toolchain:fuchsia" }
    ],
    "targets": [
        {
            "label": "//lib:lib",
            "toolchain": "//build/toolchain:fuchsia",
            "output_type": "rust_library",
            "sources": ["//lib/src/lib.rs"],
            "rustflags": ["--target", "x86_64-unknown-fuchsia", "--edition=2021"]
        },
        {
            "label": "//lib:lib_test",
            "output_type": "executable",
            "testonly": true,
            "crate_root": "//lib/src/lib.rs",
            "sources": ["//lib/src/lib.rs"],
            "rustflags": ["--edition=2021", "--cfg=test_helpers"],
            "deps": ["//assert_matches"]
        },
        {
            "label": "//lib:lib",
            "output_type": "rust_library",
            "sources": ["//lib/src/lib.rs"],
            "rustflags": ["--edition=2021"]
        },
        {
            "label": "//assert_matches:assert_matches",
            "output_type": "rust_library",
            "testonly": true,
            "sources": ["//assert_matches/src/lib.rs"]
        }
    ]
}"#,
        )
        .build();

    p.generate("graph.json").assert().success();

    let manifest = p.manifest("out.json");
    let crates = manifest["crates"].as_array().unwrap();
    assert_eq!(crates.len(), 2);
    let lib = &crates[1];
    assert_eq!(lib["label"], "//lib:lib");
    assert_eq!(lib["root_module"], "/checkout/lib/src/lib.rs");
    assert!(lib.get("target").is_none());
    assert_eq!(lib["compiler_args"], serde_json::json!(["--edition=2021"]));
    assert_eq!(
        lib["source"]["include_dirs"],
        serde_json::json!(["/checkout/lib/src", "/checkout/out/gen/lib"])
    );
    assert_eq!(
        lib["deps"],
        serde_json::json!([{ "crate": 0, "name": "assert_matches" }])
    );
    assert_eq!(
        lib["cfg"],
        serde_json::json!(["test", "debug_assertions", "test_helpers"])
    );
}

#[test]
#[cfg_attr(windows, ignore = "uses a unix source root")]
fn only_toolchain_variant_keeps_its_target() {
    let p = project()
        .file(
            "graph.json",
            r#"{
    "root_path": "/checkout",
    "build_dir": "//out/",
    "default_toolchain": "//build/toolchain:host",
    "toolchains": [{ "label": "//build/toolchain:wasm" }],
    "targets": [
        {
            "label": "//web:web",
            "toolchain": "//build/toolchain:wasm",
            "output_type": "loadable_module",
            "sources": ["//web/lib.rs"],
            "rustflags": ["--target=wasm32-unknown-unknown"]
        }
    ]
}"#,
        )
        .build();

    p.generate("graph.json").assert().success();

    let manifest = p.manifest("out.json");
    let web = &manifest["crates"][0];
    assert_eq!(web["target"], "wasm32-unknown-unknown");
    assert_eq!(web["edition"], "2015");
    assert_eq!(
        web["source"]["include_dirs"][1],
        "/checkout/out/wasm/gen/web"
    );
}

#[test]
fn output_defaults_to_the_build_dir() {
    let p = project()
        .file(
            "graph.json",
            r#"{
    "build_dir": "//out/Debug/",
    "default_toolchain": "//build/toolchain:host",
    "targets": [
        { "label": "//a:a", "output_type": "rust_library", "sources": ["//a/lib.rs"] }
    ]
}"#,
        )
        .build();

    p.gn_rust_project()
        .arg("graph.json")
        .arg("--root")
        .arg(".")
        .assert()
        .success()
        .stderr_eq(str![[r#"
   Generated [ROOT]/out/Debug/rust-project.json (1 crates)

"#]]);

    let manifest = p.manifest("out/Debug/rust-project.json");
    assert_eq!(manifest["crates"].as_array().unwrap().len(), 1);
}

#[test]
fn output_outside_the_source_root_is_rejected() {
    let p = project()
        .file(
            "graph.json",
            r#"{
    "build_dir": "//out/",
    "default_toolchain": "//build/toolchain:host",
    "targets": []
}"#,
        )
        .build();

    p.gn_rust_project()
        .args(["graph.json", "--root", ".", "-o", "../../rust-project.json"])
        .assert()
        .code(101)
        .stderr_eq(str![[r#"
error: failed to generate rust-project for `[ROOT]/graph.json`

Caused by:
  cannot resolve `../../rust-project.json` relative to the build directory: the path climbs above the source root

"#]]);
}

#[test]
fn invalid_graph_names_the_target() {
    let p = project()
        .file(
            "graph.json",
            r#"{
    "root_path": "/checkout",
    "build_dir": "//out/",
    "default_toolchain": "//build/toolchain:host",
    "targets": [
        { "label": "//a:a", "output_type": "rust_library", "sources": ["//a/lib.rs"],
          "deps": ["//missing:dep"] }
    ]
}"#,
        )
        .build();

    p.gn_rust_project()
        .arg("graph.json")
        .assert()
        .code(101)
        .stderr_eq(str![[r#"
error: failed to load build graph `[ROOT]/graph.json`

Caused by:
  invalid build graph at `//a:a(//build/toolchain:host)`: unknown dependency `//missing:dep(//build/toolchain:host)`

"#]]);
}

#[test]
fn unknown_snapshot_keys_are_rejected() {
    let p = project()
        .file(
            "graph.json",
            r#"{ "default_toolchain": "//tc:host", "target": [] }"#,
        )
        .build();

    p.gn_rust_project()
        .arg("graph.json")
        .assert()
        .code(101)
        .stderr_eq(str![[r#"
error: failed to load build graph `[ROOT]/graph.json`

Caused by:
  unknown field `target`, expected one of `root_path`, `build_dir`, `default_toolchain`, `toolchains`, `configs`, `targets` at line 1 column [..]

"#]]);
}

#[test]
#[cfg_attr(windows, ignore = "uses a unix source root")]
fn graph_without_rust_warns() {
    let p = project()
        .file(
            "graph.json",
            &graph(r#"{ "label": "//z:z", "output_type": "static_library", "sources": ["//z/z.c"] }"#),
        )
        .build();

    p.generate("graph.json")
        .assert()
        .success()
        .stderr_eq(str![[r#"
warning: the build graph has no targets that compile Rust sources
   Generated [ROOT]/out.json (0 crates)

"#]]);
    assert_eq!(p.manifest("out.json"), serde_json::json!({ "crates": [] }));

    p.generate("graph.json")
        .arg("-q")
        .assert()
        .success()
        .stderr_eq(str![""]);
}

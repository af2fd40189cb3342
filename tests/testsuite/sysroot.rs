//! Tests for the synthetic standard library crates.

use snapbox::prelude::*;
use snapbox::{assert_data_eq, str};

use crate::support::project;

const GRAPH: &str = r#"{
    "root_path": "/checkout",
    "build_dir": "//out/",
    "default_toolchain": "//build/toolchain:host",
    "toolchains": [
        { "label": "//build/toolchain:host", "sysroot": "../prebuilt/rust" }
    ],
    "targets": [
        {
            "label": "//m:m",
            "output_type": "rust_proc_macro",
            "sources": ["//m/lib.rs"],
            "outputs": ["host/libm.so"]
        },
        {
            "label": "//a:a",
            "output_type": "rust_library",
            "sources": ["//a/lib.rs"],
            "deps": ["//m"]
        }
    ]
}"#;

fn names(manifest: &serde_json::Value) -> Vec<&str> {
    manifest["crates"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["label"].as_str().unwrap())
        .collect()
}

#[test]
#[cfg_attr(windows, ignore = "uses a unix source root")]
fn sysroot_crates_come_first() {
    let p = project().file("graph.json", GRAPH).build();

    p.generate("graph.json")
        .assert()
        .success()
        .stderr_eq(str![[r#"
   Generated [ROOT]/out.json (10 crates)

"#]]);

    let manifest = p.manifest("out.json");
    assert_eq!(
        names(&manifest),
        [
            "core",
            "alloc",
            "panic_abort",
            "unwind",
            "std",
            "panic_unwind",
            "proc_macro",
            "test",
            "//m:m",
            "//a:a"
        ]
    );
    assert_data_eq!(
        manifest["crates"][4].to_string(),
        str![[r#"
{
  "crate_id": 4,
  "root_module": "/checkout/prebuilt/rust/lib/rustlib/src/rust/library/std/src/lib.rs",
  "label": "std",
  "source": {
    "include_dirs": [
      "/checkout/prebuilt/rust/lib/rustlib/src/rust/library/std/src"
    ],
    "exclude_dirs": []
  },
  "deps": [
    {
      "crate": 1,
      "name": "alloc"
    },
    {
      "crate": 0,
      "name": "core"
    },
    {
      "crate": 2,
      "name": "panic_abort"
    },
    {
      "crate": 3,
      "name": "unwind"
    }
  ],
  "edition": "2018",
  "cfg": [
    "debug_assertions"
  ]
}
"#]]
        .is_json()
    );
}

#[test]
#[cfg_attr(windows, ignore = "uses a unix source root")]
fn proc_macro_links_against_proc_macro() {
    let p = project().file("graph.json", GRAPH).build();

    p.generate("graph.json").assert().success();

    let manifest = p.manifest("out.json");
    let m = &manifest["crates"][8];
    assert_eq!(m["is_proc_macro"], true);
    assert_eq!(m["proc_macro_dylib_path"], "/checkout/out/host/libm.so");
    assert_eq!(
        m["deps"],
        serde_json::json!([
            { "crate": 0, "name": "core" },
            { "crate": 1, "name": "alloc" },
            { "crate": 4, "name": "std" },
            { "crate": 6, "name": "proc_macro" }
        ])
    );

    let a = &manifest["crates"][9];
    assert!(a.get("is_proc_macro").is_none());
    assert_eq!(
        a["deps"],
        serde_json::json!([
            { "crate": 0, "name": "core" },
            { "crate": 1, "name": "alloc" },
            { "crate": 4, "name": "std" },
            { "crate": 8, "name": "m" }
        ])
    );
}

#[test]
#[cfg_attr(windows, ignore = "uses a unix source root")]
fn toolchains_without_a_sysroot_get_no_std() {
    let p = project()
        .file(
            "graph.json",
            &crate::support::graph(
                r#"{ "label": "//a:a", "output_type": "rust_library", "sources": ["//a/lib.rs"] }"#,
            ),
        )
        .build();

    p.generate("graph.json").assert().success();

    let manifest = p.manifest("out.json");
    assert_eq!(names(&manifest), ["//a:a"]);
    assert_eq!(manifest["crates"][0]["deps"], serde_json::json!([]));
}

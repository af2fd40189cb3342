use std::fmt;

/// Identifies a target, config, or toolchain in the build graph.
///
/// Written as `//dir/path:name`, optionally followed by the toolchain it is
/// built in: `//dir/path:name(//build/toolchain:host)`. When the `:name`
/// part is omitted it defaults to the last directory component.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct Label {
    /// Source-absolute directory, always ending in `/`.
    dir: String,
    name: String,
    /// `(dir, name)` of the toolchain, if one is attached.
    toolchain: Option<(String, String)>,
}

impl Label {
    /// Parses `input`, attaching `current_toolchain` if the input does not
    /// name a toolchain itself.
    pub fn parse(input: &str, current_toolchain: Option<&Label>) -> Result<Label, String> {
        let (body, toolchain) = match input.find('(') {
            Some(open) => {
                let Some(inner) = input[open + 1..].strip_suffix(')') else {
                    return Err(format!("unterminated toolchain in label `{input}`"));
                };
                let toolchain = Label::parse(inner, None)?;
                if toolchain.toolchain.is_some() {
                    return Err(format!("toolchain label `{inner}` names a toolchain"));
                }
                (&input[..open], Some((toolchain.dir, toolchain.name)))
            }
            None => (
                input,
                current_toolchain.map(|t| (t.dir.clone(), t.name.clone())),
            ),
        };

        let Some(rest) = body.strip_prefix("//") else {
            return Err(format!("label `{input}` is not source-absolute"));
        };
        let (dir, name) = match rest.rfind(':') {
            Some(colon) => (&rest[..colon], &rest[colon + 1..]),
            None => {
                let dir = rest.trim_end_matches('/');
                (dir, dir.rsplit('/').next().unwrap_or(""))
            }
        };
        if name.is_empty() || name.contains('/') {
            return Err(format!("label `{input}` has no target name"));
        }
        let dir = dir.trim_end_matches('/');
        let dir = if dir.is_empty() {
            "//".to_string()
        } else {
            format!("//{dir}/")
        };

        Ok(Label {
            dir,
            name: name.to_string(),
            toolchain,
        })
    }

    /// Source-absolute directory of the label, ending in `/`.
    pub fn dir(&self) -> &str {
        &self.dir
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The label of the toolchain this label is attached to.
    pub fn toolchain_label(&self) -> Option<Label> {
        self.toolchain.as_ref().map(|(dir, name)| Label {
            dir: dir.clone(),
            name: name.clone(),
            toolchain: None,
        })
    }

    /// Returns the same label without a toolchain attached.
    pub fn without_toolchain(&self) -> Label {
        Label {
            dir: self.dir.clone(),
            name: self.name.clone(),
            toolchain: None,
        }
    }

    /// Formats the label the way users write it, e.g. `//foo/bar:baz`.
    pub fn user_visible_name(&self, include_toolchain: bool) -> String {
        let dir = match self.dir.as_str() {
            "//" => "//",
            dir => dir.trim_end_matches('/'),
        };
        match &self.toolchain {
            Some((tc_dir, tc_name)) if include_toolchain => {
                let tc_dir = match tc_dir.as_str() {
                    "//" => "//",
                    dir => dir.trim_end_matches('/'),
                };
                format!("{dir}:{}({tc_dir}:{tc_name})", self.name)
            }
            _ => format!("{dir}:{}", self.name),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.user_visible_name(true))
    }
}

use std::fmt;
use std::path::Path;

/// A file in the build, either source-absolute (`//foo/lib.rs`) or a system
/// absolute path (`/opt/rust/lib.rs`).
///
/// Crates are deduplicated by their root module's `SourcePath`, so two
/// spellings of the same file are only merged if they are textually equal.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct SourcePath(String);

impl SourcePath {
    pub fn new(value: impl Into<String>) -> SourcePath {
        SourcePath(value.into())
    }

    pub fn value(&self) -> &str {
        &self.0
    }

    /// Whether the path is relative to the source root (`//...`).
    pub fn is_source_absolute(&self) -> bool {
        self.0.starts_with("//")
    }

    /// The directory containing this file.
    pub fn dir(&self) -> SourceDir {
        match self.0.rfind(['/', '\\']) {
            Some(slash) => SourceDir(self.0[..=slash].to_string()),
            None => SourceDir(String::new()),
        }
    }

    /// The final component of the path.
    pub fn file_name(&self) -> &str {
        match self.0.rfind(['/', '\\']) {
            Some(slash) => &self.0[slash + 1..],
            None => &self.0,
        }
    }

    /// Whether this is a Rust source file.
    pub fn is_rust(&self) -> bool {
        Path::new(&self.0).extension().is_some_and(|ext| ext == "rs")
    }
}

impl fmt::Display for SourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A directory in the build, spelled like [`SourcePath`] but always ending
/// in a separator.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct SourceDir(String);

impl SourceDir {
    pub fn new(value: impl Into<String>) -> SourceDir {
        let mut value = value.into();
        if !value.ends_with('/') {
            value.push('/');
        }
        SourceDir(value)
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A file produced by the build, relative to the build directory.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct OutputFile(String);

impl OutputFile {
    pub fn new(value: impl Into<String>) -> OutputFile {
        OutputFile(value.into())
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OutputFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

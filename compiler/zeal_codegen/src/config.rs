//! Backend configuration.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

/// Version family of the target runtime's binary interface.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum RuntimeFamily {
    /// Legacy reference-counted model: `zval *` everywhere.
    ZendEngine2,
    /// Tagged-union model with inline `zval`s.
    #[default]
    ZendEngine3,
}

impl RuntimeFamily {
    pub const ALL: [RuntimeFamily; 2] = [RuntimeFamily::ZendEngine2, RuntimeFamily::ZendEngine3];

    pub fn name(self) -> &'static str {
        match self {
            RuntimeFamily::ZendEngine2 => "ZendEngine2",
            RuntimeFamily::ZendEngine3 => "ZendEngine3",
        }
    }
}

impl fmt::Display for RuntimeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Error)]
#[error("unknown runtime family '{0}' (expected ZendEngine2 or ZendEngine3)")]
pub struct ParseFamilyError(String);

impl FromStr for RuntimeFamily {
    type Err = ParseFamilyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "zendengine2" | "ze2" => Ok(RuntimeFamily::ZendEngine2),
            "zendengine3" | "ze3" => Ok(RuntimeFamily::ZendEngine3),
            _ => Err(ParseFamilyError(s.to_owned())),
        }
    }
}

/// Options for one code generation run.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct CodegenOptions {
    family: RuntimeFamily,
    project_root: Option<PathBuf>,
    indent: String,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        CodegenOptions {
            family: RuntimeFamily::default(),
            project_root: None,
            indent: "\t".to_owned(),
        }
    }
}

impl CodegenOptions {
    #[must_use]
    pub fn with_family(mut self, family: RuntimeFamily) -> Self {
        self.family = family;
        self
    }

    /// Paths under `root` are shortened in runtime diagnostics.
    #[must_use]
    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = Some(root.into());
        self
    }

    #[must_use]
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    pub fn family(&self) -> RuntimeFamily {
        self.family
    }

    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    pub fn indent(&self) -> &str {
        &self.indent
    }

    /// File path as embedded in emitted runtime calls: relative to the
    /// project root when it lies inside it, always with `/` separators.
    pub fn short_path(&self, file: &str) -> String {
        let path = Path::new(file);
        let relative = self
            .project_root
            .as_deref()
            .and_then(|root| path.strip_prefix(root).ok())
            .unwrap_or(path);
        relative.to_string_lossy().replace('\\', "/")
    }
}

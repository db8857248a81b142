use std::fmt;

use crate::error::{GlueError, Result};

/// Which artifacts a setting applies to: the unminified ("clean") files, the
/// minified ones, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Clean,
    Minified,
    Both,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Clean, Mode::Minified, Mode::Both];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Clean => "clean",
            Mode::Minified => "minified",
            Mode::Both => "both",
        }
    }

    /// Parses `value` for the option named `option`. Matching is exact.
    pub fn parse(option: &'static str, value: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == value)
            .ok_or_else(|| GlueError::Configuration {
                option,
                value: value.to_string(),
            })
    }

    pub fn includes_clean(self) -> bool {
        matches!(self, Mode::Clean | Mode::Both)
    }

    pub fn includes_minified(self) -> bool {
        matches!(self, Mode::Minified | Mode::Both)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

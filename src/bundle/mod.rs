pub mod config;
pub mod selection;

pub use config::{Engines, GlueConfiguration, load_config};
pub use selection::select_bundles;

use serde::Deserialize;

use crate::{error::Result, options::UserOptions, plan::ExpandedGroup, util::expand_sources};

/// One configured build target: file groups plus options overriding the
/// global `[options]` table.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct Bundle {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub files: Vec<FileGroup>,
    #[serde(default)]
    pub options: UserOptions,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileGroup {
    pub src: Vec<String>,
    pub dest: String,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub flatten: bool,
}

impl FileGroup {
    pub fn expand(&self) -> Result<ExpandedGroup> {
        let sources = expand_sources(&self.src, self.cwd.as_deref())?;
        Ok(ExpandedGroup {
            cwd: self.cwd.clone(),
            sources,
            dest: self.dest.clone(),
            flatten: self.flatten,
        })
    }
}

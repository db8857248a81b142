pub mod defaults;
pub mod mode;
pub mod resolver;

pub use mode::Mode;
pub use resolver::resolve;

use serde::Deserialize;

/// Option map handed verbatim to an engine.
pub type Settings = serde_json::Map<String, serde_json::Value>;

/// The first stage of a bundle: concatenate all sources of a file group into
/// one file, or copy each source to its own file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Concat,
    Copy,
}

/// Options as written by the user, either under `[options]` or under a
/// bundle's `options` table.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserOptions {
    pub concat: Option<Settings>,
    pub copy: Option<Settings>,
    #[serde(alias = "uglify")]
    pub minify: Option<Settings>,
    pub output: Option<String>,
    pub banner: Option<String>,
    #[serde(alias = "bannerOn")]
    pub banner_on: Option<String>,
}

impl UserOptions {
    /// Layers `over` on top of `self`. Scalars from `over` replace ours,
    /// engine tables are merged key by key.
    pub fn overlay(&self, over: &UserOptions) -> UserOptions {
        UserOptions {
            concat: overlay_settings(self.concat.as_ref(), over.concat.as_ref()),
            copy: overlay_settings(self.copy.as_ref(), over.copy.as_ref()),
            minify: overlay_settings(self.minify.as_ref(), over.minify.as_ref()),
            output: over.output.clone().or_else(|| self.output.clone()),
            banner: over.banner.clone().or_else(|| self.banner.clone()),
            banner_on: over.banner_on.clone().or_else(|| self.banner_on.clone()),
        }
    }
}

fn overlay_settings(base: Option<&Settings>, over: Option<&Settings>) -> Option<Settings> {
    match (base, over) {
        (None, None) => None,
        (Some(base), None) => Some(base.clone()),
        (None, Some(over)) => Some(over.clone()),
        (Some(base), Some(over)) => Some(merge_settings(base.clone(), Some(over))),
    }
}

/// Shallow merge: every key of `over` replaces the same key in `base`.
pub fn merge_settings(mut base: Settings, over: Option<&Settings>) -> Settings {
    if let Some(over) = over {
        for (key, value) in over {
            base.insert(key.clone(), value.clone());
        }
    }
    base
}

/// Options of one bundle after merging and validation.
///
/// `should_minify` and `should_keep_unminified` are derived from the output
/// mode on every call and cannot be set on their own.
#[derive(Debug, Clone)]
pub struct ResolvedOptions {
    operation: Operation,
    stage_settings: Settings,
    minify_settings: Settings,
    output_mode: Mode,
    banner_mode: Mode,
    banner_text: String,
}

impl ResolvedOptions {
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Present only when this bundle concatenates. Planning goes through
    /// `stage_settings`; this is for asserting which map was resolved.
    #[cfg(test)]
    pub fn concat_settings(&self) -> Option<&Settings> {
        (self.operation == Operation::Concat).then_some(&self.stage_settings)
    }

    /// Present only when this bundle copies.
    #[cfg(test)]
    pub fn copy_settings(&self) -> Option<&Settings> {
        (self.operation == Operation::Copy).then_some(&self.stage_settings)
    }

    pub fn minify_settings(&self) -> &Settings {
        &self.minify_settings
    }

    /// Settings of the concat or copy stage, whichever this bundle runs.
    pub fn stage_settings(&self) -> &Settings {
        &self.stage_settings
    }

    pub fn output_mode(&self) -> Mode {
        self.output_mode
    }

    pub fn banner_mode(&self) -> Mode {
        self.banner_mode
    }

    pub fn banner_text(&self) -> &str {
        &self.banner_text
    }

    pub fn should_minify(&self) -> bool {
        self.output_mode.includes_minified()
    }

    pub fn should_keep_unminified(&self) -> bool {
        self.output_mode.includes_clean()
    }

    /// True when the first stage writes the final `.min.js` names itself.
    pub fn minified_only(&self) -> bool {
        self.should_minify() && !self.should_keep_unminified()
    }
}

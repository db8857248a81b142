//! Destination paths for concat/copy and minify stages.
//!
//! All paths handled here are plain strings with `/` separators so that the
//! same configuration yields the same destinations on every platform.

use crate::{
    error::{GlueError, Result},
    options::{Operation, ResolvedOptions},
};

const JS_EXT: &str = ".js";
const MIN_JS_EXT: &str = ".min.js";

/// Computes the final destination of the concat or copy stage.
///
/// Copies need a directory destination (trailing `/`) and a source path;
/// concatenations need a file destination.
pub fn normalize(
    source: Option<&str>,
    raw_destination: &str,
    flatten: bool,
    options: &ResolvedOptions,
    operation: Operation,
) -> Result<String> {
    let destination = to_forward_slashes(raw_destination);

    let destination = match (operation, is_dir(&destination)) {
        (Operation::Copy, false) => {
            return Err(GlueError::PathContract(format!(
                "Can not copy multiple files into \"{}\". Destination must be a target directory name with trailing \"/\".",
                raw_destination
            )));
        }
        (Operation::Concat, true) => {
            return Err(GlueError::PathContract(format!(
                "Can not concat files into \"{}\". Destination must be a target file name (with optional .js extension).",
                raw_destination
            )));
        }
        (Operation::Copy, true) => {
            let source = source.map(to_forward_slashes).ok_or_else(|| {
                GlueError::PathContract(format!(
                    "Can not copy into \"{}\" without a source file.",
                    raw_destination
                ))
            })?;
            let source = if flatten {
                file_name_of(&source)
            } else {
                source.trim_start_matches("./")
            };
            format!("{}{}", destination, source)
        }
        (Operation::Concat, false) => destination,
    };

    Ok(apply_extension(destination, options.minified_only()))
}

/// Destination of the minify stage, derived from the concat/copy output.
///
/// When unminified files are kept the minifier writes next to them as
/// `.min.js`; otherwise the first stage already wrote `.min.js` and the file
/// is minified in place.
pub fn minified_destination(stage_destination: &str, options: &ResolvedOptions) -> String {
    if !options.should_keep_unminified() || stage_destination.ends_with(MIN_JS_EXT) {
        return stage_destination.to_string();
    }

    match stage_destination.strip_suffix(JS_EXT) {
        Some(stem) => format!("{}{}", stem, MIN_JS_EXT),
        None => format!("{}{}", stage_destination, MIN_JS_EXT),
    }
}

pub fn to_forward_slashes(path: &str) -> String {
    path.replace('\\', "/")
}

fn is_dir(destination: &str) -> bool {
    destination.ends_with('/')
}

fn file_name_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn apply_extension(destination: String, minified_only: bool) -> String {
    if !destination.ends_with(JS_EXT) {
        let ext = if minified_only { MIN_JS_EXT } else { JS_EXT };
        return destination + ext;
    }

    let is_min = destination.ends_with(MIN_JS_EXT);
    match (is_min, minified_only) {
        (true, false) => replace_suffix(&destination, MIN_JS_EXT, JS_EXT),
        (false, true) => replace_suffix(&destination, JS_EXT, MIN_JS_EXT),
        _ => destination,
    }
}

fn replace_suffix(path: &str, from: &str, to: &str) -> String {
    let stem = &path[..path.len() - from.len()];
    format!("{}{}", stem, to)
}

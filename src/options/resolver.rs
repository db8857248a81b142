use serde_json::Value;

use super::{Mode, Operation, ResolvedOptions, Settings, UserOptions, defaults, merge_settings};
use crate::error::Result;

const BANNER_KEY: &str = "banner";

pub fn resolve(user: &UserOptions) -> Result<ResolvedOptions> {
    let output_mode = Mode::parse(
        "output",
        user.output.as_deref().unwrap_or(defaults::DEFAULT_OUTPUT),
    )?;
    let banner_mode = Mode::parse(
        "bannerOn",
        user.banner_on.as_deref().unwrap_or(defaults::DEFAULT_BANNER_ON),
    )?;

    let (operation, stage_settings) = match &user.concat {
        Some(concat) => (
            Operation::Concat,
            merge_settings(defaults::concat(), Some(concat)),
        ),
        None => (
            Operation::Copy,
            merge_settings(defaults::copy(), user.copy.as_ref()),
        ),
    };

    if user.concat.is_some() && user.copy.is_some() {
        tracing::warn!("Both concat and copy options are set, concatenating and ignoring copy");
    }

    let mut options = ResolvedOptions {
        operation,
        stage_settings,
        minify_settings: merge_settings(defaults::minify(), user.minify.as_ref()),
        output_mode,
        banner_mode,
        banner_text: user.banner.clone().unwrap_or_default(),
    };

    apply_banner_policy(&mut options);

    tracing::debug!(
        operation = ?options.operation(),
        output = %options.output_mode(),
        banner_on = %options.banner_mode(),
        has_banner = !options.banner_text().is_empty(),
        "Resolved options"
    );

    Ok(options)
}

/// Decides which stage writes the banner. The concat/copy stage produces the
/// unminified files; the minify stage writes the banner again after
/// minification because minifiers drop comments.
fn apply_banner_policy(options: &mut ResolvedOptions) {
    let banner_on_clean = options.should_keep_unminified() && options.banner_mode.includes_clean();
    let banner_on_minified = options.should_minify() && options.banner_mode.includes_minified();

    let stage_banner = match (options.operation, banner_on_clean) {
        (_, true) => Value::String(options.banner_text.clone()),
        (Operation::Concat, false) => Value::String(String::new()),
        (Operation::Copy, false) => Value::Null,
    };
    set_banner(&mut options.stage_settings, stage_banner);

    let minify_banner = if banner_on_minified {
        options.banner_text.clone()
    } else {
        String::new()
    };
    set_banner(&mut options.minify_settings, Value::String(minify_banner));
}

fn set_banner(settings: &mut Settings, banner: Value) {
    settings.insert(BANNER_KEY.to_string(), banner);
}

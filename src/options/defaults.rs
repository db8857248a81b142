//! Neutral engine defaults.
//!
//! These replace whatever defaults the engines ship with, so a change in an
//! engine's own defaults never changes the output of a build.

use serde_json::{Value, json};

use super::Settings;

pub const DEFAULT_OUTPUT: &str = "both";
pub const DEFAULT_BANNER_ON: &str = "both";

pub fn concat() -> Settings {
    table(json!({
        "separator": "\n",
        "footer": "",
        "stripBanners": false,
        "process": false,
        "sourceMap": false,
        "sourceMapStyle": "embed",
    }))
}

pub fn copy() -> Settings {
    table(json!({
        "process": false,
        "noProcess": false,
        "encoding": "utf8",
        "mode": false,
        "timestamp": false,
    }))
}

pub fn minify() -> Settings {
    table(json!({
        "mangle": true,
        "compress": true,
        "beautify": false,
        "report": false,
        "sourceMap": false,
        "sourceMapIncludeSources": false,
        "maxLineLen": 32000,
        "ASCIIOnly": false,
        "exportAll": false,
        "preserveComments": false,
        "banner": "",
        "footer": "",
    }))
}

fn table(value: Value) -> Settings {
    match value {
        Value::Object(map) => map,
        _ => Settings::new(),
    }
}

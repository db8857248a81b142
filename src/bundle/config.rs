use std::{
    collections::{BTreeMap, HashMap},
    env, fs,
    sync::LazyLock,
};

use regex::Regex;
use serde::Deserialize;

use super::Bundle;
use crate::{error::Result, options::UserOptions, output::OutputDisplay, plan::Engine};

static BRACED_VARIABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid regex"));
static SIMPLE_VARIABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)\b").expect("valid regex"));

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Config {
    #[serde(rename = "bundle", default)]
    bundles: BTreeMap<String, Bundle>,
    config: Option<ConfigSection>,
    #[serde(default)]
    variables: HashMap<String, String>,
    #[serde(default)]
    engines: Engines,
    #[serde(default)]
    options: UserOptions,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigSection {
    default: Option<String>,
    timeout: Option<String>,
    display: Option<OutputDisplay>,
}

/// Shell commands implementing the three engines. Each receives its stage as
/// JSON on stdin.
#[derive(Debug, Default, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct Engines {
    pub concat: Option<String>,
    pub copy: Option<String>,
    #[serde(alias = "uglify")]
    pub minify: Option<String>,
}

impl Engines {
    pub fn command(&self, engine: Engine) -> Option<&str> {
        match engine {
            Engine::Concat => self.concat.as_deref(),
            Engine::Copy => self.copy.as_deref(),
            Engine::Minify => self.minify.as_deref(),
        }
    }
}

#[derive(Debug)]
pub struct GlueConfiguration {
    pub bundles: Vec<Bundle>,
    pub default_bundle: Option<String>,
    pub timeout: Option<String>,
    pub display: Option<OutputDisplay>,
    pub engines: Engines,
    pub options: UserOptions,
}

pub fn load_config(config_path: &str) -> Result<GlueConfiguration> {
    let config = load_and_parse_config(config_path)?;
    Ok(process_config(config))
}

fn load_and_parse_config(config_path: &str) -> Result<Config> {
    let contents = fs::read_to_string(config_path)?;
    parse_config(&contents)
}

fn parse_config(contents: &str) -> Result<Config> {
    let config = toml::from_str(contents)?;
    Ok(config)
}

fn process_config(config: Config) -> GlueConfiguration {
    let default_bundle = config.config.as_ref().and_then(|c| c.default.clone());
    let timeout = config.config.as_ref().and_then(|c| c.timeout.clone());
    let display = config.config.as_ref().and_then(|c| c.display);

    let mut variables = config.variables;
    add_builtin_variables(&mut variables);

    let bundles: Vec<Bundle> = config
        .bundles
        .into_iter()
        .map(|(name, mut bundle)| {
            if bundle.name.is_empty() {
                bundle.name = name;
            }
            substitute_variables_in_bundle(&mut bundle, &variables);
            bundle
        })
        .collect();

    let mut options = config.options;
    substitute_variables_in_options(&mut options, &variables);

    let mut engines = config.engines;
    for command in [&mut engines.concat, &mut engines.copy, &mut engines.minify]
        .into_iter()
        .flatten()
    {
        *command = substitute_variables(command, &variables);
    }

    GlueConfiguration {
        bundles,
        default_bundle,
        timeout,
        display,
        engines,
        options,
    }
}

fn add_builtin_variables(variables: &mut HashMap<String, String>) {
    for (key, value) in env::vars() {
        variables.insert(format!("ENV_{}", key), value);
    }

    if let Ok(pwd) = env::current_dir() {
        variables.insert("PWD".to_string(), pwd.to_string_lossy().to_string());
    }
}

fn substitute_variables_in_bundle(bundle: &mut Bundle, variables: &HashMap<String, String>) {
    for group in &mut bundle.files {
        group.dest = substitute_variables(&group.dest, variables);
        group.cwd = group
            .cwd
            .as_deref()
            .map(|cwd| substitute_variables(cwd, variables));
        group.src = group
            .src
            .iter()
            .map(|src| substitute_variables(src, variables))
            .collect();
    }

    substitute_variables_in_options(&mut bundle.options, variables);
}

fn substitute_variables_in_options(options: &mut UserOptions, variables: &HashMap<String, String>) {
    options.banner = options
        .banner
        .as_deref()
        .map(|banner| substitute_variables(banner, variables));
}

fn substitute_variables(text: &str, variables: &HashMap<String, String>) -> String {
    let result = BRACED_VARIABLE
        .replace_all(text, |caps: &regex::Captures| {
            let var_name = &caps[1];
            variables
                .get(var_name)
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .to_string();

    SIMPLE_VARIABLE
        .replace_all(&result, |caps: &regex::Captures| {
            let var_name = &caps[1];
            variables
                .get(var_name)
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .to_string()
}

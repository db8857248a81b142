use std::fmt;

use serde::Serialize;

use crate::{
    destination::{minified_destination, normalize, to_forward_slashes},
    error::Result,
    options::{Operation, ResolvedOptions, Settings},
    util::normalize_cwd,
};

const TARGET_HASH_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    Concat,
    Copy,
    Minify,
}

impl Engine {
    pub fn as_str(self) -> &'static str {
        match self {
            Engine::Concat => "concat",
            Engine::Copy => "copy",
            Engine::Minify => "minify",
        }
    }
}

impl From<Operation> for Engine {
    fn from(operation: Operation) -> Self {
        match operation {
            Operation::Concat => Engine::Concat,
            Operation::Copy => Engine::Copy,
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMapping {
    pub sources: Vec<String>,
    pub destination: String,
}

/// One engine invocation, serialized as the engine's input.
#[derive(Debug, Clone, Serialize)]
pub struct Stage {
    pub engine: Engine,
    pub target: String,
    pub files: Vec<FileMapping>,
    pub options: Settings,
}

impl Stage {
    fn new(bundle: &str, engine: Engine, files: Vec<FileMapping>, options: &Settings) -> Self {
        Stage {
            engine,
            target: stage_target(bundle, engine, &files),
            files,
            options: options.clone(),
        }
    }

    pub fn task_name(&self) -> String {
        format!("{}:{}", self.engine, self.target)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub bundle: String,
    pub stages: Vec<Stage>,
}

/// A file group whose `src` globs have been expanded. `sources` are relative
/// to `cwd`.
#[derive(Debug, Clone, Default)]
pub struct ExpandedGroup {
    pub cwd: Option<String>,
    pub sources: Vec<String>,
    pub dest: String,
    pub flatten: bool,
}

pub fn build_plan(
    bundle: &str,
    groups: &[ExpandedGroup],
    options: &ResolvedOptions,
) -> Result<Plan> {
    let operation = options.operation();
    let mut files = Vec::new();

    for group in groups {
        match operation {
            Operation::Concat => {
                if group.sources.is_empty() {
                    tracing::warn!(bundle, dest = %group.dest, "No source files matched, skipping");
                    continue;
                }
                let destination = normalize(None, &group.dest, group.flatten, options, operation)?;
                let sources = group
                    .sources
                    .iter()
                    .map(|src| join_cwd(group.cwd.as_deref(), src))
                    .collect();
                files.push(FileMapping {
                    sources,
                    destination,
                });
            }
            Operation::Copy => {
                for src in &group.sources {
                    let destination =
                        normalize(Some(src), &group.dest, group.flatten, options, operation)?;
                    files.push(FileMapping {
                        sources: vec![join_cwd(group.cwd.as_deref(), src)],
                        destination,
                    });
                }
            }
        }
    }

    let mut stages = Vec::new();

    if files.is_empty() {
        tracing::warn!(bundle, "Nothing to build");
        return Ok(Plan {
            bundle: bundle.to_string(),
            stages,
        });
    }

    let minify_files: Vec<FileMapping> = files
        .iter()
        .map(|file| FileMapping {
            sources: vec![file.destination.clone()],
            destination: minified_destination(&file.destination, options),
        })
        .collect();

    stages.push(Stage::new(
        bundle,
        operation.into(),
        files,
        options.stage_settings(),
    ));

    if options.should_minify() {
        stages.push(Stage::new(
            bundle,
            Engine::Minify,
            minify_files,
            options.minify_settings(),
        ));
    }

    for stage in &stages {
        tracing::debug!(stage = %stage.task_name(), "Planned stage");
        for file in &stage.files {
            tracing::debug!("  [{}] -> {}", file.sources.join(", "), file.destination);
        }
    }

    Ok(Plan {
        bundle: bundle.to_string(),
        stages,
    })
}

fn join_cwd(cwd: Option<&str>, src: &str) -> String {
    let src = to_forward_slashes(src);
    let cwd = normalize_cwd(cwd);
    if cwd.is_empty() {
        src
    } else {
        format!("{}/{}", cwd.trim_end_matches('/'), src)
    }
}

/// `<bundle>_<hash>` where the hash covers the engine and file mappings, so
/// targets are unique per stage and stable across runs.
fn stage_target(bundle: &str, engine: Engine, files: &[FileMapping]) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(engine.as_str().as_bytes());
    hasher.update(b"\0");
    hasher.update(bundle.as_bytes());
    for file in files {
        for source in &file.sources {
            hasher.update(b"\0");
            hasher.update(source.as_bytes());
        }
        hasher.update(b"\0>");
        hasher.update(file.destination.as_bytes());
    }

    let hex = hasher.finalize().to_hex();
    format!("{}_{}", bundle, &hex[..TARGET_HASH_LEN])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::GlueError,
        options::{UserOptions, resolve},
        util::expand_sources,
    };

    fn resolved(output: &str, concat: bool) -> ResolvedOptions {
        resolve(&UserOptions {
            output: Some(output.to_string()),
            concat: concat.then(Settings::new),
            ..UserOptions::default()
        })
        .unwrap()
    }

    fn group(cwd: Option<&str>, sources: &[&str], dest: &str, flatten: bool) -> ExpandedGroup {
        ExpandedGroup {
            cwd: cwd.map(str::to_string),
            sources: sources.iter().map(|s| s.to_string()).collect(),
            dest: dest.to_string(),
            flatten,
        }
    }

    #[test]
    fn test_copy_plan_with_minify() {
        let groups = [group(Some("lib"), &["a.js", "util/b.js"], "dist/", false)];

        let plan = build_plan("app", &groups, &resolved("both", false)).unwrap();

        assert_eq!(plan.stages.len(), 2);
        let copy = &plan.stages[0];
        assert_eq!(copy.engine, Engine::Copy);
        assert_eq!(
            copy.files,
            vec![
                FileMapping {
                    sources: vec!["lib/a.js".to_string()],
                    destination: "dist/a.js".to_string(),
                },
                FileMapping {
                    sources: vec!["lib/util/b.js".to_string()],
                    destination: "dist/util/b.js".to_string(),
                },
            ]
        );

        let minify = &plan.stages[1];
        assert_eq!(minify.engine, Engine::Minify);
        assert_eq!(minify.files[0].sources, vec!["dist/a.js"]);
        assert_eq!(minify.files[0].destination, "dist/a.min.js");
        assert_eq!(minify.files[1].destination, "dist/util/b.min.js");
    }

    #[test]
    fn test_concat_plan_clean_only_has_no_minify_stage() {
        let groups = [group(None, &["src/a.js", "src/b.js"], "dist/app", false)];

        let plan = build_plan("app", &groups, &resolved("clean", true)).unwrap();

        assert_eq!(plan.stages.len(), 1);
        let concat = &plan.stages[0];
        assert_eq!(concat.engine, Engine::Concat);
        assert_eq!(concat.files[0].sources, vec!["src/a.js", "src/b.js"]);
        assert_eq!(concat.files[0].destination, "dist/app.js");
        assert_eq!(concat.options["separator"], serde_json::json!("\n"));
    }

    #[test]
    fn test_minified_only_minifies_in_place() {
        let groups = [group(Some("."), &["src/a.js"], "dist/app.js", false)];

        let plan = build_plan("app", &groups, &resolved("minified", true)).unwrap();

        assert_eq!(plan.stages[0].files[0].sources, vec!["src/a.js"]);
        assert_eq!(plan.stages[0].files[0].destination, "dist/app.min.js");
        assert_eq!(plan.stages[1].files[0].sources, vec!["dist/app.min.js"]);
        assert_eq!(plan.stages[1].files[0].destination, "dist/app.min.js");
    }

    #[test]
    fn test_empty_concat_groups_are_skipped() {
        let groups = [
            group(None, &[], "dist/empty", false),
            group(None, &["src/a.js"], "dist/app", false),
        ];

        let plan = build_plan("app", &groups, &resolved("both", true)).unwrap();

        assert_eq!(plan.stages[0].files.len(), 1);
        assert_eq!(plan.stages[0].files[0].destination, "dist/app.js");
    }

    #[test]
    fn test_no_files_means_no_stages() {
        let plan = build_plan("app", &[], &resolved("both", false)).unwrap();
        assert!(plan.stages.is_empty());
    }

    #[test]
    fn test_contract_violation_aborts_plan() {
        let groups = [group(None, &["src/a.js"], "dist/app.js", false)];

        let err = build_plan("app", &groups, &resolved("both", false)).unwrap_err();

        assert!(matches!(err, GlueError::PathContract(_)));
    }

    #[test]
    fn test_stage_targets_are_stable_and_distinct() {
        let groups = [group(None, &["src/a.js"], "dist/app", false)];
        let options = resolved("both", true);

        let first = build_plan("app", &groups, &options).unwrap();
        let second = build_plan("app", &groups, &options).unwrap();

        assert_eq!(first.stages[0].target, second.stages[0].target);
        assert_ne!(first.stages[0].target, first.stages[1].target);
        assert!(first.stages[0].target.starts_with("app_"));
        assert_eq!(first.stages[0].target.len(), "app_".len() + TARGET_HASH_LEN);
        assert!(first.stages[1].task_name().starts_with("minify:app_"));
    }

    #[test]
    fn test_stage_serializes_as_engine_input() {
        let groups = [group(None, &["src/a.js"], "dist/app", false)];
        let plan = build_plan("app", &groups, &resolved("clean", true)).unwrap();

        let json = serde_json::to_value(&plan.stages[0]).unwrap();

        assert_eq!(json["engine"], "concat");
        assert_eq!(json["files"][0]["sources"][0], "src/a.js");
        assert_eq!(json["files"][0]["destination"], "dist/app.js");
        assert!(json["options"].is_object());
    }

    #[test]
    fn test_cwd_forms_join_to_the_same_source() {
        for cwd in ["lib", "lib/", "./lib", "./lib/"] {
            assert_eq!(join_cwd(Some(cwd), "util/b.js"), "lib/util/b.js", "cwd={}", cwd);
        }
        for cwd in [".", "./", ""] {
            assert_eq!(join_cwd(Some(cwd), "src/a.js"), "src/a.js", "cwd={}", cwd);
        }
        assert_eq!(join_cwd(None, "src/a.js"), "src/a.js");
    }

    /// Restores the process working directory when dropped.
    struct CurrentDirGuard(std::path::PathBuf);

    impl Drop for CurrentDirGuard {
        fn drop(&mut self) {
            let _ = std::env::set_current_dir(&self.0);
        }
    }

    #[test]
    fn test_relative_cwd_expands_and_plans_copy_mappings() {
        let dir = tempfile::tempdir().unwrap();
        for relative in ["lib/a.js", "lib/util/b.js"] {
            let path = dir.path().join(relative);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, "// js").unwrap();
        }

        let _guard = CurrentDirGuard(std::env::current_dir().unwrap());
        std::env::set_current_dir(dir.path()).unwrap();

        let expected = vec![
            FileMapping {
                sources: vec!["lib/a.js".to_string()],
                destination: "dist/a.js".to_string(),
            },
            FileMapping {
                sources: vec!["lib/util/b.js".to_string()],
                destination: "dist/util/b.js".to_string(),
            },
        ];

        for cwd in ["lib", "./lib", "./lib/"] {
            let mut sources = expand_sources(&["**/*.js".to_string()], Some(cwd)).unwrap();
            sources.sort();
            assert_eq!(sources, vec!["a.js", "util/b.js"], "cwd={}", cwd);

            let groups = [group(Some(cwd), &["a.js", "util/b.js"], "dist/", false)];
            let plan = build_plan("lib", &groups, &resolved("clean", false)).unwrap();
            assert_eq!(plan.stages[0].files, expected, "cwd={}", cwd);
        }

        let mut sources = expand_sources(&["lib/**/*.js".to_string()], Some(".")).unwrap();
        sources.sort();
        assert_eq!(sources, vec!["lib/a.js", "lib/util/b.js"]);

        let groups = [ExpandedGroup {
            cwd: Some(".".to_string()),
            sources,
            dest: "dist/".to_string(),
            flatten: false,
        }];
        let plan = build_plan("lib", &groups, &resolved("clean", false)).unwrap();
        assert_eq!(
            plan.stages[0].files,
            vec![
                FileMapping {
                    sources: vec!["lib/a.js".to_string()],
                    destination: "dist/lib/a.js".to_string(),
                },
                FileMapping {
                    sources: vec!["lib/util/b.js".to_string()],
                    destination: "dist/lib/util/b.js".to_string(),
                },
            ]
        );
    }
}

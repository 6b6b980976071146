use std::path::{Path, PathBuf};

use futures::future::BoxFuture;
use serde::Deserialize;
use tracing::info;

use crate::command::{CommandDescriptor, Context};
use crate::error::CoreError;
use crate::flags::{FOREIGN_MANIFEST, maven_flags};
use crate::options::Options;
use crate::version::{LINT_SINCE, at_least};

/// Parser version that first shipped the PHI translators.
pub const PHI_SINCE: &str = "0.35.2";

const EASY_HINT: &str =
    "There are errors and/or warnings; you may disable warnings via the --easy option";

/// Commands shared by every platform.
pub fn common() -> Vec<CommandDescriptor> {
    vec![
        CommandDescriptor::new("register").static_goals(&["eo:register"]),
        CommandDescriptor::new("parse").static_goals(&["eo:parse"]),
        CommandDescriptor::new("assemble").static_goals(&["eo:assemble"]),
        CommandDescriptor::new("verify")
            .goals(verify_goals)
            .extras(|options| {
                vec![format!("-Deo.failOnWarning={}", !options.easy)]
            })
            .hint(EASY_HINT),
        CommandDescriptor::new("sodg")
            .static_goals(&["eo:sodg"])
            .extras(sodg_extras),
        CommandDescriptor::new("phi")
            .static_goals(&["eo:xmir-to-phi"])
            .extras(|options| {
                vec![
                    dir_flag("eo.phiInputDir", &options.in_target(&options.phi_input)),
                    dir_flag("eo.phiOutputDir", &options.in_target(&options.phi_output)),
                ]
            })
            .requires(PHI_SINCE),
        CommandDescriptor::new("unphi")
            .static_goals(&["eo:phi-to-xmir"])
            .extras(|options| {
                let mut flags = vec![
                    dir_flag("eo.unphiInputDir", &options.in_target(&options.unphi_input)),
                    dir_flag("eo.unphiOutputDir", &options.in_target(&options.unphi_output)),
                ];
                if options.tests {
                    flags.push("-Deo.unphiMetas=+tests".to_string());
                }
                flags
            })
            .requires(PHI_SINCE),
        CommandDescriptor::new("print")
            .static_goals(&["eo:print"])
            .extras(|options| {
                vec![
                    dir_flag("eo.printSourcesDir", &options.in_target(&options.print_input)),
                    dir_flag("eo.printOutputDir", &options.in_target(&options.print_output)),
                ]
            }),
        CommandDescriptor::new("fmt")
            .static_goals(&["eo:print"])
            .extras(|options| {
                vec![
                    dir_flag("eo.printSourcesDir", &options.in_target("1-parse")),
                    dir_flag("eo.printOutputDir", options.sources()),
                ]
            }),
        CommandDescriptor::new("latex").static_goals(&["eo:latex"]),
        CommandDescriptor::new("jeo:disassemble")
            .goals(|options| vec![jeo_goal(options, "disassemble")])
            .extras(|options| {
                vec![
                    dir_flag("jeo.disassemble.sourcesDir", &options.in_target(&options.classes)),
                    dir_flag("jeo.disassemble.outputDir", &options.in_target(&options.xmirs)),
                ]
            }),
        CommandDescriptor::new("jeo:assemble")
            .goals(|options| vec![jeo_goal(options, "assemble")])
            .extras(|options| {
                vec![
                    dir_flag("jeo.assemble.sourcesDir", &options.in_target(&options.xmirs)),
                    dir_flag("jeo.assemble.outputDir", &options.in_target(&options.classes)),
                ]
            }),
        CommandDescriptor::new("audit").action(audit),
        CommandDescriptor::new("preflight").action(preflight),
        CommandDescriptor::new("clean").action(clean),
        CommandDescriptor::new("foreign").action(foreign),
    ]
}

fn verify_goals(options: &Options) -> Vec<String> {
    if at_least(&options.parser, LINT_SINCE) {
        vec!["eo:lint".to_string()]
    } else {
        vec!["eo:verify".to_string()]
    }
}

fn sodg_extras(options: &Options) -> Vec<String> {
    let mut flags = vec![format!("-Deo.sodgIncludes={}", options.include)];
    if let Some(exclude) = &options.exclude {
        flags.push(format!("-Deo.sodgExcludes={exclude}"));
    }
    let sodg = &options.sodg;
    let levels = [
        (sodg.xml || sodg.xembly || sodg.graph || sodg.dot, "-Deo.generateSodgXmlFiles"),
        (sodg.xembly || sodg.graph || sodg.dot, "-Deo.generateXemblyFiles"),
        (sodg.graph || sodg.dot, "-Deo.generateGraphFiles"),
        (sodg.dot, "-Deo.generateDotFiles"),
    ];
    flags.extend(
        levels
            .into_iter()
            .filter(|(on, _)| *on)
            .map(|(_, flag)| flag.to_string()),
    );
    flags
}

fn jeo_goal(options: &Options, goal: &str) -> String {
    format!("org.eolang:jeo-maven-plugin:{}:{goal}", options.jeo_version)
}

fn dir_flag(property: &str, dir: &Path) -> String {
    format!("-D{property}={}", dir.display())
}

fn audit(ctx: &Context) -> BoxFuture<'_, Result<(), CoreError>> {
    Box::pin(async move {
        ctx.mvnw_detached(vec!["--version".to_string()]).await?;
        Ok(())
    })
}

fn preflight(ctx: &Context) -> BoxFuture<'_, Result<(), CoreError>> {
    Box::pin(async move {
        info!("Starting preflight check");
        let mut args = vec!["eo:help".to_string()];
        args.extend(maven_flags(&ctx.options));
        ctx.mvnw(args, "preflight").await.map_err(|_| {
            CoreError::Failed(format!(
                "Preflight check failed. Parser version could be the problem. \
                 Current version of parser is: {}",
                ctx.options.parser
            ))
        })?;
        info!("Preflight check finished successfully");
        Ok(())
    })
}

fn clean(ctx: &Context) -> BoxFuture<'_, Result<(), CoreError>> {
    Box::pin(async move {
        remove_if_exists(ctx.options.target()).await?;
        if ctx.options.global {
            if let Some(home) = dirs::home_dir() {
                remove_if_exists(&home.join(".eo")).await?;
            }
        }
        Ok(())
    })
}

async fn remove_if_exists(dir: &Path) -> Result<(), CoreError> {
    if tokio::fs::try_exists(dir).await? {
        tokio::fs::remove_dir_all(dir).await?;
        info!("The directory {} deleted", dir.display());
    } else {
        info!("The directory {} doesn't exist, no need to delete", dir.display());
    }
    Ok(())
}

/// One entry of the foreign-objects manifest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ForeignObject {
    pub id: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// Reads `<target>/eo-foreign.json`.
pub async fn read_foreign(target: &Path) -> Result<(PathBuf, Vec<ForeignObject>), CoreError> {
    let path = target.join(FOREIGN_MANIFEST);
    let text = tokio::fs::read_to_string(&path).await?;
    let objects = serde_json::from_str(&text).map_err(|source| CoreError::Manifest {
        path: path.clone(),
        source,
    })?;
    Ok((path, objects))
}

fn foreign(ctx: &Context) -> BoxFuture<'_, Result<(), CoreError>> {
    Box::pin(async move {
        let (path, objects) = read_foreign(ctx.options.target()).await?;
        println!("There are {} objects in {}:", objects.len(), path.display());
        for object in &objects {
            println!("  {}", object.id);
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::command::testing::{RecordingRunner, context};
    use tempfile::tempdir;

    fn find(name: &str) -> CommandDescriptor {
        common()
            .into_iter()
            .find(|command| command.name() == name)
            .expect("command registered")
    }

    fn options() -> Options {
        let mut options = Options::new("src", "target").expect("options");
        options.batch = true;
        options
    }

    #[test]
    fn verify_switches_goal_with_parser_version() {
        let verify = find("verify");
        let mut options = options();
        options.parser = "0.44.0".to_string();
        assert_eq!(verify.goals_for(&options), vec!["eo:verify"]);
        options.parser = "0.45.0".to_string();
        assert_eq!(verify.goals_for(&options), vec!["eo:lint"]);
        options.parser = "0.1.0-SNAPSHOT".to_string();
        assert_eq!(verify.goals_for(&options), vec!["eo:lint"]);
    }

    #[test]
    fn verify_fails_on_warnings_unless_easy() {
        let verify = find("verify");
        let mut options = options();
        assert_eq!(verify.extras_for(&options), vec!["-Deo.failOnWarning=true"]);
        options.easy = true;
        assert_eq!(verify.extras_for(&options), vec!["-Deo.failOnWarning=false"]);
        assert!(verify.failure_hint().is_some());
    }

    #[test]
    fn sodg_levels_are_cumulative_without_duplicates() {
        let sodg = find("sodg");
        let mut options = options();
        options.sodg.dot = true;
        options.sodg.xml = true;
        options.exclude = Some("org.eolang.*".to_string());
        assert_eq!(
            sodg.extras_for(&options),
            vec![
                "-Deo.sodgIncludes=**",
                "-Deo.sodgExcludes=org.eolang.*",
                "-Deo.generateSodgXmlFiles",
                "-Deo.generateXemblyFiles",
                "-Deo.generateGraphFiles",
                "-Deo.generateDotFiles",
            ]
        );
    }

    #[test]
    fn phi_directories_are_resolved_under_target() {
        let phi = find("phi");
        let options = options();
        let extras = phi.extras_for(&options);
        assert_eq!(
            extras[0],
            format!("-Deo.phiInputDir={}", options.target().join("2-optimize").display())
        );
        assert_eq!(phi.min_parser(), Some(PHI_SINCE));
    }

    #[test]
    fn unphi_marks_tests_only_when_asked() {
        let unphi = find("unphi");
        let mut options = options();
        assert_eq!(unphi.extras_for(&options).len(), 2);
        options.tests = true;
        assert!(unphi
            .extras_for(&options)
            .contains(&"-Deo.unphiMetas=+tests".to_string()));
    }

    #[test]
    fn jeo_goal_carries_plugin_version() {
        let options = options();
        assert_eq!(
            find("jeo:disassemble").goals_for(&options),
            vec!["org.eolang:jeo-maven-plugin:0.6.11:disassemble"]
        );
    }

    #[tokio::test]
    async fn audit_runs_without_target() {
        let runner = Arc::new(RecordingRunner::default());
        let ctx = context(options(), runner.clone());
        find("audit").run(&ctx).await.expect("audit");
        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].args[0], "--version");
        assert!(calls[0].target.is_none());
    }

    #[tokio::test]
    async fn preflight_failure_names_the_parser() {
        let runner = Arc::new(RecordingRunner::failing(1));
        let mut options = options();
        options.parser = "0.1.0".to_string();
        let ctx = context(options, runner);
        let err = find("preflight").run(&ctx).await.unwrap_err();
        assert!(err.to_string().contains("Preflight check failed"), "{err}");
        assert!(err.to_string().contains("0.1.0"), "{err}");
    }

    #[tokio::test]
    async fn clean_removes_the_target_directory() {
        let dir = tempdir().expect("tempdir");
        let target = dir.path().join(".eoc");
        std::fs::create_dir_all(target.join("1-parse")).expect("mkdir");
        std::fs::write(target.join("1-parse/app.xmir"), "<program/>").expect("write");
        let mut options = Options::new(dir.path(), &target).expect("options");
        options.batch = true;
        let ctx = context(options, Arc::new(RecordingRunner::default()));
        find("clean").run(&ctx).await.expect("clean");
        assert!(!target.exists());
        find("clean").run(&ctx).await.expect("clean twice");
    }

    #[tokio::test]
    async fn reads_foreign_manifest() {
        let dir = tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join(FOREIGN_MANIFEST),
            r#"[{"id": "org.eolang.io.stdout", "version": "0.59.0"}, {"id": "app"}]"#,
        )
        .expect("write");
        let (path, objects) = read_foreign(dir.path()).await.expect("manifest");
        assert!(path.ends_with(FOREIGN_MANIFEST));
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[1].id, "app");
        assert_eq!(objects[1].version, None);
    }

    #[tokio::test]
    async fn broken_manifest_is_reported() {
        let dir = tempdir().expect("tempdir");
        std::fs::write(dir.path().join(FOREIGN_MANIFEST), "{").expect("write");
        let err = read_foreign(dir.path()).await.unwrap_err();
        assert!(matches!(err, CoreError::Manifest { .. }), "{err}");
    }
}

//! Argument vectors for the external tools.
//!
//! Every builder here is a pure function of its inputs, so the same
//! [`Options`] always yields the same vector.

use std::path::Path;

use crate::options::Options;

/// Name of the foreign-objects manifest, relative to the target directory.
pub const FOREIGN_MANIFEST: &str = "eo-foreign.json";

/// Arguments the Maven wrapper always receives after the composed ones.
pub const MAVEN_TRAILER: &[&str] = &[
    "--batch-mode",
    "--update-snapshots",
    "--fail-fast",
    "--color=never",
];

/// Shared flags passed to every Maven plugin goal.
pub fn maven_flags(options: &Options) -> Vec<String> {
    let target = options.target();
    strip_empty([
        format!("-Deo.version={}", options.parser),
        format!("-Deo.tag={}", options.home_tag),
        format!("-Deo.sourcesDir={}", options.sources().display()),
        format!("-Deo.targetDir={}", target.display()),
        format!(
            "-Deo.generatedDir={}",
            options.in_target("generated-sources").display()
        ),
        format!("-Deo.outputDir={}", options.in_target("classes").display()),
        format!("-Deo.placed={}", options.in_target("eo-placed.csv").display()),
        "-Deo.placedFormat=csv".to_string(),
        if options.verbose { "--errors" } else { "--quiet" }.to_string(),
        if options.debug { "--debug" } else { "" }.to_string(),
        if options.track_transformation_steps {
            "-Deo.trackTransformationSteps"
        } else {
            ""
        }
        .to_string(),
    ])
}

/// Flags of a single `eo2js` invocation.
pub fn eo2js_flags(options: &Options, resources: &Path, alone: bool, tests: bool) -> Vec<String> {
    strip_empty([
        "--target".to_string(),
        options.target().display().to_string(),
        "--project".to_string(),
        options.project.clone(),
        "--foreign".to_string(),
        FOREIGN_MANIFEST.to_string(),
        "--resources".to_string(),
        resources.display().to_string(),
        if alone { "--alone" } else { "" }.to_string(),
        if tests { "--tests" } else { "" }.to_string(),
    ])
}

/// Drops conditional placeholders; no process may receive an empty token.
pub fn strip_empty(args: impl IntoIterator<Item = String>) -> Vec<String> {
    args.into_iter().filter(|arg| !arg.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Options {
        let mut options = Options::new("sources", "target").expect("options");
        options.parser = "parser".to_string();
        options.home_tag = "homeTag".to_string();
        options
    }

    #[test]
    fn sets_version_and_tag() {
        let flags = maven_flags(&options());
        assert!(flags.contains(&"-Deo.tag=homeTag".to_string()));
        assert!(flags.contains(&"-Deo.version=parser".to_string()));
        assert!(flags.contains(&"-Deo.placedFormat=csv".to_string()));
    }

    #[test]
    fn is_deterministic_and_has_no_empty_tokens() {
        let options = options();
        let first = maven_flags(&options);
        let second = maven_flags(&options);
        assert_eq!(first, second);
        assert!(first.iter().all(|flag| !flag.is_empty()));
    }

    #[test]
    fn embeds_absolute_directories() {
        let options = options();
        let flags = maven_flags(&options);
        let target = flags
            .iter()
            .find_map(|flag| flag.strip_prefix("-Deo.targetDir="))
            .expect("target flag");
        assert!(Path::new(target).is_absolute());
        let sources = flags
            .iter()
            .find_map(|flag| flag.strip_prefix("-Deo.sourcesDir="))
            .expect("sources flag");
        assert!(Path::new(sources).is_absolute());
        assert!(flags.contains(&format!(
            "-Deo.generatedDir={}",
            options.target().join("generated-sources").display()
        )));
    }

    #[test]
    fn verbosity_flags_are_exclusive() {
        let mut options = options();
        let quiet = maven_flags(&options);
        assert!(quiet.contains(&"--quiet".to_string()));
        assert!(!quiet.contains(&"--errors".to_string()));

        options.verbose = true;
        options.debug = true;
        let loud = maven_flags(&options);
        assert!(loud.contains(&"--errors".to_string()));
        assert!(loud.contains(&"--debug".to_string()));
        assert!(!loud.contains(&"--quiet".to_string()));
    }

    #[test]
    fn eo2js_toggles_are_omitted_when_off() {
        let options = options();
        let flags = eo2js_flags(&options, Path::new("/opt/eo2js/resources"), false, false);
        assert_eq!(flags.len(), 8);
        assert_eq!(flags[0], "--target");
        assert_eq!(flags[5], FOREIGN_MANIFEST);

        let flags = eo2js_flags(&options, Path::new("/opt/eo2js/resources"), true, true);
        assert!(flags.ends_with(&["--alone".to_string(), "--tests".to_string()]));
    }
}

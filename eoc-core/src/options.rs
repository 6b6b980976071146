//! Normalized options record shared by every command.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::CoreError;

/// Parser version used when neither `--parser` nor `--latest` is given.
pub const DEFAULT_PARSER_VERSION: &str = "0.59.0";

/// Tag of objectionary/home compiled against by default.
pub const DEFAULT_HOME_TAG: &str = "0.59.0";

/// Target execution platform of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Java,
    JavaScript,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Java => f.write_str("Java"),
            Platform::JavaScript => f.write_str("JavaScript"),
        }
    }
}

impl FromStr for Platform {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "java" => Ok(Platform::Java),
            "javascript" | "js" => Ok(Platform::JavaScript),
            _ => Err(CoreError::UnknownPlatform(value.to_string())),
        }
    }
}

/// Which SODG renderings to request; each one implies the previous ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SodgOutputs {
    pub xml: bool,
    pub xembly: bool,
    pub graph: bool,
    pub dot: bool,
}

/// Everything a command needs to compute its goals, flags and actions.
///
/// `sources` and `target` are private so that they can only be set through
/// [`Options::new`], which makes them absolute. Nothing relative ever
/// reaches the arguments of a spawned process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    sources: PathBuf,
    target: PathBuf,
    pub parser: String,
    pub home_tag: String,
    pub platform: Platform,
    pub batch: bool,
    pub verbose: bool,
    pub debug: bool,
    pub alone: bool,
    pub easy: bool,
    pub track_transformation_steps: bool,

    // dataize / test
    pub stack: String,
    pub heap: String,
    pub object: Option<String>,
    pub arguments: Vec<String>,
    pub tests: bool,

    // sodg
    pub include: String,
    pub exclude: Option<String>,
    pub sodg: SodgOutputs,

    // phi / unphi / print, relative to target
    pub phi_input: String,
    pub phi_output: String,
    pub unphi_input: String,
    pub unphi_output: String,
    pub print_input: String,
    pub print_output: String,

    // jeo
    pub jeo_version: String,
    pub classes: String,
    pub xmirs: String,

    // eo2js
    pub project: String,

    // clean
    pub global: bool,
}

impl Options {
    pub fn new(sources: impl AsRef<Path>, target: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self {
            sources: std::path::absolute(sources.as_ref())?,
            target: std::path::absolute(target.as_ref())?,
            parser: DEFAULT_PARSER_VERSION.to_string(),
            home_tag: DEFAULT_HOME_TAG.to_string(),
            platform: Platform::Java,
            batch: false,
            verbose: false,
            debug: false,
            alone: false,
            easy: false,
            track_transformation_steps: false,
            stack: "64M".to_string(),
            heap: "256M".to_string(),
            object: None,
            arguments: Vec::new(),
            tests: false,
            include: "**".to_string(),
            exclude: None,
            sodg: SodgOutputs::default(),
            phi_input: "2-optimize".to_string(),
            phi_output: "phi".to_string(),
            unphi_input: "phi".to_string(),
            unphi_output: "unphi".to_string(),
            print_input: "2-optimize".to_string(),
            print_output: "print".to_string(),
            jeo_version: "0.6.11".to_string(),
            classes: "classes".to_string(),
            xmirs: "xmir".to_string(),
            project: "project".to_string(),
            global: false,
        })
    }

    /// Absolute directory with `.eo` sources.
    pub fn sources(&self) -> &Path {
        &self.sources
    }

    /// Absolute directory with all generated files.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// A path under the target directory.
    pub fn in_target(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.target.join(relative)
    }
}

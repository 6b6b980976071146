use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use eoc_core::central::MavenCentral;
use eoc_core::options::{DEFAULT_HOME_TAG, DEFAULT_PARSER_VERSION};
use eoc_core::version::is_snapshot;
use eoc_core::{
    CoreError, Options, PipelineRequest, Platform, ProcessRunner, Registry, Runner, Toolchain,
    run_pipeline,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "eoc", version, about = "EO command-line toolkit", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true, default_value = ".", help = "Directory with .eo sources")]
    sources: PathBuf,

    #[arg(
        short,
        long,
        global = true,
        default_value = ".eoc",
        help = "Directory with all generated files"
    )]
    target: PathBuf,

    #[arg(long, global = true, value_name = "VERSION", default_value = DEFAULT_PARSER_VERSION)]
    parser: String,

    #[arg(long, global = true, value_name = "TAG", default_value = DEFAULT_HOME_TAG)]
    home_tag: String,

    #[arg(long, global = true, help = "Use the latest parser version from Maven Central")]
    latest: bool,

    #[arg(long, global = true, help = "Run the command without its prerequisites")]
    alone: bool,

    #[arg(
        short,
        long,
        global = true,
        value_name = "PLATFORM",
        default_value = "Java",
        help = "Target platform: Java or JavaScript"
    )]
    language: String,

    #[arg(short, long, global = true, help = "Run in batch mode, no live progress")]
    batch: bool,

    #[arg(long, global = true, help = "Do not fail on warnings")]
    easy: bool,

    #[arg(long, global = true, help = "Delete the target directory first")]
    clean: bool,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, global = true)]
    debug: bool,

    #[arg(long, global = true, help = "Save intermediate XMIR files")]
    track_transformation_steps: bool,

    #[arg(long, global = true, help = "Skip checking that the parser version exists")]
    offline: bool,

    #[arg(long, global = true, env = "EOC_MVNW_HOME", value_name = "DIR")]
    mvnw_home: Option<PathBuf>,

    #[arg(long, global = true, env = "EOC_EO2JS_HOME", value_name = "DIR")]
    eo2js_home: Option<PathBuf>,

    #[arg(long, global = true, env = "EOC_NODE", default_value = "node")]
    node: PathBuf,

    #[arg(long, global = true, env = "EOC_JAVA", default_value = "java")]
    java: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Register all .eo sources in a CSV catalog
    Register,
    /// Parse .eo sources into XMIR
    Parse,
    /// Parse, optimize, pull and resolve all objects
    Assemble,
    /// Check XMIR for errors and warnings
    #[command(alias = "lint")]
    Verify,
    /// Resolve and place all dependencies
    Resolve,
    /// Generate SODG from XMIR
    Sodg {
        #[arg(long, default_value = "**", help = "Objects to include")]
        include: String,
        #[arg(long, help = "Objects to exclude")]
        exclude: Option<String>,
        #[arg(long)]
        xml: bool,
        #[arg(long)]
        xembly: bool,
        #[arg(long)]
        graph: bool,
        #[arg(long)]
        dot: bool,
    },
    /// Generate phi expressions from XMIR
    Phi {
        #[arg(long, default_value = "2-optimize", help = "Input directory inside target")]
        phi_input: String,
        #[arg(long, default_value = "phi", help = "Output directory inside target")]
        phi_output: String,
    },
    /// Generate XMIR from phi expressions
    Unphi {
        #[arg(long, default_value = "phi")]
        unphi_input: String,
        #[arg(long, default_value = "unphi")]
        unphi_output: String,
        #[arg(long, help = "Mark generated XMIR as tests")]
        tests: bool,
    },
    /// Print EO sources back from XMIR
    Print {
        #[arg(long, default_value = "2-optimize")]
        print_input: String,
        #[arg(long, default_value = "print")]
        print_output: String,
    },
    /// Format .eo sources in place
    Fmt,
    /// Generate LaTeX from EO sources
    Latex,
    /// Disassemble bytecode into XMIR
    #[command(name = "jeo:disassemble")]
    JeoDisassemble {
        #[command(flatten)]
        jeo: JeoArgs,
    },
    /// Assemble XMIR into bytecode
    #[command(name = "jeo:assemble")]
    JeoAssemble {
        #[command(flatten)]
        jeo: JeoArgs,
    },
    /// Inspect the toolchain
    Audit,
    /// Check that the parser version works
    Preflight,
    /// Delete generated files
    Clean {
        #[arg(long, help = "Also delete ~/.eo")]
        global: bool,
    },
    /// List foreign objects
    Foreign,
    /// Generate target-language sources from XMIR
    Transpile,
    /// Compile generated sources
    Compile,
    /// Link compiled code into an executable
    Link,
    /// Run a single EO object
    Dataize {
        object: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        arguments: Vec<String>,
        #[command(flatten)]
        memory: MemoryArgs,
    },
    /// Run all EO tests
    Test {
        #[command(flatten)]
        memory: MemoryArgs,
    },
}

#[derive(clap::Args, Debug)]
struct JeoArgs {
    #[arg(long, default_value = "0.6.11")]
    jeo_version: String,
    #[arg(long, default_value = "classes", help = "Bytecode directory inside target")]
    classes: String,
    #[arg(long, default_value = "xmir", help = "XMIR directory inside target")]
    xmirs: String,
}

#[derive(clap::Args, Debug)]
struct MemoryArgs {
    #[arg(long, default_value = "64M", help = "JVM stack size")]
    stack: String,
    #[arg(long, default_value = "256M", help = "JVM heap size")]
    heap: String,
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Register => "register",
            Commands::Parse => "parse",
            Commands::Assemble => "assemble",
            Commands::Verify => "verify",
            Commands::Resolve => "resolve",
            Commands::Sodg { .. } => "sodg",
            Commands::Phi { .. } => "phi",
            Commands::Unphi { .. } => "unphi",
            Commands::Print { .. } => "print",
            Commands::Fmt => "fmt",
            Commands::Latex => "latex",
            Commands::JeoDisassemble { .. } => "jeo:disassemble",
            Commands::JeoAssemble { .. } => "jeo:assemble",
            Commands::Audit => "audit",
            Commands::Preflight => "preflight",
            Commands::Clean { .. } => "clean",
            Commands::Foreign => "foreign",
            Commands::Transpile => "transpile",
            Commands::Compile => "compile",
            Commands::Link => "link",
            Commands::Dataize { .. } => "dataize",
            Commands::Test { .. } => "test",
        }
    }

    /// Whether `--clean` wipes the target before this command.
    fn honours_clean(&self) -> bool {
        matches!(
            self,
            Commands::Parse
                | Commands::Assemble
                | Commands::Verify
                | Commands::Resolve
                | Commands::Sodg { .. }
                | Commands::Phi { .. }
                | Commands::Unphi { .. }
                | Commands::Print { .. }
                | Commands::Fmt
                | Commands::Latex
                | Commands::Transpile
                | Commands::Compile
                | Commands::Link
                | Commands::Dataize { .. }
                | Commands::Test { .. }
        )
    }

    /// Copies per-command arguments into the options record.
    fn apply(self, options: &mut Options) {
        match self {
            Commands::Sodg {
                include,
                exclude,
                xml,
                xembly,
                graph,
                dot,
            } => {
                options.include = include;
                options.exclude = exclude;
                options.sodg.xml = xml;
                options.sodg.xembly = xembly;
                options.sodg.graph = graph;
                options.sodg.dot = dot;
            }
            Commands::Phi {
                phi_input,
                phi_output,
            } => {
                options.phi_input = phi_input;
                options.phi_output = phi_output;
            }
            Commands::Unphi {
                unphi_input,
                unphi_output,
                tests,
            } => {
                options.unphi_input = unphi_input;
                options.unphi_output = unphi_output;
                options.tests = tests;
            }
            Commands::Print {
                print_input,
                print_output,
            } => {
                options.print_input = print_input;
                options.print_output = print_output;
            }
            Commands::JeoDisassemble { jeo } | Commands::JeoAssemble { jeo } => {
                options.jeo_version = jeo.jeo_version;
                options.classes = jeo.classes;
                options.xmirs = jeo.xmirs;
            }
            Commands::Clean { global } => options.global = global,
            Commands::Dataize {
                object,
                arguments,
                memory,
            } => {
                options.object = Some(object);
                options.arguments = arguments;
                options.stack = memory.stack;
                options.heap = memory.heap;
            }
            Commands::Test { memory } => {
                options.tests = true;
                options.stack = memory.stack;
                options.heap = memory.heap;
            }
            _ => {}
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.debug);
    let verbose = cli.verbose || cli.debug;
    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", style("\u{2717}").red());
            if verbose {
                eprintln!("{err:?}");
            }
            ExitCode::from(exit_code(&err))
        }
    }
}

fn init_tracing(verbose: bool, debug: bool) {
    let level = if debug {
        "trace"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<CoreError>()
        .map(CoreError::exit_code)
        .and_then(|code| u8::try_from(code).ok())
        .filter(|code| *code != 0)
        .unwrap_or(1)
}

fn default_mvnw_home() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../mvnw")
}

fn default_eo2js_home() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../eo2js")
}

/// Replaces the parser version with the latest release; the home tag stays.
async fn use_latest(options: &mut Options, central: &MavenCentral) -> Result<()> {
    let latest = central
        .latest()
        .await
        .context("failed to find the latest parser version")?;
    info!("EO parser {latest} is the latest release");
    options.parser = latest;
    Ok(())
}

async fn execute(cli: Cli) -> Result<()> {
    let platform: Platform = cli.language.parse()?;
    let command = cli.command.name();
    let clean_first = cli.clean && cli.command.honours_clean();

    let mut options = Options::new(&cli.sources, &cli.target)
        .with_context(|| format!("failed to resolve {}", cli.target.display()))?;
    options.parser = cli.parser;
    options.home_tag = cli.home_tag;
    options.platform = platform;
    options.batch = cli.batch;
    options.verbose = cli.verbose;
    options.debug = cli.debug;
    options.alone = cli.alone;
    options.easy = cli.easy;
    options.track_transformation_steps = cli.track_transformation_steps;
    cli.command.apply(&mut options);

    if cli.latest || !cli.offline {
        let central = MavenCentral::new()?;
        if cli.latest {
            use_latest(&mut options, &central).await?;
        }
        if !cli.offline
            && !is_snapshot(&options.parser)
            && !central.exists(Some(&options.parser)).await
        {
            warn!(
                "EO parser {} is not confirmed to exist in Maven Central",
                options.parser
            );
        }
    }

    let registry = Registry::for_platform(platform);
    let toolchain = Toolchain {
        mvnw_home: cli.mvnw_home.unwrap_or_else(default_mvnw_home),
        eo2js_home: cli.eo2js_home.unwrap_or_else(default_eo2js_home),
        node: cli.node,
        java: cli.java,
    };
    let runner: Arc<dyn Runner> = Arc::new(ProcessRunner);

    if clean_first {
        let request = PipelineRequest {
            commands: vec!["clean".to_string()],
            options: options.clone(),
        };
        run_pipeline(&registry, request, toolchain.clone(), runner.clone()).await?;
    }

    let request = PipelineRequest::resolve(&registry, command, options)?;
    run_pipeline(&registry, request, toolchain, runner).await?;
    Ok(())
}

use futures::future::BoxFuture;

use crate::command::{CommandDescriptor, Context};
use crate::error::CoreError;
use crate::flags::strip_empty;
use crate::options::Options;
use crate::runner::Invocation;

/// Name of the executable JAR produced by `link`.
pub const JAR: &str = "eoc.jar";

/// Java halves of the build: all Maven goals except `dataize`.
pub fn java() -> Vec<CommandDescriptor> {
    vec![
        CommandDescriptor::new("resolve").static_goals(&["eo:resolve", "eo:place"]),
        CommandDescriptor::new("transpile").static_goals(&["eo:transpile"]),
        CommandDescriptor::new("compile").static_goals(&["test-compile"]),
        CommandDescriptor::new("link").static_goals(&["jar:jar", "shade:shade"]),
        CommandDescriptor::new("test")
            .static_goals(&["surefire:test"])
            .extras(|options| {
                vec![
                    format!("-Dstack-size={}", options.stack),
                    format!("-Dheap-size={}", options.heap),
                ]
            }),
        CommandDescriptor::new("dataize").action(dataize),
    ]
}

/// JVM arguments that run `object` from the linked JAR.
pub fn jvm_args(options: &Options, object: &str) -> Vec<String> {
    let mut args = vec![
        "-Dfile.encoding=UTF-8".to_string(),
        format!("-Xss{}", options.stack),
        format!("-Xms{}", options.heap),
        "-jar".to_string(),
        options.in_target(JAR).display().to_string(),
        if options.verbose { "--verbose" } else { "" }.to_string(),
        object.to_string(),
    ];
    args.extend(options.arguments.iter().cloned());
    strip_empty(args)
}

fn dataize(ctx: &Context) -> BoxFuture<'_, Result<(), CoreError>> {
    Box::pin(async move {
        let options = &ctx.options;
        let object = options
            .object
            .as_deref()
            .ok_or_else(|| CoreError::Failed("dataize needs the name of an object".to_string()))?;
        let jar = options.in_target(JAR);
        if !tokio::fs::try_exists(&jar).await? {
            return Err(CoreError::MissingArtifact(jar));
        }
        let invocation = Invocation::new(&ctx.toolchain.java, jvm_args(options, object));
        ctx.runner.run(invocation).await?;
        Ok(())
    })
}

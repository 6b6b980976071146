use futures::future::BoxFuture;
use tracing::info;

use crate::command::{CommandDescriptor, Context};
use crate::error::CoreError;

/// JavaScript halves of the build, each one a separate `eo2js` call.
pub fn javascript() -> Vec<CommandDescriptor> {
    vec![
        CommandDescriptor::new("resolve").action(resolve),
        CommandDescriptor::new("transpile").action(transpile),
        CommandDescriptor::new("compile").action(compile),
        CommandDescriptor::new("link").action(link),
        CommandDescriptor::new("dataize").action(dataize),
        CommandDescriptor::new("test").action(test),
    ]
}

fn resolve(_ctx: &Context) -> BoxFuture<'_, Result<(), CoreError>> {
    Box::pin(async {
        info!("Resolve step is skipped for JavaScript");
        Ok(())
    })
}

fn transpile(ctx: &Context) -> BoxFuture<'_, Result<(), CoreError>> {
    Box::pin(async move {
        ctx.eo2js(vec!["transpile".to_string()], false).await?;
        info!(
            "JS sources are generated in {}",
            ctx.options.in_target(&ctx.options.project).display()
        );
        Ok(())
    })
}

fn compile(_ctx: &Context) -> BoxFuture<'_, Result<(), CoreError>> {
    Box::pin(async {
        info!("Compile step is skipped for JavaScript");
        Ok(())
    })
}

fn link(ctx: &Context) -> BoxFuture<'_, Result<(), CoreError>> {
    Box::pin(async move {
        ctx.eo2js(vec!["link".to_string()], ctx.options.tests).await?;
        info!(
            "NPM project generated in {}",
            ctx.options.in_target(&ctx.options.project).display()
        );
        Ok(())
    })
}

fn dataize(ctx: &Context) -> BoxFuture<'_, Result<(), CoreError>> {
    Box::pin(async move {
        let object = ctx
            .options
            .object
            .clone()
            .ok_or_else(|| CoreError::Failed("dataize needs the name of an object".to_string()))?;
        let mut command = vec!["dataize".to_string(), object];
        command.extend(
            ctx.options
                .arguments
                .iter()
                .filter(|arg| !arg.starts_with('-'))
                .cloned(),
        );
        ctx.eo2js(command, false).await?;
        Ok(())
    })
}

fn test(ctx: &Context) -> BoxFuture<'_, Result<(), CoreError>> {
    Box::pin(async move {
        ctx.eo2js(vec!["test".to_string()], false).await?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::command::testing::{RecordingRunner, context};
    use crate::options::{Options, Platform};

    fn find(name: &str) -> CommandDescriptor {
        javascript()
            .into_iter()
            .find(|command| command.name() == name)
            .expect("command registered")
    }

    fn options() -> Options {
        let mut options = Options::new("src", "target").expect("options");
        options.platform = Platform::JavaScript;
        options.batch = true;
        options
    }

    #[test]
    fn nothing_is_mergeable() {
        assert!(javascript().iter().all(|command| !command.is_mergeable()));
    }

    #[tokio::test]
    async fn compile_and_resolve_spawn_nothing() {
        let runner = Arc::new(RecordingRunner::default());
        let ctx = context(options(), runner.clone());
        find("compile").run(&ctx).await.expect("compile");
        find("resolve").run(&ctx).await.expect("resolve");
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn link_adds_tests_toggle() {
        let runner = Arc::new(RecordingRunner::default());
        let mut options = options();
        options.tests = true;
        let ctx = context(options, runner.clone());
        find("link").run(&ctx).await.expect("link");
        let call = &runner.calls()[0];
        assert_eq!(call.args[1], "link");
        assert!(call.args.contains(&"--tests".to_string()));
    }

    #[tokio::test]
    async fn dataize_drops_dashed_arguments() {
        let runner = Arc::new(RecordingRunner::default());
        let mut options = options();
        options.object = Some("app".to_string());
        options.arguments = vec!["--verbose".to_string(), "42".to_string()];
        let ctx = context(options, runner.clone());
        find("dataize").run(&ctx).await.expect("dataize");
        let call = &runner.calls()[0];
        assert_eq!(&call.args[1..4], ["dataize", "app", "42"]);
        assert!(!call.args.contains(&"--verbose".to_string()));
    }
}

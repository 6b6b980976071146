//! Wall-clock timing of a task.

use std::future::Future;
use std::time::{Duration, Instant};

use tracing::info;

/// Renders a duration as `<n>ms`, `<n>s` or `<n>min`, rounding up.
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1_000 {
        format!("{millis}ms")
    } else if millis < 60_000 {
        format!("{}s", millis.div_ceil(1_000))
    } else {
        format!("{}min", millis.div_ceil(3_600_000))
    }
}

/// Handle given to a task measured by [`elapsed`].
#[derive(Debug, Clone, Copy)]
pub struct Tracked {
    started: Instant,
}

impl Tracked {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Logs `"<message> in <duration>"` and returns it.
    pub fn print(&self, message: impl AsRef<str>) -> String {
        let line = format!(
            "{} in {}",
            message.as_ref(),
            format_duration(self.started.elapsed())
        );
        info!("{line}");
        line
    }
}

/// Runs `task`, handing it a tracker started right before it.
pub async fn elapsed<T, F, Fut>(task: F) -> T
where
    F: FnOnce(Tracked) -> Fut,
    Fut: Future<Output = T>,
{
    task(Tracked::start()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[test]
    fn formats_each_range() {
        assert_eq!(format_duration(Duration::from_millis(0)), "0ms");
        assert_eq!(format_duration(Duration::from_millis(999)), "999ms");
        assert_eq!(format_duration(Duration::from_millis(1_000)), "1s");
        assert_eq!(format_duration(Duration::from_millis(1_200)), "2s");
        assert_eq!(format_duration(Duration::from_millis(59_999)), "60s");
        assert_eq!(format_duration(Duration::from_millis(60_000)), "1min");
        assert_eq!(format_duration(Duration::from_millis(7_200_001)), "3min");
    }

    #[tokio::test]
    async fn measures_time() {
        let actual = elapsed(|tracked| async move {
            sleep(Duration::from_millis(333)).await;
            tracked.print("task")
        })
        .await;
        assert!(actual.starts_with("task in "), "{actual}");
        assert!(actual.ends_with("ms") || actual.ends_with('s'), "{actual}");
    }

    #[tokio::test]
    async fn measures_long_time() {
        let actual = elapsed(|tracked| async move {
            sleep(Duration::from_millis(1_200)).await;
            tracked.print("long task")
        })
        .await;
        assert_eq!(actual, "long task in 2s");
    }

    #[tokio::test]
    async fn passes_errors_through() {
        let result: Result<(), String> =
            elapsed(|_| async { Err("task error".to_string()) }).await;
        assert_eq!(result.unwrap_err(), "task error");
    }
}

//! Completion counter shared by the workers of one phase

use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counts attempted items and optionally renders a single status line
#[derive(Debug)]
pub struct Progress {
    label: &'static str,
    total: usize,
    completed: AtomicUsize,
    render: bool,
}

impl Progress {
    pub fn new(label: &'static str, total: usize, render: bool) -> Self {
        Self {
            label,
            total,
            completed: AtomicUsize::new(0),
            render,
        }
    }

    /// Record one finished item, successful or not
    pub fn tick(&self) -> usize {
        let completed = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        if self.render {
            let mut stderr = io::stderr();
            let _ = write!(
                stderr,
                "\r{}: {}/{} ({:.2}%)",
                self.label,
                completed,
                self.total,
                percent(completed, self.total)
            );
            let _ = stderr.flush();
        }
        completed
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn percent(&self) -> f64 {
        percent(self.completed(), self.total)
    }

    /// End the status line
    pub fn finish(&self) {
        if self.render && self.total > 0 {
            let _ = writeln!(io::stderr());
        }
    }
}

fn percent(completed: usize, total: usize) -> f64 {
    if total == 0 {
        100.0
    } else {
        completed as f64 * 100.0 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_percent() {
        let progress = Progress::new("Probing", 4, false);
        assert_eq!(progress.percent(), 0.0);
        progress.tick();
        assert_eq!(progress.percent(), 25.0);
        progress.tick();
        progress.tick();
        assert_eq!(progress.tick(), 4);
        assert_eq!(progress.percent(), 100.0);
    }

    #[test]
    fn test_empty_total_is_complete() {
        assert_eq!(Progress::new("Probing", 0, false).percent(), 100.0);
    }

    #[tokio::test]
    async fn test_concurrent_ticks() {
        let progress = Arc::new(Progress::new("Probing", 200, false));
        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..200 {
            let progress = progress.clone();
            tasks.spawn(async move {
                progress.tick();
            });
        }
        while tasks.join_next().await.is_some() {}

        assert_eq!(progress.completed(), 200);
    }
}

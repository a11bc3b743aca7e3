use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::sync::Arc;
use async_trait::async_trait;
use tracing::debug;

use crate::processing::exec::{CommandSpec, ProcessOutput, ProcessRunner};

#[cfg(test)]
use mockall::automock;

/// Answers "is this directory under version control?".
///
/// Any failure (missing directory, missing tool) is reported as `false`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RepositoryDetector: Send + Sync {
    async fn is_repository(&self, path: &Path) -> bool;
}

/// Thin wrapper over the git executable. Every call runs with `-C <dir>` and
/// the C locale, so its messages can be matched as text.
#[derive(Clone)]
pub struct GitCli {
    runner: Arc<dyn ProcessRunner>,
    program: OsString,
}

impl GitCli {
    pub fn new(runner: Arc<dyn ProcessRunner>, program: impl Into<OsString>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }

    fn command(&self, dir: &Path) -> CommandSpec {
        CommandSpec::new(&self.program)
            .env("LC_ALL", "C")
            .arg("-C")
            .arg(dir)
    }

    async fn exec(&self, spec: CommandSpec) -> io::Result<ProcessOutput> {
        debug!("Running {}", spec.display());
        self.runner.run(&spec).await
    }

    /// `git add -A`
    pub async fn stage_all(&self, dir: &Path) -> io::Result<ProcessOutput> {
        self.exec(self.command(dir).args(["add", "-A"])).await
    }

    /// `git commit -m <message>`
    pub async fn commit(&self, dir: &Path, message: &str) -> io::Result<ProcessOutput> {
        self.exec(self.command(dir).args(["commit", "-m", message])).await
    }

    /// `git push` to the configured upstream
    pub async fn push(&self, dir: &Path) -> io::Result<ProcessOutput> {
        self.exec(self.command(dir).arg("push")).await
    }
}

#[async_trait]
impl RepositoryDetector for GitCli {
    async fn is_repository(&self, path: &Path) -> bool {
        let spec = self
            .command(path)
            .args(["rev-parse", "--is-inside-work-tree"]);
        match self.exec(spec).await {
            Ok(output) => output.success() && output.stdout.trim() == "true",
            Err(e) => {
                debug!("git probe for {} failed: {}", path.display(), e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::exec::MockProcessRunner;

    fn git_with(mock: MockProcessRunner) -> GitCli {
        GitCli::new(Arc::new(mock), "git")
    }

    #[tokio::test]
    async fn work_tree_answer_true_is_a_repository() {
        let mut mock = MockProcessRunner::new();
        mock.expect_run()
            .withf(|spec| {
                spec.args_lossy() == ["-C", "/repo/out", "rev-parse", "--is-inside-work-tree"]
                    && spec.envs == vec![(OsString::from("LC_ALL"), OsString::from("C"))]
            })
            .returning(|_| {
                Ok(ProcessOutput {
                    code: Some(0),
                    stdout: "true\n".into(),
                    stderr: String::new(),
                })
            });

        assert!(git_with(mock).is_repository(Path::new("/repo/out")).await);
    }

    #[tokio::test]
    async fn non_zero_exit_is_not_a_repository() {
        let mut mock = MockProcessRunner::new();
        mock.expect_run().returning(|_| {
            Ok(ProcessOutput {
                code: Some(128),
                stdout: String::new(),
                stderr: "fatal: not a git repository".into(),
            })
        });

        assert!(!git_with(mock).is_repository(Path::new("/tmp/plain")).await);
    }

    #[tokio::test]
    async fn missing_git_is_not_a_repository() {
        let mut mock = MockProcessRunner::new();
        mock.expect_run()
            .returning(|_| Err(io::Error::new(io::ErrorKind::NotFound, "git")));

        assert!(!git_with(mock).is_repository(Path::new("/anywhere")).await);
    }

    #[tokio::test]
    async fn bare_repository_answer_false_is_not_a_work_tree() {
        let mut mock = MockProcessRunner::new();
        mock.expect_run().returning(|_| {
            Ok(ProcessOutput {
                code: Some(0),
                stdout: "false\n".into(),
                stderr: String::new(),
            })
        });

        assert!(!git_with(mock).is_repository(Path::new("/srv/repo.git")).await);
    }
}

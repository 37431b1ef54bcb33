// Thin typed wrapper over the `git` binary.
//
// Every operation is one subprocess call against the repository working
// directory. The executor is a trait so tests can script exit codes and
// output without a real repository.

use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Captured result of one subprocess invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// The output worth reporting on failure: stderr, or stdout when git
    /// wrote its diagnostics there.
    fn failure_output(&self) -> String {
        if self.stderr.trim().is_empty() {
            self.stdout.clone()
        } else {
            self.stderr.clone()
        }
    }
}

/// Runs a program with arguments in a working directory.
pub trait CommandExecutor: Send + Sync {
    fn execute(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
    ) -> Result<ExecOutput, std::io::Error>;
}

/// Production executor backed by `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessCommandExecutor;

impl CommandExecutor for ProcessCommandExecutor {
    fn execute(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
    ) -> Result<ExecOutput, std::io::Error> {
        let output = Command::new(program).args(args).current_dir(cwd).output()?;
        Ok(ExecOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GitError {
    #[error("failed to run `{command}`: {message}")]
    Spawn { command: String, message: String },

    #[error("`{command}` exited with code {code:?}: {output}")]
    CommandFailure { command: String, code: Option<i32>, output: String },
}

/// Remote name every pull and push targets.
pub const REMOTE: &str = "origin";

/// Git operations the commit workflow needs, bound to one repository.
#[derive(Debug, Clone)]
pub struct GitWorker<E = ProcessCommandExecutor> {
    repo_path: PathBuf,
    executor: E,
}

impl GitWorker<ProcessCommandExecutor> {
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self { repo_path: repo_path.into(), executor: ProcessCommandExecutor }
    }
}

impl<E: CommandExecutor> GitWorker<E> {
    pub fn with_executor(repo_path: impl Into<PathBuf>, executor: E) -> Self {
        Self { repo_path: repo_path.into(), executor }
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    /// `git pull origin <branch>`.
    pub fn pull(&self, branch: &str) -> Result<String, GitError> {
        self.run(&["pull", REMOTE, branch])
    }

    /// `git add <path>`.
    pub fn add(&self, path: &str) -> Result<String, GitError> {
        self.run(&["add", path])
    }

    /// `git commit -m <message>`.
    pub fn commit(&self, message: &str) -> Result<String, GitError> {
        self.run(&["commit", "-m", message])
    }

    /// `git push origin <branch>`.
    pub fn push(&self, branch: &str) -> Result<String, GitError> {
        self.run(&["push", REMOTE, branch])
    }

    /// `git diff --staged --quiet`.
    ///
    /// Exit code 0 means the index matches HEAD (nothing staged), 1 means
    /// staged differences exist. Anything else is a real failure.
    pub fn has_staged_changes(&self) -> Result<bool, GitError> {
        let args = ["diff", "--staged", "--quiet"];
        let (command, output) = self.execute(&args)?;
        match output.code {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            code => Err(GitError::CommandFailure {
                command,
                code,
                output: output.failure_output(),
            }),
        }
    }

    fn run(&self, args: &[&str]) -> Result<String, GitError> {
        let (command, output) = self.execute(args)?;
        if output.success() {
            Ok(output.stdout)
        } else {
            Err(GitError::CommandFailure {
                command,
                code: output.code,
                output: output.failure_output(),
            })
        }
    }

    fn execute(&self, args: &[&str]) -> Result<(String, ExecOutput), GitError> {
        let command = format!("git {}", args.join(" "));
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        let output = self
            .executor
            .execute("git", &args, &self.repo_path)
            .map_err(|error| GitError::Spawn { command: command.clone(), message: error.to_string() })?;
        Ok((command, output))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) struct Invocation {
        pub program: String,
        pub args: Vec<String>,
        pub cwd: PathBuf,
    }

    /// Scripted executor: pops one canned response per call and records
    /// every invocation.
    #[derive(Clone)]
    pub(crate) struct MockExecutor {
        calls: Arc<Mutex<Vec<Invocation>>>,
        responses: Arc<Mutex<VecDeque<Result<ExecOutput, std::io::Error>>>>,
    }

    impl MockExecutor {
        pub fn new(responses: Vec<Result<ExecOutput, std::io::Error>>) -> Self {
            Self {
                calls: Arc::new(Mutex::new(Vec::new())),
                responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            }
        }

        pub fn calls(&self) -> Vec<Invocation> {
            self.calls.lock().expect("mock calls lock poisoned").clone()
        }
    }

    impl CommandExecutor for MockExecutor {
        fn execute(
            &self,
            program: &str,
            args: &[String],
            cwd: &Path,
        ) -> Result<ExecOutput, std::io::Error> {
            self.calls.lock().expect("mock calls lock poisoned").push(Invocation {
                program: program.to_string(),
                args: args.to_vec(),
                cwd: cwd.to_path_buf(),
            });
            self.responses
                .lock()
                .expect("mock responses lock poisoned")
                .pop_front()
                .expect("missing mock response")
        }
    }

    pub(crate) fn exit(code: i32) -> Result<ExecOutput, std::io::Error> {
        Ok(ExecOutput { code: Some(code), stdout: String::new(), stderr: String::new() })
    }

    pub(crate) fn exit_with(
        code: i32,
        stdout: &str,
        stderr: &str,
    ) -> Result<ExecOutput, std::io::Error> {
        Ok(ExecOutput { code: Some(code), stdout: stdout.to_string(), stderr: stderr.to_string() })
    }

    #[test]
    fn pull_targets_origin_and_branch() {
        let mock = MockExecutor::new(vec![exit_with(0, "Already up to date.\n", "")]);
        let worker = GitWorker::with_executor("/tmp/repo", mock.clone());

        let stdout = worker.pull("main").expect("pull should succeed");
        assert_eq!(stdout, "Already up to date.\n");

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "git");
        assert_eq!(calls[0].args, vec!["pull", "origin", "main"]);
        assert_eq!(calls[0].cwd, PathBuf::from("/tmp/repo"));
    }

    #[test]
    fn failed_command_carries_command_text_and_stderr() {
        let mock = MockExecutor::new(vec![exit_with(128, "", "fatal: couldn't find remote ref\n")]);
        let worker = GitWorker::with_executor("/tmp/repo", mock);

        let error = worker.pull("missing").expect_err("pull should fail");
        assert_eq!(
            error,
            GitError::CommandFailure {
                command: "git pull origin missing".to_string(),
                code: Some(128),
                output: "fatal: couldn't find remote ref\n".to_string(),
            }
        );
    }

    #[test]
    fn failure_output_falls_back_to_stdout() {
        let mock = MockExecutor::new(vec![exit_with(1, "nothing added to commit\n", "  ")]);
        let worker = GitWorker::with_executor("/tmp/repo", mock);

        let error = worker.commit("msg").expect_err("commit should fail");
        match error {
            GitError::CommandFailure { output, .. } => {
                assert_eq!(output, "nothing added to commit\n");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn spawn_failure_is_its_own_kind() {
        let mock = MockExecutor::new(vec![Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "No such file or directory",
        ))]);
        let worker = GitWorker::with_executor("/tmp/repo", mock);

        let error = worker.add("auto-sign.txt").expect_err("spawn should fail");
        assert!(matches!(
            error,
            GitError::Spawn { ref command, .. } if command == "git add auto-sign.txt"
        ));
    }

    #[test]
    fn staged_diff_exit_zero_means_clean() {
        let mock = MockExecutor::new(vec![exit(0)]);
        let worker = GitWorker::with_executor("/tmp/repo", mock.clone());

        assert!(!worker.has_staged_changes().unwrap());
        assert_eq!(mock.calls()[0].args, vec!["diff", "--staged", "--quiet"]);
    }

    #[test]
    fn staged_diff_exit_one_means_changes() {
        let mock = MockExecutor::new(vec![exit(1)]);
        let worker = GitWorker::with_executor("/tmp/repo", mock);

        assert!(worker.has_staged_changes().unwrap());
    }

    #[test]
    fn staged_diff_other_exit_is_a_failure() {
        let mock = MockExecutor::new(vec![exit_with(129, "", "error: unknown option\n")]);
        let worker = GitWorker::with_executor("/tmp/repo", mock);

        let error = worker.has_staged_changes().expect_err("exit 129 is a real failure");
        assert!(matches!(
            error,
            GitError::CommandFailure { ref command, code: Some(129), .. }
                if command == "git diff --staged --quiet"
        ));
    }

    #[test]
    fn commit_passes_message_as_single_argument() {
        let mock = MockExecutor::new(vec![exit_with(0, "[main abc123] Auto commit\n", "")]);
        let worker = GitWorker::with_executor("/tmp/repo", mock.clone());

        worker.commit("Auto commit: 2026-08-06 09:00:00").expect("commit should succeed");
        assert_eq!(
            mock.calls()[0].args,
            vec!["commit", "-m", "Auto commit: 2026-08-06 09:00:00"]
        );
    }

    #[test]
    fn push_targets_origin_and_branch() {
        let mock = MockExecutor::new(vec![exit(0)]);
        let worker = GitWorker::with_executor("/tmp/repo", mock.clone());

        worker.push("develop").expect("push should succeed");
        assert_eq!(mock.calls()[0].args, vec!["push", "origin", "develop"]);
    }
}

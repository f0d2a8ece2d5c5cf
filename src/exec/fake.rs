//! exec::fake
//!
//! Scripted tool runner for deterministic testing.
//!
//! # Design
//!
//! The fake runner resolves every program and exits zero by default.
//! Tests script deviations per program (absent from the path, non-zero
//! exit) and inspect the recorded invocations afterwards.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use gangway::exec::{FakeRunner, Invocation, ToolRunner};
//!
//! let runner = FakeRunner::new();
//! runner.set_absent("kubectl");
//! assert!(runner.lookup("kubectl").is_none());
//!
//! let exit = runner
//!     .run(&Invocation::new("bash", &["setup-argocd.sh"], Path::new(".")))
//!     .unwrap();
//! assert!(exit.success());
//! assert_eq!(runner.invocations().len(), 1);
//! ```

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use super::{ExecError, Invocation, ToolExit, ToolRunner};

/// Scripted runner for tests.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone, Default)]
pub struct FakeRunner {
    inner: Arc<Mutex<FakeRunnerInner>>,
}

#[derive(Debug, Default)]
struct FakeRunnerInner {
    /// Programs scripted as missing from the path.
    absent: HashSet<String>,
    /// Exit codes per program (default 0).
    exit_codes: HashMap<String, i32>,
    /// Recorded invocations for verification.
    invocations: Vec<Invocation>,
}

impl FakeRunner {
    /// Create a runner where every program resolves and exits zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a program as absent from the path.
    pub fn set_absent(&self, program: &str) {
        self.inner.lock().unwrap().absent.insert(program.to_string());
    }

    /// Script a program's exit code.
    pub fn set_exit_code(&self, program: &str, code: i32) {
        self.inner
            .lock()
            .unwrap()
            .exit_codes
            .insert(program.to_string(), code);
    }

    /// All invocations recorded so far, in order.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.inner.lock().unwrap().invocations.clone()
    }
}

impl ToolRunner for FakeRunner {
    fn lookup(&self, program: &str) -> Option<PathBuf> {
        let inner = self.inner.lock().unwrap();
        if inner.absent.contains(program) {
            None
        } else {
            Some(PathBuf::from(format!("/usr/bin/{program}")))
        }
    }

    fn run(&self, invocation: &Invocation) -> Result<ToolExit, ExecError> {
        let mut inner = self.inner.lock().unwrap();
        inner.invocations.push(invocation.clone());
        let code = inner
            .exit_codes
            .get(&invocation.program)
            .copied()
            .unwrap_or(0);
        Ok(ToolExit { code })
    }

    fn run_silent(&self, invocation: &Invocation) -> Result<ToolExit, ExecError> {
        self.run(invocation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn resolves_programs_by_default() {
        let runner = FakeRunner::new();
        assert!(runner.lookup("kubectl").is_some());
    }

    #[test]
    fn scripted_absence_and_exit_codes() {
        let runner = FakeRunner::new();
        runner.set_absent("kubectl");
        runner.set_exit_code("bash", 2);

        assert!(runner.lookup("kubectl").is_none());
        let exit = runner
            .run(&Invocation::new("bash", &["x"], Path::new(".")))
            .unwrap();
        assert_eq!(exit.code, 2);
    }

    #[test]
    fn records_invocations_in_order() {
        let runner = FakeRunner::new();
        runner
            .run(&Invocation::new("kubectl", &["cluster-info"], Path::new(".")))
            .unwrap();
        runner
            .run(&Invocation::new("bash", &["setup-argocd.sh"], Path::new(".")))
            .unwrap();

        let recorded = runner.invocations();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0].program, "kubectl");
        assert_eq!(recorded[1].program, "bash");
    }
}

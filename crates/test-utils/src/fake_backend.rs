use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use devlaunch::errors::{LauncherError, Result};
use devlaunch::exec::{
    BoxFuture, CapturedOutput, ChildProcess, CommandOutput, CommandSpec, ExitInfo, ProcessBackend,
};
use devlaunch::fs::mock::MockFileSystem;

/// Scripted answer to a one-shot command.
#[derive(Debug, Clone)]
pub enum FakeResponse {
    /// Exit 0 with this stdout.
    Success(String),
    /// Non-zero exit with this stderr.
    Fail { code: i32, stderr: String },
    /// The program cannot be run at all.
    NotFound,
}

/// Scripted lifetime of a spawned server.
#[derive(Debug, Clone)]
pub enum FakeServer {
    /// Alive until terminated.
    StaysUp,
    /// Already gone at the first poll.
    ExitsDuringGrace {
        code: i32,
        stdout: Vec<String>,
        stderr: Vec<String>,
    },
    /// Alive for `polls` polls, exited from the next one on.
    ExitsAfterPolls { polls: usize, code: i32 },
    /// `spawn` itself fails.
    SpawnFails(String),
}

struct Rule {
    program: PathBuf,
    args: Option<Vec<String>>,
    response: FakeResponse,
    creates: Option<(MockFileSystem, Vec<PathBuf>)>,
}

#[derive(Debug)]
struct ChildState {
    program: PathBuf,
    behaviour: FakeServer,
    polls: usize,
    exited: Option<ExitInfo>,
    terminate_calls: usize,
    wait_calls: usize,
}

#[derive(Default)]
struct State {
    rules: Vec<Rule>,
    servers: Vec<(PathBuf, FakeServer)>,
    commands: Vec<CommandSpec>,
    spawned: Vec<CommandSpec>,
    children: Vec<Arc<Mutex<ChildState>>>,
    next_pid: u32,
}

/// A `ProcessBackend` that never spawns anything.
///
/// - One-shot commands are answered from rules registered with
///   [`respond`](Self::respond); unmatched commands behave like a missing
///   program. Later rules win over earlier ones.
/// - Spawned servers follow the [`FakeServer`] registered for their program.
/// - Every command and spawn is recorded for assertions.
#[derive(Clone, Default)]
pub struct FakeProcessBackend {
    state: Arc<Mutex<State>>,
}

impl FakeProcessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `program args...` (exact argument match).
    pub fn respond(&self, program: impl AsRef<Path>, args: &[&str], response: FakeResponse) {
        self.push_rule(program, Some(args), response, None);
    }

    /// Answer `program` whatever its arguments.
    pub fn respond_any(&self, program: impl AsRef<Path>, response: FakeResponse) {
        self.push_rule(program, None, response, None);
    }

    /// Like [`respond`](Self::respond), and on success also create `files`
    /// in `fs` (parents included), the way `python -m venv` would.
    pub fn respond_and_create(
        &self,
        program: impl AsRef<Path>,
        args: &[&str],
        response: FakeResponse,
        fs: &MockFileSystem,
        files: Vec<PathBuf>,
    ) {
        self.push_rule(program, Some(args), response, Some((fs.clone(), files)));
    }

    /// How servers started from `program` behave.
    pub fn server(&self, program: impl AsRef<Path>, behaviour: FakeServer) {
        self.lock()
            .servers
            .push((program.as_ref().to_path_buf(), behaviour));
    }

    /// Every one-shot command run so far, rendered as `program args...`.
    pub fn commands(&self) -> Vec<String> {
        self.lock().commands.iter().map(|c| c.to_string()).collect()
    }

    /// Every spawn attempt so far, in order.
    pub fn spawned(&self) -> Vec<CommandSpec> {
        self.lock().spawned.clone()
    }

    /// Probe for the most recent child spawned from `program`.
    pub fn child(&self, program: impl AsRef<Path>) -> Option<FakeChildProbe> {
        let program = program.as_ref();
        self.lock()
            .children
            .iter()
            .rev()
            .find(|c| c.lock().unwrap().program == program)
            .map(|c| FakeChildProbe {
                state: Arc::clone(c),
            })
    }

    fn push_rule(
        &self,
        program: impl AsRef<Path>,
        args: Option<&[&str]>,
        response: FakeResponse,
        creates: Option<(MockFileSystem, Vec<PathBuf>)>,
    ) {
        self.lock().rules.push(Rule {
            program: program.as_ref().to_path_buf(),
            args: args.map(|a| a.iter().map(|s| s.to_string()).collect()),
            response,
            creates,
        });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }
}

impl ProcessBackend for FakeProcessBackend {
    type Child = FakeChild;

    fn output<'a>(&'a self, spec: &'a CommandSpec) -> BoxFuture<'a, Result<CommandOutput>> {
        Box::pin(async move {
            let mut state = self.lock();
            state.commands.push(spec.clone());

            let args = spec.args_lossy();
            let rule = state.rules.iter().rev().find(|r| {
                r.program == spec.program && r.args.as_ref().is_none_or(|a| *a == args)
            });

            let Some(rule) = rule else {
                return Err(not_found(spec));
            };

            match &rule.response {
                FakeResponse::Success(stdout) => {
                    if let Some((fs, files)) = &rule.creates {
                        for file in files {
                            fs.add_file(file);
                        }
                    }
                    Ok(CommandOutput {
                        status: ExitInfo::from_code(0),
                        stdout: stdout.clone(),
                        stderr: String::new(),
                    })
                }
                FakeResponse::Fail { code, stderr } => Ok(CommandOutput {
                    status: ExitInfo::from_code(*code),
                    stdout: String::new(),
                    stderr: stderr.clone(),
                }),
                FakeResponse::NotFound => Err(not_found(spec)),
            }
        })
    }

    fn spawn(&self, spec: &CommandSpec) -> Result<FakeChild> {
        let mut state = self.lock();
        state.spawned.push(spec.clone());

        let behaviour = state
            .servers
            .iter()
            .rev()
            .find(|(program, _)| *program == spec.program)
            .map(|(_, b)| b.clone());

        let behaviour = match behaviour {
            None => return Err(not_found(spec)),
            Some(FakeServer::SpawnFails(reason)) => {
                return Err(LauncherError::SpawnFailed {
                    program: spec.program.display().to_string(),
                    reason,
                });
            }
            Some(b) => b,
        };

        state.next_pid += 1;
        let pid = 1000 + state.next_pid;
        let child = Arc::new(Mutex::new(ChildState {
            program: spec.program.clone(),
            behaviour,
            polls: 0,
            exited: None,
            terminate_calls: 0,
            wait_calls: 0,
        }));
        state.children.push(Arc::clone(&child));

        Ok(FakeChild { pid, state: child })
    }
}

fn not_found(spec: &CommandSpec) -> LauncherError {
    LauncherError::IoError(io::Error::new(
        io::ErrorKind::NotFound,
        format!("program not found: {}", spec.program.display()),
    ))
}

/// Child handed out by [`FakeProcessBackend::spawn`].
#[derive(Debug)]
pub struct FakeChild {
    pid: u32,
    state: Arc<Mutex<ChildState>>,
}

impl ChildProcess for FakeChild {
    fn id(&self) -> Option<u32> {
        Some(self.pid)
    }

    fn try_status(&mut self) -> Result<Option<ExitInfo>> {
        let mut s = self.state.lock().unwrap();
        s.polls += 1;
        if s.exited.is_none() {
            match s.behaviour {
                FakeServer::ExitsDuringGrace { code, .. } => {
                    s.exited = Some(ExitInfo::from_code(code));
                }
                FakeServer::ExitsAfterPolls { polls, code } if s.polls > polls => {
                    s.exited = Some(ExitInfo::from_code(code));
                }
                _ => {}
            }
        }
        Ok(s.exited)
    }

    fn terminate(&mut self) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.terminate_calls += 1;
        if s.exited.is_none() {
            s.exited = Some(ExitInfo::signalled());
        }
        Ok(())
    }

    fn wait(&mut self) -> BoxFuture<'_, Result<ExitInfo>> {
        Box::pin(async move {
            let mut s = self.state.lock().unwrap();
            s.wait_calls += 1;
            Ok(*s.exited.get_or_insert(ExitInfo::signalled()))
        })
    }

    fn captured_output(&mut self) -> BoxFuture<'_, CapturedOutput> {
        Box::pin(async move {
            let s = self.state.lock().unwrap();
            match &s.behaviour {
                FakeServer::ExitsDuringGrace { stdout, stderr, .. } => CapturedOutput {
                    stdout: stdout.clone(),
                    stderr: stderr.clone(),
                },
                _ => CapturedOutput::default(),
            }
        })
    }
}

/// Read-only view of a fake child, kept by tests after the launcher has
/// taken ownership of the child itself.
#[derive(Clone)]
pub struct FakeChildProbe {
    state: Arc<Mutex<ChildState>>,
}

impl FakeChildProbe {
    pub fn terminate_calls(&self) -> usize {
        self.state.lock().unwrap().terminate_calls
    }

    pub fn wait_calls(&self) -> usize {
        self.state.lock().unwrap().wait_calls
    }

    pub fn polls(&self) -> usize {
        self.state.lock().unwrap().polls
    }

    pub fn has_exited(&self) -> bool {
        self.state.lock().unwrap().exited.is_some()
    }
}

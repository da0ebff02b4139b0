use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use crate::foundation::core::FrameSpan;
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::chunk::RenderChunk;
use crate::render::scheduler::ChunkRunner;

/// Separates host flags from build-script flags on the host command line.
pub const ARG_BOUNDARY: &str = "--";

/// How to launch the external host application.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Host executable.
    pub binary: PathBuf,
    /// Flag that runs the host without a UI.
    pub background_flag: String,
    /// Scene file opened before the build script runs.
    pub scene_file: Option<PathBuf>,
    /// Flag that introduces the build script path.
    pub script_flag: String,
    /// Build script executed inside the host.
    pub build_script: PathBuf,
    /// Extra host flags, placed before the argument boundary.
    pub host_args: Vec<String>,
    /// Extra build-script flags, placed after the frame and output flags.
    pub script_args: Vec<String>,
    /// Per-chunk wall-clock limit; `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("blender"),
            background_flag: "--background".to_string(),
            scene_file: None,
            script_flag: "--python".to_string(),
            build_script: PathBuf::from("build_scene.py"),
            host_args: Vec::new(),
            script_args: Vec::new(),
            timeout_secs: None,
        }
    }
}

/// Where rendered frames go: `{root}/renders/{category}/{subdir}/render_####`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OutputLayout {
    /// Project root.
    pub root: PathBuf,
    /// Render category (e.g. `preview`, `final`).
    pub category: String,
}

impl OutputLayout {
    /// Directory a chunk writes into.
    pub fn chunk_dir(&self, output_subdir: &Path) -> PathBuf {
        self.root
            .join("renders")
            .join(&self.category)
            .join(output_subdir)
    }

    /// Output path prefix handed to the build script; the host appends zero-padded frame numbers.
    pub fn output_prefix(&self, output_subdir: &Path) -> PathBuf {
        self.chunk_dir(output_subdir).join("render_")
    }
}

/// Fully resolved host command for one chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostInvocation {
    /// Executable.
    pub program: PathBuf,
    /// Arguments in order.
    pub args: Vec<OsString>,
}

impl HostInvocation {
    /// Assemble the command for `chunk`.
    pub fn for_chunk(host: &HostConfig, layout: &OutputLayout, chunk: &RenderChunk) -> Self {
        let mut args: Vec<OsString> = vec![host.background_flag.clone().into()];
        if let Some(scene) = &host.scene_file {
            args.push(scene.clone().into());
        }
        args.push(host.script_flag.clone().into());
        args.push(host.build_script.clone().into());
        args.extend(host.host_args.iter().map(OsString::from));
        args.push(ARG_BOUNDARY.into());
        args.push("--start".into());
        args.push(chunk.span.start.to_string().into());
        args.push("--end".into());
        args.push(chunk.span.end.to_string().into());
        args.push("--output".into());
        args.push(layout.output_prefix(&chunk.output_subdir).into());
        args.extend(host.script_args.iter().map(OsString::from));
        Self {
            program: host.binary.clone(),
            args,
        }
    }

    /// Shell-like rendering of the command, for error reports and logs.
    pub fn command_line(&self) -> String {
        let mut out = self.program.display().to_string();
        for a in &self.args {
            out.push(' ');
            out.push_str(&a.to_string_lossy());
        }
        out
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

/// Runs each chunk as a separate host process and waits for it.
#[derive(Clone, Debug)]
pub struct HostProcessRunner {
    host: HostConfig,
    layout: OutputLayout,
}

impl HostProcessRunner {
    /// Runner launching `host`, writing under `layout`.
    pub fn new(host: HostConfig, layout: OutputLayout) -> Self {
        Self { host, layout }
    }

    /// Output layout used by this runner.
    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }
}

impl ChunkRunner for HostProcessRunner {
    fn run_chunk(&self, chunk: &RenderChunk) -> ReelResult<()> {
        let inv = HostInvocation::for_chunk(&self.host, &self.layout, chunk);
        let command = inv.command_line();
        let fail = |message: String| ReelError::Subprocess {
            span: chunk.span,
            command: command.clone(),
            message,
        };

        let dir = self.layout.chunk_dir(&chunk.output_subdir);
        std::fs::create_dir_all(&dir).map_err(|e| {
            fail(format!(
                "failed to create output directory '{}': {e}",
                dir.display()
            ))
        })?;

        tracing::debug!(%command, "spawning host");
        let mut child = inv
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| fail(format!("failed to spawn host: {e}")))?;

        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| fail("failed to open host stderr (unexpected)".to_string()))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok::<_, std::io::Error>(bytes)
        });

        let timeout = self.host.timeout_secs.map(Duration::from_secs);
        let status = wait_with_timeout(&mut child, timeout)
            .map_err(|e| fail(format!("failed to wait for host: {e}")))?;
        let stderr_bytes = stderr_drain
            .join()
            .map_err(|_| fail("host stderr drain thread panicked".to_string()))?
            .map_err(|e| fail(format!("host stderr read failed: {e}")))?;

        match status {
            Some(status) if status.success() => Ok(()),
            Some(status) => Err(fail(format!(
                "host exited with {status}: {}",
                stderr_tail(&stderr_bytes)
            ))),
            None => Err(fail(format!(
                "host timed out after {}s and was killed",
                self.host.timeout_secs.unwrap_or_default()
            ))),
        }
    }
}

/// Wait for `child`; `Ok(None)` means the timeout expired and the child was killed.
fn wait_with_timeout(
    child: &mut Child,
    timeout: Option<Duration>,
) -> std::io::Result<Option<ExitStatus>> {
    let Some(limit) = timeout else {
        return child.wait().map(Some);
    };
    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if started.elapsed() >= limit {
            child.kill()?;
            child.wait()?;
            return Ok(None);
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}

fn stderr_tail(bytes: &[u8]) -> String {
    const MAX_LINES: usize = 20;
    let text = String::from_utf8_lossy(bytes);
    let lines: Vec<&str> = text.trim().lines().collect();
    lines[lines.len().saturating_sub(MAX_LINES)..].join("\n")
}

/// Flags the build script receives after [`ARG_BOUNDARY`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildScriptArgs {
    /// Frames to build/render.
    pub span: FrameSpan,
    /// Output path prefix override.
    pub output: Option<PathBuf>,
}

impl BuildScriptArgs {
    /// Parse the flags after the argument boundary in `argv`.
    ///
    /// Everything before `--` belongs to the host and is ignored. A missing `--start` or `--end`
    /// defaults to the matching end of `full`, so no flags at all means the whole timeline.
    pub fn parse<I, S>(argv: I, full: FrameSpan) -> ReelResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let argv: Vec<String> = argv.into_iter().map(|s| s.as_ref().to_string()).collect();
        let script = match argv.iter().position(|a| a == ARG_BOUNDARY) {
            Some(i) => &argv[i + 1..],
            None => &[][..],
        };

        let mut start = None;
        let mut end = None;
        let mut output = None;
        let mut it = script.iter();
        while let Some(flag) = it.next() {
            let mut value = || {
                it.next()
                    .ok_or_else(|| ReelError::validation(format!("flag '{flag}' needs a value")))
            };
            match flag.as_str() {
                "--start" => start = Some(parse_frame(flag, value()?)?),
                "--end" => end = Some(parse_frame(flag, value()?)?),
                "--output" => output = Some(PathBuf::from(value()?)),
                other => {
                    return Err(ReelError::validation(format!(
                        "unknown build-script flag '{other}'"
                    )));
                }
            }
        }

        let span = FrameSpan::new(start.unwrap_or(full.start), end.unwrap_or(full.end))?;
        if span.start < full.start || span.end > full.end {
            return Err(ReelError::validation(format!(
                "frames {span} fall outside the timeline {full}"
            )));
        }
        Ok(Self { span, output })
    }
}

fn parse_frame(flag: &str, raw: &str) -> ReelResult<u64> {
    raw.parse()
        .map_err(|e| ReelError::validation(format!("{flag} expects a frame number, got '{raw}': {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/host.rs"]
mod tests;

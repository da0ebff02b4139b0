use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use reelwright::{
    BuildOrchestrator, BuildScriptArgs, FrameSpan, HostProcessRunner, ProjectConfig,
    RenderScheduler, SceneState, builtin_registry, is_complete, lint_paths, plan_chunks,
};

#[derive(Parser, Debug)]
#[command(name = "reelwright", version)]
struct Cli {
    /// Project config JSON (defaults apply when omitted).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output on stderr (`-v` debug, `-vv` trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check the timeline table and segment sources for unknown keys and legacy names.
    Lint(LintArgs),
    /// Print the render chunks for a frame range without rendering.
    Plan(RangeArgs),
    /// Run the full scene build and print a summary.
    Build(BuildArgs),
    /// Render a frame range through the external host.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct LintArgs {
    /// Files or directories to scan (default: `<root>/src`).
    paths: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
struct RangeArgs {
    /// First frame (default: timeline start).
    #[arg(long)]
    start: Option<u64>,

    /// Last frame, inclusive (default: timeline end).
    #[arg(long)]
    end: Option<u64>,

    /// Output subdirectory under the render category.
    #[arg(long, default_value = "full")]
    subdir: PathBuf,
}

#[derive(Parser, Debug)]
struct BuildArgs {
    /// Build-script flags after `--`: `--start N --end N --output PREFIX`.
    #[arg(last = true)]
    script_args: Vec<String>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    range: RangeArgs,

    /// Dispatch chunks on a worker pool.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cfg = match &cli.config {
        Some(p) => ProjectConfig::from_path(p)?,
        None => ProjectConfig::default(),
    };
    match cli.cmd {
        Command::Lint(args) => cmd_lint(&cfg, args),
        Command::Plan(args) => cmd_plan(&cfg, args),
        Command::Build(args) => cmd_build(&cfg, args),
        Command::Render(args) => cmd_render(&cfg, args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn cmd_lint(cfg: &ProjectConfig, args: LintArgs) -> anyhow::Result<()> {
    let segments = cfg.raw_segments()?;
    let paths = if args.paths.is_empty() {
        vec![cfg.root.join("src")]
    } else {
        args.paths
    };
    let report = lint_paths(&paths, &segments, &cfg.lint)?;
    for issue in &report.timeline_issues {
        println!("timeline: {issue} (frame {})", issue.frame());
    }
    for v in &report.violations {
        println!("{v}");
    }
    eprintln!(
        "checked {} file(s), {} problem(s)",
        report.files_checked,
        report.problem_count()
    );
    report.into_result()?;
    Ok(())
}

fn resolve_range(cfg: &ProjectConfig, args: &RangeArgs) -> anyhow::Result<FrameSpan> {
    let full = cfg.timeline()?.total_span();
    let span = FrameSpan::new(args.start.unwrap_or(full.start), args.end.unwrap_or(full.end))?;
    Ok(span)
}

fn cmd_plan(cfg: &ProjectConfig, args: RangeArgs) -> anyhow::Result<()> {
    let span = resolve_range(cfg, &args)?;
    let layout = cfg.output_layout();
    let chunks = plan_chunks(span.start, span.end, &args.subdir)?;
    for c in &chunks {
        println!(
            "{}\t{}\t{}",
            c.span.start,
            c.span.end,
            layout.output_prefix(&c.output_subdir).display()
        );
    }
    eprintln!("{} chunk(s) for frames {span}", chunks.len());
    Ok(())
}

fn cmd_build(cfg: &ProjectConfig, args: BuildArgs) -> anyhow::Result<()> {
    let timeline = cfg.timeline()?;
    let argv = std::iter::once("--".to_string()).chain(args.script_args);
    let script = BuildScriptArgs::parse(argv, timeline.total_span())?;

    let scene = BuildOrchestrator::new(timeline, builtin_registry()?)?
        .with_settings(cfg.scene.clone())
        .with_cast(cfg.cast.clone())
        .run()?;

    let summary = build_summary(cfg, &scene, script.span)?;
    let text = serde_json::to_string_pretty(&summary).context("serialize build summary")?;
    println!("{text}");

    if let Some(prefix) = &script.output {
        let out = PathBuf::from(format!("{}build.json", prefix.display()));
        if let Some(parent) = out.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        std::fs::write(&out, text).with_context(|| format!("write '{}'", out.display()))?;
        eprintln!("wrote {}", out.display());
    }
    Ok(())
}

fn build_summary(
    cfg: &ProjectConfig,
    scene: &SceneState,
    span: FrameSpan,
) -> anyhow::Result<serde_json::Value> {
    let mut curves = 0usize;
    let mut keys_in_span = 0usize;
    for actor in scene.actors() {
        for c in actor.curves()? {
            curves += 1;
            keys_in_span += c
                .points()
                .iter()
                .filter(|p| span.contains(p.frame))
                .count();
        }
    }
    Ok(serde_json::json!({
        "actors": scene.actor_count(),
        "curves": curves,
        "frames": span.to_string(),
        "keys_in_frames": keys_in_span,
        "phases": scene.completed_phases(),
        "complete": is_complete(scene, &cfg.readiness),
        "fingerprint": scene.fingerprint()?.to_string(),
    }))
}

fn cmd_render(cfg: &ProjectConfig, args: RenderArgs) -> anyhow::Result<()> {
    let span = resolve_range(cfg, &args.range)?;
    let runner = HostProcessRunner::new(cfg.host.clone(), cfg.output_layout());
    let mut threading = cfg.threading(args.parallel);
    if args.threads.is_some() {
        threading.threads = args.threads;
    }
    let report = RenderScheduler::new(runner)
        .with_threading(threading)
        .render_range(span.start, span.end, &args.range.subdir)?;
    eprintln!(
        "rendered {} frame(s) in {} chunk(s)",
        report.frames_rendered(),
        report.outcomes.iter().filter(|o| o.is_ok()).count()
    );
    report.into_result()?;
    Ok(())
}

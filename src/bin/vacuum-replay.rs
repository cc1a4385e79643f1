use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use sha2::Digest as _;
use vacuum_replay::{
    AutoContinue, ComparisonSession, ContinuePolicy, ControlSource, Fps, HouseStatus,
    JsonLinesRenderer, Renderer, Replay, RunReport, ScoreSummary, SessionContext, SessionFrame,
    StdinControl, TextRenderer, TieBreak, TrajectoryStore,
};

#[derive(Parser, Debug)]
#[command(name = "vacuum-replay", version)]
struct Cli {
    /// Log filter used when `RUST_LOG` is unset (e.g. `info`, `vacuum_replay=debug`).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay every house in the log, side by side.
    Replay(ReplayArgs),
    /// Print the frame reached after N steps of one house as JSON.
    Frame(FrameArgs),
    /// Write the algorithm x house score table as CSV.
    Summary(SummaryArgs),
    /// Replay headlessly and print the SHA-256 of the JSON frame stream.
    Digest(DigestArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// House log (`initial_house.json`).
    #[arg(long)]
    houses: PathBuf,

    /// Step log (`steps_history.json`).
    #[arg(long)]
    steps: PathBuf,
}

#[derive(Args, Debug)]
struct PlaybackArgs {
    /// House log entries consumed per comparison.
    #[arg(long, default_value_t = 2)]
    stride: usize,

    /// Which algorithm wins on equal scores.
    #[arg(long, value_enum, default_value_t = TieBreakChoice::First)]
    tie_break: TieBreakChoice,
}

#[derive(Parser, Debug)]
struct ReplayArgs {
    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    playback: PlaybackArgs,

    /// Output format.
    #[arg(long, value_enum, default_value_t = FormatChoice::Text)]
    format: FormatChoice,

    /// Draw both grids in text output.
    #[arg(long)]
    grid: bool,

    /// Ticks per second when pacing is on (`--realtime` or `--interactive`).
    #[arg(long, default_value_t = 8)]
    fps: u32,

    /// Pace output at `--fps` instead of running as fast as possible.
    #[arg(long)]
    realtime: bool,

    /// Read controls from stdin: `c` continue, `s` skip, `p` pause, `q` quit. Implies
    /// `--realtime`.
    #[arg(long)]
    interactive: bool,

    /// When a continue request is honoured.
    #[arg(long = "continue", value_enum, default_value_t = ContinueChoice::AfterFinish)]
    continue_policy: ContinueChoice,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    input: InputArgs,

    /// House name as written in the house log.
    #[arg(long)]
    house: String,

    /// Number of session steps to run (1-based).
    #[arg(long)]
    tick: u64,

    /// Which algorithm wins on equal scores.
    #[arg(long, value_enum, default_value_t = TieBreakChoice::First)]
    tie_break: TieBreakChoice,

    /// Output JSON path (stdout when omitted).
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct SummaryArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output CSV path (stdout when omitted).
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct DigestArgs {
    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    playback: PlaybackArgs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TieBreakChoice {
    First,
    Second,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ContinueChoice {
    AfterFinish,
    Anytime,
}

impl From<TieBreakChoice> for TieBreak {
    fn from(c: TieBreakChoice) -> Self {
        match c {
            TieBreakChoice::First => TieBreak::PreferFirst,
            TieBreakChoice::Second => TieBreak::PreferSecond,
        }
    }
}

impl From<ContinueChoice> for ContinuePolicy {
    fn from(c: ContinueChoice) -> Self {
        match c {
            ContinueChoice::AfterFinish => ContinuePolicy::AfterFinish,
            ContinueChoice::Anytime => ContinuePolicy::Anytime,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    match cli.cmd {
        Command::Replay(args) => cmd_replay(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Summary(args) => cmd_summary(args),
        Command::Digest(args) => cmd_digest(args),
    }
}

fn init_tracing(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_store(input: &InputArgs) -> anyhow::Result<TrajectoryStore> {
    TrajectoryStore::load(&input.houses, &input.steps).with_context(|| {
        format!(
            "load replay inputs '{}' + '{}'",
            input.houses.display(),
            input.steps.display()
        )
    })
}

fn open_output(out: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    let Some(path) = out else {
        return Ok(Box::new(std::io::stdout().lock()));
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let f = File::create(path).with_context(|| format!("create '{}'", path.display()))?;
    Ok(Box::new(BufWriter::new(f)))
}

fn cmd_replay(args: ReplayArgs) -> anyhow::Result<()> {
    let store = load_store(&args.input)?;
    let ctx = SessionContext {
        fps: Fps::new(args.fps, 1)?,
        realtime: args.realtime || args.interactive,
        stride: args.playback.stride,
        continue_policy: args.continue_policy.into(),
        tie_break: args.playback.tie_break.into(),
    };
    let replay = Replay::new(&store, ctx)?;

    let mut control: Box<dyn ControlSource> = if args.interactive {
        Box::new(StdinControl::spawn())
    } else {
        Box::new(AutoContinue)
    };

    let stdout = std::io::stdout().lock();
    let mut renderer: Box<dyn Renderer> = match args.format {
        FormatChoice::Text => Box::new(TextRenderer::new(stdout, args.grid)),
        FormatChoice::Json => Box::new(JsonLinesRenderer::new(stdout)),
    };

    let report = vacuum_replay::run(replay, renderer.as_mut(), control.as_mut())?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &RunReport) {
    for h in &report.houses {
        let detail = match (&h.status, &h.outcome) {
            (HouseStatus::Missing { reason }, _) => format!("missing ({reason})"),
            (_, Some(outcome)) => outcome.to_string(),
            (status, None) => format!("{status:?}").to_lowercase(),
        };
        let dirt = h
            .dirt_left
            .map(|[a, b]| format!(", dirt left {a}/{b}"))
            .unwrap_or_default();
        eprintln!("  {}: {detail} [{} steps{dirt}]", h.house_name, h.steps);
    }
    let finished = report.finished().count();
    eprintln!(
        "replayed {finished} of {} houses{}",
        report.houses.len(),
        if report.stopped { " (stopped)" } else { "" }
    );
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    if args.tick == 0 {
        anyhow::bail!("--tick must be >= 1");
    }
    let store = load_store(&args.input)?;
    let house = store
        .houses()
        .iter()
        .find(|h| h.house_name == args.house)
        .with_context(|| format!("house '{}' is not in the house log", args.house))?;

    let mut session = ComparisonSession::new(&store, house, args.tie_break.into())?;
    for _ in 0..args.tick {
        if session.is_finished() {
            anyhow::bail!(
                "house '{}' finished after {} steps",
                args.house,
                session.steps()
            );
        }
        session.step()?;
    }
    let frame = session
        .frame()
        .context("session produced no frame (bug)")?;

    let mut out = open_output(args.out.as_deref())?;
    serde_json::to_writer_pretty(&mut out, &frame).context("encode frame JSON")?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

fn cmd_summary(args: SummaryArgs) -> anyhow::Result<()> {
    let store = load_store(&args.input)?;
    let summary = ScoreSummary::from_store(&store);
    let mut out = open_output(args.out.as_deref())?;
    summary.write_csv(&mut out)?;
    out.flush()?;
    if let Some(path) = &args.out {
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

/// Feeds each frame's JSON encoding into a running SHA-256.
#[derive(Default)]
struct DigestRenderer {
    hasher: sha2::Sha256,
    frames: u64,
}

impl Renderer for DigestRenderer {
    fn render(&mut self, frame: &SessionFrame<'_>) -> vacuum_replay::ReplayResult<()> {
        let bytes = serde_json::to_vec(frame)
            .map_err(|e| vacuum_replay::ReplayError::serde(format!("encode frame: {e}")))?;
        self.hasher.update(&bytes);
        self.frames += 1;
        Ok(())
    }
}

fn cmd_digest(args: DigestArgs) -> anyhow::Result<()> {
    let store = load_store(&args.input)?;
    let ctx = SessionContext {
        stride: args.playback.stride,
        tie_break: args.playback.tie_break.into(),
        ..SessionContext::default()
    };
    let replay = Replay::new(&store, ctx)?;
    let mut digest = DigestRenderer::default();
    vacuum_replay::run(replay, &mut digest, &mut AutoContinue)?;

    println!("{}  ({} frames)", sha256_hex(digest.hasher), digest.frames);
    Ok(())
}

fn sha256_hex(hasher: sha2::Sha256) -> String {
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

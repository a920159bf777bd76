use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use crossbeam_channel::unbounded;
use lyric_scroll::models::{TextMetrics, ViewportGeometry};
use lyric_scroll::normalize::normalize;
use lyric_scroll::progress::{format_duration, set_log_only, ReplayProgress};
use lyric_scroll::replay::{load_script, replay, ReplaySummary};
use lyric_scroll::resolver::rank_candidates;
use lyric_scroll::runtime::{run, SessionEvent};
use lyric_scroll::scoring::score;
use lyric_scroll::scroll::IntervalScheduler;
use lyric_scroll::view::SimulatedView;
use lyric_scroll::{Config, LineIndex, LyricsView, Session};
use rayon::prelude::*;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lyric-scroll")]
#[command(about = "Follow a sung transcript through song lyrics and drive a forward-only scroll")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// JSON config file overriding the built-in thresholds
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true, default_value = "600")]
    viewport_height: f64,

    #[arg(long, global = true, default_value = "30")]
    line_height: f64,

    #[arg(long, global = true, default_value = "40")]
    padding: f64,

    /// Hide progress bars; report progress through the log instead
    #[arg(long, global = true)]
    log_only: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Replay recorded event scripts against the lyrics
    Replay {
        lyrics: PathBuf,

        #[arg(required = true)]
        scripts: Vec<PathBuf>,

        /// Write per-script summaries as JSON
        #[arg(long)]
        stats: Option<PathBuf>,

        #[arg(long, default_value = "0")]
        workers: usize,
    },
    /// Show how a phrase scores against every line
    Score {
        lyrics: PathBuf,

        phrase: String,

        /// Line the tracker is currently on (for distance penalties)
        #[arg(long, default_value = "0")]
        current: usize,

        /// Score as an interim fragment
        #[arg(long)]
        interim: bool,

        #[arg(long, default_value = "5")]
        top: usize,
    },
    /// Read one final fragment per stdin line and follow along
    Live { lyrics: PathBuf },
}

/// Prints each new line as the tracker reaches it.
struct ConsoleView {
    inner: SimulatedView,
    lines: LineIndex,
}

impl LyricsView for ConsoleView {
    fn viewport_geometry(&self) -> ViewportGeometry {
        self.inner.viewport_geometry()
    }

    fn text_metrics(&self) -> TextMetrics {
        self.inner.text_metrics()
    }

    fn on_position_changed(&mut self, line_index: usize) {
        if let Some(line) = self.lines.get(line_index) {
            println!("{:>4}  {}", line_index + 1, line.text);
        }
        self.inner.on_position_changed(line_index);
    }

    fn on_scroll_position_changed(&mut self, px: f64) {
        self.inner.on_scroll_position_changed(px);
    }

    fn on_no_match(&mut self) {
        println!("   -  (no match)");
        self.inner.on_no_match();
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config {:?}", path)),
        None => Ok(Config::default()),
    }
}

fn load_lyrics(path: &Path) -> Result<LineIndex> {
    let lines = LineIndex::load(path).with_context(|| format!("Failed to read lyrics {:?}", path))?;
    if lines.is_empty() {
        bail!("No lyric lines found in {:?}", path);
    }
    info!(lines = lines.len(), path = ?path, "lyrics loaded");
    Ok(lines)
}

fn run_replay(
    args: &Args,
    config: &Config,
    lyrics: &Path,
    scripts: &[PathBuf],
    stats: Option<&Path>,
    workers: usize,
) -> Result<()> {
    if workers > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build_global()
            .context("Failed to set thread pool size")?;
    }

    let start = Instant::now();
    let lines = load_lyrics(lyrics)?;
    let progress = ReplayProgress::new(scripts.len() as u64, 10);

    let summaries: Vec<ReplaySummary> = scripts
        .par_iter()
        .map(|path| -> Result<ReplaySummary> {
            let events = load_script(path)
                .with_context(|| format!("Failed to load script {:?}", path))?;
            let view = SimulatedView::new(lines.len(), args.viewport_height, args.line_height, args.padding);
            let name = path.display().to_string();
            let summary = replay(&name, &lines, config, view, &events);
            progress.script_done(&name, summary.final_line);
            Ok(summary)
        })
        .collect::<Result<_>>()?;

    progress.finish();

    println!("\n{:=<72}", "");
    println!("{:<40} {:>6} {:>7} {:>6} {:>10}", "Script", "Events", "Matched", "Line", "Scroll px");
    println!("{:-<72}", "");
    for s in &summaries {
        println!(
            "{:<40} {:>6} {:>7} {:>6} {:>10.1}",
            truncate(&s.script, 40),
            s.events,
            s.matched,
            format!("{}/{}", s.final_line + 1, lines.len()),
            s.final_scroll_px
        );
    }
    println!("{:=<72}", "");
    println!("Elapsed: {}", format_duration(start.elapsed()));

    if let Some(stats) = stats {
        let json = serde_json::to_string_pretty(&summaries).context("Failed to serialize stats")?;
        std::fs::write(stats, json).with_context(|| format!("Failed to write stats {:?}", stats))?;
        println!("Stats written to {:?}", stats);
    }

    Ok(())
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let tail: String = text.chars().rev().take(max - 1).collect::<Vec<_>>().into_iter().rev().collect();
    format!("…{}", tail)
}

fn run_score(
    config: &Config,
    lyrics: &Path,
    phrase: &str,
    current: usize,
    interim: bool,
    top: usize,
) -> Result<()> {
    let lines = load_lyrics(lyrics)?;
    if current >= lines.len() {
        bail!("--current {} is past the last line ({})", current, lines.len() - 1);
    }

    let normalized = normalize(phrase);
    println!("Phrase: {:?} -> {:?}", phrase, normalized);
    println!(
        "Threshold: > {:.2} ({})",
        config.matching.min_confidence(interim),
        if interim { "interim" } else { "final" }
    );

    let ranked = rank_candidates(&normalized, interim, current, &lines, &config.matching);
    if ranked.is_empty() {
        println!("No line scores above the threshold.");
        let best = lines
            .iter()
            .map(|line| (line.index, score(&normalized, &line.normalized)))
            .max_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((index, raw)) = best {
            println!("Closest: line {} at {:.3}", index + 1, raw);
        }
        return Ok(());
    }

    println!("{:>5} {:>7} {:>8} {:>6}  Text", "Line", "Score", "Adjusted", "Dist");
    for candidate in ranked.iter().take(top) {
        println!(
            "{:>5} {:>7.3} {:>8.3} {:>6}  {}",
            candidate.line_index + 1,
            candidate.confidence,
            candidate.adjusted_score,
            candidate.distance,
            lines[candidate.line_index].text
        );
    }
    Ok(())
}

fn run_live(args: &Args, config: Config, lyrics: &Path) -> Result<()> {
    let lines = load_lyrics(lyrics)?;
    let view = ConsoleView {
        inner: SimulatedView::new(lines.len(), args.viewport_height, args.line_height, args.padding),
        lines: lines.clone(),
    };
    let interval = Duration::from_millis(config.animation.frame_interval_ms.max(1));
    let session = Session::new(lines, config, IntervalScheduler::new(interval), view);

    let (tx, rx) = unbounded();
    let worker = thread::spawn(move || run(session, rx));

    println!("Listening on stdin (one phrase per line, Ctrl-D to stop)");
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let text = line.context("Failed to read stdin")?;
        if text.trim().is_empty() {
            continue;
        }
        if tx.send(SessionEvent::Fragment { text, is_final: true }).is_err() {
            break;
        }
    }
    let _ = tx.send(SessionEvent::Stop);

    let session = match worker.join() {
        Ok(session) => session,
        Err(_) => bail!("Runtime thread panicked"),
    };
    let view = session.into_view();
    println!(
        "Reached {} line(s); {} phrase(s) matched nothing",
        view.inner.positions.len(),
        view.inner.no_matches
    );
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    set_log_only(args.log_only);
    let config = load_config(args.config.as_deref())?;

    match &args.command {
        Command::Replay {
            lyrics,
            scripts,
            stats,
            workers,
        } => run_replay(&args, &config, lyrics, scripts, stats.as_deref(), *workers),
        Command::Score {
            lyrics,
            phrase,
            current,
            interim,
            top,
        } => run_score(&config, lyrics, phrase, *current, *interim, *top),
        Command::Live { lyrics } => run_live(&args, config, lyrics),
    }
}

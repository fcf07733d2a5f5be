use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

use cantara::config::{self, Config};
use cantara::lyrics::sync::END_GRACE_SECS;
use cantara::player::clock::SimulatedClock;
use cantara::player::{PlayerControl, PlayerEvent};
use cantara::processor::SongProcessor;
use cantara::session::Session;
use cantara::song;
use cantara::tasks::reconcile::RenderedWord;

#[derive(Debug, Parser)]
#[command(name = "cantara", version, about = "Language-learning karaoke engine (headless)")]
struct Cli {
    /// Override config file path.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the parsed word timeline of a song.
    Timeline {
        #[arg(long)]
        song: PathBuf,
    },
    /// Print the reconciled lyric text, marking the active word at --time.
    Show {
        #[arg(long)]
        song: PathBuf,
        /// Playback position in seconds.
        #[arg(long)]
        time: Option<f64>,
    },
    /// List the song's embedded tasks.
    Tasks {
        #[arg(long)]
        song: PathBuf,
    },
    /// Play the song through on a simulated clock, printing lines as they
    /// become active.
    Follow {
        #[arg(long)]
        song: PathBuf,
        /// Playback rate override (e.g. 8 for eight times faster).
        #[arg(long)]
        speed: Option<f64>,
    },
    /// Generate a processed song (tasks + placeholder lyrics) from lyrics.
    Process {
        /// Word-synced or plain lyrics file.
        #[arg(long)]
        lyrics: PathBuf,
        /// Wordlist file (one word per line) for the target language.
        #[arg(long)]
        wordlist: Option<PathBuf>,
        #[arg(long, default_value_t = 1)]
        word_tasks: usize,
        #[arg(long, default_value_t = 1)]
        line_tasks: usize,
        /// Keep word timestamps in the processed lyrics.
        #[arg(long)]
        keep_lrc: bool,
        #[arg(long)]
        spotify_id: Option<String>,
        #[arg(long)]
        youtube_id: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref()).context("load config")?;

    match cli.command {
        Command::Timeline { song } => cmd_timeline(&song),
        Command::Show { song, time } => cmd_show(&song, time),
        Command::Tasks { song } => cmd_tasks(&song),
        Command::Follow { song, speed } => cmd_follow(&cfg, &song, speed).await,
        Command::Process {
            lyrics,
            wordlist,
            word_tasks,
            line_tasks,
            keep_lrc,
            spotify_id,
            youtube_id,
        } => cmd_process(
            &cfg,
            &lyrics,
            wordlist.as_deref(),
            word_tasks,
            line_tasks,
            keep_lrc,
            spotify_id,
            youtube_id,
        ),
    }
}

fn cmd_timeline(song_path: &Path) -> anyhow::Result<()> {
    let song = song::load(song_path)?;
    let parsed = cantara::lyrics::ParsedLyrics::parse(song.display_lyrics());
    for line in &parsed.lines {
        if line.is_empty() {
            println!();
            continue;
        }
        for word in &line.words {
            println!("{:>8.2}  {}", word.time, word.raw);
        }
    }
    Ok(())
}

fn cmd_show(song_path: &Path, time: Option<f64>) -> anyhow::Result<()> {
    let mut session = Session::new();
    session.load_song(song::load(song_path)?);
    if let Some(t) = time {
        session.apply_player_event(PlayerEvent::Position { seconds: t });
    }

    let active = time.and_then(|_| session.active_word());
    for line_idx in 0..session.parsed().lines.len() {
        if let Some(text) = format_line(&session, line_idx, active) {
            println!("{text}");
        }
    }
    Ok(())
}

fn cmd_tasks(song_path: &Path) -> anyhow::Result<()> {
    let song = song::load(song_path)?;
    for task in &song.word_selection_tasks {
        println!(
            "wp{}: \"{}\"  (alternatives: {})",
            task.task_id,
            task.target_word,
            task.alternatives.join(" | ")
        );
    }
    for task in &song.line_reordering_tasks {
        println!(
            "lp{}: \"{}\"  (scrambled: {})",
            task.task_id,
            task.original_line,
            task.scrambled_line.join(" / ")
        );
    }
    if song.word_selection_tasks.is_empty() && song.line_reordering_tasks.is_empty() {
        println!("no tasks");
    }
    Ok(())
}

async fn cmd_follow(cfg: &Config, song_path: &Path, speed: Option<f64>) -> anyhow::Result<()> {
    let mut session = Session::new();
    session.load_song(song::load(song_path)?);

    let Some(end) = session.parsed().end_time() else {
        anyhow::bail!("song has no timestamped words to follow");
    };

    let (tx, mut rx) = mpsc::channel::<PlayerEvent>(256);
    let mut clock = SimulatedClock::new(
        tx,
        cfg.playback.tick_ms,
        speed.unwrap_or(cfg.playback.speed),
        end + END_GRACE_SECS,
    );
    clock.play();

    let mut last_line: Option<usize> = None;
    while let Some(event) = rx.recv().await {
        let ended = event == PlayerEvent::Ended;
        session.apply_player_event(event);

        if let Some((line_idx, _)) = session.active_word()
            && last_line != Some(line_idx)
        {
            last_line = Some(line_idx);
            if let Some(text) = format_line(&session, line_idx, None) {
                println!("[{:>7.2}] {text}", session.position());
            }
        }
        if ended {
            break;
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_process(
    cfg: &Config,
    lyrics_path: &Path,
    wordlist_path: Option<&Path>,
    word_tasks: usize,
    line_tasks: usize,
    keep_lrc: bool,
    spotify_id: Option<String>,
    youtube_id: Option<String>,
) -> anyhow::Result<()> {
    let lyrics = std::fs::read_to_string(lyrics_path)
        .with_context(|| format!("read {}", lyrics_path.display()))?;
    let wordlist = match wordlist_path {
        Some(p) => std::fs::read_to_string(p)
            .with_context(|| format!("read {}", p.display()))?
            .lines()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect(),
        None => Vec::new(),
    };

    let mut processor = SongProcessor::new(&lyrics, wordlist, keep_lrc);
    for _ in 0..word_tasks {
        if processor.create_word_selection_task(None).is_none() {
            tracing::warn!("no remaining word-selection candidates");
            break;
        }
    }
    for _ in 0..line_tasks {
        if processor.create_line_reordering_task(None).is_none() {
            tracing::warn!("no remaining line-reordering candidates");
            break;
        }
    }
    processor.mask_words();

    let song = processor.into_song(
        spotify_id.unwrap_or_default(),
        youtube_id.unwrap_or_default(),
        cfg.language.clone(),
    );
    println!("{}", serde_json::to_string_pretty(&song)?);
    Ok(())
}

/// One display line with widget hints inlined; the active word is bracketed.
fn format_line(
    session: &Session,
    line_idx: usize,
    active: Option<(usize, usize)>,
) -> Option<String> {
    let song = session.song()?;
    let line = session.parsed().lines.get(line_idx)?;
    if line.is_empty() {
        return Some(String::new());
    }

    let mut parts: Vec<String> = Vec::new();
    for word_idx in 0..line.words.len() {
        match session.rendered_word(line_idx, word_idx)? {
            RenderedWord::Text { text, .. } => {
                if active == Some((line_idx, word_idx)) {
                    parts.push(format!(">{text}<"));
                } else {
                    parts.push(text);
                }
            }
            RenderedWord::WordChoices { task_id } => {
                if let Some(task) = song.word_selection_task(task_id) {
                    parts.push(format!("(choose: {})", task.alternatives.join(" | ")));
                }
            }
            RenderedWord::LineChoices { task_id } => {
                if let Some(task) = song.line_reordering_task(task_id) {
                    parts.push(format!("(order: {})", task.scrambled_line.join(" / ")));
                }
            }
            RenderedWord::Hidden => {}
        }
    }
    Some(parts.join(" "))
}

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use bonkman_engine::constants::TICK_MS;
use bonkman_engine::engine::GameEngine;
use bonkman_engine::error::GameError;
use bonkman_engine::levels::LevelSet;
use bonkman_engine::types::{
    AdversaryColor, Direction, Mode, Outcome, PickupKind, RuntimeEvent, Snapshot, WorldInit,
};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Terminal Bonkman: type a direction (w/a/s/d or up/down/left/right) and
/// press Enter.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    seed: Option<u32>,
    #[arg(long)]
    levels: Option<PathBuf>,
    /// Wall-clock pacing of the tick loop; the simulation always advances
    /// one fixed tick per beat.
    #[arg(long, default_value_t = TICK_MS)]
    tick_ms: u64,
}

#[derive(Debug)]
enum Command {
    Move(Direction),
    Acknowledge,
    IntroFinished,
    Quit,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "cannot start");
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> Result<(), GameError> {
    let levels = match cli.levels.as_deref() {
        Some(path) => LevelSet::load(path)?,
        None => LevelSet::embedded()?,
    };
    let seed = cli.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, levels = levels.len(), "starting");
    let mut engine = GameEngine::new(levels, seed);

    let (tx, mut rx) = mpsc::channel::<Command>(64);
    spawn_input_reader(tx.clone());

    let mut world = engine.world_init();
    let initial = engine.build_snapshot(true);
    handle_events(&initial, &tx, &mut world, &engine);

    let mut interval = tokio::time::interval(Duration::from_millis(cli.tick_ms.max(1)));
    loop {
        tokio::select! {
            _ = interval.tick() => {
                if engine.is_paused() {
                    continue;
                }
                engine.step();
                let snapshot = engine.build_snapshot(true);
                print_frame(&render_frame(&world, &snapshot));
                handle_events(&snapshot, &tx, &mut world, &engine);
            }
            command = rx.recv() => {
                let Some(command) = command else {
                    break;
                };
                match command {
                    Command::Move(dir) => engine.set_direction(dir),
                    Command::IntroFinished => {
                        engine.resume();
                        let snapshot = engine.build_snapshot(true);
                        print_frame(&render_frame(&world, &snapshot));
                        handle_events(&snapshot, &tx, &mut world, &engine);
                    }
                    Command::Acknowledge => {
                        if engine.is_ended() {
                            engine.acknowledge();
                            let snapshot = engine.build_snapshot(true);
                            handle_events(&snapshot, &tx, &mut world, &engine);
                        }
                    }
                    Command::Quit => break,
                }
            }
        }
    }

    tracing::info!(score = engine.score(), level = engine.level(), "bye");
    Ok(())
}

fn spawn_input_reader(tx: mpsc::Sender<Command>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    let _ = tx.send(Command::Quit).await;
                    return;
                }
                Err(error) => {
                    tracing::warn!(%error, "stdin closed");
                    let _ = tx.send(Command::Quit).await;
                    return;
                }
            };
            let Some(command) = parse_command(&line) else {
                tracing::warn!(input = %line.trim(), "unrecognized command");
                continue;
            };
            if tx.send(command).await.is_err() {
                return;
            }
        }
    });
}

fn parse_command(line: &str) -> Option<Command> {
    let trimmed = line.trim();
    match trimmed {
        "" => Some(Command::Acknowledge),
        "q" | "quit" => Some(Command::Quit),
        other => Direction::parse_move(other).map(Command::Move),
    }
}

fn handle_events(
    snapshot: &Snapshot,
    tx: &mpsc::Sender<Command>,
    world: &mut WorldInit,
    engine: &GameEngine,
) {
    for event in &snapshot.events {
        if let Some(cue) = event.cue() {
            tracing::info!(?cue, "audio cue");
        }
        match event {
            RuntimeEvent::LevelLoaded { level } => {
                *world = engine.world_init();
                println!(
                    "\n=== Level {level}/{}: {} ===",
                    world.config.level_count, world.name
                );
            }
            RuntimeEvent::PauseRequested { duration_ms, .. } => {
                let tx = tx.clone();
                let delay = Duration::from_millis(*duration_ms);
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = tx.send(Command::IntroFinished).await;
                });
            }
            RuntimeEvent::RunEnded { outcome, score } => {
                let banner = match outcome {
                    Outcome::Victory => "YOU WIN",
                    Outcome::Failure => "GAME OVER",
                };
                println!("\n{banner}  score {score}  (press Enter to play again, q to quit)");
            }
            _ => {}
        }
    }
}

fn adversary_glyph(color: AdversaryColor, mode: Mode, flashing: bool) -> char {
    match mode {
        Mode::Captured => '"',
        Mode::Vulnerable if flashing => '!',
        Mode::Vulnerable => color.layout_char().to_ascii_lowercase(),
        Mode::Scatter | Mode::Pursuit => color.layout_char(),
    }
}

fn render_frame(world: &WorldInit, snapshot: &Snapshot) -> String {
    let mut grid: Vec<Vec<char>> = world
        .tiles
        .iter()
        .map(|row| row.chars().map(|ch| if ch == '#' { '#' } else { ' ' }).collect())
        .collect();
    let mut put = |x: i32, y: i32, ch: char| {
        if let Some(cell) = usize::try_from(y)
            .ok()
            .and_then(|y| grid.get_mut(y))
            .and_then(|row| usize::try_from(x).ok().and_then(|x| row.get_mut(x)))
        {
            *cell = ch;
        }
    };

    for pickup in &snapshot.pickups {
        let glyph = match pickup.kind {
            PickupKind::Standard => '.',
            PickupKind::Power => 'o',
        };
        put(pickup.x, pickup.y, glyph);
    }
    put(snapshot.player.x, snapshot.player.y, '@');
    for adversary in &snapshot.adversaries {
        put(
            adversary.x,
            adversary.y,
            adversary_glyph(adversary.color, adversary.mode, adversary.flashing),
        );
    }

    let mut frame = format!(
        "level {}  score {}  {:?}\n",
        snapshot.level, snapshot.score, snapshot.phase
    );
    for row in grid {
        frame.extend(row);
        frame.push('\n');
    }
    frame
}

fn print_frame(frame: &str) {
    let mut stdout = std::io::stdout().lock();
    let _ = write!(stdout, "\x1b[2J\x1b[H{frame}");
    let _ = stdout.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_line_acknowledges_and_letters_steer() {
        assert!(matches!(parse_command(""), Some(Command::Acknowledge)));
        assert!(matches!(parse_command("  q "), Some(Command::Quit)));
        assert!(matches!(
            parse_command("w"),
            Some(Command::Move(Direction::Up))
        ));
        assert!(matches!(
            parse_command("left"),
            Some(Command::Move(Direction::Left))
        ));
        assert!(parse_command("jump").is_none());
    }

    #[test]
    fn frame_draws_player_pickups_and_mallets() {
        let mut engine = GameEngine::with_default_levels(5).expect("embedded levels");
        let world = engine.world_init();
        let snapshot = engine.build_snapshot(false);
        let frame = render_frame(&world, &snapshot);
        let lines: Vec<&str> = frame.lines().collect();

        assert_eq!(lines.len(), 1 + world.height as usize);
        assert!(lines[0].starts_with("level 1  score 0"));
        assert_eq!(frame.matches('@').count(), 1);
        assert_eq!(frame.matches('R').count(), 1);
        let player_row: Vec<char> = lines[1 + snapshot.player.y as usize].chars().collect();
        assert_eq!(player_row[snapshot.player.x as usize], '@');
    }

    #[test]
    fn vulnerable_mallets_change_glyph() {
        assert_eq!(adversary_glyph(AdversaryColor::Blue, Mode::Pursuit, false), 'B');
        assert_eq!(adversary_glyph(AdversaryColor::Blue, Mode::Vulnerable, false), 'b');
        assert_eq!(adversary_glyph(AdversaryColor::Blue, Mode::Vulnerable, true), '!');
        assert_eq!(adversary_glyph(AdversaryColor::Green, Mode::Captured, false), '"');
    }
}

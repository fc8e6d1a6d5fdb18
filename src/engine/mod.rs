use crate::constants::{
    AMBUSH_LOOKAHEAD_TILES, CAPTURE_BONUS, CHASE_DURATION_MS, FLASH_INTERVAL_MS, FLASH_WINDOW_MS,
    LEVEL_INTRO_MS, OPPORTUNIST_RADIUS_TILES, POWER_PICKUP_SCORE, SCATTER_DURATION_MS,
    STANDARD_PICKUP_SCORE, TICK_MS, TILE_SIZE, VULNERABLE_DURATION_MS,
};
use crate::error::LevelError;
use crate::levels::{AdversarySpawn, LevelSet};
use crate::rng::Rng;
use crate::types::{
    AdversaryColor, AdversaryView, Direction, GameConfig, Mode, Outcome, PauseReason, PickupKind,
    PlayerView, RoundState, RuntimeEvent, Snapshot, Variant, Vec2, WorldInit,
};
use crate::world::{Collectibles, Maze};

mod adversary_system;
mod autopilot;
mod mode_system;
mod player_system;

pub use self::mode_system::ModeCoordinator;

use self::adversary_system::AdversaryInternal;
use self::player_system::PlayerInternal;

#[derive(Clone, Debug)]
pub struct GameEngine {
    levels: LevelSet,
    rng: Rng,
    level_index: usize,
    level_name: String,
    maze: Maze,
    pickups: Collectibles,
    player: PlayerInternal,
    adversaries: Vec<AdversaryInternal>,
    coordinator: ModeCoordinator,
    events: Vec<RuntimeEvent>,

    score: u32,
    round: RoundState,
    tick_counter: u64,
}

impl GameEngine {
    pub fn new(levels: LevelSet, seed: u32) -> Self {
        let first = levels.first().clone();
        let mut engine = Self {
            levels,
            rng: Rng::new(seed),
            level_index: first.index,
            level_name: first.name.clone(),
            maze: first.maze.clone(),
            pickups: Collectibles::seeded(&first.pickups),
            player: PlayerInternal::spawn_at(first.player_spawn),
            adversaries: Vec::new(),
            coordinator: ModeCoordinator::new(),
            events: Vec::new(),
            score: 0,
            round: RoundState::Intro,
            tick_counter: 0,
        };
        engine.load_level(1);
        engine
    }

    pub fn with_default_levels(seed: u32) -> Result<Self, LevelError> {
        Ok(Self::new(LevelSet::embedded()?, seed))
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> usize {
        self.level_index
    }

    pub fn round_state(&self) -> RoundState {
        self.round
    }

    pub fn is_paused(&self) -> bool {
        self.round != RoundState::Running
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.round, RoundState::Ended(_))
    }

    pub fn pickups_remaining(&self) -> usize {
        self.pickups.len()
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    /// Resets the board to level `n` as defined. Score is kept. Asking for a
    /// level past the last one ends the run in victory.
    pub fn load_level(&mut self, n: usize) {
        let n = n.max(1);
        let Some(level) = self.levels.get(n).cloned() else {
            tracing::debug!(requested = n, available = self.levels.len(), "no more levels");
            self.finish_run(Outcome::Victory);
            return;
        };

        self.level_index = level.index;
        self.level_name = level.name;
        self.maze = level.maze;
        self.pickups = Collectibles::seeded(&level.pickups);
        self.player = PlayerInternal::spawn_at(level.player_spawn);
        self.spawn_roster(&level.adversaries);
        self.coordinator.reset();
        self.round = RoundState::Intro;

        tracing::debug!(
            level = self.level_index,
            pickups = self.pickups.len(),
            roster = self.adversaries.len(),
            "level loaded"
        );
        self.events.push(RuntimeEvent::LevelLoaded {
            level: self.level_index,
        });
        self.events.push(RuntimeEvent::PauseRequested {
            reason: PauseReason::LevelIntro,
            duration_ms: LEVEL_INTRO_MS,
        });
    }

    pub fn resume(&mut self) {
        if self.round != RoundState::Intro {
            return;
        }
        self.round = RoundState::Running;
        self.coordinator.reset();
        self.events.push(RuntimeEvent::Resumed {
            level: self.level_index,
        });
    }

    pub fn acknowledge(&mut self) {
        if !self.is_ended() {
            return;
        }
        self.score = 0;
        self.load_level(1);
    }

    pub fn set_direction(&mut self, dir: Direction) {
        if self.round != RoundState::Running {
            return;
        }
        self.player.desired_dir = dir;
    }

    pub fn step(&mut self) {
        if self.round != RoundState::Running {
            return;
        }
        self.tick_counter += 1;

        let player_before_move = self.player.pos;
        let adversaries_before_move: Vec<Vec2> =
            self.adversaries.iter().map(|adversary| adversary.pos).collect();

        self.update_player();
        self.update_mode_phase();
        self.update_adversaries();
        self.resolve_pickups();
        self.resolve_contacts(player_before_move, &adversaries_before_move);
        if self.round == RoundState::Running {
            self.check_level_complete();
        }
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let snapshot = Snapshot {
            tick: self.tick_counter,
            level: self.level_index,
            score: self.score,
            state: self.round,
            paused: self.is_paused(),
            phase: self.coordinator.phase(),
            phase_elapsed_ms: self.coordinator.elapsed_ms(),
            pickups: self.pickups.views(),
            player: self.player.view(),
            adversaries: self.adversaries.iter().map(|a| a.view()).collect(),
            events: if include_events {
                self.events.clone()
            } else {
                Vec::new()
            },
        };
        if include_events {
            self.events.clear();
        }
        snapshot
    }

    pub fn world_init(&self) -> WorldInit {
        WorldInit {
            level: self.level_index,
            name: self.level_name.clone(),
            width: self.maze.width,
            height: self.maze.height,
            tile_size: TILE_SIZE,
            pixel_width: self.maze.pixel_width(),
            pixel_height: self.maze.pixel_height(),
            tiles: self.maze.tile_rows().to_vec(),
            config: GameConfig {
                tick_ms: TICK_MS,
                scatter_duration_ms: SCATTER_DURATION_MS,
                chase_duration_ms: CHASE_DURATION_MS,
                vulnerable_duration_ms: VULNERABLE_DURATION_MS,
                level_intro_ms: LEVEL_INTRO_MS,
                level_count: self.levels.len(),
            },
        }
    }

    fn resolve_pickups(&mut self) {
        let pos = self.player.pos;
        for kind in self.pickups.consume_at(pos) {
            match kind {
                PickupKind::Standard => {
                    self.score += STANDARD_PICKUP_SCORE;
                    self.events
                        .push(RuntimeEvent::PickupConsumed { x: pos.x, y: pos.y });
                }
                PickupKind::Power => {
                    self.score += POWER_PICKUP_SCORE;
                    self.events
                        .push(RuntimeEvent::PowerConsumed { x: pos.x, y: pos.y });
                    self.broadcast_vulnerability();
                }
            }
        }
    }

    /// Same tile, or player and adversary swapped tiles this tick.
    fn resolve_contacts(&mut self, player_before_move: Vec2, adversaries_before_move: &[Vec2]) {
        let player_pos = self.player.pos;
        for idx in 0..self.adversaries.len() {
            let adversary_pos = self.adversaries[idx].pos;
            let overlap = adversary_pos == player_pos;
            let swapped = adversaries_before_move
                .get(idx)
                .map(|before| *before == player_pos && adversary_pos == player_before_move)
                .unwrap_or(false);
            if !overlap && !swapped {
                continue;
            }

            match self.adversaries[idx].mode {
                Mode::Captured => {}
                Mode::Vulnerable => {
                    let adversary = &mut self.adversaries[idx];
                    adversary.mode = Mode::Captured;
                    adversary.vulnerable_ms = 0;
                    adversary.flashing = false;
                    self.score += CAPTURE_BONUS;
                    tracing::debug!(id = %adversary.id, "adversary captured");
                    self.events.push(RuntimeEvent::AdversaryCaptured {
                        adversary_id: adversary.id.clone(),
                        bonus: CAPTURE_BONUS,
                    });
                }
                Mode::Scatter | Mode::Pursuit => {
                    self.events.push(RuntimeEvent::PlayerCaught {
                        by: self.adversaries[idx].id.clone(),
                    });
                    self.finish_run(Outcome::Failure);
                    return;
                }
            }
        }
    }

    fn check_level_complete(&mut self) {
        if !self.pickups.is_empty() {
            return;
        }
        self.events.push(RuntimeEvent::LevelCleared {
            level: self.level_index,
        });
        if self.level_index >= self.levels.len() {
            self.finish_run(Outcome::Victory);
        } else {
            self.load_level(self.level_index + 1);
        }
    }

    fn finish_run(&mut self, outcome: Outcome) {
        self.round = RoundState::Ended(outcome);
        tracing::info!(
            ?outcome,
            score = self.score,
            level = self.level_index,
            tick = self.tick_counter,
            "run ended"
        );
        self.events.push(RuntimeEvent::RunEnded {
            outcome,
            score: self.score,
        });
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::constants::ticks_for;
    use crate::levels::LevelDefinition;

    pub(crate) fn engine_from_layout(rows: &[&str]) -> GameEngine {
        engine_from_layouts(&[rows])
    }

    pub(crate) fn engine_from_layouts(layouts: &[&[&str]]) -> GameEngine {
        let levels = layouts
            .iter()
            .enumerate()
            .map(|(idx, rows)| {
                let roster = AdversaryColor::ROSTER
                    .into_iter()
                    .take_while(|color| rows.iter().any(|row| row.contains(color.layout_char())))
                    .count();
                LevelDefinition::parse_layout(idx + 1, None, Some(roster), *rows)
                    .expect("test layout parses")
            })
            .collect();
        GameEngine::new(
            LevelSet::from_definitions(levels).expect("at least one level"),
            7,
        )
    }

    fn running(rows: &[&str]) -> GameEngine {
        let mut engine = engine_from_layout(rows);
        engine.resume();
        engine.events.clear();
        engine
    }

    fn assert_positions_open(engine: &GameEngine) {
        let player = engine.player.pos;
        assert!(engine.maze.is_walkable(player.x, player.y), "player on {player:?}");
        for adversary in &engine.adversaries {
            assert!(
                engine.maze.is_walkable(adversary.pos.x, adversary.pos.y),
                "{} on {:?}",
                adversary.id,
                adversary.pos
            );
        }
    }

    #[test]
    fn new_engine_waits_for_the_intro_overlay() {
        let mut engine = GameEngine::with_default_levels(1).expect("embedded levels");
        assert_eq!(engine.round_state(), RoundState::Intro);
        assert!(engine.is_paused());

        let snapshot = engine.build_snapshot(true);
        assert_eq!(
            snapshot.events,
            vec![
                RuntimeEvent::LevelLoaded { level: 1 },
                RuntimeEvent::PauseRequested {
                    reason: PauseReason::LevelIntro,
                    duration_ms: LEVEL_INTRO_MS,
                },
            ]
        );

        let before = engine.build_snapshot(false);
        engine.set_direction(Direction::Right);
        engine.step();
        let after = engine.build_snapshot(false);
        assert_eq!(before, after);
        assert_eq!(after.player.dir, Direction::None);
    }

    #[test]
    fn eating_the_last_pickup_clears_the_level() {
        let mut engine = running(&["#####", "#PC #", "#####"]);
        assert_eq!(engine.player.pos, Vec2::new(1, 1));
        engine.set_direction(Direction::Right);
        engine.step();

        assert_eq!(engine.player.pos, Vec2::new(2, 1));
        assert_eq!(engine.score(), STANDARD_PICKUP_SCORE);
        assert_eq!(engine.pickups_remaining(), 0);
        assert_eq!(engine.round_state(), RoundState::Ended(Outcome::Victory));

        let events = engine.build_snapshot(true).events;
        assert_eq!(
            events,
            vec![
                RuntimeEvent::PickupConsumed { x: 2, y: 1 },
                RuntimeEvent::LevelCleared { level: 1 },
                RuntimeEvent::RunEnded {
                    outcome: Outcome::Victory,
                    score: 10,
                },
            ]
        );
    }

    #[test]
    fn clearing_a_level_loads_the_next_one_paused() {
        let mut engine = engine_from_layouts(&[
            &["#####", "#PC #", "#####"],
            &["######", "#P CC#", "#    #", "#R   #", "######"],
        ]);
        engine.resume();
        engine.set_direction(Direction::Right);
        engine.step();

        assert_eq!(engine.level(), 2);
        assert_eq!(engine.round_state(), RoundState::Intro);
        assert_eq!(engine.score(), 10);
        assert_eq!(engine.pickups_remaining(), 2);
        assert_eq!(engine.adversaries.len(), 1);
        assert_eq!(engine.player.pos, Vec2::new(1, 1));
        assert_eq!(engine.player.desired_dir, Direction::None);
    }

    #[test]
    fn power_pickup_makes_every_free_adversary_vulnerable() {
        let mut engine = running(&[
            "#########",
            "#PU C   #",
            "#       #",
            "#R  B  G#",
            "#########",
        ]);
        engine.adversaries[2].mode = Mode::Captured;
        engine.adversaries[2].home = Vec2::new(1, 2);
        engine.adversaries[1].mode = Mode::Vulnerable;
        engine.adversaries[1].vulnerable_ms = 500;

        engine.set_direction(Direction::Right);
        engine.step();

        assert_eq!(engine.score(), POWER_PICKUP_SCORE);
        assert_eq!(engine.pickups_remaining(), 1);
        assert_eq!(engine.adversaries[0].mode, Mode::Vulnerable);
        assert_eq!(engine.adversaries[0].vulnerable_ms, VULNERABLE_DURATION_MS);
        assert_eq!(engine.adversaries[1].mode, Mode::Vulnerable);
        assert_eq!(engine.adversaries[1].vulnerable_ms, VULNERABLE_DURATION_MS);
        assert_eq!(engine.adversaries[2].mode, Mode::Captured);
        assert!(engine
            .build_snapshot(true)
            .events
            .contains(&RuntimeEvent::PowerConsumed { x: 2, y: 1 }));
    }

    #[test]
    fn direct_adversary_steps_toward_player_above() {
        let mut engine = running(&[
            "#########",
            "#    P  #",
            "#       #",
            "#       #",
            "#       #",
            "#    R  #",
            "#      C#",
            "#########",
        ]);
        engine.coordinator.advance(SCATTER_DURATION_MS - TICK_MS);
        engine.step();

        assert_eq!(engine.coordinator.phase(), Mode::Pursuit);
        assert_eq!(engine.adversaries[0].mode, Mode::Pursuit);
        assert_eq!(engine.adversaries[0].target, Vec2::new(5, 1));
        assert_eq!(engine.adversaries[0].pos, Vec2::new(5, 4));
        assert_eq!(engine.adversaries[0].dir, Direction::Up);
    }

    #[test]
    fn contact_with_a_hunting_adversary_ends_the_run() {
        for mode in [Mode::Pursuit, Mode::Scatter] {
            let mut engine = running(&["#######", "#P R C#", "#######"]);
            engine.adversaries[0].mode = mode;
            engine.adversaries[0].dir = Direction::Left;
            engine.set_direction(Direction::Right);
            engine.step();

            assert_eq!(engine.round_state(), RoundState::Ended(Outcome::Failure));
            let events = engine.build_snapshot(true).events;
            assert!(events.contains(&RuntimeEvent::PlayerCaught {
                by: "mallet_red".to_string()
            }));
            assert!(events.contains(&RuntimeEvent::RunEnded {
                outcome: Outcome::Failure,
                score: 0,
            }));
        }
    }

    #[test]
    fn passing_through_each_other_counts_as_contact() {
        let mut engine = running(&["######", "#PR C#", "######"]);
        engine.adversaries[0].mode = Mode::Pursuit;
        engine.adversaries[0].dir = Direction::Left;
        engine.set_direction(Direction::Right);
        engine.step();

        assert_eq!(engine.player.pos, Vec2::new(2, 1));
        assert_eq!(engine.adversaries[0].pos, Vec2::new(1, 1));
        assert_eq!(engine.round_state(), RoundState::Ended(Outcome::Failure));
    }

    #[test]
    fn captured_adversary_is_harmless() {
        let mut engine = running(&["########", "#P R  C#", "########"]);
        engine.adversaries[0].mode = Mode::Captured;
        engine.adversaries[0].home = Vec2::new(6, 1);
        engine.adversaries[0].dir = Direction::Left;
        engine.set_direction(Direction::Right);
        engine.step();

        assert_eq!(engine.round_state(), RoundState::Running);
        assert_eq!(engine.score(), 0);
    }

    #[test]
    fn captured_adversary_walks_home_then_resumes_pursuit() {
        let mut engine = running(&[
            "##########",
            "#P R     #",
            "#        #",
            "#       C#",
            "##########",
        ]);
        let home = engine.adversaries[0].home;
        assert_eq!(home, Vec2::new(3, 1));
        engine.adversaries[0].mode = Mode::Vulnerable;
        engine.adversaries[0].vulnerable_ms = VULNERABLE_DURATION_MS;
        engine.adversaries[0].pos = engine.player.pos;

        let player_pos = engine.player.pos;
        engine.resolve_contacts(player_pos, &[player_pos]);
        assert_eq!(engine.adversaries[0].mode, Mode::Captured);
        assert_eq!(engine.score(), CAPTURE_BONUS);
        assert_eq!(
            engine.build_snapshot(true).events,
            vec![RuntimeEvent::AdversaryCaptured {
                adversary_id: "mallet_red".to_string(),
                bonus: CAPTURE_BONUS,
            }]
        );

        let mut ticks = 0;
        while engine.adversaries[0].mode == Mode::Captured {
            engine.step();
            assert_eq!(engine.adversaries[0].target, home);
            assert_eq!(engine.round_state(), RoundState::Running);
            ticks += 1;
            assert!(ticks < 20, "never made it home");
        }
        assert_eq!(ticks, 2);
        assert_eq!(engine.adversaries[0].pos, home);
        assert_eq!(engine.adversaries[0].mode, Mode::Pursuit);
        assert_eq!(engine.score(), CAPTURE_BONUS);
    }

    #[test]
    fn power_then_swap_captures_through_the_tick_pipeline() {
        let mut engine = running(&["#########", "#PU R  C#", "#########"]);
        engine.adversaries[0].mode = Mode::Pursuit;
        engine.adversaries[0].dir = Direction::Left;
        engine.set_direction(Direction::Right);

        engine.step();
        assert_eq!(engine.score(), POWER_PICKUP_SCORE);
        assert_eq!(engine.adversaries[0].mode, Mode::Vulnerable);
        assert_eq!(engine.adversaries[0].pos, Vec2::new(3, 1));

        engine.step();
        assert_eq!(engine.player.pos, Vec2::new(3, 1));
        assert_eq!(engine.adversaries[0].pos, Vec2::new(2, 1));
        assert_eq!(engine.score(), POWER_PICKUP_SCORE + CAPTURE_BONUS);
        assert_eq!(engine.adversaries[0].mode, Mode::Captured);
        assert_eq!(engine.round_state(), RoundState::Running);
        assert!(engine
            .build_snapshot(true)
            .events
            .contains(&RuntimeEvent::AdversaryCaptured {
                adversary_id: "mallet_red".to_string(),
                bonus: CAPTURE_BONUS,
            }));
    }

    #[test]
    fn world_init_publishes_timing_and_level_count() {
        let engine = engine_from_layouts(&[
            &["#####", "#PC #", "#####"],
            &["#####", "#P C#", "#####"],
        ]);
        let world = engine.world_init();
        assert_eq!(world.width, 5);
        assert_eq!(world.pixel_width, 5 * TILE_SIZE);
        assert_eq!(
            world.config,
            GameConfig {
                tick_ms: TICK_MS,
                scatter_duration_ms: SCATTER_DURATION_MS,
                chase_duration_ms: CHASE_DURATION_MS,
                vulnerable_duration_ms: VULNERABLE_DURATION_MS,
                level_intro_ms: LEVEL_INTRO_MS,
                level_count: 2,
            }
        );
    }

    #[test]
    fn reloading_a_level_restores_the_initial_board() {
        let mut engine = GameEngine::with_default_levels(3).expect("embedded levels");
        let initial = engine.build_snapshot(false);

        engine.resume();
        for _ in 0..40 {
            let dir = engine.autopilot_direction();
            engine.set_direction(dir);
            engine.step();
        }
        let score = engine.score();
        assert!(score > 0);

        engine.load_level(1);
        let first = engine.build_snapshot(false);
        engine.load_level(1);
        let second = engine.build_snapshot(false);

        assert_eq!(first, second);
        assert_eq!(second.score, score);
        assert_eq!(second.level, 1);
        assert_eq!(second.pickups, initial.pickups);
        assert_eq!(second.adversaries, initial.adversaries);
        assert_eq!(second.player, initial.player);
    }

    #[test]
    fn vulnerability_lapses_back_into_the_coordinator_phase() {
        let mut engine = running(&[
            "###########",
            "#P#       #",
            "###       #",
            "#    R   C#",
            "###########",
        ]);
        engine.adversaries[0].mode = Mode::Vulnerable;
        engine.adversaries[0].vulnerable_ms = 2 * TICK_MS;

        engine.step();
        assert_eq!(engine.adversaries[0].mode, Mode::Vulnerable);
        engine.step();
        assert_eq!(engine.adversaries[0].mode, Mode::Pursuit);
        assert_eq!(engine.adversaries[0].vulnerable_ms, 0);

        engine.step();
        assert_eq!(engine.coordinator.phase(), Mode::Scatter);
        assert_eq!(engine.adversaries[0].mode, Mode::Scatter);
    }

    #[test]
    fn phase_flips_reach_every_phased_adversary() {
        let mut engine = running(&[
            "###########",
            "#P#       #",
            "###       #",
            "#   R B  C#",
            "###########",
        ]);
        engine.adversaries[1].mode = Mode::Vulnerable;
        engine.adversaries[1].vulnerable_ms = 60_000;

        for _ in 1..ticks_for(SCATTER_DURATION_MS) {
            engine.step();
            assert_eq!(engine.adversaries[0].mode, Mode::Scatter);
        }
        engine.step();
        assert_eq!(engine.adversaries[0].mode, Mode::Pursuit);
        assert_eq!(engine.adversaries[1].mode, Mode::Vulnerable);
        assert!(engine
            .build_snapshot(true)
            .events
            .contains(&RuntimeEvent::PhaseChanged {
                phase: Mode::Pursuit
            }));

        for _ in 0..ticks_for(CHASE_DURATION_MS) {
            engine.step();
        }
        assert_eq!(engine.coordinator.phase(), Mode::Scatter);
        assert_eq!(engine.adversaries[0].mode, Mode::Scatter);
    }

    #[test]
    fn acknowledge_resets_the_run() {
        let mut engine = engine_from_layouts(&[
            &["#####", "#PC #", "#####"],
            &["######", "#P CC#", "#R   #", "######"],
        ]);
        engine.resume();
        engine.set_direction(Direction::Right);
        engine.step();
        assert_eq!(engine.level(), 2);
        engine.resume();

        engine.adversaries[0].mode = Mode::Pursuit;
        engine.adversaries[0].pos = engine.player.pos;
        let player_pos = engine.player.pos;
        engine.resolve_contacts(player_pos, &[]);
        assert_eq!(engine.round_state(), RoundState::Ended(Outcome::Failure));

        engine.resume();
        engine.set_direction(Direction::Right);
        engine.step();
        assert!(engine.is_ended());
        assert_eq!(engine.score(), 10);

        engine.acknowledge();
        assert_eq!(engine.level(), 1);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.round_state(), RoundState::Intro);
        assert_eq!(engine.pickups_remaining(), 1);
    }

    #[test]
    fn requesting_a_missing_level_is_a_victory() {
        let mut engine = engine_from_layout(&["#####", "#PC #", "#####"]);
        engine.load_level(5);
        assert_eq!(engine.round_state(), RoundState::Ended(Outcome::Victory));
    }

    #[test]
    fn same_seed_produces_same_progression() {
        let mut a = GameEngine::with_default_levels(424_242).expect("embedded levels");
        let mut b = GameEngine::with_default_levels(424_242).expect("embedded levels");
        a.resume();
        b.resume();

        for _ in 0..600 {
            let dir = a.autopilot_direction();
            a.set_direction(dir);
            b.set_direction(b.autopilot_direction());
            a.step();
            b.step();
            assert_eq!(a.build_snapshot(true), b.build_snapshot(true));
            if a.round_state() == RoundState::Intro {
                a.resume();
                b.resume();
            }
            if a.is_ended() {
                break;
            }
        }
    }

    #[test]
    fn agents_never_stand_on_walls() {
        for seed in 0..20u32 {
            let mut engine = GameEngine::with_default_levels(seed).expect("embedded levels");
            engine.resume();
            let mut last_score = 0;
            for tick in 0..800 {
                let dir = if tick % 7 == 0 {
                    Direction::CARDINALS[(tick / 7) % 4]
                } else {
                    engine.autopilot_direction()
                };
                engine.set_direction(dir);
                engine.step();
                assert_positions_open(&engine);
                assert!(engine.score() >= last_score);
                last_score = engine.score();
                match engine.round_state() {
                    RoundState::Intro => engine.resume(),
                    RoundState::Ended(_) => break,
                    RoundState::Running => {}
                }
            }
        }
    }
}

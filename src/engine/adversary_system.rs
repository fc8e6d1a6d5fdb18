use super::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct AdversaryInternal {
    pub(super) id: String,
    pub(super) color: AdversaryColor,
    pub(super) variant: Variant,
    pub(super) pos: Vec2,
    pub(super) home: Vec2,
    pub(super) corner: Vec2,
    pub(super) dir: Direction,
    pub(super) mode: Mode,
    pub(super) vulnerable_ms: u64,
    pub(super) target: Vec2,
    pub(super) flashing: bool,
}

impl AdversaryInternal {
    pub(super) fn spawn(color: AdversaryColor, tile: Vec2, maze: &Maze) -> Self {
        Self {
            id: format!("mallet_{}", color.name()),
            color,
            variant: color.variant(),
            pos: tile,
            home: tile,
            corner: scatter_corner(color, maze),
            dir: Direction::None,
            mode: Mode::Scatter,
            vulnerable_ms: 0,
            target: tile,
            flashing: false,
        }
    }

    pub(super) fn view(&self) -> AdversaryView {
        AdversaryView {
            id: self.id.clone(),
            color: self.color,
            variant: self.variant,
            x: self.pos.x,
            y: self.pos.y,
            dir: self.dir,
            mode: self.mode,
            home: self.home,
            target: self.target,
            vulnerable_ms: self.vulnerable_ms,
            flashing: self.flashing,
        }
    }

    fn tick_vulnerability(&mut self) {
        self.vulnerable_ms = self.vulnerable_ms.saturating_sub(TICK_MS);
        if self.vulnerable_ms == 0 {
            self.mode = Mode::Pursuit;
            self.flashing = false;
            return;
        }
        self.flashing = self.vulnerable_ms <= FLASH_WINDOW_MS
            && (self.vulnerable_ms / FLASH_INTERVAL_MS) % 2 == 0;
    }
}

pub(super) fn scatter_corner(color: AdversaryColor, maze: &Maze) -> Vec2 {
    match color {
        AdversaryColor::Red => Vec2::new(maze.width - 1, 0),
        AdversaryColor::Blue => Vec2::new(0, 0),
        AdversaryColor::Green => Vec2::new(0, maze.height - 1),
    }
}

pub(super) fn select_target(
    adversary: &AdversaryInternal,
    player: &PlayerInternal,
    maze: &Maze,
    rng: &mut Rng,
) -> Vec2 {
    match adversary.mode {
        Mode::Captured => adversary.home,
        Mode::Vulnerable => rng.tile_within(maze.width, maze.height),
        Mode::Scatter => adversary.corner,
        Mode::Pursuit => match adversary.variant {
            Variant::Direct => player.pos,
            Variant::Ambush => player.pos.offset(player.last_dir, AMBUSH_LOOKAHEAD_TILES),
            Variant::Opportunist => {
                let radius = OPPORTUNIST_RADIUS_TILES as i64;
                if adversary.pos.distance_sq(player.pos) > radius * radius {
                    player.pos
                } else {
                    adversary.corner
                }
            }
        },
    }
}

/// Greedy one-tile step toward `target`.
///
/// Candidates are tried Up, Down, Left, Right and the first one with the
/// smallest Euclidean distance wins. Turning back on `heading` is only allowed
/// when nothing else is open; `None` means the adversary is boxed in.
pub(super) fn choose_greedy_direction(
    maze: &Maze,
    from: Vec2,
    heading: Direction,
    target: Vec2,
) -> Option<Direction> {
    let reverse = heading.opposite();
    let is_open = |dir: Direction| {
        let next = from.step(dir);
        maze.is_walkable(next.x, next.y)
    };

    Direction::CARDINALS
        .into_iter()
        .filter(|dir| *dir != reverse && is_open(*dir))
        .min_by_key(|dir| from.step(*dir).distance_sq(target))
        .or_else(|| (reverse != Direction::None && is_open(reverse)).then_some(reverse))
}

impl GameEngine {
    pub(super) fn spawn_roster(&mut self, spawns: &[AdversarySpawn]) {
        self.adversaries = spawns
            .iter()
            .map(|spawn| AdversaryInternal::spawn(spawn.color, spawn.tile, &self.maze))
            .collect();
    }

    pub(super) fn update_adversaries(&mut self) {
        for idx in 0..self.adversaries.len() {
            if self.adversaries[idx].mode == Mode::Captured
                && self.adversaries[idx].pos == self.adversaries[idx].home
            {
                self.adversaries[idx].mode = Mode::Pursuit;
            }

            let target = select_target(
                &self.adversaries[idx],
                &self.player,
                &self.maze,
                &mut self.rng,
            );
            let adversary = &mut self.adversaries[idx];
            adversary.target = target;

            if let Some(dir) =
                choose_greedy_direction(&self.maze, adversary.pos, adversary.dir, target)
            {
                adversary.pos = adversary.pos.step(dir);
                adversary.dir = dir;
            }

            match adversary.mode {
                Mode::Vulnerable => adversary.tick_vulnerability(),
                Mode::Captured if adversary.pos == adversary.home => {
                    tracing::debug!(id = %adversary.id, "adversary back home");
                    adversary.mode = Mode::Pursuit;
                }
                _ => {}
            }
        }
    }
}

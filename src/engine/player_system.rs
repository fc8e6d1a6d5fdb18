use super::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct PlayerInternal {
    pub(super) pos: Vec2,
    pub(super) spawn: Vec2,
    /// Buffered input, retried every tick until it becomes legal.
    pub(super) desired_dir: Direction,
    pub(super) last_dir: Direction,
}

impl PlayerInternal {
    pub(super) fn spawn_at(spawn: Vec2) -> Self {
        Self {
            pos: spawn,
            spawn,
            desired_dir: Direction::None,
            last_dir: Direction::None,
        }
    }

    pub(super) fn step(&mut self, maze: &Maze) -> bool {
        if self.desired_dir == Direction::None {
            return false;
        }
        let next = self.pos.step(self.desired_dir);
        if !maze.is_walkable(next.x, next.y) {
            return false;
        }
        self.pos = next;
        self.last_dir = self.desired_dir;
        true
    }

    pub(super) fn view(&self) -> PlayerView {
        PlayerView {
            x: self.pos.x,
            y: self.pos.y,
            dir: self.desired_dir,
            last_dir: self.last_dir,
        }
    }
}

impl GameEngine {
    pub(super) fn update_player(&mut self) {
        self.player.step(&self.maze);
    }
}

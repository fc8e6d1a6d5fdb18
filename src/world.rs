use std::collections::{BTreeSet, HashSet, VecDeque};

use crate::constants::TILE_SIZE;
use crate::types::{PickupKind, PickupView, Vec2};

const WALL: u8 = b'#';
const FLOOR: u8 = b'.';

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Maze {
    pub width: i32,
    pub height: i32,
    tiles: Vec<String>,
}

impl Maze {
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Self {
        let width = rows
            .iter()
            .map(|row| row.as_ref().chars().count())
            .max()
            .unwrap_or(0);
        let tiles: Vec<String> = rows
            .iter()
            .map(|row| {
                let mut out: String = row
                    .as_ref()
                    .chars()
                    .map(|c| if c == '#' { WALL as char } else { FLOOR as char })
                    .collect();
                while out.len() < width {
                    out.push(WALL as char);
                }
                out
            })
            .collect();
        Self {
            width: width as i32,
            height: tiles.len() as i32,
            tiles,
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        if !self.contains(x, y) {
            return false;
        }
        self.tiles
            .get(y as usize)
            .and_then(|row| row.as_bytes().get(x as usize))
            .map(|c| *c == FLOOR)
            .unwrap_or(false)
    }

    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        !self.is_walkable(x, y)
    }

    pub fn pixel_width(&self) -> i32 {
        self.width * TILE_SIZE
    }

    pub fn pixel_height(&self) -> i32 {
        self.height * TILE_SIZE
    }

    pub fn tile_rows(&self) -> &[String] {
        &self.tiles
    }

    pub fn reachable_from(&self, start: Vec2) -> HashSet<(i32, i32)> {
        let mut out = HashSet::new();
        if !self.is_walkable(start.x, start.y) {
            return out;
        }

        let mut queue = VecDeque::new();
        out.insert((start.x, start.y));
        queue.push_back((start.x, start.y));

        while let Some((x, y)) = queue.pop_front() {
            for (nx, ny) in [(x, y - 1), (x, y + 1), (x - 1, y), (x + 1, y)] {
                if !self.is_walkable(nx, ny) {
                    continue;
                }
                if out.insert((nx, ny)) {
                    queue.push_back((nx, ny));
                }
            }
        }

        out
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Collectibles {
    standard: BTreeSet<(i32, i32)>,
    power: BTreeSet<(i32, i32)>,
}

impl Collectibles {
    pub fn seeded(pickups: &[(Vec2, PickupKind)]) -> Self {
        let mut out = Self::default();
        for (pos, kind) in pickups {
            match kind {
                PickupKind::Standard => out.standard.insert((pos.x, pos.y)),
                PickupKind::Power => out.power.insert((pos.x, pos.y)),
            };
        }
        out
    }

    /// Removes whatever sits on `pos`, standard before power.
    pub fn consume_at(&mut self, pos: Vec2) -> Vec<PickupKind> {
        let mut taken = Vec::new();
        if self.standard.remove(&(pos.x, pos.y)) {
            taken.push(PickupKind::Standard);
        }
        if self.power.remove(&(pos.x, pos.y)) {
            taken.push(PickupKind::Power);
        }
        taken
    }

    pub fn kind_at(&self, pos: Vec2) -> Option<PickupKind> {
        if self.standard.contains(&(pos.x, pos.y)) {
            Some(PickupKind::Standard)
        } else if self.power.contains(&(pos.x, pos.y)) {
            Some(PickupKind::Power)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.standard.len() + self.power.len()
    }

    pub fn is_empty(&self) -> bool {
        self.standard.is_empty() && self.power.is_empty()
    }

    pub fn views(&self) -> Vec<PickupView> {
        let standard = self.standard.iter().map(|&(x, y)| PickupView {
            x,
            y,
            kind: PickupKind::Standard,
        });
        let power = self.power.iter().map(|&(x, y)| PickupView {
            x,
            y,
            kind: PickupKind::Power,
        });
        standard.chain(power).collect()
    }
}

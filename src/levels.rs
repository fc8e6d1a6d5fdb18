//! Layouts use the classic Bonkman alphabet: `#` wall, `C` coin, `U` power-up,
//! `P` player spawn, plus `R`/`B`/`G` for the red, blue and green mallets.

use std::path::Path;

use serde::Deserialize;

use crate::constants::MAX_ROSTER;
use crate::error::{GameError, LevelError};
use crate::types::{AdversaryColor, PickupKind, Vec2};
use crate::world::Maze;

const EMBEDDED_LEVELS: &str = include_str!("levels.json");

#[derive(Debug, Deserialize)]
struct LevelFile {
    levels: Vec<RawLevel>,
}

#[derive(Debug, Deserialize)]
struct RawLevel {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    roster: Option<usize>,
    rows: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdversarySpawn {
    pub color: AdversaryColor,
    pub tile: Vec2,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelDefinition {
    /// 1-based.
    pub index: usize,
    pub name: String,
    pub maze: Maze,
    pub player_spawn: Vec2,
    pub adversaries: Vec<AdversarySpawn>,
    pub pickups: Vec<(Vec2, PickupKind)>,
}

impl LevelDefinition {
    pub fn parse_layout<S: AsRef<str>>(
        index: usize,
        name: Option<String>,
        roster: Option<usize>,
        rows: &[S],
    ) -> Result<Self, LevelError> {
        if rows.iter().all(|row| row.as_ref().is_empty()) {
            return Err(LevelError::EmptyLayout { level: index });
        }

        let mut player_spawn = None;
        let mut color_spawns: Vec<(AdversaryColor, Vec2)> = Vec::new();
        let mut pickups = Vec::new();

        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.as_ref().chars().enumerate() {
                let pos = Vec2::new(x as i32, y as i32);
                match ch {
                    '#' | ' ' | '.' => {}
                    'C' => pickups.push((pos, PickupKind::Standard)),
                    'U' => pickups.push((pos, PickupKind::Power)),
                    'P' => {
                        if player_spawn.is_none() {
                            player_spawn = Some(pos);
                        }
                    }
                    other => {
                        let Some(color) = AdversaryColor::from_layout_char(other) else {
                            return Err(LevelError::UnknownCharacter {
                                level: index,
                                ch: other,
                                x: pos.x,
                                y: pos.y,
                            });
                        };
                        if !color_spawns.iter().any(|(seen, _)| *seen == color) {
                            color_spawns.push((color, pos));
                        }
                    }
                }
            }
        }

        let player_spawn = player_spawn.ok_or(LevelError::MissingPlayerSpawn { level: index })?;
        let roster = roster.unwrap_or(index).min(MAX_ROSTER);
        let mut adversaries = Vec::with_capacity(roster);
        for color in AdversaryColor::ROSTER.into_iter().take(roster) {
            let tile = color_spawns
                .iter()
                .find(|(seen, _)| *seen == color)
                .map(|(_, tile)| *tile)
                .ok_or(LevelError::MissingAdversarySpawn {
                    level: index,
                    color: color.name(),
                    marker: color.layout_char(),
                })?;
            adversaries.push(AdversarySpawn { color, tile });
        }

        let maze = Maze::from_rows(rows);
        let reachable = maze.reachable_from(player_spawn);
        let stranded = pickups
            .iter()
            .filter(|(pos, _)| !reachable.contains(&(pos.x, pos.y)))
            .count();
        if stranded > 0 {
            tracing::warn!(level = index, stranded, "pickups unreachable from player spawn");
        }

        Ok(Self {
            index,
            name: name.unwrap_or_else(|| format!("Level {index}")),
            maze,
            player_spawn,
            adversaries,
            pickups,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelSet {
    levels: Vec<LevelDefinition>,
}

impl LevelSet {
    pub fn embedded() -> Result<Self, LevelError> {
        Self::from_json(EMBEDDED_LEVELS)
    }

    pub fn from_json(text: &str) -> Result<Self, LevelError> {
        let file: LevelFile = serde_json::from_str(text)?;
        if file.levels.is_empty() {
            return Err(LevelError::Empty);
        }
        let levels = file
            .levels
            .into_iter()
            .enumerate()
            .map(|(idx, raw)| {
                LevelDefinition::parse_layout(idx + 1, raw.name, raw.roster, raw.rows.as_slice())
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { levels })
    }

    pub fn load(path: &Path) -> Result<Self, GameError> {
        let text = std::fs::read_to_string(path).map_err(|source| GameError::AssetUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_json(&text)?)
    }

    pub fn from_definitions(levels: Vec<LevelDefinition>) -> Result<Self, LevelError> {
        if levels.is_empty() {
            return Err(LevelError::Empty);
        }
        Ok(Self { levels })
    }

    pub fn first(&self) -> &LevelDefinition {
        &self.levels[0]
    }

    /// `index` is 1-based; `None` past the last level.
    pub fn get(&self, index: usize) -> Option<&LevelDefinition> {
        index.checked_sub(1).and_then(|idx| self.levels.get(idx))
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

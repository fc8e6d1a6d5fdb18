use std::collections::{HashMap, HashSet, VecDeque};

use super::*;

impl GameEngine {
    pub fn autopilot_direction(&self) -> Direction {
        let start = self.player.pos;
        let hazards: Vec<Vec2> = self
            .adversaries
            .iter()
            .filter(|adversary| adversary.mode.is_hazard())
            .map(|adversary| adversary.pos)
            .collect();

        let mut danger = HashSet::new();
        for hazard in &hazards {
            danger.insert((hazard.x, hazard.y));
            for dir in Direction::CARDINALS {
                let near = hazard.step(dir);
                danger.insert((near.x, near.y));
            }
        }
        danger.remove(&(start.x, start.y));

        if let Some(dir) = self.first_step_to_pickup(start, &danger) {
            return dir;
        }
        if let Some(dir) = self.first_step_to_pickup(start, &HashSet::new()) {
            if !hazards.is_empty() {
                return self.flee_direction(start, &hazards).unwrap_or(dir);
            }
            return dir;
        }
        self.flee_direction(start, &hazards).unwrap_or(Direction::None)
    }

    fn first_step_to_pickup(
        &self,
        start: Vec2,
        blocked: &HashSet<(i32, i32)>,
    ) -> Option<Direction> {
        let mut first_step: HashMap<(i32, i32), Direction> = HashMap::new();
        let mut queue = VecDeque::new();
        queue.push_back(start);
        let mut visited = HashSet::new();
        visited.insert((start.x, start.y));

        while let Some(pos) = queue.pop_front() {
            if pos != start && self.pickups.kind_at(pos).is_some() {
                return first_step.get(&(pos.x, pos.y)).copied();
            }
            for dir in Direction::CARDINALS {
                let next = pos.step(dir);
                if !self.maze.is_walkable(next.x, next.y) || blocked.contains(&(next.x, next.y)) {
                    continue;
                }
                if !visited.insert((next.x, next.y)) {
                    continue;
                }
                let step = if pos == start {
                    dir
                } else {
                    first_step.get(&(pos.x, pos.y)).copied().unwrap_or(dir)
                };
                first_step.insert((next.x, next.y), step);
                queue.push_back(next);
            }
        }
        None
    }

    fn flee_direction(&self, start: Vec2, hazards: &[Vec2]) -> Option<Direction> {
        let clearance = |pos: Vec2| {
            hazards
                .iter()
                .map(|hazard| pos.distance_sq(*hazard))
                .min()
                .unwrap_or(i64::MAX)
        };
        let current = clearance(start);
        Direction::CARDINALS
            .into_iter()
            .filter(|dir| {
                let next = start.step(*dir);
                self.maze.is_walkable(next.x, next.y)
            })
            .map(|dir| (dir, clearance(start.step(dir))))
            .filter(|(_, score)| *score > current)
            .max_by_key(|(_, score)| *score)
            .map(|(dir, _)| dir)
    }
}

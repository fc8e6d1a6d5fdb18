pub const TICK_MS: u64 = 125;

pub const TILE_SIZE: i32 = 20;

pub const SCATTER_DURATION_MS: u64 = 7_000;
pub const CHASE_DURATION_MS: u64 = 20_000;
pub const VULNERABLE_DURATION_MS: u64 = 8_000;
pub const FLASH_WINDOW_MS: u64 = 2_000;
pub const FLASH_INTERVAL_MS: u64 = 250;
pub const LEVEL_INTRO_MS: u64 = 2_500;

pub const STANDARD_PICKUP_SCORE: u32 = 10;
pub const POWER_PICKUP_SCORE: u32 = 50;
pub const CAPTURE_BONUS: u32 = 200;

pub const MAX_ROSTER: usize = 3;
pub const AMBUSH_LOOKAHEAD_TILES: i32 = 4;
pub const OPPORTUNIST_RADIUS_TILES: i32 = 8;

pub fn ticks_for(duration_ms: u64) -> u64 {
    duration_ms / TICK_MS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_duration_is_a_whole_number_of_ticks() {
        for duration in [
            SCATTER_DURATION_MS,
            CHASE_DURATION_MS,
            VULNERABLE_DURATION_MS,
            FLASH_WINDOW_MS,
            FLASH_INTERVAL_MS,
            LEVEL_INTRO_MS,
        ] {
            assert_eq!(duration % TICK_MS, 0, "duration {duration} is not tick aligned");
        }
    }

    #[test]
    fn scatter_phase_spans_whole_ticks() {
        assert_eq!(ticks_for(SCATTER_DURATION_MS), 56);
    }
}

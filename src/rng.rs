use crate::types::Vec2;

#[derive(Clone, Debug)]
pub struct Rng {
    seed: u32,
}

impl Rng {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    pub fn next_f32(&mut self) -> f32 {
        self.seed = self.seed.wrapping_add(0x6d2b79f5);
        let mut t = self.seed;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        let out = t ^ (t >> 14);
        (out as f64 / 4_294_967_296.0) as f32
    }

    pub fn int(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let span = (max - min + 1) as f32;
        (min + (self.next_f32() * span).floor() as i32).min(max)
    }

    pub fn tile_within(&mut self, width: i32, height: i32) -> Vec2 {
        Vec2 {
            x: self.int(0, width - 1),
            y: self.int(0, height - 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Rng;

    #[test]
    fn same_seed_repeats_sequence() {
        let mut a = Rng::new(7);
        let mut b = Rng::new(7);
        for _ in 0..64 {
            assert_eq!(a.next_f32().to_bits(), b.next_f32().to_bits());
        }
    }

    #[test]
    fn tile_within_stays_in_bounds() {
        let mut rng = Rng::new(99);
        let mut seen_far_corner = false;
        for _ in 0..4_000 {
            let tile = rng.tile_within(5, 3);
            assert!((0..5).contains(&tile.x));
            assert!((0..3).contains(&tile.y));
            seen_far_corner |= tile.x == 4 && tile.y == 2;
        }
        assert!(seen_far_corner);
    }

    #[test]
    fn degenerate_range_returns_min() {
        let mut rng = Rng::new(1);
        assert_eq!(rng.int(3, 3), 3);
        assert_eq!(rng.int(5, 2), 5);
    }
}

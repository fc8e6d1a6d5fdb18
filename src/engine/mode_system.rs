use super::*;

/// Global Scatter/Pursuit clock. It only proposes a phase; adversaries in
/// `Vulnerable` or `Captured` keep their own mode until it lapses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModeCoordinator {
    phase: Mode,
    elapsed_ms: u64,
}

impl Default for ModeCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeCoordinator {
    pub fn new() -> Self {
        Self {
            phase: Mode::Scatter,
            elapsed_ms: 0,
        }
    }

    pub fn phase(&self) -> Mode {
        self.phase
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn phase_duration_ms(phase: Mode) -> u64 {
        match phase {
            Mode::Pursuit => CHASE_DURATION_MS,
            _ => SCATTER_DURATION_MS,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn advance(&mut self, dt_ms: u64) -> Option<Mode> {
        self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms);
        if self.elapsed_ms < Self::phase_duration_ms(self.phase) {
            return None;
        }
        self.phase = match self.phase {
            Mode::Pursuit => Mode::Scatter,
            _ => Mode::Pursuit,
        };
        self.elapsed_ms = 0;
        Some(self.phase)
    }
}

impl GameEngine {
    pub(super) fn update_mode_phase(&mut self) {
        if let Some(phase) = self.coordinator.advance(TICK_MS) {
            tracing::debug!(tick = self.tick_counter, ?phase, "mode phase flipped");
            self.events.push(RuntimeEvent::PhaseChanged { phase });
        }
        let phase = self.coordinator.phase();
        for adversary in &mut self.adversaries {
            if adversary.mode.is_phased() {
                adversary.mode = phase;
            }
        }
    }

    pub(super) fn broadcast_vulnerability(&mut self) {
        for adversary in &mut self.adversaries {
            if adversary.mode == Mode::Captured {
                continue;
            }
            adversary.mode = Mode::Vulnerable;
            adversary.vulnerable_ms = VULNERABLE_DURATION_MS;
            adversary.flashing = false;
        }
    }
}

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    None,
}

impl Direction {
    /// Enumeration order doubles as the tie-break order for greedy steps.
    pub const CARDINALS: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn parse_move(value: &str) -> Option<Self> {
        match value {
            "up" | "w" => Some(Self::Up),
            "down" | "s" => Some(Self::Down),
            "left" | "a" => Some(Self::Left),
            "right" | "d" => Some(Self::Right),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
            Self::None => (0, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::None => Self::None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

impl Vec2 {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn step(self, dir: Direction) -> Self {
        self.offset(dir, 1)
    }

    pub fn offset(self, dir: Direction, tiles: i32) -> Self {
        let (dx, dy) = dir.delta();
        Self {
            x: self.x + dx * tiles,
            y: self.y + dy * tiles,
        }
    }

    /// Squared Euclidean distance; orders candidates exactly like the real distance.
    pub fn distance_sq(self, other: Vec2) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PickupKind {
    Standard,
    Power,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdversaryColor {
    Red,
    Blue,
    Green,
}

impl AdversaryColor {
    pub const ROSTER: [AdversaryColor; 3] = [Self::Red, Self::Blue, Self::Green];

    pub fn variant(self) -> Variant {
        match self {
            Self::Red => Variant::Direct,
            Self::Blue => Variant::Ambush,
            Self::Green => Variant::Opportunist,
        }
    }

    pub fn from_layout_char(ch: char) -> Option<Self> {
        Self::ROSTER.into_iter().find(|color| color.layout_char() == ch)
    }

    pub fn layout_char(self) -> char {
        match self {
            Self::Red => 'R',
            Self::Blue => 'B',
            Self::Green => 'G',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Green => "green",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    Direct,
    Ambush,
    Opportunist,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Scatter,
    Pursuit,
    Vulnerable,
    Captured,
}

impl Mode {
    pub fn is_phased(self) -> bool {
        matches!(self, Self::Scatter | Self::Pursuit)
    }

    pub fn is_hazard(self) -> bool {
        self.is_phased()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Victory,
    Failure,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundState {
    /// Level loaded, waiting for the intro overlay to call `resume`.
    Intro,
    Running,
    /// Run finished, waiting for the presentation layer to `acknowledge`.
    Ended(Outcome),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PauseReason {
    LevelIntro,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioCue {
    EatCoin,
    PowerUp,
    AdversaryCaptured,
    Death,
    LevelUp,
    GameOver,
    Victory,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    LevelLoaded {
        level: usize,
    },
    PauseRequested {
        reason: PauseReason,
        #[serde(rename = "durationMs")]
        duration_ms: u64,
    },
    Resumed {
        level: usize,
    },
    PhaseChanged {
        phase: Mode,
    },
    PickupConsumed {
        x: i32,
        y: i32,
    },
    PowerConsumed {
        x: i32,
        y: i32,
    },
    AdversaryCaptured {
        #[serde(rename = "adversaryId")]
        adversary_id: String,
        bonus: u32,
    },
    PlayerCaught {
        by: String,
    },
    LevelCleared {
        level: usize,
    },
    RunEnded {
        outcome: Outcome,
        score: u32,
    },
}

impl RuntimeEvent {
    pub fn cue(&self) -> Option<AudioCue> {
        match self {
            Self::PickupConsumed { .. } => Some(AudioCue::EatCoin),
            Self::PowerConsumed { .. } => Some(AudioCue::PowerUp),
            Self::AdversaryCaptured { .. } => Some(AudioCue::AdversaryCaptured),
            Self::PlayerCaught { .. } => Some(AudioCue::Death),
            Self::LevelCleared { .. } => Some(AudioCue::LevelUp),
            Self::RunEnded {
                outcome: Outcome::Failure,
                ..
            } => Some(AudioCue::GameOver),
            Self::RunEnded {
                outcome: Outcome::Victory,
                ..
            } => Some(AudioCue::Victory),
            Self::LevelLoaded { .. }
            | Self::PauseRequested { .. }
            | Self::Resumed { .. }
            | Self::PhaseChanged { .. } => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GameConfig {
    #[serde(rename = "tickMs")]
    pub tick_ms: u64,
    #[serde(rename = "scatterDurationMs")]
    pub scatter_duration_ms: u64,
    #[serde(rename = "chaseDurationMs")]
    pub chase_duration_ms: u64,
    #[serde(rename = "vulnerableDurationMs")]
    pub vulnerable_duration_ms: u64,
    #[serde(rename = "levelIntroMs")]
    pub level_intro_ms: u64,
    #[serde(rename = "levelCount")]
    pub level_count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WorldInit {
    pub level: usize,
    pub name: String,
    pub width: i32,
    pub height: i32,
    #[serde(rename = "tileSize")]
    pub tile_size: i32,
    #[serde(rename = "pixelWidth")]
    pub pixel_width: i32,
    #[serde(rename = "pixelHeight")]
    pub pixel_height: i32,
    pub tiles: Vec<String>,
    pub config: GameConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PickupView {
    pub x: i32,
    pub y: i32,
    pub kind: PickupKind,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlayerView {
    pub x: i32,
    pub y: i32,
    pub dir: Direction,
    #[serde(rename = "lastDir")]
    pub last_dir: Direction,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AdversaryView {
    pub id: String,
    pub color: AdversaryColor,
    pub variant: Variant,
    pub x: i32,
    pub y: i32,
    pub dir: Direction,
    pub mode: Mode,
    pub home: Vec2,
    pub target: Vec2,
    #[serde(rename = "vulnerableMs")]
    pub vulnerable_ms: u64,
    pub flashing: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub level: usize,
    pub score: u32,
    pub state: RoundState,
    pub paused: bool,
    pub phase: Mode,
    #[serde(rename = "phaseElapsedMs")]
    pub phase_elapsed_ms: u64,
    pub pickups: Vec<PickupView>,
    pub player: PlayerView,
    pub adversaries: Vec<AdversaryView>,
    pub events: Vec<RuntimeEvent>,
}

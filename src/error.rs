use std::io;
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("asset unavailable: {path}: {source}")]
    AssetUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("level definitions: {0}")]
    Levels(#[from] LevelError),
}

#[derive(thiserror::Error, Debug)]
pub enum LevelError {
    #[error("malformed level file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no levels defined")]
    Empty,

    #[error("level {level} has an empty layout")]
    EmptyLayout { level: usize },

    #[error("level {level}: unknown character {ch:?} at ({x}, {y})")]
    UnknownCharacter {
        level: usize,
        ch: char,
        x: i32,
        y: i32,
    },

    #[error("level {level} has no player spawn")]
    MissingPlayerSpawn { level: usize },

    #[error("level {level} fields a {color} adversary but its layout has no '{marker}' tile")]
    MissingAdversarySpawn {
        level: usize,
        color: &'static str,
        marker: char,
    },
}

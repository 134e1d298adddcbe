use std::{collections::BTreeMap, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of the default track; reaching this tile wins the game
pub const WINNING_SCORE: u32 = 30;
/// Longest track a board may be configured with
pub const MAX_WINNING_SCORE: u32 = 1000;
/// Number of tiles per row on the snake-path board
pub const BOARD_COLUMNS: u32 = 5;

/// Effect applied when a player lands exactly on a special tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileEffect {
    Forward,
    Backward,
}

impl FromStr for TileEffect {
    type Err = BoardConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forward" => Ok(TileEffect::Forward),
            "backward" => Ok(TileEffect::Backward),
            other => Err(BoardConfigError::UnknownEffect(other.to_string())),
        }
    }
}

/// How a tile is drawn by board-rendering clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TileKind {
    Start,
    Finish,
    Forward,
    Backward,
    Normal,
}

/// Display cell on the board grid. Row 0 is the top row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoardCell {
    pub row: u32,
    pub col: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardTile {
    pub position: u32,
    #[serde(flatten)]
    pub cell: BoardCell,
    pub kind: TileKind,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardConfigError {
    #[error("Winning score must be at least 1")]
    InvalidWinningScore,

    #[error("Winning score {0} exceeds the maximum of {max}", max = MAX_WINNING_SCORE)]
    WinningScoreTooLarge(u32),

    #[error("Malformed special tile entry '{0}', expected <position>:<forward|backward>")]
    MalformedEntry(String),

    #[error("Unknown special tile effect '{0}'")]
    UnknownEffect(String),

    #[error("Special tile {position} must lie strictly between start and {winning_score}")]
    PositionOutOfRange { position: u32, winning_score: u32 },
}

/// Immutable board configuration: track length plus the special tile table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    winning_score: u32,
    special_tiles: BTreeMap<u32, TileEffect>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        let special_tiles = BTreeMap::from([
            (4, TileEffect::Forward),
            (11, TileEffect::Backward),
            (16, TileEffect::Forward),
            (22, TileEffect::Backward),
            (26, TileEffect::Backward),
        ]);

        Self {
            winning_score: WINNING_SCORE,
            special_tiles,
        }
    }
}

impl BoardConfig {
    /// Build a board, checking the track length and that every special tile
    /// sits between the start tile and the winning tile.
    pub fn new(
        winning_score: u32,
        special_tiles: BTreeMap<u32, TileEffect>,
    ) -> Result<Self, BoardConfigError> {
        if winning_score == 0 {
            return Err(BoardConfigError::InvalidWinningScore);
        }
        if winning_score > MAX_WINNING_SCORE {
            return Err(BoardConfigError::WinningScoreTooLarge(winning_score));
        }

        if let Some(&position) = special_tiles
            .keys()
            .find(|&&position| position == 0 || position >= winning_score)
        {
            return Err(BoardConfigError::PositionOutOfRange {
                position,
                winning_score,
            });
        }

        Ok(Self {
            winning_score,
            special_tiles,
        })
    }

    /// Parse a table such as `4:forward,11:backward`. Blank entries are ignored.
    pub fn parse_special_tiles(
        table: &str,
    ) -> Result<BTreeMap<u32, TileEffect>, BoardConfigError> {
        let mut tiles = BTreeMap::new();

        for entry in table.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (position, effect) = entry
                .split_once(':')
                .ok_or_else(|| BoardConfigError::MalformedEntry(entry.to_string()))?;
            let position = position
                .trim()
                .parse::<u32>()
                .map_err(|_| BoardConfigError::MalformedEntry(entry.to_string()))?;
            tiles.insert(position, effect.parse()?);
        }

        Ok(tiles)
    }

    pub fn winning_score(&self) -> u32 {
        self.winning_score
    }

    pub fn special_tiles(&self) -> &BTreeMap<u32, TileEffect> {
        &self.special_tiles
    }

    pub fn effect_at(&self, position: u32) -> Option<TileEffect> {
        self.special_tiles.get(&position).copied()
    }

    pub fn is_winning(&self, score: u32) -> bool {
        score >= self.winning_score
    }

    pub fn tile_kind(&self, position: u32) -> TileKind {
        if position == 0 {
            return TileKind::Start;
        }
        if position == self.winning_score {
            return TileKind::Finish;
        }
        match self.effect_at(position) {
            Some(TileEffect::Forward) => TileKind::Forward,
            Some(TileEffect::Backward) => TileKind::Backward,
            None => TileKind::Normal,
        }
    }

    pub fn rows(&self) -> u32 {
        (self.winning_score + 1).div_ceil(BOARD_COLUMNS)
    }

    /// Map a score onto the snake path. The start tile is bottom-left, even
    /// rows run left to right and odd rows run right to left. Scores past the
    /// finish are drawn on the finish tile.
    pub fn display_cell(&self, position: u32) -> BoardCell {
        let position = position.min(self.winning_score);
        let logical_row = position / BOARD_COLUMNS;
        let logical_col = position % BOARD_COLUMNS;

        let col = if logical_row % 2 == 1 {
            (BOARD_COLUMNS - 1) - logical_col
        } else {
            logical_col
        };

        BoardCell {
            row: (self.rows() - 1) - logical_row,
            col,
        }
    }

    pub fn tiles(&self) -> Vec<BoardTile> {
        (0..=self.winning_score)
            .map(|position| BoardTile {
                position,
                cell: self.display_cell(position),
                kind: self.tile_kind(position),
            })
            .collect()
    }
}

use thiserror::Error;

use crate::assets;
use crate::config::{GRID_CELLS, SPAWN_ORDER_LEN};
use crate::entities::TankKind;

/// Level data problems are fatal at startup: without a grid there is no game.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LevelError {
    #[error("No grid shipped for level {0}")]
    Missing(u32),
    #[error("Level {level}: expected {expected} rows of {expected} codes, found {found} at row {row}")]
    BadGrid {
        level: u32,
        expected: usize,
        found: usize,
        row: usize,
    },
    #[error("Level {level}: unknown terrain code '{code}' at row {row}, column {col}")]
    BadCode {
        level: u32,
        code: String,
        row: usize,
        col: usize,
    },
    #[error("No spawn order defined for level {0}")]
    MissingSpawnOrder(u32),
}

/// One cell of the 13x13 grid, decoded from the two-digit terrain codes.
/// Bricks and walls come in a full variant and four half-tile fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    /// 01..=05: right half, bottom half, left half, top half, full.
    Bricks(Fill),
    /// 06..=10: same fill order in steel.
    Wall(Fill),
    Water,
    Trees,
    Ice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    Right,
    Bottom,
    Left,
    Top,
    Full,
}

#[derive(Debug, Clone)]
pub struct LevelData {
    pub number: u32,
    pub cells: Vec<Vec<Cell>>,
    /// Enemy kinds in spawn order, consumed from the tail.
    pub spawn_order: Vec<TankKind>,
}

fn decode(code: &str) -> Option<Cell> {
    match code {
        "00" => Some(Cell::Empty),
        "01" => Some(Cell::Bricks(Fill::Right)),
        "02" => Some(Cell::Bricks(Fill::Bottom)),
        "03" => Some(Cell::Bricks(Fill::Left)),
        "04" => Some(Cell::Bricks(Fill::Top)),
        "05" => Some(Cell::Bricks(Fill::Full)),
        "06" => Some(Cell::Wall(Fill::Right)),
        "07" => Some(Cell::Wall(Fill::Bottom)),
        "08" => Some(Cell::Wall(Fill::Left)),
        "09" => Some(Cell::Wall(Fill::Top)),
        "10" => Some(Cell::Wall(Fill::Full)),
        "11" => Some(Cell::Water),
        "12" => Some(Cell::Trees),
        "13" => Some(Cell::Ice),
        _ => None,
    }
}

/// Per-level enemy spawn order. Each digit is a tank kind (0 basic, 2 fast,
/// 4 power, 6 armor); the rightmost digit spawns first. Which three of the
/// twenty become award variants is rolled per run, not stored here.
const SPAWN_ORDERS: [&str; 35] = [
    "22000000000000000000",
    "00000000000000222266",
    "66222200000000000000",
    "66600222224444444444",
    "22222000000006644444",
    "66000000000224444444",
    "00000004444442222000",
    "00000002222664444444",
    "66644444442222000000",
    "66444422000000000000",
    "22222444466666622222",
    "66666622222244444444",
    "66662222222244444444",
    "66666622224444444444",
    "66666666222222222200",
    "66220000000000000000",
    "00000000666666662266",
    "22222222444444006666",
    "44440000666666662222",
    "66666666440022222222",
    "66660000002244444444",
    "66664400000022222222",
    "22222222224444666666",
    "00000000002222664444",
    "66666666662222222244",
    "44440000666666222222",
    "00222222226666666644",
    "44000000000000000622",
    "66666622224444444444",
    "66664444222222220000",
    "44466666622222222444",
    "22224400000066666666",
    "22224444666666662222",
    "66666622222222224444",
    "66666666662222224444",
];

fn spawn_order(level: u32) -> Result<Vec<TankKind>, LevelError> {
    let digits = SPAWN_ORDERS
        .get((level as usize).wrapping_sub(1))
        .ok_or(LevelError::MissingSpawnOrder(level))?;
    let order = digits
        .bytes()
        .map(|d| match d {
            b'2' => TankKind::Fast,
            b'4' => TankKind::Power,
            b'6' => TankKind::Armor,
            _ => TankKind::Basic,
        })
        .collect::<Vec<_>>();
    debug_assert_eq!(order.len(), SPAWN_ORDER_LEN);
    Ok(order)
}

/// Parses the embedded grid file for a level and pairs it with the level's
/// spawn order.
pub fn load(level: u32) -> Result<LevelData, LevelError> {
    let text = assets::level_text(level).ok_or(LevelError::Missing(level))?;
    let mut cells = Vec::with_capacity(GRID_CELLS);
    for (row, line) in text.lines().filter(|l| !l.trim().is_empty()).enumerate() {
        let codes: Vec<&str> = line.split_whitespace().collect();
        if codes.len() != GRID_CELLS {
            return Err(LevelError::BadGrid {
                level,
                expected: GRID_CELLS,
                found: codes.len(),
                row,
            });
        }
        let mut parsed = Vec::with_capacity(GRID_CELLS);
        for (col, code) in codes.iter().enumerate() {
            let cell = decode(code).ok_or_else(|| LevelError::BadCode {
                level,
                code: (*code).to_string(),
                row,
                col,
            })?;
            parsed.push(cell);
        }
        cells.push(parsed);
    }
    if cells.len() != GRID_CELLS {
        return Err(LevelError::BadGrid {
            level,
            expected: GRID_CELLS,
            found: cells.len(),
            row: cells.len(),
        });
    }
    Ok(LevelData {
        number: level,
        cells,
        spawn_order: spawn_order(level)?,
    })
}

/// Highest level the binary can play: every embedded grid has a spawn order.
pub fn max_level() -> u32 {
    assets::level_count().min(SPAWN_ORDERS.len() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_embedded_level_parses() {
        for level in 1..=max_level() {
            let data = load(level).expect("embedded level must parse");
            assert_eq!(data.cells.len(), GRID_CELLS);
            assert_eq!(data.spawn_order.len(), SPAWN_ORDER_LEN);
        }
    }

    #[test]
    fn test_missing_level_is_an_error() {
        assert_eq!(load(900).unwrap_err(), LevelError::Missing(900));
    }

    #[test]
    fn test_spawn_order_digits_decode_to_kinds() {
        let order = spawn_order(1).unwrap();
        // "22000000000000000000": the two fast tanks sit at the head of the
        // string, so they come out of the tail last.
        assert_eq!(order[0], TankKind::Fast);
        assert_eq!(order[1], TankKind::Fast);
        assert!(order[2..].iter().all(|k| *k == TankKind::Basic));
    }

    #[test]
    fn test_all_spawn_orders_are_complete() {
        for (i, digits) in SPAWN_ORDERS.iter().enumerate() {
            assert_eq!(
                digits.len(),
                SPAWN_ORDER_LEN,
                "spawn order {} has wrong length",
                i + 1
            );
            assert!(
                digits.bytes().all(|d| matches!(d, b'0' | b'2' | b'4' | b'6')),
                "spawn order {} holds a bad digit",
                i + 1
            );
        }
    }

    #[test]
    fn test_bad_terrain_code_is_rejected() {
        assert!(decode("14").is_none());
        assert!(decode("5").is_none());
        assert_eq!(decode("13"), Some(Cell::Ice));
    }
}

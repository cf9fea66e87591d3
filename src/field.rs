use crate::config::{BRICK_SIZE, HALF_TILE, TANK_SIZE, TILE_SIZE, WALL_SIZE};
use crate::entities::{Dir, Eagle, Point, Rect, Tank, Tile, TileKind};
use crate::level::{Cell, Fill, LevelData};

/// Material the base is currently built from. A shovel power-up swaps the
/// brick ring for steel for a while.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseMaterial {
    Bricks,
    Steel,
}

/// The terrain of one level: every placed tile plus the eagle. Bricks and
/// walls obstruct and can be shot away; water obstructs but is indestructible
/// from the tanks' point of view; trees and ice are decoration.
#[derive(Debug)]
pub struct Field {
    pub bricks: Vec<Tile>,
    pub walls: Vec<Tile>,
    pub water: Vec<Tile>,
    pub trees: Vec<Tile>,
    pub ice: Vec<Tile>,
    pub eagle: Eagle,
}

/// Columns/rows of the 4x4 brick-chip matrix used by each fill variant.
fn brick_fill(fill: Fill) -> (&'static [i32], &'static [i32]) {
    match fill {
        Fill::Right => (&[2, 3], &[0, 1, 2, 3]),
        Fill::Bottom => (&[0, 1, 2, 3], &[2, 3]),
        Fill::Left => (&[0, 1], &[0, 1, 2, 3]),
        Fill::Top => (&[0, 1, 2, 3], &[0, 1]),
        Fill::Full => (&[0, 1, 2, 3], &[0, 1, 2, 3]),
    }
}

/// Offsets of the 2x2 steel pieces used by each wall fill variant.
fn wall_fill(fill: Fill) -> &'static [(i32, i32)] {
    match fill {
        Fill::Right => &[(WALL_SIZE, 0), (WALL_SIZE, WALL_SIZE)],
        Fill::Bottom => &[(0, WALL_SIZE), (WALL_SIZE, WALL_SIZE)],
        Fill::Left => &[(0, 0), (0, WALL_SIZE)],
        Fill::Top => &[(0, 0), (WALL_SIZE, 0)],
        Fill::Full => &[(0, 0), (WALL_SIZE, 0), (0, WALL_SIZE), (WALL_SIZE, WALL_SIZE)],
    }
}

// The defended corner: eagle position and the protective ring around it.
pub const EAGLE_POS: Point = Point::new(288, 576);
const BASE_STEEL: [(i32, i32); 8] = [
    (264, 552),
    (264, 576),
    (264, 600),
    (288, 552),
    (312, 552),
    (336, 552),
    (336, 576),
    (336, 600),
];
const BASE_BRICKS_EVEN: [(i32, i32); 16] = [
    (264, 552),
    (264, 576),
    (264, 600),
    (276, 564),
    (276, 588),
    (276, 612),
    (288, 552),
    (300, 564),
    (312, 552),
    (324, 564),
    (336, 552),
    (336, 576),
    (336, 600),
    (348, 564),
    (348, 588),
    (348, 612),
];
const BASE_BRICKS_ODD: [(i32, i32); 16] = [
    (264, 564),
    (264, 588),
    (264, 612),
    (276, 552),
    (276, 576),
    (276, 600),
    (288, 564),
    (300, 552),
    (312, 564),
    (324, 552),
    (336, 564),
    (336, 588),
    (336, 612),
    (348, 552),
    (348, 576),
    (348, 600),
];

impl Field {
    /// Builds the terrain for a parsed level: grid tiles, the brick base ring
    /// and the eagle.
    pub fn from_level(data: &LevelData) -> Self {
        let mut field = Field {
            bricks: Vec::new(),
            walls: Vec::new(),
            water: Vec::new(),
            trees: Vec::new(),
            ice: Vec::new(),
            eagle: Eagle {
                pos: EAGLE_POS,
                destroyed: false,
            },
        };

        for (row, line) in data.cells.iter().enumerate() {
            for (col, cell) in line.iter().enumerate() {
                let base = Point::new(TILE_SIZE * col as i32, TILE_SIZE * row as i32);
                match cell {
                    Cell::Empty => {}
                    Cell::Bricks(fill) => {
                        let (cols, rows) = brick_fill(*fill);
                        for &cx in cols {
                            for &cy in rows {
                                let mut tile = Tile::new(
                                    TileKind::Brick,
                                    base.offset(BRICK_SIZE * cx, BRICK_SIZE * cy),
                                );
                                tile.variant = ((cx + cy) % 2) as u8;
                                field.bricks.push(tile);
                            }
                        }
                    }
                    Cell::Wall(fill) => {
                        for &(dx, dy) in wall_fill(*fill) {
                            field
                                .walls
                                .push(Tile::new(TileKind::Wall, base.offset(dx, dy)));
                        }
                    }
                    Cell::Water => field.water.push(Tile::new(TileKind::Water, base)),
                    Cell::Trees => field.trees.push(Tile::new(TileKind::Trees, base)),
                    Cell::Ice => field.ice.push(Tile::new(TileKind::Ice, base)),
                }
            }
        }

        field.build_base(BaseMaterial::Bricks);
        field
    }

    /// Rebuilds the protective ring around the eagle in the given material,
    /// removing whatever the previous base was made of first. Base tiles sit
    /// in the regular brick/wall collections so bullets and movement treat
    /// them like any other terrain.
    pub fn build_base(&mut self, material: BaseMaterial) {
        self.bricks.retain(|t| !t.in_base);
        self.walls.retain(|t| !t.in_base);
        match material {
            BaseMaterial::Steel => {
                for &(x, y) in &BASE_STEEL {
                    let mut tile = Tile::new(TileKind::Wall, Point::new(x, y));
                    tile.in_base = true;
                    self.walls.push(tile);
                }
            }
            BaseMaterial::Bricks => {
                for (variant, positions) in [(0u8, &BASE_BRICKS_EVEN), (1u8, &BASE_BRICKS_ODD)] {
                    for &(x, y) in positions.iter() {
                        let mut tile = Tile::new(TileKind::Brick, Point::new(x, y));
                        tile.variant = variant;
                        tile.in_base = true;
                        self.bricks.push(tile);
                    }
                }
            }
        }
    }

    pub fn hits_bricks(&self, rect: &Rect) -> bool {
        self.bricks.iter().any(|t| t.rect().intersects(rect))
    }

    pub fn hits_walls(&self, rect: &Rect) -> bool {
        self.walls.iter().any(|t| t.rect().intersects(rect))
    }

    pub fn hits_water(&self, rect: &Rect) -> bool {
        self.water.iter().any(|t| t.rect().intersects(rect))
    }

    /// Anything a tank cannot drive through. Trees and ice are passable.
    pub fn obstructed(&self, rect: &Rect) -> bool {
        self.hits_bricks(rect)
            || self.hits_walls(rect)
            || self.hits_water(rect)
            || self.eagle.rect().intersects(rect)
    }

    /// Removes every brick chip the swathe touches.
    pub fn destroy_bricks(&mut self, swathe: &Rect) {
        self.bricks.retain(|t| !t.rect().intersects(swathe));
    }

    /// Removes every steel piece the swathe touches.
    pub fn destroy_walls(&mut self, swathe: &Rect) {
        self.walls.retain(|t| !t.rect().intersects(swathe));
    }

    /// Applies the movement contract to a tank that wants to advance this
    /// step: probe one tile ahead on the lane grid, and when something is in
    /// the way either clamp the velocity to the remaining gap or, with no gap
    /// left, refuse the move outright.
    pub fn clamp_move(&self, tank: &mut Tank) {
        let (probe, gap) = probe_ahead(tank.pos, tank.dir);
        if self.obstructed(&probe) && gap <= tank.speed() {
            tank.velocity = tank.dir.velocity(gap);
            if gap == 0 {
                tank.ready_to_move = false;
            }
        }
    }
}

/// The probe rectangle for a mover at `pos` heading `dir`: a tile-sized rect
/// snapped to the lane grid just ahead of the mover, paired with the pixel
/// gap the mover may still cover before reaching it. Sub-tile gaps matter
/// here: sprites are two lanes wide and the maps leave openings only a few
/// pixels deeper than a lane.
pub fn probe_ahead(pos: Point, dir: Dir) -> (Rect, i32) {
    match dir {
        Dir::Up => {
            let lane = pos.y.div_euclid(HALF_TILE) * HALF_TILE;
            (
                Rect::new(pos.x, lane - HALF_TILE, TANK_SIZE, TANK_SIZE),
                pos.y - lane,
            )
        }
        Dir::Left => {
            let lane = pos.x.div_euclid(HALF_TILE) * HALF_TILE;
            (
                Rect::new(lane - HALF_TILE, pos.y, TANK_SIZE, TANK_SIZE),
                pos.x - lane,
            )
        }
        Dir::Down => {
            let rem = pos.y.rem_euclid(HALF_TILE);
            let (top, gap) = if rem == 0 {
                (pos.y + HALF_TILE, 0)
            } else {
                (pos.y + TANK_SIZE - rem, HALF_TILE - rem)
            };
            (Rect::new(pos.x, top, TANK_SIZE, TANK_SIZE), gap)
        }
        Dir::Right => {
            let rem = pos.x.rem_euclid(HALF_TILE);
            let (left, gap) = if rem == 0 {
                (pos.x + HALF_TILE, 0)
            } else {
                (pos.x + TANK_SIZE - rem, HALF_TILE - rem)
            };
            (Rect::new(left, pos.y, TANK_SIZE, TANK_SIZE), gap)
        }
    }
}

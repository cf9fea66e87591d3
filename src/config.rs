//! Configuration constants for the tank battlefield game.

// Field geometry. The playfield is a 13x13 grid of 48px tiles; tanks and
// bullets move on the 24px half-tile lane grid. All simulation coordinates
// are field-local pixels; the grey HUD border exists only in the renderer.
pub const TILE_SIZE: i32 = 48;
pub const HALF_TILE: i32 = 24;
pub const GRID_CELLS: usize = 13;
pub const FIELD_SIZE: i32 = TILE_SIZE * GRID_CELLS as i32; // 624
pub const TANK_SIZE: i32 = 48;
pub const TANK_MAX_POS: i32 = FIELD_SIZE - TANK_SIZE; // 576
pub const BRICK_SIZE: i32 = 12; // a tile holds a 4x4 matrix of brick chips
pub const WALL_SIZE: i32 = 24; // a tile holds a 2x2 matrix of steel pieces

// Bullets leave the map slightly past the right/bottom edge because their
// sprites are narrower than a tile.
pub const BULLET_MAX_X: i32 = 609;
pub const BULLET_MAX_Y: i32 = 624;

// Rendering configuration
pub const WINDOW_WIDTH: i32 = 768;
pub const WINDOW_HEIGHT: i32 = 672;
pub const FIELD_OFFSET_X: i32 = 48; // grey border left of the playfield
pub const FIELD_OFFSET_Y: i32 = 24; // grey border above the playfield

// Simulation pacing: fixed 30 steps per second, clock counted in ms.
pub const STEPS_PER_SECOND: u32 = 30;
pub const STEP_MS: u64 = 1000 / STEPS_PER_SECOND as u64; // 33

// Player tank
pub const PLAYER_SPEED: i32 = 5;
pub const PLAYER_SPAWN_X: i32 = 192;
pub const PLAYER_SPAWN_Y: i32 = 576;
pub const MAX_TIER: u8 = 3;
pub const BULLET_SPEED_SLOW: i32 = 12;
pub const BULLET_SPEED_FAST: i32 = 24;
pub const STARTING_LIVES: i32 = 2;

// Enemy pacing
pub const MAX_ENEMIES_ON_MAP: u32 = 4;
pub const SPAWN_GAP_MS: u64 = 4000;
pub const ELIMINATION_GAP_MS: u64 = 1000;
pub const ENEMY_FIRE_GAP_MS: u64 = 1200;
pub const SPAWN_ORDER_LEN: usize = 20;
// The first five spawns of a level ignore the elimination gap.
pub const EARLY_SPAWN_THRESHOLD: usize = 15;
pub const AWARD_ENEMIES_PER_LEVEL: usize = 3;

// Level end pacing
pub const SUCCESS_DELAY_MS: u64 = 2000;
pub const GAME_OVER_DELAY_MS: u64 = 4000;
pub const PLAYER_RESPAWN_MS: u64 = 2000;

// Power-up windows
pub const POWERUP_TIMEOUT_MS: u64 = 20000;
pub const SPAWN_MATCHLESS_MS: u64 = 4000;
pub const HELMET_MATCHLESS_MS: u64 = 15000;
pub const SHOVEL_MS: u64 = 20000;
pub const FREEZE_MS: u64 = 15000;
pub const POWERUP_SCORE: u32 = 500;

// Animation cadence (ms between frame toggles)
pub const TREAD_ANIM_MS: u64 = 30;
pub const WATER_ANIM_MS: u64 = 600;
pub const POWERUP_ANIM_MS: u64 = 360;
pub const EXPLOSION_FRAME_MS: u64 = 120;
pub const MENU_POINTER_ANIM_MS: u64 = 60;

// Game over banner rises 8px per step from the bottom of the screen.
pub const BANNER_RISE_STEP: i32 = 8;
pub const BANNER_START_Y: i32 = 672;
pub const BANNER_REST_Y: i32 = 312;

// Menu / level select pacing
pub const MENU_RISE_STEP: i32 = 8;
pub const CURTAIN_STEP: i32 = 96;
pub const CURTAIN_CLOSED: i32 = 336;
pub const CURTAIN_OPEN: i32 = 24;
pub const SCREEN_PAINT_MS: u64 = 30;
pub const AUTO_START_MS: u64 = 2000;

// Scoring board
pub const BOARD_REVEAL_MS: u64 = 200;
pub const BOARD_SUCCESS_EXTRA_STEPS: u64 = 18;
pub const BOARD_GAME_OVER_EXTRA_STEPS: u64 = 30;
pub const HIGH_SCORE: u32 = 20000;

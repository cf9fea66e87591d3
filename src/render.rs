use log::warn;
use macroquad::prelude::*;

use crate::assets::get_asset_bytes;
use crate::board::{Board, TankClass};
use crate::config::{
    BRICK_SIZE, FIELD_OFFSET_X, FIELD_OFFSET_Y, FIELD_SIZE, TANK_SIZE, TILE_SIZE, WALL_SIZE,
    WINDOW_HEIGHT, WINDOW_WIDTH,
};
use crate::entities::{
    Bullet, Dir, Explosion, ExplosionKind, PlayerSlot, Point, PowerUp, PowerUpKind, Tank,
    TankKind, Tile, TileKind, ARMOR_LIFE,
};
use crate::game::{Game, LevelState};
use crate::level_select::LevelSelect;
use crate::menu::Menu;

const BACKGROUND_GREY: Color = Color::new(0.5, 0.5, 0.5, 1.0);
const BRICK_RED: Color = Color::new(0.63, 0.26, 0.13, 1.0);
const BRICK_RED_DARK: Color = Color::new(0.5, 0.2, 0.1, 1.0);
const STEEL_GREY: Color = Color::new(0.75, 0.75, 0.75, 1.0);
const WATER_BLUE: Color = Color::new(0.2, 0.35, 0.9, 1.0);
const WATER_BLUE_DIM: Color = Color::new(0.15, 0.28, 0.75, 1.0);
const TREE_GREEN: Color = Color::new(0.1, 0.55, 0.15, 0.85);
const ICE_WHITE: Color = Color::new(0.85, 0.9, 0.95, 1.0);
const PLAYER_YELLOW: Color = Color::new(0.9, 0.8, 0.2, 1.0);
const ENEMY_SILVER: Color = Color::new(0.7, 0.7, 0.75, 1.0);
const ENEMY_RED: Color = Color::new(0.85, 0.3, 0.25, 1.0);
const ENEMY_GREEN: Color = Color::new(0.4, 0.75, 0.35, 1.0);

// Conversion helpers from field coordinates to screen pixels.
fn sx(x: i32) -> f32 {
    (x + FIELD_OFFSET_X) as f32
}

fn sy(y: i32) -> f32 {
    (y + FIELD_OFFSET_Y) as f32
}

fn load_texture_asset(name: &str) -> Option<Texture2D> {
    let bytes = get_asset_bytes(name)?;
    let texture = Texture2D::from_file_with_format(&bytes, None);
    texture.set_filter(FilterMode::Nearest);
    Some(texture)
}

/// Source rectangle on the enemy rows of the tank sheet.
fn enemy_sheet_row(tank: &Tank) -> u8 {
    match tank.kind {
        TankKind::Armor => armor_sheet_row(tank),
        kind => {
            let base = match kind {
                TankKind::Basic => 0,
                TankKind::Fast => 2,
                TankKind::Power => 4,
                _ => 0,
            };
            8 + base + u8::from(tank.award)
        }
    }
}

/// Armor plating flickers through dedicated sheet rows while it can still
/// absorb hits; at the last hit point it settles on the plain row.
fn armor_sheet_row(tank: &Tank) -> u8 {
    match (tank.life, tank.flash) {
        (ARMOR_LIFE, true) => {
            if tank.award {
                15
            } else {
                16
            }
        }
        (3, true) => 17,
        (2, true) => 17,
        (2, false) => 16,
        _ => 14,
    }
}

/// Handles all drawing. Sprite sheets are optional: when one is missing the
/// renderer falls back to flat shapes so the game stays playable without the
/// binary art assets.
pub struct Renderer {
    tank_sheet: Option<Texture2D>,
    environment_sheet: Option<Texture2D>,
    bullet_sheet: Option<Texture2D>,
    explosion_sheet: Option<Texture2D>,
    powerup_sheet: Option<Texture2D>,
    menu_image: Option<Texture2D>,
    board_image: Option<Texture2D>,
    game_over_image: Option<Texture2D>,
}

impl Renderer {
    pub fn new() -> Self {
        let renderer = Renderer {
            tank_sheet: load_texture_asset("images/tanks.png"),
            environment_sheet: load_texture_asset("images/environment.png"),
            bullet_sheet: load_texture_asset("images/bullet.png"),
            explosion_sheet: load_texture_asset("images/explosions.png"),
            powerup_sheet: load_texture_asset("images/power_ups.png"),
            menu_image: load_texture_asset("images/menu.png"),
            board_image: load_texture_asset("images/board.png"),
            game_over_image: load_texture_asset("images/game_over.png"),
        };
        if renderer.tank_sheet.is_none() {
            warn!("Sprite sheets missing, drawing with flat shapes");
        }
        renderer
    }

    fn sheet(tex: &Option<Texture2D>, src: Rect, x: f32, y: f32) -> bool {
        if let Some(tex) = tex {
            draw_texture_ex(
                tex,
                x,
                y,
                WHITE,
                DrawTextureParams {
                    source: Some(src),
                    ..Default::default()
                },
            );
            true
        } else {
            false
        }
    }

    fn draw_tile(&self, tile: &Tile) {
        let x = sx(tile.pos.x);
        let y = sy(tile.pos.y);
        match tile.kind {
            TileKind::Brick => {
                let src_x = if tile.variant == 0 { 0.0 } else { 12.0 };
                if !Self::sheet(
                    &self.environment_sheet,
                    Rect::new(src_x, 48.0, BRICK_SIZE as f32, BRICK_SIZE as f32),
                    x,
                    y,
                ) {
                    let color = if tile.variant == 0 { BRICK_RED } else { BRICK_RED_DARK };
                    draw_rectangle(x, y, BRICK_SIZE as f32, BRICK_SIZE as f32, color);
                }
            }
            TileKind::Wall => {
                if !Self::sheet(
                    &self.environment_sheet,
                    Rect::new(48.0, 48.0, WALL_SIZE as f32, WALL_SIZE as f32),
                    x,
                    y,
                ) {
                    draw_rectangle(x, y, WALL_SIZE as f32, WALL_SIZE as f32, STEEL_GREY);
                    draw_rectangle_lines(x, y, WALL_SIZE as f32, WALL_SIZE as f32, 2.0, GRAY);
                }
            }
            TileKind::Water => {
                let src_x = tile.variant as f32 * TILE_SIZE as f32;
                if !Self::sheet(
                    &self.environment_sheet,
                    Rect::new(src_x, 0.0, TILE_SIZE as f32, TILE_SIZE as f32),
                    x,
                    y,
                ) {
                    let color = if tile.variant == 0 { WATER_BLUE } else { WATER_BLUE_DIM };
                    draw_rectangle(x, y, TILE_SIZE as f32, TILE_SIZE as f32, color);
                }
            }
            TileKind::Trees => {
                if !Self::sheet(
                    &self.environment_sheet,
                    Rect::new(144.0, 0.0, TILE_SIZE as f32, TILE_SIZE as f32),
                    x,
                    y,
                ) {
                    draw_rectangle(x, y, TILE_SIZE as f32, TILE_SIZE as f32, TREE_GREEN);
                }
            }
            TileKind::Ice => {
                if !Self::sheet(
                    &self.environment_sheet,
                    Rect::new(192.0, 0.0, TILE_SIZE as f32, TILE_SIZE as f32),
                    x,
                    y,
                ) {
                    draw_rectangle(x, y, TILE_SIZE as f32, TILE_SIZE as f32, ICE_WHITE);
                }
            }
        }
    }

    fn tank_body_color(kind: TankKind) -> Color {
        match kind {
            TankKind::Player => PLAYER_YELLOW,
            TankKind::Basic => ENEMY_SILVER,
            TankKind::Fast => ENEMY_GREEN,
            TankKind::Power => ENEMY_RED,
            TankKind::Armor => Color::new(0.45, 0.8, 0.8, 1.0),
        }
    }

    fn draw_tank(&self, tank: &Tank) {
        let x = sx(tank.pos.x);
        let y = sy(tank.pos.y);
        let row = match tank.kind {
            TankKind::Player => tank.tier,
            _ => enemy_sheet_row(tank),
        };
        let col = tank.dir.frame_stride() + u8::from(tank.anim.frame);
        let src = Rect::new(
            col as f32 * TANK_SIZE as f32,
            row as f32 * TANK_SIZE as f32,
            TANK_SIZE as f32,
            TANK_SIZE as f32,
        );
        if Self::sheet(&self.tank_sheet, src, x, y) {
            return;
        }

        // Flat fallback: hull plus a barrel stub showing the facing.
        let mut body = Self::tank_body_color(tank.kind);
        if tank.kind == TankKind::Armor && tank.flash {
            body = Color::new(body.r, body.g, body.b, 0.6);
        }
        draw_rectangle(x + 4.0, y + 4.0, 40.0, 40.0, body);
        let (bx, by, bw, bh) = match tank.dir {
            Dir::Up => (x + 21.0, y - 4.0, 6.0, 16.0),
            Dir::Down => (x + 21.0, y + 36.0, 6.0, 16.0),
            Dir::Left => (x - 4.0, y + 21.0, 16.0, 6.0),
            Dir::Right => (x + 36.0, y + 21.0, 16.0, 6.0),
        };
        draw_rectangle(bx, by, bw, bh, DARKGRAY);
        if tank.kind == TankKind::Player && tank.tier > 0 {
            draw_rectangle_lines(x + 4.0, y + 4.0, 40.0, 40.0, 2.0, WHITE);
        }
    }

    fn draw_bullet(&self, bullet: &Bullet) {
        let x = sx(bullet.pos.x);
        let y = sy(bullet.pos.y);
        let src = match bullet.dir {
            Dir::Up => Rect::new(0.0, 3.0, 9.0, 12.0),
            Dir::Left => Rect::new(15.0, 6.0, 12.0, 9.0),
            Dir::Down => Rect::new(30.0, 3.0, 9.0, 12.0),
            Dir::Right => Rect::new(45.0, 6.0, 12.0, 9.0),
        };
        if !Self::sheet(&self.bullet_sheet, src, x, y) {
            draw_rectangle(x, y, src.w, src.h, LIGHTGRAY);
        }
    }

    fn draw_explosion(&self, explosion: &Explosion) {
        let x = sx(explosion.pos.x);
        let y = sy(explosion.pos.y);
        let src = Rect::new(explosion.frame as f32 * 96.0, 0.0, 96.0, 96.0);
        if !Self::sheet(&self.explosion_sheet, src, x, y) {
            let scale = match explosion.kind {
                ExplosionKind::Small => 10.0,
                ExplosionKind::Large => 18.0,
            };
            let radius = scale * (explosion.frame + 1) as f32;
            draw_circle(x + 48.0, y + 48.0, radius, ORANGE);
            draw_circle(x + 48.0, y + 48.0, radius * 0.6, YELLOW);
        }
    }

    fn draw_powerup(&self, powerup: &PowerUp) {
        let x = sx(powerup.pos.x);
        let y = sy(powerup.pos.y);
        let frame = match powerup.kind {
            PowerUpKind::Grenade => 0,
            PowerUpKind::Helmet => 2,
            PowerUpKind::Shovel => 4,
            PowerUpKind::Star => 6,
            PowerUpKind::Tank => 8,
            PowerUpKind::Timer => 10,
        } + u8::from(powerup.anim.frame);
        let src = Rect::new(
            (frame % 2) as f32 * TILE_SIZE as f32,
            (frame / 2) as f32 * TILE_SIZE as f32,
            TILE_SIZE as f32,
            TILE_SIZE as f32,
        );
        if !Self::sheet(&self.powerup_sheet, src, x, y) {
            // Flickering badge with the power-up's initial.
            if powerup.anim.frame {
                draw_rectangle(x + 2.0, y + 2.0, 44.0, 44.0, Color::new(0.9, 0.2, 0.2, 1.0));
            } else {
                draw_rectangle(x + 2.0, y + 2.0, 44.0, 44.0, Color::new(0.7, 0.15, 0.15, 1.0));
            }
            let letter = match powerup.kind {
                PowerUpKind::Grenade => "G",
                PowerUpKind::Helmet => "H",
                PowerUpKind::Shovel => "S",
                PowerUpKind::Star => "*",
                PowerUpKind::Tank => "T",
                PowerUpKind::Timer => "C",
            };
            draw_text(letter, x + 16.0, y + 34.0, 32.0, WHITE);
        }
    }

    fn draw_eagle(&self, game: &Game) {
        let eagle = &game.field.eagle;
        let x = sx(eagle.pos.x);
        let y = sy(eagle.pos.y);
        let src = if eagle.destroyed {
            Rect::new(96.0, 48.0, TILE_SIZE as f32, TILE_SIZE as f32)
        } else {
            Rect::new(144.0, 48.0, TILE_SIZE as f32, TILE_SIZE as f32)
        };
        if !Self::sheet(&self.environment_sheet, src, x, y) {
            let color = if eagle.destroyed { DARKGRAY } else { PURPLE };
            draw_rectangle(x + 4.0, y + 4.0, 40.0, 40.0, color);
            draw_triangle(
                Vec2::new(x + 24.0, y + 8.0),
                Vec2::new(x + 8.0, y + 40.0),
                Vec2::new(x + 40.0, y + 40.0),
                if eagle.destroyed { GRAY } else { GOLD },
            );
        }
    }

    fn draw_halo(&self, pos: Point, frame: bool) {
        let x = sx(pos.x);
        let y = sy(pos.y);
        // Halo frames sit at indices 20/21 of the five-column environment
        // sheet.
        let index = 20 + u8::from(frame);
        let src = Rect::new(
            (index % 5) as f32 * TILE_SIZE as f32,
            (index / 5) as f32 * TILE_SIZE as f32,
            TILE_SIZE as f32,
            TILE_SIZE as f32,
        );
        if !Self::sheet(&self.environment_sheet, src, x, y) {
            let alpha = if frame { 0.8 } else { 0.4 };
            draw_rectangle_lines(x, y, 48.0, 48.0, 3.0, Color::new(1.0, 1.0, 1.0, alpha));
        }
    }

    /// Right-aligned HUD/board number in the arcade glyph size.
    fn draw_number(&self, value: u32, right_x: f32, y: f32, color: Color) {
        let text = value.to_string();
        let width = text.len() as f32 * 14.0;
        draw_text(&text, right_x - width, y + 20.0, 28.0, color);
    }

    fn draw_hud(&self, game: &Game) {
        // One marker per enemy still queued, two per row down the right edge.
        for i in 0..game.spawn_order.len() {
            let x = if i % 2 == 0 { 696.0 } else { 720.0 };
            let y = (48 + (i / 2) as i32 * 24) as f32;
            if !Self::sheet(
                &self.environment_sheet,
                Rect::new(192.0, 144.0, 24.0, 24.0),
                x,
                y,
            ) {
                draw_rectangle(x + 4.0, y + 4.0, 16.0, 16.0, ENEMY_SILVER);
            }
        }

        // Player lives.
        if !Self::sheet(
            &self.environment_sheet,
            Rect::new(216.0, 144.0, 24.0, 24.0),
            696.0,
            384.0,
        ) {
            draw_rectangle(700.0, 388.0, 16.0, 16.0, PLAYER_YELLOW);
        }
        draw_text("IP", 696.0, 380.0, 24.0, BLACK);
        self.draw_number(game.lives.max(0) as u32, 744.0, 384.0, BLACK);

        // Stage flag and number.
        if !Self::sheet(
            &self.environment_sheet,
            Rect::new(192.0, 48.0, 48.0, 48.0),
            696.0,
            528.0,
        ) {
            draw_rectangle(700.0, 532.0, 12.0, 40.0, DARKGRAY);
            draw_rectangle(712.0, 532.0, 24.0, 16.0, RED);
        }
        self.draw_number(game.level, 744.0, 576.0, BLACK);
    }

    pub fn draw_game(&self, game: &Game, now: u64) {
        clear_background(BACKGROUND_GREY);
        draw_rectangle(
            FIELD_OFFSET_X as f32,
            FIELD_OFFSET_Y as f32,
            FIELD_SIZE as f32,
            FIELD_SIZE as f32,
            BLACK,
        );

        for tile in &game.field.bricks {
            self.draw_tile(tile);
        }
        for tile in &game.field.walls {
            self.draw_tile(tile);
        }
        for tile in &game.field.water {
            self.draw_tile(tile);
        }
        for tile in &game.field.ice {
            self.draw_tile(tile);
        }
        self.draw_eagle(game);

        if let PlayerSlot::Alive(tank) = &game.player {
            self.draw_tank(tank);
            if tank.is_matchless(now) {
                self.draw_halo(tank.pos, game.halo_anim.frame);
            }
        }
        for enemy in &game.enemies {
            self.draw_tank(enemy);
        }
        for bullet in &game.bullets {
            self.draw_bullet(bullet);
        }
        for explosion in &game.explosions {
            self.draw_explosion(explosion);
        }

        // Trees canopy over everything that drives beneath it.
        for tile in &game.field.trees {
            self.draw_tile(tile);
        }
        for powerup in &game.powerups {
            self.draw_powerup(powerup);
        }

        self.draw_hud(game);

        if game.state == LevelState::GameOver {
            draw_text(
                "GAME OVER",
                (WINDOW_WIDTH / 2 - 96) as f32,
                game.banner_y as f32,
                48.0,
                RED,
            );
        }
    }

    pub fn draw_menu(&self, menu: &Menu) {
        clear_background(BLACK);
        let y = menu.background_y as f32;
        if let Some(tex) = &self.menu_image {
            draw_texture(tex, 0.0, y, WHITE);
        } else {
            draw_text("STEEL", 264.0, y + 180.0, 96.0, Color::new(0.85, 0.4, 0.2, 1.0));
            draw_text("CITY", 288.0, y + 270.0, 96.0, Color::new(0.85, 0.4, 0.2, 1.0));
            draw_text("1 PLAYER", 264.0, y + 400.0, 32.0, WHITE);
            draw_text("2 PLAYERS", 264.0, y + 448.0, 32.0, WHITE);
            draw_text("CONSTRUCTION", 264.0, y + 496.0, 32.0, WHITE);
        }
        if menu.ready() {
            let pointer_y = (369 + menu.choice as i32 * 48) as f32;
            let src = Rect::new(
                (6 + u8::from(menu.pointer_anim.frame)) as f32 * TANK_SIZE as f32,
                0.0,
                TANK_SIZE as f32,
                TANK_SIZE as f32,
            );
            if !Self::sheet(&self.tank_sheet, src, 192.0, pointer_y) {
                draw_rectangle(200.0, pointer_y + 12.0, 24.0, 24.0, PLAYER_YELLOW);
            }
        }
    }

    pub fn draw_level_select(&self, select: &LevelSelect) {
        if select.opening() {
            // Curtains pull back onto the battlefield underneath.
            clear_background(BACKGROUND_GREY);
            draw_rectangle(
                FIELD_OFFSET_X as f32,
                FIELD_OFFSET_Y as f32,
                FIELD_SIZE as f32,
                FIELD_SIZE as f32,
                BLACK,
            );
        } else {
            clear_background(BLACK);
        }
        if select.showing_stage() && !select.opening() {
            draw_rectangle(
                0.0,
                0.0,
                WINDOW_WIDTH as f32,
                WINDOW_HEIGHT as f32,
                BACKGROUND_GREY,
            );
            draw_text("STAGE", 288.0, 348.0, 32.0, BLACK);
            self.draw_number(select.level, 480.0, 324.0, BLACK);
            return;
        }
        let curtain = select.curtain as f32;
        draw_rectangle(0.0, 0.0, WINDOW_WIDTH as f32, curtain, BACKGROUND_GREY);
        draw_rectangle(
            0.0,
            WINDOW_HEIGHT as f32 - curtain,
            WINDOW_WIDTH as f32,
            curtain,
            BACKGROUND_GREY,
        );
    }

    pub fn draw_board(&self, board: &Board) {
        clear_background(BLACK);
        if board.showing_game_over_card {
            if let Some(tex) = &self.game_over_image {
                draw_texture(tex, 0.0, 0.0, WHITE);
            } else {
                draw_text("GAME", 264.0, 300.0, 96.0, RED);
                draw_text("OVER", 264.0, 396.0, 96.0, RED);
            }
            return;
        }

        if let Some(tex) = &self.board_image {
            draw_texture(tex, 0.0, 0.0, WHITE);
        } else {
            draw_text("HI-SCORE", 288.0, 68.0, 32.0, RED);
            draw_text("STAGE", 336.0, 116.0, 32.0, WHITE);
            draw_text("I-PLAYER", 96.0, 212.0, 32.0, RED);
        }
        self.draw_number(crate::config::HIGH_SCORE, 576.0, 48.0, GOLD);
        self.draw_number(board.level, 480.0, 96.0, WHITE);
        self.draw_number(board.run_score, 264.0, 192.0, GOLD);

        for (class, label) in [
            (TankClass::Basic, "BASIC"),
            (TankClass::Fast, "FAST"),
            (TankClass::Power, "POWER"),
            (TankClass::Armor, "ARMOR"),
        ] {
            let row = class.row();
            let y = (264 + row as i32 * 72) as f32;
            let count = board.counters[row];
            draw_text(label, 408.0, y + 20.0, 24.0, WHITE);
            self.draw_number(count * class.points(), 168.0, y, WHITE);
            self.draw_number(count, 336.0, y, WHITE);
            draw_text("PTS", 192.0, y + 20.0, 24.0, WHITE);
        }

        if board.total_shown {
            draw_text("TOTAL", 168.0, 548.0, 24.0, WHITE);
            self.draw_number(board.total_kills(), 336.0, 528.0, WHITE);
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

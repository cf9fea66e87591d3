use log::info;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::ai;
use crate::config::{
    BANNER_REST_Y, BANNER_RISE_STEP, BANNER_START_Y, BULLET_MAX_X, BULLET_MAX_Y,
    EARLY_SPAWN_THRESHOLD, ELIMINATION_GAP_MS, EXPLOSION_FRAME_MS, FREEZE_MS, GAME_OVER_DELAY_MS,
    HELMET_MATCHLESS_MS, MAX_ENEMIES_ON_MAP, MAX_TIER, PLAYER_RESPAWN_MS, PLAYER_SPAWN_X,
    PLAYER_SPAWN_Y, POWERUP_ANIM_MS, POWERUP_SCORE, POWERUP_TIMEOUT_MS, SHOVEL_MS,
    SPAWN_GAP_MS, SPAWN_MATCHLESS_MS, SUCCESS_DELAY_MS, TANK_MAX_POS, TANK_SIZE,
    TREAD_ANIM_MS, WATER_ANIM_MS, AWARD_ENEMIES_PER_LEVEL,
};
use crate::context::RunContext;
use crate::entities::{
    fire_position, snap_to_lane, AnimPhase, Bullet, BulletOwner, Dir, Explosion, PlayerSlot,
    Point, PowerUp, PowerUpKind, Rect, Tank, TankKind, ARMOR_LIFE,
};
use crate::field::{BaseMaterial, Field};
use crate::input::GameKey;
use crate::level::{self, LevelError};
use crate::{debug_bullet, debug_game, debug_powerup};

/// Coarse per-level state. `Running` is the steady loop; the terminal states
/// keep simulating scenery until their display delay runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelState {
    Initializing,
    Running,
    Respawning,
    GameOver,
    Success,
}

/// Kill counters the scoring board replays after the level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KillTally {
    pub basic: u32,
    pub fast: u32,
    pub power: u32,
    pub armor: u32,
}

impl KillTally {
    pub fn total(&self) -> u32 {
        self.basic + self.fast + self.power + self.armor
    }

    fn record(&mut self, kind: TankKind) {
        match kind {
            TankKind::Basic => self.basic += 1,
            TankKind::Fast => self.fast += 1,
            TankKind::Power => self.power += 1,
            TankKind::Armor => self.armor += 1,
            TankKind::Player => {}
        }
    }
}

/// Handed to the outer driver when a level ends; the level's score is already
/// folded into the carried total by then.
#[derive(Debug, Clone, Copy)]
pub struct LevelReport {
    pub level: u32,
    pub success: bool,
    pub kills: KillTally,
}

/// How thoroughly a bullet probe reaches when knocking out terrain. The
/// instant a bullet leaves the barrel it tests with a tighter offset so a
/// point-blank shot chews the wall directly ahead instead of the line behind
/// it; every later sub-step uses the wider travelling offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CollisionMode {
    Immediate,
    Normal,
}

/// One level of play: owns every entity collection and drives a single
/// simulation step per tick.
pub struct Game {
    pub level: u32,
    pub state: LevelState,
    pub field: Field,
    pub player: PlayerSlot,
    pub enemies: Vec<Tank>,
    pub bullets: Vec<Bullet>,
    pub powerups: Vec<PowerUp>,
    pub explosions: Vec<Explosion>,
    /// Remaining spawn order, consumed from the tail.
    pub spawn_order: Vec<TankKind>,
    /// Which positions of the full spawn order drop a power-up.
    award_marks: Vec<usize>,
    spawned_count: usize,
    pub enemy_on_map: u32,
    pub lives: i32,
    pub score: u32,
    pub kills: KillTally,
    pub banner_y: i32,
    pub halo_anim: AnimPhase,
    last_spawn: u64,
    last_elimination: u64,
    shovel_until: u64,
    freeze_until: u64,
    all_cleared_at: Option<u64>,
    game_over_at: u64,
    next_bullet_id: u64,
    next_enemy_id: u32,
    rng: StdRng,
}

impl Game {
    /// Loads a level. Failing to find or parse the grid is fatal for the run,
    /// so the error surfaces to the caller instead of being absorbed.
    pub fn new(level_number: u32, tier: u8, lives: i32) -> Result<Self, LevelError> {
        Self::with_rng(level_number, tier, lives, StdRng::from_entropy())
    }

    pub fn with_rng(
        level_number: u32,
        tier: u8,
        lives: i32,
        mut rng: StdRng,
    ) -> Result<Self, LevelError> {
        let data = level::load(level_number)?;
        let field = Field::from_level(&data);

        // Three random entries of the spawn order carry a power-up.
        let mut award_marks: Vec<usize> = Vec::with_capacity(AWARD_ENEMIES_PER_LEVEL);
        while award_marks.len() < AWARD_ENEMIES_PER_LEVEL {
            let mark = rng.gen_range(0..data.spawn_order.len());
            if !award_marks.contains(&mark) {
                award_marks.push(mark);
            }
        }

        info!(
            "Level {} loaded: {} bricks, {} walls, {} enemies queued",
            level_number,
            field.bricks.len(),
            field.walls.len(),
            data.spawn_order.len()
        );

        Ok(Game {
            level: level_number,
            state: LevelState::Initializing,
            field,
            player: PlayerSlot::Alive(Tank::player(
                tier,
                Point::new(PLAYER_SPAWN_X, PLAYER_SPAWN_Y),
            )),
            enemies: Vec::new(),
            bullets: Vec::new(),
            powerups: Vec::new(),
            explosions: Vec::new(),
            spawn_order: data.spawn_order,
            award_marks,
            spawned_count: 0,
            enemy_on_map: 0,
            lives,
            score: 0,
            kills: KillTally::default(),
            banner_y: BANNER_START_Y,
            halo_anim: Default::default(),
            last_spawn: 0,
            last_elimination: 0,
            shovel_until: 0,
            freeze_until: 0,
            all_cleared_at: None,
            game_over_at: 0,
            next_bullet_id: 1,
            next_enemy_id: 1,
            rng,
        })
    }

    pub fn frozen(&self, now: u64) -> bool {
        now < self.freeze_until
    }

    /// Advances the level one simulation step. Returns a report once the
    /// level has finished displaying its terminal state.
    pub fn tick(&mut self, ctx: &mut RunContext) -> Option<LevelReport> {
        match self.state {
            LevelState::Initializing => {
                self.finish_init(ctx.now);
                None
            }
            LevelState::Running => {
                self.tick_running(ctx);
                None
            }
            LevelState::Respawning => {
                self.tick_respawning(ctx);
                None
            }
            LevelState::GameOver => self.tick_game_over(ctx),
            LevelState::Success => {
                ctx.carry.score += self.score;
                if let Some(tank) = self.player.tank() {
                    ctx.carry.tier = tank.tier;
                }
                ctx.carry.lives = self.lives;
                info!(
                    "Level {} cleared: score {} ({} kills)",
                    self.level,
                    self.score,
                    self.kills.total()
                );
                Some(LevelReport {
                    level: self.level,
                    success: true,
                    kills: self.kills,
                })
            }
        }
    }

    /// Time-dependent setup that has to wait for the first tick: the spawn
    /// pacing clocks and the player's post-spawn matchless window.
    fn finish_init(&mut self, now: u64) {
        self.last_spawn = now;
        self.last_elimination = now;
        if let Some(tank) = self.player.tank_mut() {
            tank.spawn_matchless_until = now + SPAWN_MATCHLESS_MS;
            tank.in_flight = 0;
        }
        self.state = LevelState::Running;
    }

    fn tick_running(&mut self, ctx: &mut RunContext) {
        self.advance_animations(ctx.now);
        self.check_success(ctx.now);
        self.load_enemy(ctx.now);
        self.pickup_powerups(ctx);
        self.expire_effects(ctx.now);
        self.run_enemies(ctx);
        self.move_player(ctx);
        self.expire_powerups(ctx.now);
        self.move_bullets(ctx);
        self.reap();
    }

    fn tick_respawning(&mut self, ctx: &mut RunContext) {
        if let PlayerSlot::Respawning { since } = self.player {
            if ctx.now > since + PLAYER_RESPAWN_MS && self.lives >= 0 {
                // Respawned tanks start over at tier zero.
                let mut tank = Tank::player(0, Point::new(PLAYER_SPAWN_X, PLAYER_SPAWN_Y));
                tank.spawn_matchless_until = ctx.now + SPAWN_MATCHLESS_MS;
                self.player = PlayerSlot::Alive(tank);
                self.state = LevelState::Running;
                debug_game!("player respawned with {} lives left", self.lives);
            }
        }
        self.advance_animations(ctx.now);
        self.load_enemy(ctx.now);
        self.expire_effects(ctx.now);
        self.run_enemies(ctx);
        self.move_bullets(ctx);
        self.reap();
    }

    fn tick_game_over(&mut self, ctx: &mut RunContext) -> Option<LevelReport> {
        if ctx.now > self.game_over_at + GAME_OVER_DELAY_MS {
            ctx.carry.score += self.score;
            return Some(LevelReport {
                level: self.level,
                success: false,
                kills: self.kills,
            });
        }
        if self.banner_y > BANNER_REST_Y {
            self.banner_y -= BANNER_RISE_STEP;
        }
        self.advance_animations(ctx.now);
        self.load_enemy(ctx.now);
        self.run_enemies(ctx);
        self.move_bullets(ctx);
        self.reap();
        None
    }

    fn advance_animations(&mut self, now: u64) {
        // Water flashes slowly; its phase lives on the tile variant.
        let water_phase = ((now / WATER_ANIM_MS) % 2) as u8;
        for tile in self.field.water.iter_mut() {
            tile.variant = water_phase;
        }
        for powerup in self.powerups.iter_mut() {
            powerup.anim.tick(now, POWERUP_ANIM_MS);
        }
        for explosion in self.explosions.iter_mut() {
            explosion.advance(now, EXPLOSION_FRAME_MS);
        }
        let frozen = self.frozen(now);
        for enemy in self.enemies.iter_mut() {
            if !frozen {
                enemy.anim.tick(now, TREAD_ANIM_MS);
            }
            // Armor plating flickers while hits remain absorbed; at the last
            // hit point the flicker stops.
            if enemy.kind == TankKind::Armor && enemy.life > 1 {
                enemy.flash = !enemy.flash;
            }
        }
        if let Some(tank) = self.player.tank_mut() {
            if tank.moving {
                tank.anim.tick(now, TREAD_ANIM_MS);
            }
        }
        self.halo_anim.tick(now, TREAD_ANIM_MS);
    }

    fn check_success(&mut self, now: u64) {
        if self.all_cleared_at.is_none()
            && self.spawn_order.is_empty()
            && self.enemy_on_map == 0
        {
            self.all_cleared_at = Some(now);
            debug_game!("field cleared, closing level shortly");
        }
        if let Some(cleared) = self.all_cleared_at {
            if now > cleared + SUCCESS_DELAY_MS {
                self.state = LevelState::Success;
            }
        }
    }

    /// Spawn pacing: at most four enemies alive, a fixed gap between spawns,
    /// and past the early part of the order also a gap after the last kill.
    fn load_enemy(&mut self, now: u64) {
        if self.spawn_order.is_empty() || self.enemy_on_map >= MAX_ENEMIES_ON_MAP {
            return;
        }
        if now.saturating_sub(self.last_spawn) <= SPAWN_GAP_MS {
            return;
        }
        if self.spawn_order.len() <= EARLY_SPAWN_THRESHOLD
            && now.saturating_sub(self.last_elimination) <= ELIMINATION_GAP_MS
        {
            return;
        }

        // Spawn column rotates with the remaining queue length.
        let pos = match self.spawn_order.len() % 3 {
            2 => Point::new(288, 0),
            1 => Point::new(576, 0),
            _ => Point::new(0, 0),
        };
        let kind = self.spawn_order.pop().expect("spawn order checked non-empty");
        let award = self.award_marks.contains(&(self.spawn_order.len()));
        self.spawned_count += 1;

        let enemy = Tank::enemy(self.next_enemy_id, kind, award, pos);
        self.next_enemy_id += 1;
        debug_game!(
            "spawn #{}: {:?}{} at {:?} ({} queued)",
            self.spawned_count,
            kind,
            if award { " (award)" } else { "" },
            pos,
            self.spawn_order.len()
        );
        self.enemies.push(enemy);
        self.enemy_on_map += 1;
        self.last_spawn = now;
    }

    fn run_enemies(&mut self, ctx: &RunContext) {
        if self.frozen(ctx.now) {
            return;
        }
        for i in 0..self.enemies.len() {
            let wants_fire = {
                let enemy = &mut self.enemies[i];
                ai::drive_enemy(enemy, &self.field, &mut self.rng, ctx.now)
            };
            if wants_fire {
                let (pos, dir, speed, id) = {
                    let enemy = &mut self.enemies[i];
                    enemy.in_flight += 1;
                    enemy.last_fire = ctx.now;
                    (enemy.pos, enemy.dir, enemy.bullet_speed(), enemy.id)
                };
                self.spawn_bullet(pos, dir, speed, BulletOwner::Enemy(id), false, ctx);
            }
        }
    }

    fn move_player(&mut self, ctx: &RunContext) {
        let Some(tank) = self.player.tank_mut() else {
            return;
        };
        tank.ready_to_move = true;

        let mut fire = false;
        if ctx.input.released(GameKey::Fire) {
            if tank.in_flight < tank.bullet_cap() {
                fire = true;
            }
        } else if ctx.input.held(GameKey::Up) {
            if !tank.dir.is_vertical() {
                snap_to_lane(&mut tank.pos);
            }
            tank.dir = Dir::Up;
            tank.moving = true;
        } else if ctx.input.held(GameKey::Left) {
            if tank.dir.is_vertical() {
                snap_to_lane(&mut tank.pos);
            }
            tank.dir = Dir::Left;
            tank.moving = true;
        } else if ctx.input.held(GameKey::Down) {
            if !tank.dir.is_vertical() {
                snap_to_lane(&mut tank.pos);
            }
            tank.dir = Dir::Down;
            tank.moving = true;
        } else if ctx.input.held(GameKey::Right) {
            if tank.dir.is_vertical() {
                snap_to_lane(&mut tank.pos);
            }
            tank.dir = Dir::Right;
            tank.moving = true;
        } else {
            tank.moving = false;
        }

        if tank.moving {
            tank.velocity = tank.dir.velocity(tank.speed());
            let next = tank.pos + tank.velocity;
            if next.x < 0 || next.x > TANK_MAX_POS || next.y < 0 || next.y > TANK_MAX_POS {
                tank.ready_to_move = false;
            }
            self.field.clamp_move(tank);
            if tank.ready_to_move {
                let velocity = tank.velocity;
                tank.pos += velocity;
            }
        }

        if fire {
            let (pos, dir, speed, heavy) = {
                let tank = self.player.tank_mut().expect("checked alive above");
                tank.in_flight += 1;
                (
                    tank.pos,
                    tank.dir,
                    tank.bullet_speed(),
                    tank.tier == MAX_TIER,
                )
            };
            ctx.audio.play_fire();
            self.spawn_bullet(pos, dir, speed, BulletOwner::Player, heavy, ctx);
        }
    }

    fn spawn_bullet(
        &mut self,
        tank_pos: Point,
        dir: Dir,
        speed: i32,
        owner: BulletOwner,
        heavy: bool,
        ctx: &RunContext,
    ) {
        let bullet = Bullet {
            id: self.next_bullet_id,
            pos: fire_position(tank_pos, dir),
            dir,
            speed,
            owner,
            heavy,
            alive: true,
        };
        self.next_bullet_id += 1;
        debug_bullet!(bullet.id, "fired {:?} from {:?}", dir, tank_pos);
        self.bullets.push(bullet);
        // Point-blank test before any travel.
        let index = self.bullets.len() - 1;
        self.resolve_bullet(index, CollisionMode::Immediate, ctx);
    }

    fn move_bullets(&mut self, ctx: &RunContext) {
        for i in 0..self.bullets.len() {
            if !self.bullets[i].alive {
                continue;
            }
            // One pixel at a time: a full-speed leap could carry the bullet
            // clean through a 12px brick chip between two tests.
            let speed = self.bullets[i].speed;
            for _ in 0..speed {
                if !self.bullets[i].alive {
                    break;
                }
                let step = self.bullets[i].dir.velocity(1);
                self.bullets[i].pos += step;
                self.resolve_bullet(i, CollisionMode::Normal, ctx);
            }

            let bullet = &self.bullets[i];
            if bullet.alive
                && (bullet.pos.x < 0
                    || bullet.pos.x > BULLET_MAX_X
                    || bullet.pos.y < 0
                    || bullet.pos.y > BULLET_MAX_Y)
            {
                let pos = bullet.pos;
                let owner = bullet.owner;
                self.bullets[i].alive = false;
                self.release_bullet(owner);
                self.explosions.push(Explosion::small_at_hit(pos));
                if owner.is_player() {
                    ctx.audio.play_steel();
                }
            }
        }
    }

    /// Full collision resolution for one bullet at its current position.
    /// Every class of target is tested even after one has fired, so a single
    /// step can total all its effects, but the bullet dies at most once and
    /// its owner's in-flight counter drops exactly once.
    fn resolve_bullet(&mut self, i: usize, mode: CollisionMode, ctx: &RunContext) {
        let bullet = self.bullets[i].clone();
        let brect = bullet.rect();
        let mut hit = false;

        // Destructible bricks: knock out a swathe of chips along the probe.
        if self.field.hits_bricks(&brect) {
            hit = true;
            self.bullets[i].alive = false;
            self.explosions.push(Explosion::small_at_hit(bullet.pos));
            if bullet.owner.is_player() {
                ctx.audio.play_brick();
            }
            let swathe = brick_swathe(bullet.pos, bullet.dir, mode, bullet.heavy);
            self.field.destroy_bricks(&swathe);
            debug_bullet!(bullet.id, "ate bricks at {:?}", bullet.pos);
        }

        // Steel: stops everything, but only heavy bullets break pieces out.
        if self.field.hits_walls(&brect) {
            hit = true;
            self.bullets[i].alive = false;
            self.explosions.push(Explosion::small_at_hit(bullet.pos));
            if bullet.owner.is_player() {
                ctx.audio.play_steel();
            }
            if bullet.heavy {
                let swathe = wall_swathe(bullet.pos, bullet.dir, mode);
                self.field.destroy_walls(&swathe);
            }
        }

        // Crossing bullets annihilate each other.
        let mut struck: Vec<usize> = Vec::new();
        for (j, other) in self.bullets.iter().enumerate() {
            if j != i && other.alive && brect.intersects(&other.rect()) {
                struck.push(j);
            }
        }
        if !struck.is_empty() {
            hit = true;
            self.bullets[i].alive = false;
            for j in struck {
                let owner = self.bullets[j].owner;
                self.bullets[j].alive = false;
                self.release_bullet(owner);
            }
        }

        if bullet.owner.is_player() {
            hit |= self.resolve_bullet_vs_enemies(i, &bullet, &brect, ctx);
        } else {
            hit |= self.resolve_bullet_vs_player(i, &bullet, &brect, ctx);
        }

        // The base: fatal to the run no matter how many lives remain.
        if self.state != LevelState::GameOver && self.field.eagle.rect().intersects(&brect) {
            hit = true;
            self.bullets[i].alive = false;
            self.explosions.push(Explosion::small_at_hit(bullet.pos));
            self.field.eagle.destroyed = true;
            self.explosions
                .push(Explosion::large_over(self.field.eagle.pos));
            ctx.audio.play_explosion();
            self.trigger_game_over(ctx.now);
            info!("the base fell");
        }

        if hit {
            self.release_bullet(bullet.owner);
        }
    }

    fn resolve_bullet_vs_enemies(
        &mut self,
        i: usize,
        bullet: &Bullet,
        brect: &Rect,
        ctx: &RunContext,
    ) -> bool {
        let victims: Vec<usize> = self
            .enemies
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.dead && e.rect().intersects(brect))
            .map(|(k, _)| k)
            .collect();
        if victims.is_empty() {
            return false;
        }

        let mut soft_kill = false;
        let mut armor_struck = false;
        for k in victims {
            if self.enemies[k].kind == TankKind::Armor {
                armor_struck = true;
                let already_hit = self.enemies[k].hit_by.contains(&bullet.id);
                if already_hit {
                    continue;
                }
                // An award armor tank pays out on the first dent.
                if self.enemies[k].award && self.enemies[k].life == ARMOR_LIFE {
                    self.spawn_powerup(ctx.now);
                }
                self.enemies[k].life -= 1;
                self.enemies[k].hit_by.push(bullet.id);
                if self.enemies[k].life == 0 {
                    let pos = self.enemies[k].pos;
                    self.enemies[k].dead = true;
                    self.score += TankKind::Armor.score();
                    self.kills.record(TankKind::Armor);
                    self.explosions.push(Explosion::large_over(pos));
                    ctx.audio.play_explosion();
                    self.last_elimination = ctx.now;
                    self.enemy_on_map -= 1;
                    debug_game!("armor tank down");
                }
            } else {
                soft_kill = true;
                let (kind, award, pos) = {
                    let e = &self.enemies[k];
                    (e.kind, e.award, e.pos)
                };
                self.enemies[k].dead = true;
                self.score += kind.score();
                self.kills.record(kind);
                self.explosions.push(Explosion::large_over(pos));
                ctx.audio.play_explosion();
                self.enemy_on_map -= 1;
                if award {
                    self.spawn_powerup(ctx.now);
                }
                debug_game!("{:?} tank down, +{}", kind, kind.score());
            }
        }

        if soft_kill {
            self.last_elimination = ctx.now;
        }
        if soft_kill || armor_struck {
            self.bullets[i].alive = false;
            self.explosions.push(Explosion::small_at_hit(bullet.pos));
        }
        self.enemies.retain(|e| !e.dead);
        true
    }

    fn resolve_bullet_vs_player(
        &mut self,
        i: usize,
        bullet: &Bullet,
        brect: &Rect,
        ctx: &RunContext,
    ) -> bool {
        let Some(tank) = self.player.tank() else {
            return false;
        };
        if !tank.rect().intersects(brect) {
            return false;
        }

        self.bullets[i].alive = false;
        if tank.is_matchless(ctx.now) {
            self.explosions.push(Explosion::small_at_hit(bullet.pos));
            return true;
        }

        let pos = tank.pos;
        self.player = PlayerSlot::Respawning { since: ctx.now };
        self.lives -= 1;
        self.explosions.push(Explosion::large_over(pos));
        self.explosions.push(Explosion::small_at_hit(bullet.pos));
        ctx.audio.play_explosion();
        if self.lives < 0 {
            self.trigger_game_over(ctx.now);
            info!("out of lives");
        } else if self.state == LevelState::Running {
            self.state = LevelState::Respawning;
        }
        true
    }

    fn trigger_game_over(&mut self, now: u64) {
        if self.state != LevelState::GameOver {
            self.state = LevelState::GameOver;
            self.game_over_at = now;
            self.banner_y = BANNER_START_Y;
        }
    }

    /// Drops one from the owner's in-flight counter. A counter can never go
    /// negative, and bullets of an owner that died mid-flight vanish quietly.
    fn release_bullet(&mut self, owner: BulletOwner) {
        match owner {
            BulletOwner::Player => {
                if let Some(tank) = self.player.tank_mut() {
                    tank.in_flight = tank.in_flight.saturating_sub(1);
                }
            }
            BulletOwner::Enemy(id) => {
                if let Some(tank) = self.enemies.iter_mut().find(|e| e.id == id) {
                    tank.in_flight = tank.in_flight.saturating_sub(1);
                }
            }
        }
    }

    fn spawn_powerup(&mut self, now: u64) {
        let kind = match self.rng.gen_range(0..=5) {
            0 => PowerUpKind::Grenade,
            1 => PowerUpKind::Helmet,
            2 => PowerUpKind::Shovel,
            3 => PowerUpKind::Star,
            4 => PowerUpKind::Tank,
            _ => PowerUpKind::Timer,
        };
        // Anywhere on the field except over water or the eagle.
        let pos = loop {
            let candidate = Point::new(
                self.rng.gen_range(0..=TANK_MAX_POS),
                self.rng.gen_range(0..=TANK_MAX_POS),
            );
            let rect = Rect::new(candidate.x, candidate.y, TANK_SIZE, TANK_SIZE);
            if !self.field.hits_water(&rect) && !self.field.eagle.rect().intersects(&rect) {
                break candidate;
            }
        };
        debug_powerup!("{:?} dropped at {:?}", kind, pos);
        self.powerups.push(PowerUp {
            kind,
            pos,
            spawned: now,
            anim: Default::default(),
        });
    }

    fn pickup_powerups(&mut self, ctx: &mut RunContext) {
        let Some(rect) = self.player.tank().map(|t| t.rect()) else {
            return;
        };
        let collected: Vec<PowerUp> = {
            let (taken, left): (Vec<PowerUp>, Vec<PowerUp>) = self
                .powerups
                .drain(..)
                .partition(|p| p.rect().intersects(&rect));
            self.powerups = left;
            taken
        };
        if collected.is_empty() {
            return;
        }

        ctx.audio.play_bonus();
        self.score += POWERUP_SCORE;
        for powerup in collected {
            debug_powerup!("picked up {:?}", powerup.kind);
            self.apply_powerup(powerup.kind, ctx);
        }
    }

    fn apply_powerup(&mut self, kind: PowerUpKind, ctx: &RunContext) {
        match kind {
            PowerUpKind::Grenade => {
                // Every enemy on the field goes up at once, scoreless.
                self.enemy_on_map = 0;
                let doomed = std::mem::take(&mut self.enemies);
                for enemy in &doomed {
                    self.explosions.push(Explosion::large_over(enemy.pos));
                    ctx.audio.play_explosion();
                }
            }
            PowerUpKind::Helmet => {
                if let Some(tank) = self.player.tank_mut() {
                    tank.powerup_matchless_until = ctx.now + HELMET_MATCHLESS_MS;
                }
            }
            PowerUpKind::Shovel => {
                self.field.build_base(BaseMaterial::Steel);
                self.shovel_until = ctx.now + SHOVEL_MS;
            }
            PowerUpKind::Star => {
                if let Some(tank) = self.player.tank_mut() {
                    if tank.tier < MAX_TIER {
                        tank.tier += 1;
                    } else {
                        self.lives += 1;
                    }
                }
            }
            PowerUpKind::Tank => {
                self.lives += 1;
            }
            PowerUpKind::Timer => {
                self.freeze_until = ctx.now + FREEZE_MS;
            }
        }
    }

    fn expire_effects(&mut self, now: u64) {
        // Matchless and freeze windows expire by timestamp comparison on
        // their own; the shovel needs its brick ring put back.
        if self.shovel_until != 0 && now > self.shovel_until {
            self.field.build_base(BaseMaterial::Bricks);
            self.shovel_until = 0;
            debug_powerup!("shovel expired, base back to bricks");
        }
    }

    fn expire_powerups(&mut self, now: u64) {
        self.powerups
            .retain(|p| now <= p.spawned + POWERUP_TIMEOUT_MS);
    }

    fn reap(&mut self) {
        self.bullets.retain(|b| b.alive);
        self.explosions.retain(|e| !e.done);
    }
}

/// Terrain swathe a bullet knocks out of a brick wall: a thin strip across
/// the full tile width ahead of the impact, one chip-line deep for normal
/// shots and two for heavy ones.
fn brick_swathe(pos: Point, dir: Dir, mode: CollisionMode, heavy: bool) -> Rect {
    let thickness = if heavy { 11 } else { 3 };
    let (mut a, mut b, w, h) = match (dir, mode) {
        (Dir::Up, CollisionMode::Normal) => (-18, -9, TANK_SIZE, thickness),
        (Dir::Up, CollisionMode::Immediate) => (-18, 0, TANK_SIZE, thickness),
        (Dir::Down, CollisionMode::Normal) => (-18, 18, TANK_SIZE, thickness),
        (Dir::Down, CollisionMode::Immediate) => (-18, 9, TANK_SIZE, thickness),
        (Dir::Left, CollisionMode::Normal) => (-9, -21, thickness, TANK_SIZE),
        (Dir::Left, CollisionMode::Immediate) => (0, -21, thickness, TANK_SIZE),
        (Dir::Right, CollisionMode::Normal) => (18, -21, thickness, TANK_SIZE),
        (Dir::Right, CollisionMode::Immediate) => (9, -21, thickness, TANK_SIZE),
    };
    // The wider heavy swathe grows backwards against the travel direction.
    if heavy {
        match dir {
            Dir::Up => b -= 6,
            Dir::Left => a -= 6,
            Dir::Down | Dir::Right => {}
        }
    }
    Rect::new(pos.x + a, pos.y + b, w, h)
}

/// Steel destruction probe for heavy bullets: same offsets as the brick
/// swathe, always one piece-line thick.
fn wall_swathe(pos: Point, dir: Dir, mode: CollisionMode) -> Rect {
    let (a, b, w, h) = match (dir, mode) {
        (Dir::Up, CollisionMode::Normal) => (-18, -9, TANK_SIZE, 3),
        (Dir::Up, CollisionMode::Immediate) => (-18, 0, TANK_SIZE, 3),
        (Dir::Down, CollisionMode::Normal) => (-18, 18, TANK_SIZE, 3),
        (Dir::Down, CollisionMode::Immediate) => (-18, 9, TANK_SIZE, 3),
        (Dir::Left, CollisionMode::Normal) => (-9, -21, 3, TANK_SIZE),
        (Dir::Left, CollisionMode::Immediate) => (0, -21, 3, TANK_SIZE),
        (Dir::Right, CollisionMode::Normal) => (18, -21, 3, TANK_SIZE),
        (Dir::Right, CollisionMode::Immediate) => (9, -21, 3, TANK_SIZE),
    };
    Rect::new(pos.x + a, pos.y + b, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioManager;
    use crate::config::STEP_MS;
    use crate::context::Carry;
    use crate::input::InputSnapshot;

    struct Harness {
        game: Game,
        carry: Carry,
        audio: AudioManager,
        input: InputSnapshot,
        now: u64,
    }

    impl Harness {
        fn new() -> Self {
            Harness::with_game(
                Game::with_rng(1, 0, 2, StdRng::seed_from_u64(42)).expect("level 1 loads"),
            )
        }

        fn with_game(game: Game) -> Self {
            Harness {
                game,
                carry: Carry::default(),
                audio: AudioManager::new(),
                input: InputSnapshot::default(),
                now: 0,
            }
        }

        fn step(&mut self) -> Option<LevelReport> {
            self.now += STEP_MS;
            let mut ctx = RunContext {
                now: self.now,
                input: &self.input,
                audio: &self.audio,
                carry: &mut self.carry,
            };
            self.game.tick(&mut ctx)
        }

        fn step_until(&mut self, limit_ms: u64) -> Option<LevelReport> {
            let deadline = self.now + limit_ms;
            while self.now < deadline {
                if let Some(report) = self.step() {
                    return Some(report);
                }
            }
            None
        }
    }

    /// A game with no terrain, no queued enemies and a parked clock baseline,
    /// for targeted collision scenarios.
    fn bare_game() -> Game {
        let mut game = Game::with_rng(1, 0, 2, StdRng::seed_from_u64(42)).expect("level 1 loads");
        game.field.bricks.clear();
        game.field.walls.clear();
        game.field.water.clear();
        game.spawn_order.clear();
        game.state = LevelState::Running;
        game
    }

    fn test_ctx<'a>(
        now: u64,
        input: &'a InputSnapshot,
        audio: &'a AudioManager,
        carry: &'a mut Carry,
    ) -> RunContext<'a> {
        RunContext {
            now,
            input,
            audio,
            carry,
        }
    }

    #[test]
    fn test_initializing_arms_spawn_clocks_and_matchless() {
        let mut harness = Harness::new();
        assert_eq!(harness.game.state, LevelState::Initializing);
        harness.step();
        assert_eq!(harness.game.state, LevelState::Running);
        let tank = harness.game.player.tank().unwrap();
        assert!(tank.is_matchless(harness.now));
        assert!(!tank.is_matchless(harness.now + SPAWN_MATCHLESS_MS));
    }

    #[test]
    fn test_spawn_pacing_caps_at_four() {
        let mut harness = Harness::new();
        harness.step();
        // Freeze the field so pacing is the only variable: frozen enemies
        // neither move nor shoot, but the spawner keeps working.
        harness.game.freeze_until = u64::MAX;
        let report = harness.step_until(60_000);
        assert!(report.is_none(), "nothing can end a frozen level");
        assert_eq!(harness.game.enemy_on_map, MAX_ENEMIES_ON_MAP);
        assert_eq!(harness.game.enemies.len() as u32, harness.game.enemy_on_map);
        assert_eq!(
            harness.game.spawned_count, 4,
            "without eliminations the cap pins the spawn count"
        );
    }

    #[test]
    fn test_player_bullet_cap_respected() {
        let audio = AudioManager::new();
        let mut carry = Carry::default();
        let mut game = bare_game();
        let mut input = InputSnapshot::default();
        input.set_released(GameKey::Fire, true);

        // Two fire ticks in a row at tier 0: only one bullet leaves.
        for step in 1..=2u64 {
            let ctx = test_ctx(step * STEP_MS, &input, &audio, &mut carry);
            game.move_player(&ctx);
        }
        assert_eq!(game.player.tank().unwrap().in_flight, 1);
        assert_eq!(game.bullets.len(), 1);

        // A tier-2 tank keeps two in the air but never three.
        let mut game = bare_game();
        game.player.tank_mut().unwrap().tier = 2;
        for step in 1..=3u64 {
            let ctx = test_ctx(step * STEP_MS, &input, &audio, &mut carry);
            game.move_player(&ctx);
        }
        assert_eq!(game.player.tank().unwrap().in_flight, 2);
        assert_eq!(game.bullets.len(), 2);
    }

    #[test]
    fn test_bullet_out_of_bounds_releases_owner() {
        let audio = AudioManager::new();
        let mut carry = Carry::default();
        let mut game = bare_game();
        if let Some(tank) = game.player.tank_mut() {
            tank.pos = Point::new(240, 240);
            tank.dir = Dir::Up;
        }
        let mut input = InputSnapshot::default();
        input.set_released(GameKey::Fire, true);
        {
            let ctx = test_ctx(33, &input, &audio, &mut carry);
            game.move_player(&ctx);
        }
        assert_eq!(game.player.tank().unwrap().in_flight, 1);

        let quiet = InputSnapshot::default();
        // Bullet travels up 12px per step from y=228; it exits in ~20 steps.
        for step in 2..40 {
            let ctx = test_ctx(step * 33, &quiet, &audio, &mut carry);
            game.move_bullets(&ctx);
            game.reap();
        }
        assert!(game.bullets.is_empty());
        assert_eq!(
            game.player.tank().unwrap().in_flight,
            0,
            "counter returns exactly to zero"
        );
    }

    #[test]
    fn test_point_blank_shot_dies_immediately() {
        let audio = AudioManager::new();
        let mut carry = Carry::default();
        let mut game = bare_game();
        // A wall tile directly above the muzzle.
        game.field
            .walls
            .push(crate::entities::Tile::new(crate::entities::TileKind::Wall, Point::new(258, 216)));
        if let Some(tank) = game.player.tank_mut() {
            tank.pos = Point::new(240, 240);
            tank.dir = Dir::Up;
        }
        let mut input = InputSnapshot::default();
        input.set_released(GameKey::Fire, true);
        let ctx = test_ctx(33, &input, &audio, &mut carry);
        game.move_player(&ctx);

        assert!(!game.bullets[0].alive, "immediate mode killed the bullet");
        assert_eq!(game.player.tank().unwrap().in_flight, 0);
        assert_eq!(game.field.walls.len(), 1, "light bullets leave steel intact");
    }

    #[test]
    fn test_heavy_bullet_breaks_steel() {
        let audio = AudioManager::new();
        let mut carry = Carry::default();
        let mut game = bare_game();
        game.field
            .walls
            .push(crate::entities::Tile::new(crate::entities::TileKind::Wall, Point::new(258, 216)));
        if let Some(tank) = game.player.tank_mut() {
            tank.pos = Point::new(240, 240);
            tank.dir = Dir::Up;
            tank.tier = MAX_TIER;
        }
        let mut input = InputSnapshot::default();
        input.set_released(GameKey::Fire, true);
        let ctx = test_ctx(33, &input, &audio, &mut carry);
        game.move_player(&ctx);

        assert!(game.field.walls.is_empty(), "tier-4 round breaks the piece out");
    }

    #[test]
    fn test_armor_tank_takes_four_distinct_bullets() {
        let audio = AudioManager::new();
        let mut carry = Carry::default();
        let mut game = bare_game();
        game.enemies
            .push(Tank::enemy(1, TankKind::Armor, false, Point::new(240, 96)));
        game.enemy_on_map = 1;

        // One bullet fired straight through the armor tank: its sub-steps
        // must not count as more than one hit.
        if let Some(tank) = game.player.tank_mut() {
            tank.pos = Point::new(240, 192);
            tank.dir = Dir::Up;
        }
        let quiet = InputSnapshot::default();
        let mut fire = InputSnapshot::default();
        fire.set_released(GameKey::Fire, true);

        for round in 0..3u64 {
            let now = 33 + round * 2000;
            let ctx = test_ctx(now, &fire, &audio, &mut carry);
            game.move_player(&ctx);
            // Let the bullet cover the whole distance to the target.
            for travel in 1..=6u64 {
                let ctx = test_ctx(now + travel * 33, &quiet, &audio, &mut carry);
                game.move_bullets(&ctx);
            }
            game.reap();
            assert!(game.bullets.is_empty(), "bullet spent on round {}", round + 1);
            assert_eq!(game.enemies.len(), 1, "armor survives hit {}", round + 1);
            assert_eq!(game.enemies[0].life, 3 - round as u8);
            assert_eq!(game.player.tank().unwrap().in_flight, 0);
        }

        let ctx = test_ctx(9000, &fire, &audio, &mut carry);
        game.move_player(&ctx);
        for travel in 1..=6u64 {
            let ctx = test_ctx(9000 + travel * 33, &quiet, &audio, &mut carry);
            game.move_bullets(&ctx);
        }
        game.reap();
        assert!(game.enemies.is_empty(), "fourth hit finishes it");
        assert_eq!(game.score, 400);
        assert_eq!(game.kills.armor, 1);
        assert_eq!(game.enemy_on_map, 0);
    }

    #[test]
    fn test_enemy_kill_scores_by_kind() {
        let audio = AudioManager::new();
        let mut carry = Carry::default();
        let mut game = bare_game();
        game.enemies
            .push(Tank::enemy(1, TankKind::Fast, false, Point::new(240, 96)));
        game.enemy_on_map = 1;
        if let Some(tank) = game.player.tank_mut() {
            tank.pos = Point::new(240, 192);
            tank.dir = Dir::Up;
        }
        let mut fire = InputSnapshot::default();
        fire.set_released(GameKey::Fire, true);
        let ctx = test_ctx(33, &fire, &audio, &mut carry);
        game.move_player(&ctx);
        let quiet = InputSnapshot::default();
        for travel in 1..=6u64 {
            let ctx = test_ctx(33 + travel * 33, &quiet, &audio, &mut carry);
            game.move_bullets(&ctx);
        }
        game.reap();

        assert!(game.enemies.is_empty());
        assert_eq!(game.score, 200);
        assert_eq!(game.kills.fast, 1);
    }

    #[test]
    fn test_matchless_player_shrugs_off_enemy_fire() {
        let audio = AudioManager::new();
        let mut carry = Carry::default();
        let mut game = bare_game();
        if let Some(tank) = game.player.tank_mut() {
            tank.pos = Point::new(240, 240);
            tank.spawn_matchless_until = 10_000;
        }
        game.enemies
            .push(Tank::enemy(1, TankKind::Basic, false, Point::new(240, 96)));
        game.enemy_on_map = 1;
        game.bullets.push(Bullet {
            id: 99,
            pos: Point::new(258, 230),
            dir: Dir::Down,
            speed: 12,
            owner: BulletOwner::Enemy(1),
            heavy: false,
            alive: true,
        });

        let quiet = InputSnapshot::default();
        let ctx = test_ctx(100, &quiet, &audio, &mut carry);
        game.move_bullets(&ctx);
        game.reap();

        assert!(matches!(game.player, PlayerSlot::Alive(_)));
        assert_eq!(game.lives, 2);
        assert!(game.bullets.is_empty(), "the bullet still dies on impact");
    }

    #[test]
    fn test_player_death_and_respawn_window() {
        let audio = AudioManager::new();
        let mut carry = Carry::default();
        let mut game = bare_game();
        if let Some(tank) = game.player.tank_mut() {
            tank.pos = Point::new(240, 240);
            tank.tier = 2;
        }
        game.bullets.push(Bullet {
            id: 99,
            pos: Point::new(258, 230),
            dir: Dir::Down,
            speed: 12,
            owner: BulletOwner::Enemy(1),
            heavy: false,
            alive: true,
        });

        let quiet = InputSnapshot::default();
        let ctx = test_ctx(100, &quiet, &audio, &mut carry);
        game.move_bullets(&ctx);
        assert!(matches!(game.player, PlayerSlot::Respawning { .. }));
        assert_eq!(game.lives, 1);
        assert_eq!(game.state, LevelState::Respawning);

        // Not yet: the window is two seconds.
        let mut ctx = test_ctx(1000, &quiet, &audio, &mut carry);
        game.tick(&mut ctx);
        assert!(matches!(game.player, PlayerSlot::Respawning { .. }));

        let mut ctx = test_ctx(2200, &quiet, &audio, &mut carry);
        game.tick(&mut ctx);
        let tank = game.player.tank().expect("respawned");
        assert_eq!(tank.tier, 0, "respawn resets the tier");
        assert!(tank.is_matchless(2300));
        assert_eq!(game.state, LevelState::Running);
    }

    #[test]
    fn test_base_destruction_ends_run_despite_lives() {
        let audio = AudioManager::new();
        let mut carry = Carry::default();
        let mut game = bare_game();
        game.lives = 3;
        game.bullets.push(Bullet {
            id: 99,
            pos: Point::new(300, 560),
            dir: Dir::Down,
            speed: 12,
            owner: BulletOwner::Enemy(1),
            heavy: false,
            alive: true,
        });

        let quiet = InputSnapshot::default();
        let ctx = test_ctx(100, &quiet, &audio, &mut carry);
        game.move_bullets(&ctx);

        assert!(game.field.eagle.destroyed);
        assert_eq!(game.state, LevelState::GameOver);
        assert_eq!(game.lives, 3, "lives played no part");

        // The terminal state holds for four seconds, then reports.
        let mut report = None;
        let mut now = 100;
        while report.is_none() && now < 100 + GAME_OVER_DELAY_MS + 1000 {
            now += STEP_MS;
            let mut ctx = test_ctx(now, &quiet, &audio, &mut carry);
            report = game.tick(&mut ctx);
        }
        let report = report.expect("game over reported");
        assert!(!report.success);
    }

    #[test]
    fn test_success_exactly_after_delay() {
        let audio = AudioManager::new();
        let mut carry = Carry::default();
        let mut game = bare_game();
        // Nothing queued, nothing alive: the clear clock starts on the next
        // running tick.
        let quiet = InputSnapshot::default();
        let mut ctx = test_ctx(1000, &quiet, &audio, &mut carry);
        game.tick(&mut ctx);
        assert_eq!(game.state, LevelState::Running);

        // One ms short of the delay: still running.
        let mut ctx = test_ctx(1000 + SUCCESS_DELAY_MS, &quiet, &audio, &mut carry);
        game.tick(&mut ctx);
        assert_eq!(game.state, LevelState::Running, "not a moment early");

        let mut ctx = test_ctx(1001 + SUCCESS_DELAY_MS, &quiet, &audio, &mut carry);
        game.tick(&mut ctx);
        assert_eq!(game.state, LevelState::Success);

        game.score = 700;
        if let Some(tank) = game.player.tank_mut() {
            tank.tier = 2;
        }
        game.lives = 1;
        let mut ctx = test_ctx(1100 + SUCCESS_DELAY_MS, &quiet, &audio, &mut carry);
        let report = game.tick(&mut ctx).expect("success reported");
        assert!(report.success);
        assert_eq!(carry.score, 700);
        assert_eq!(carry.tier, 2);
        assert_eq!(carry.lives, 1);
    }

    #[test]
    fn test_star_powerup_tiers_then_lives() {
        let audio = AudioManager::new();
        let mut carry = Carry::default();
        let mut game = bare_game();
        let input = InputSnapshot::default();
        let ctx = test_ctx(100, &input, &audio, &mut carry);
        for expected_tier in 1..=MAX_TIER {
            game.apply_powerup(PowerUpKind::Star, &ctx);
            assert_eq!(game.player.tank().unwrap().tier, expected_tier);
        }
        assert_eq!(game.player.tank().unwrap().bullet_speed(), 24);
        assert_eq!(game.lives, 2);
        // At max tier a star pays out in lives instead.
        game.apply_powerup(PowerUpKind::Star, &ctx);
        assert_eq!(game.player.tank().unwrap().tier, MAX_TIER);
        assert_eq!(game.lives, 3);
    }

    #[test]
    fn test_grenade_clears_field_without_score() {
        let audio = AudioManager::new();
        let mut carry = Carry::default();
        let mut game = bare_game();
        for id in 1..=3 {
            game.enemies
                .push(Tank::enemy(id, TankKind::Basic, false, Point::new(96 * id as i32, 0)));
        }
        game.enemy_on_map = 3;
        let input = InputSnapshot::default();
        let ctx = test_ctx(100, &input, &audio, &mut carry);
        game.apply_powerup(PowerUpKind::Grenade, &ctx);
        assert!(game.enemies.is_empty());
        assert_eq!(game.enemy_on_map, 0);
        assert_eq!(game.score, 0, "grenade kills score nothing");
        assert_eq!(game.kills.total(), 0);
    }

    #[test]
    fn test_shovel_turns_base_to_steel_and_back() {
        let audio = AudioManager::new();
        let mut carry = Carry::default();
        let mut game = bare_game();
        game.field.build_base(BaseMaterial::Bricks);
        let input = InputSnapshot::default();
        let ctx = test_ctx(100, &input, &audio, &mut carry);
        game.apply_powerup(PowerUpKind::Shovel, &ctx);
        assert!(game.field.bricks.iter().all(|t| !t.in_base));
        assert_eq!(game.field.walls.iter().filter(|t| t.in_base).count(), 8);

        game.expire_effects(100 + SHOVEL_MS);
        assert_eq!(game.field.walls.iter().filter(|t| t.in_base).count(), 8, "still shoveled");
        game.expire_effects(101 + SHOVEL_MS);
        assert!(game.field.walls.iter().all(|t| !t.in_base));
        assert_eq!(game.field.bricks.iter().filter(|t| t.in_base).count(), 32);
    }

    #[test]
    fn test_timer_freezes_enemies() {
        let audio = AudioManager::new();
        let mut carry = Carry::default();
        let mut game = bare_game();
        game.enemies
            .push(Tank::enemy(1, TankKind::Basic, false, Point::new(96, 96)));
        game.enemy_on_map = 1;
        let input = InputSnapshot::default();
        let ctx = test_ctx(100, &input, &audio, &mut carry);
        game.apply_powerup(PowerUpKind::Timer, &ctx);

        let before = game.enemies[0].pos;
        let ctx = test_ctx(200, &input, &audio, &mut carry);
        game.run_enemies(&ctx);
        assert_eq!(game.enemies[0].pos, before, "frozen enemies hold still");

        let ctx = test_ctx(101 + FREEZE_MS, &input, &audio, &mut carry);
        game.run_enemies(&ctx);
        assert!(game.frozen(200));
        assert!(!game.frozen(101 + FREEZE_MS));
    }

    #[test]
    fn test_powerup_timeout() {
        let mut game = bare_game();
        game.powerups.push(PowerUp {
            kind: PowerUpKind::Helmet,
            pos: Point::new(96, 96),
            spawned: 1000,
            anim: Default::default(),
        });
        game.expire_powerups(1000 + POWERUP_TIMEOUT_MS);
        assert_eq!(game.powerups.len(), 1, "inside the window it stays");
        game.expire_powerups(1001 + POWERUP_TIMEOUT_MS);
        assert!(game.powerups.is_empty());
    }

    #[test]
    fn test_pickup_scores_and_applies() {
        let audio = AudioManager::new();
        let mut carry = Carry::default();
        let mut game = bare_game();
        let player_pos = game.player.tank().unwrap().pos;
        game.powerups.push(PowerUp {
            kind: PowerUpKind::Tank,
            pos: player_pos,
            spawned: 0,
            anim: Default::default(),
        });
        let input = InputSnapshot::default();
        let mut ctx = test_ctx(100, &input, &audio, &mut carry);
        game.pickup_powerups(&mut ctx);
        assert!(game.powerups.is_empty());
        assert_eq!(game.score, POWERUP_SCORE);
        assert_eq!(game.lives, 3);
    }

    #[test]
    fn test_crossing_bullets_annihilate() {
        let audio = AudioManager::new();
        let mut carry = Carry::default();
        let mut game = bare_game();
        if let Some(tank) = game.player.tank_mut() {
            tank.in_flight = 1;
        }
        game.enemies
            .push(Tank::enemy(7, TankKind::Basic, false, Point::new(0, 0)));
        game.enemies[0].in_flight = 1;
        game.enemy_on_map = 1;
        game.bullets.push(Bullet {
            id: 1,
            pos: Point::new(300, 300),
            dir: Dir::Up,
            speed: 12,
            owner: BulletOwner::Player,
            heavy: false,
            alive: true,
        });
        game.bullets.push(Bullet {
            id: 2,
            pos: Point::new(300, 290),
            dir: Dir::Down,
            speed: 12,
            owner: BulletOwner::Enemy(7),
            heavy: false,
            alive: true,
        });

        let quiet = InputSnapshot::default();
        let ctx = test_ctx(100, &quiet, &audio, &mut carry);
        game.move_bullets(&ctx);
        game.reap();

        assert!(game.bullets.is_empty());
        assert_eq!(game.player.tank().unwrap().in_flight, 0);
        assert_eq!(game.enemies[0].in_flight, 0);
    }

    #[test]
    fn test_movement_clamp_never_overshoots() {
        let audio = AudioManager::new();
        let mut carry = Carry::default();
        let mut game = bare_game();
        // Wall row at y=72..96 across the player's column.
        game.field
            .walls
            .push(crate::entities::Tile::new(crate::entities::TileKind::Wall, Point::new(240, 72)));
        game.field
            .walls
            .push(crate::entities::Tile::new(crate::entities::TileKind::Wall, Point::new(264, 72)));
        if let Some(tank) = game.player.tank_mut() {
            tank.pos = Point::new(240, 103);
            tank.dir = Dir::Up;
        }
        let mut input = InputSnapshot::default();
        input.set_held(GameKey::Up, true);
        for step in 1..10u64 {
            let ctx = test_ctx(step * STEP_MS, &input, &audio, &mut carry);
            game.move_player(&ctx);
        }
        // 103 -> 98 at full speed, then the 2px gap, then flush.
        assert_eq!(game.player.tank().unwrap().pos, Point::new(240, 96));
    }
}

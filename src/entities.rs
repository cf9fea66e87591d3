use crate::config::{
    BRICK_SIZE, BULLET_SPEED_FAST, BULLET_SPEED_SLOW, HALF_TILE, MAX_TIER, PLAYER_SPEED,
    TANK_SIZE, TILE_SIZE, WALL_SIZE,
};

/// Integer 2D vector in field-local pixels. Used for positions and velocities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Point {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl std::ops::Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

/// Axis-aligned rectangle in field pixels. Touching edges do not overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Rect { x, y, w, h }
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }
}

/// Facing of a tank or bullet. The discriminants are the sprite-frame stride
/// of each facing on the tank sheet (two frames per facing).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dir {
    Up = 0,
    Left = 2,
    Down = 4,
    Right = 6,
}

impl Dir {
    pub fn frame_stride(self) -> u8 {
        self as u8
    }

    /// Velocity of a mover heading this way at the given speed.
    pub fn velocity(self, speed: i32) -> Point {
        match self {
            Dir::Up => Point::new(0, -speed),
            Dir::Left => Point::new(-speed, 0),
            Dir::Down => Point::new(0, speed),
            Dir::Right => Point::new(speed, 0),
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Dir::Up | Dir::Down)
    }

    pub fn turned_left(self) -> Dir {
        match self {
            Dir::Up => Dir::Left,
            Dir::Left => Dir::Down,
            Dir::Down => Dir::Right,
            Dir::Right => Dir::Up,
        }
    }

    pub fn turned_right(self) -> Dir {
        match self {
            Dir::Up => Dir::Right,
            Dir::Right => Dir::Down,
            Dir::Down => Dir::Left,
            Dir::Left => Dir::Up,
        }
    }

    pub fn reversed(self) -> Dir {
        match self {
            Dir::Up => Dir::Down,
            Dir::Down => Dir::Up,
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

/// Pulls a tank onto the lane grid after an axis change. Whichever coordinate
/// is already lane-aligned identifies the movement axis; the other coordinate
/// snaps to the nearer lane line so the tank never wedges mid-cell.
pub fn snap_to_lane(pos: &mut Point) {
    let rx = pos.x.rem_euclid(HALF_TILE);
    let ry = pos.y.rem_euclid(HALF_TILE);
    if rx == 0 {
        if ry < HALF_TILE / 2 {
            pos.y -= ry;
        } else {
            pos.y += HALF_TILE - ry;
        }
    } else if ry == 0 {
        if rx < HALF_TILE / 2 {
            pos.x -= rx;
        } else {
            pos.x += HALF_TILE - rx;
        }
    }
}

/// Two-frame animation toggle shared by treads, water, power-ups and halos.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnimPhase {
    pub frame: bool,
    last_toggle: u64,
}

impl AnimPhase {
    /// Flips the frame once `rate_ms` has elapsed since the last flip.
    pub fn tick(&mut self, now: u64, rate_ms: u64) {
        if now > self.last_toggle + rate_ms {
            self.frame = !self.frame;
            self.last_toggle = now;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TankKind {
    Player,
    Basic,
    Fast,
    Power,
    Armor,
}

impl TankKind {
    pub fn speed(self) -> i32 {
        match self {
            TankKind::Player => PLAYER_SPEED,
            TankKind::Basic => 3,
            TankKind::Fast => 5,
            TankKind::Power => 4,
            TankKind::Armor => 4,
        }
    }

    /// Score for eliminating an enemy of this kind.
    pub fn score(self) -> u32 {
        match self {
            TankKind::Player => 0,
            TankKind::Basic => 100,
            TankKind::Fast => 200,
            TankKind::Power => 300,
            TankKind::Armor => 400,
        }
    }

    fn enemy_bullet_speed(self) -> i32 {
        match self {
            TankKind::Power => BULLET_SPEED_FAST,
            _ => BULLET_SPEED_SLOW,
        }
    }
}

pub const ARMOR_LIFE: u8 = 4;

/// One tank record for every variant; `kind` carries the per-kind constants.
#[derive(Debug, Clone)]
pub struct Tank {
    pub id: u32,
    pub kind: TankKind,
    pub award: bool,
    pub pos: Point,
    pub dir: Dir,
    pub velocity: Point,
    pub ready_to_move: bool,
    pub moving: bool,
    /// Player upgrade level 0..=3; unused for enemies.
    pub tier: u8,
    /// Bullets this tank currently has on the map.
    pub in_flight: u8,
    pub last_fire: u64,
    /// Armor tanks take four hits; everything else dies to one.
    pub life: u8,
    /// Bullet ids that already damaged this armor tank, so one bullet never
    /// lands twice across its sub-steps.
    pub hit_by: Vec<u64>,
    pub flash: bool,
    pub anim: AnimPhase,
    pub spawn_matchless_until: u64,
    pub powerup_matchless_until: u64,
    pub dead: bool,
}

impl Tank {
    pub fn player(tier: u8, pos: Point) -> Self {
        Tank {
            id: 0,
            kind: TankKind::Player,
            award: false,
            pos,
            dir: Dir::Up,
            velocity: Point::default(),
            ready_to_move: false,
            moving: false,
            tier: tier.min(MAX_TIER),
            in_flight: 0,
            last_fire: 0,
            life: 1,
            hit_by: Vec::new(),
            flash: false,
            anim: AnimPhase::default(),
            spawn_matchless_until: 0,
            powerup_matchless_until: 0,
            dead: false,
        }
    }

    pub fn enemy(id: u32, kind: TankKind, award: bool, pos: Point) -> Self {
        Tank {
            id,
            kind,
            award,
            pos,
            dir: Dir::Down,
            velocity: Point::default(),
            ready_to_move: false,
            moving: true,
            tier: 0,
            in_flight: 0,
            last_fire: 0,
            life: if kind == TankKind::Armor { ARMOR_LIFE } else { 1 },
            hit_by: Vec::new(),
            flash: false,
            anim: AnimPhase::default(),
            spawn_matchless_until: 0,
            powerup_matchless_until: 0,
            dead: false,
        }
    }

    pub fn speed(&self) -> i32 {
        self.kind.speed()
    }

    pub fn bullet_speed(&self) -> i32 {
        match self.kind {
            TankKind::Player => {
                if self.tier >= 1 {
                    BULLET_SPEED_FAST
                } else {
                    BULLET_SPEED_SLOW
                }
            }
            kind => kind.enemy_bullet_speed(),
        }
    }

    /// Tiers 2 and 3 may keep two bullets on the map; everyone else one.
    pub fn bullet_cap(&self) -> u8 {
        match self.kind {
            TankKind::Player if self.tier >= 2 => 2,
            _ => 1,
        }
    }

    pub fn is_matchless(&self, now: u64) -> bool {
        now < self.spawn_matchless_until || now < self.powerup_matchless_until
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, TANK_SIZE, TANK_SIZE)
    }
}

/// The player slot is explicitly absent during the respawn window instead of
/// a dangling reference that every caller has to defend against.
#[derive(Debug, Clone)]
pub enum PlayerSlot {
    Alive(Tank),
    Respawning { since: u64 },
}

impl PlayerSlot {
    pub fn tank(&self) -> Option<&Tank> {
        match self {
            PlayerSlot::Alive(tank) => Some(tank),
            PlayerSlot::Respawning { .. } => None,
        }
    }

    pub fn tank_mut(&mut self) -> Option<&mut Tank> {
        match self {
            PlayerSlot::Alive(tank) => Some(tank),
            PlayerSlot::Respawning { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulletOwner {
    Player,
    Enemy(u32),
}

impl BulletOwner {
    pub fn is_player(self) -> bool {
        matches!(self, BulletOwner::Player)
    }
}

#[derive(Debug, Clone)]
pub struct Bullet {
    pub id: u64,
    pub pos: Point,
    pub dir: Dir,
    pub speed: i32,
    pub owner: BulletOwner,
    /// Top-tier player bullets chew through steel and a double swathe of
    /// bricks.
    pub heavy: bool,
    pub alive: bool,
}

impl Bullet {
    pub fn rect(&self) -> Rect {
        // Bullet sprites are taller than wide when travelling vertically and
        // wider than tall when travelling horizontally.
        if self.dir.is_vertical() {
            Rect::new(self.pos.x, self.pos.y, 9, 12)
        } else {
            Rect::new(self.pos.x, self.pos.y, 12, 9)
        }
    }
}

/// Muzzle position for a shot leaving a tank at `pos` facing `dir`, expressed
/// as the bullet sprite's top-left corner.
pub fn fire_position(pos: Point, dir: Dir) -> Point {
    match dir {
        Dir::Up => pos.offset(18, -12),
        Dir::Left => pos.offset(-12, 21),
        Dir::Down => pos.offset(18, TANK_SIZE),
        Dir::Right => pos.offset(TANK_SIZE, 21),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerUpKind {
    Grenade,
    Helmet,
    Shovel,
    Star,
    Tank,
    Timer,
}

#[derive(Debug, Clone)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub pos: Point,
    pub spawned: u64,
    pub anim: AnimPhase,
}

impl PowerUp {
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, TILE_SIZE, TILE_SIZE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplosionKind {
    Small,
    Large,
}

impl ExplosionKind {
    /// Last frame of the sequence; the explosion disappears on reaching it.
    fn kill_frame(self) -> u8 {
        match self {
            ExplosionKind::Small => 2,
            ExplosionKind::Large => 4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Explosion {
    pub kind: ExplosionKind,
    pub pos: Point,
    pub frame: u8,
    pub done: bool,
    last_frame_time: u64,
}

impl Explosion {
    /// A small flash centered on a bullet impact point.
    pub fn small_at_hit(hit: Point) -> Self {
        Explosion {
            kind: ExplosionKind::Small,
            pos: hit.offset(-48, -48),
            frame: 0,
            done: false,
            last_frame_time: 0,
        }
    }

    /// A full blast centered over a 48px tank or the base.
    pub fn large_over(pos: Point) -> Self {
        Explosion {
            kind: ExplosionKind::Large,
            pos: pos.offset(-24, -24),
            frame: 0,
            done: false,
            last_frame_time: 0,
        }
    }

    pub fn advance(&mut self, now: u64, rate_ms: u64) {
        if now > self.last_frame_time + rate_ms {
            self.last_frame_time = now;
            self.frame += 1;
            if self.frame >= self.kind.kill_frame() {
                self.done = true;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileKind {
    Brick,
    Wall,
    Water,
    Trees,
    Ice,
}

impl TileKind {
    fn size(self) -> i32 {
        match self {
            TileKind::Brick => BRICK_SIZE,
            TileKind::Wall => WALL_SIZE,
            TileKind::Water | TileKind::Trees | TileKind::Ice => TILE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Tile {
    pub kind: TileKind,
    pub pos: Point,
    /// Brick chips alternate between two sprites in a checker pattern.
    pub variant: u8,
    /// Base tiles belong to the wall/brick collection and the base at once;
    /// rebuilding the base removes exactly these.
    pub in_base: bool,
}

impl Tile {
    pub fn new(kind: TileKind, pos: Point) -> Self {
        Tile {
            kind,
            pos,
            variant: 0,
            in_base: false,
        }
    }

    pub fn rect(&self) -> Rect {
        let size = self.kind.size();
        Rect::new(self.pos.x, self.pos.y, size, size)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Eagle {
    pub pos: Point,
    pub destroyed: bool,
}

impl Eagle {
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, TILE_SIZE, TILE_SIZE)
    }
}

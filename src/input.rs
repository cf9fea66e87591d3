use macroquad::prelude::{KeyCode, is_key_down, is_key_released};

/// Named keys the simulation consumes. The core never sees raw key codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameKey {
    Up,
    Down,
    Left,
    Right,
    Fire,
    Confirm,
    Escape,
}

const KEY_COUNT: usize = 7;

fn index(key: GameKey) -> usize {
    match key {
        GameKey::Up => 0,
        GameKey::Down => 1,
        GameKey::Left => 2,
        GameKey::Right => 3,
        GameKey::Fire => 4,
        GameKey::Confirm => 5,
        GameKey::Escape => 6,
    }
}

/// Physical key bindings for one player.
pub struct PlayerKeys {
    pub up: KeyCode,
    pub down: KeyCode,
    pub left: KeyCode,
    pub right: KeyCode,
    pub fire: KeyCode,
}

pub const PLAYER_ONE_KEYS: PlayerKeys = PlayerKeys {
    up: KeyCode::W,
    down: KeyCode::S,
    left: KeyCode::A,
    right: KeyCode::D,
    fire: KeyCode::Space,
};

/// Second seat bindings, kept alongside the first even though only one tank
/// spawns; a second slot would poll these.
#[allow(dead_code)]
pub const PLAYER_TWO_KEYS: PlayerKeys = PlayerKeys {
    up: KeyCode::Up,
    down: KeyCode::Down,
    left: KeyCode::Left,
    right: KeyCode::Right,
    fire: KeyCode::O,
};

/// One tick's worth of keyboard state: keys currently held and keys released
/// since the previous tick.
#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    held: [bool; KEY_COUNT],
    released: [bool; KEY_COUNT],
}

impl InputSnapshot {
    /// Reads the keyboard through the given bindings. Call once per rendered
    /// frame; macroquad's release edges reset on `next_frame`.
    pub fn poll(keys: &PlayerKeys) -> Self {
        let mut snapshot = InputSnapshot::default();
        snapshot.set_held(GameKey::Up, is_key_down(keys.up));
        snapshot.set_held(GameKey::Down, is_key_down(keys.down));
        snapshot.set_held(GameKey::Left, is_key_down(keys.left));
        snapshot.set_held(GameKey::Right, is_key_down(keys.right));
        snapshot.set_held(GameKey::Fire, is_key_down(keys.fire));
        snapshot.set_held(GameKey::Confirm, is_key_down(KeyCode::Enter));
        snapshot.set_held(GameKey::Escape, is_key_down(KeyCode::Escape));
        snapshot.set_released(GameKey::Up, is_key_released(keys.up));
        snapshot.set_released(GameKey::Down, is_key_released(keys.down));
        snapshot.set_released(GameKey::Fire, is_key_released(keys.fire));
        snapshot.set_released(GameKey::Confirm, is_key_released(KeyCode::Enter));
        snapshot
    }

    pub fn held(&self, key: GameKey) -> bool {
        self.held[index(key)]
    }

    pub fn released(&self, key: GameKey) -> bool {
        self.released[index(key)]
    }

    pub fn set_held(&mut self, key: GameKey, value: bool) {
        self.held[index(key)] = value;
    }

    pub fn set_released(&mut self, key: GameKey, value: bool) {
        self.released[index(key)] = value;
    }

    /// The same snapshot with release edges consumed. When one rendered frame
    /// carries several simulation steps, only the first step sees releases.
    pub fn held_only(&self) -> Self {
        InputSnapshot {
            held: self.held,
            released: [false; KEY_COUNT],
        }
    }

    /// Folds a freshly polled frame into a pending snapshot: held state is
    /// replaced, release edges accumulate. Rendered frames outnumber
    /// simulation steps, so an edge must survive until a step consumes it.
    pub fn fold_frame(&mut self, polled: &InputSnapshot) {
        self.held = polled.held;
        for i in 0..KEY_COUNT {
            self.released[i] |= polled.released[i];
        }
    }
}

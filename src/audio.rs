use log::warn;
use macroquad::audio::{Sound, load_sound_from_bytes, play_sound_once};

use crate::assets::get_asset_bytes;

/// Fire-and-forget sound effects. Every sound is optional: a missing or
/// undecodable asset downgrades to silence with a warning, never an error.
#[derive(Default)]
pub struct AudioManager {
    fire_sound: Option<Sound>,
    brick_sound: Option<Sound>,
    steel_sound: Option<Sound>,
    explosion_sound: Option<Sound>,
    bonus_sound: Option<Sound>,
    game_start_sound: Option<Sound>,
    game_over_sound: Option<Sound>,
    score_sound: Option<Sound>,
}

async fn load_effect(name: &str) -> Option<Sound> {
    let path = format!("sounds/{}.ogg", name);
    let bytes = get_asset_bytes(&path)?;
    match load_sound_from_bytes(&bytes).await {
        Ok(sound) => Some(sound),
        Err(e) => {
            warn!("Failed to decode sound '{}': {}", path, e);
            None
        }
    }
}

impl AudioManager {
    pub fn new() -> Self {
        Default::default()
    }

    // Load all required sound assets
    pub async fn load_assets(&mut self) {
        self.fire_sound = load_effect("fire").await;
        self.brick_sound = load_effect("brick").await;
        self.steel_sound = load_effect("steel").await;
        self.explosion_sound = load_effect("explosion").await;
        self.bonus_sound = load_effect("bonus").await;
        self.game_start_sound = load_effect("gamestart").await;
        self.game_over_sound = load_effect("gameover").await;
        self.score_sound = load_effect("score").await;
    }

    fn play(sound: &Option<Sound>) {
        if let Some(sound) = sound {
            play_sound_once(sound);
        }
    }

    // Player shot leaving the barrel
    pub fn play_fire(&self) {
        Self::play(&self.fire_sound);
    }

    // Bullet chewing through a brick wall
    pub fn play_brick(&self) {
        Self::play(&self.brick_sound);
    }

    // Bullet pinging off steel or the field edge
    pub fn play_steel(&self) {
        Self::play(&self.steel_sound);
    }

    // Tank or base going up
    pub fn play_explosion(&self) {
        Self::play(&self.explosion_sound);
    }

    // Power-up pickup
    pub fn play_bonus(&self) {
        Self::play(&self.bonus_sound);
    }

    // Level start jingle
    pub fn play_game_start(&self) {
        Self::play(&self.game_start_sound);
    }

    // Game over jingle
    pub fn play_game_over(&self) {
        Self::play(&self.game_over_sound);
    }

    // Scoring board tally blip
    pub fn play_score(&self) {
        Self::play(&self.score_sound);
    }
}

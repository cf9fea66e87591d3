use crate::audio::AudioManager;
use crate::config::STARTING_LIVES;
use crate::input::InputSnapshot;

/// Run state that outlives a single level: the running score plus the tank
/// tier and lives a won level hands to the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carry {
    pub score: u32,
    pub tier: u8,
    pub lives: i32,
}

impl Default for Carry {
    fn default() -> Self {
        Carry {
            score: 0,
            tier: 0,
            lives: STARTING_LIVES,
        }
    }
}

/// Everything a screen needs for one simulation step. Threaded explicitly
/// into each `tick` instead of living in globals.
pub struct RunContext<'a> {
    /// Milliseconds of simulation time since launch, advancing 33ms per step.
    pub now: u64,
    pub input: &'a InputSnapshot,
    pub audio: &'a AudioManager,
    pub carry: &'a mut Carry,
}

/// What a screen wants the outer driver to do after a tick. Screens never
/// construct their successors; they only name them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Stay,
    ToMenu,
    ToLevelSelect { level: u32, choose: bool },
    ToGame { level: u32 },
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_carry_matches_a_fresh_run() {
        let carry = Carry::default();
        assert_eq!(carry.score, 0);
        assert_eq!(carry.tier, 0);
        assert_eq!(carry.lives, STARTING_LIVES);
    }
}

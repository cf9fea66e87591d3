use crate::config::{BOARD_GAME_OVER_EXTRA_STEPS, BOARD_REVEAL_MS, BOARD_SUCCESS_EXTRA_STEPS};
use crate::context::{RunContext, Transition};
use crate::game::{KillTally, LevelReport};
use crate::level;

/// Enemy classes in the order the board tallies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TankClass {
    Basic,
    Fast,
    Power,
    Armor,
}

impl TankClass {
    pub fn points(self) -> u32 {
        match self {
            TankClass::Basic => 100,
            TankClass::Fast => 200,
            TankClass::Power => 300,
            TankClass::Armor => 400,
        }
    }

    pub fn row(self) -> usize {
        match self {
            TankClass::Basic => 0,
            TankClass::Fast => 1,
            TankClass::Power => 2,
            TankClass::Armor => 3,
        }
    }
}

/// One flicker of the tally: either another kill of a class counts up, or a
/// class with no kills prints its zero line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reveal {
    Count(TankClass),
    Zero(TankClass),
}

fn reveal_list(kills: &KillTally) -> Vec<Reveal> {
    let mut list = Vec::new();
    for (class, count) in [
        (TankClass::Basic, kills.basic),
        (TankClass::Fast, kills.fast),
        (TankClass::Power, kills.power),
        (TankClass::Armor, kills.armor),
    ] {
        if count > 0 {
            for _ in 0..count {
                list.push(Reveal::Count(class));
            }
        } else {
            list.push(Reveal::Zero(class));
        }
    }
    list
}

/// The post-level scoring board: kill counts flicker in one at a time with a
/// blip each, then the total, then the screen hands the run onward.
pub struct Board {
    pub level: u32,
    pub success: bool,
    pub run_score: u32,
    /// Kills revealed so far, per class row.
    pub counters: [u32; 4],
    /// Set once every class has been replayed.
    pub total_shown: bool,
    /// Swaps the tally for the full-screen card after a lost run.
    pub showing_game_over_card: bool,
    reveals: Vec<Reveal>,
    spawn_time: u64,
    last_order: u64,
    game_over_sound_played: bool,
}

impl Board {
    pub fn new(report: &LevelReport, run_score: u32, now: u64) -> Self {
        Board {
            level: report.level,
            success: report.success,
            run_score,
            counters: [0; 4],
            total_shown: false,
            showing_game_over_card: false,
            reveals: reveal_list(&report.kills),
            spawn_time: now,
            last_order: 0,
            game_over_sound_played: false,
        }
    }

    pub fn total_kills(&self) -> u32 {
        self.counters.iter().sum()
    }

    pub fn tick(&mut self, ctx: &RunContext) -> Transition {
        let total = self.reveals.len() as u64;
        let tally_done = self.spawn_time + (total + BOARD_SUCCESS_EXTRA_STEPS) * BOARD_REVEAL_MS;

        if ctx.now > tally_done {
            if self.success {
                if self.level >= level::max_level() {
                    // The campaign ends back at the title screen.
                    return Transition::ToMenu;
                }
                return Transition::ToLevelSelect {
                    level: self.level + 1,
                    choose: false,
                };
            }
            // A lost run lingers on the game-over card before the menu.
            let card_done =
                self.spawn_time + (total + BOARD_GAME_OVER_EXTRA_STEPS) * BOARD_REVEAL_MS;
            if ctx.now > card_done {
                return Transition::ToMenu;
            }
            if !self.game_over_sound_played {
                ctx.audio.play_game_over();
                self.game_over_sound_played = true;
            }
            self.showing_game_over_card = true;
            return Transition::Stay;
        }

        // Each elapsed reveal interval uncovers one more line of the tally.
        let order = (ctx.now - self.spawn_time) / BOARD_REVEAL_MS;
        if order != self.last_order {
            self.last_order = order;
            if order >= 1 && order <= total {
                ctx.audio.play_score();
                match self.reveals[(order - 1) as usize] {
                    Reveal::Count(class) => self.counters[class.row()] += 1,
                    Reveal::Zero(_) => {}
                }
            }
            if order == total + 1 {
                ctx.audio.play_score();
                self.total_shown = true;
            }
        }
        Transition::Stay
    }
}

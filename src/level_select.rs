use crate::config::{AUTO_START_MS, CURTAIN_CLOSED, CURTAIN_OPEN, CURTAIN_STEP, SCREEN_PAINT_MS};
use crate::context::{RunContext, Transition};
use crate::input::GameKey;
use crate::level;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SelectPhase {
    /// Grey curtains close from both edges to meet mid-screen.
    Closing,
    Choosing,
    /// Curtains pull back to reveal the battlefield underneath.
    Opening,
}

/// The STAGE chooser between menu and play. Arriving from a won level the
/// stage is fixed and the screen starts the next level on its own.
pub struct LevelSelect {
    pub level: u32,
    /// Whether the player may change the stage number.
    allow_change: bool,
    phase: SelectPhase,
    /// Height of each curtain half in screen pixels.
    pub curtain: i32,
    last_paint: u64,
    entered_at: u64,
}

impl LevelSelect {
    pub fn new(level: u32, allow_change: bool, now: u64) -> Self {
        LevelSelect {
            level: level.clamp(1, level::max_level()),
            allow_change,
            phase: SelectPhase::Closing,
            curtain: 0,
            last_paint: 0,
            entered_at: now,
        }
    }

    /// True once the curtain has met in the middle and the stage number is
    /// showing.
    pub fn showing_stage(&self) -> bool {
        self.phase != SelectPhase::Closing
    }

    /// True while the curtain pulls back onto the battlefield.
    pub fn opening(&self) -> bool {
        self.phase == SelectPhase::Opening
    }

    pub fn tick(&mut self, ctx: &RunContext) -> Transition {
        match self.phase {
            SelectPhase::Closing => {
                if self.curtain >= CURTAIN_CLOSED {
                    self.curtain = CURTAIN_CLOSED;
                    self.phase = SelectPhase::Choosing;
                    // The auto-start clock runs from here when choosing is
                    // locked.
                    self.entered_at = ctx.now;
                } else if ctx.now > self.last_paint + SCREEN_PAINT_MS {
                    self.last_paint = ctx.now;
                    self.curtain += CURTAIN_STEP;
                }
                Transition::Stay
            }
            SelectPhase::Choosing => {
                if self.allow_change {
                    if ctx.input.released(GameKey::Up) {
                        self.level = (self.level + 1).min(level::max_level());
                    } else if ctx.input.released(GameKey::Down) {
                        self.level = (self.level - 1).max(1);
                    } else if ctx.input.released(GameKey::Confirm) {
                        ctx.audio.play_game_start();
                        self.phase = SelectPhase::Opening;
                    }
                } else if ctx.now > self.entered_at + AUTO_START_MS {
                    ctx.audio.play_game_start();
                    self.phase = SelectPhase::Opening;
                }
                Transition::Stay
            }
            SelectPhase::Opening => {
                if self.curtain <= CURTAIN_OPEN {
                    return Transition::ToGame { level: self.level };
                }
                if ctx.now > self.last_paint + SCREEN_PAINT_MS {
                    self.last_paint = ctx.now;
                    self.curtain = (self.curtain - CURTAIN_STEP).max(CURTAIN_OPEN);
                }
                Transition::Stay
            }
        }
    }
}

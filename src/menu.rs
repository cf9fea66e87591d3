use crate::config::{MENU_POINTER_ANIM_MS, MENU_RISE_STEP, SCREEN_PAINT_MS, WINDOW_HEIGHT};
use crate::context::{RunContext, Transition};
use crate::entities::AnimPhase;
use crate::input::GameKey;

/// Rows on the title screen. Only the first seat is wired to a tank; the
/// cursor still walks all three entries.
pub const MENU_CHOICES: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuPhase {
    /// The background art scrolls up from below the screen.
    Rising,
    Ready,
}

/// The title screen: rising background, then a tank-shaped pointer that
/// picks a row.
pub struct Menu {
    phase: MenuPhase,
    /// Top of the background image in screen pixels; 0 is at rest.
    pub background_y: i32,
    pub choice: u8,
    pub pointer_anim: AnimPhase,
    last_rise: u64,
}

impl Menu {
    pub fn new() -> Self {
        Menu {
            phase: MenuPhase::Rising,
            background_y: WINDOW_HEIGHT,
            choice: 0,
            pointer_anim: AnimPhase::default(),
            last_rise: 0,
        }
    }

    /// True once the pointer is on screen; the renderer hides it during the
    /// rise.
    pub fn ready(&self) -> bool {
        self.phase == MenuPhase::Ready
    }

    pub fn tick(&mut self, ctx: &RunContext) -> Transition {
        match self.phase {
            MenuPhase::Rising => {
                // Enter skips the scroll.
                if ctx.input.released(GameKey::Confirm) {
                    self.background_y = 0;
                }
                if ctx.now > self.last_rise + SCREEN_PAINT_MS {
                    self.last_rise = ctx.now;
                    if self.background_y <= 0 {
                        self.background_y = 0;
                        self.phase = MenuPhase::Ready;
                    } else {
                        self.background_y -= MENU_RISE_STEP;
                    }
                }
                Transition::Stay
            }
            MenuPhase::Ready => {
                self.pointer_anim.tick(ctx.now, MENU_POINTER_ANIM_MS);
                if ctx.input.released(GameKey::Down) {
                    self.choice = (self.choice + 1) % MENU_CHOICES;
                } else if ctx.input.released(GameKey::Up) {
                    self.choice = (self.choice + MENU_CHOICES - 1) % MENU_CHOICES;
                } else if ctx.input.held(GameKey::Confirm) {
                    return Transition::ToLevelSelect {
                        level: 1,
                        choose: true,
                    };
                }
                Transition::Stay
            }
        }
    }
}

impl Default for Menu {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioManager;
    use crate::context::Carry;
    use crate::input::InputSnapshot;

    fn drive(menu: &mut Menu, now: u64, input: &InputSnapshot) -> Transition {
        let audio = AudioManager::new();
        let mut carry = Carry::default();
        let ctx = RunContext {
            now,
            input,
            audio: &audio,
            carry: &mut carry,
        };
        menu.tick(&ctx)
    }

    #[test]
    fn test_background_rises_then_menu_is_ready() {
        let mut menu = Menu::new();
        let quiet = InputSnapshot::default();
        let mut now = 0;
        while !menu.ready() && now < 10_000 {
            now += 33;
            drive(&mut menu, now, &quiet);
        }
        assert!(menu.ready(), "rise finishes well inside ten seconds");
        assert_eq!(menu.background_y, 0);
    }

    #[test]
    fn test_confirm_skips_the_rise() {
        let mut menu = Menu::new();
        let mut skip = InputSnapshot::default();
        skip.set_released(GameKey::Confirm, true);
        drive(&mut menu, 40, &skip);
        let quiet = InputSnapshot::default();
        drive(&mut menu, 80, &quiet);
        assert!(menu.ready());
    }

    #[test]
    fn test_pointer_wraps_both_ways() {
        let mut menu = Menu::new();
        menu.phase = MenuPhase::Ready;
        let mut down = InputSnapshot::default();
        down.set_released(GameKey::Down, true);
        for _ in 0..MENU_CHOICES {
            drive(&mut menu, 100, &down);
        }
        assert_eq!(menu.choice, 0, "wraps after the last row");
        let mut up = InputSnapshot::default();
        up.set_released(GameKey::Up, true);
        drive(&mut menu, 100, &up);
        assert_eq!(menu.choice, MENU_CHOICES - 1);
    }

    #[test]
    fn test_confirm_opens_level_select() {
        let mut menu = Menu::new();
        menu.phase = MenuPhase::Ready;
        let mut confirm = InputSnapshot::default();
        confirm.set_held(GameKey::Confirm, true);
        assert_eq!(
            drive(&mut menu, 100, &confirm),
            Transition::ToLevelSelect {
                level: 1,
                choose: true
            }
        );
    }
}

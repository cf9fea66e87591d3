mod ai;
mod assets;
mod audio;
mod board;
mod config;
mod context;
mod entities;
mod field;
mod game;
mod input;
mod level;
mod level_select;
mod logging;
mod menu;
mod render;

use clap::Parser;
use log::{error, info, LevelFilter};
use macroquad::prelude::*;
use std::process;

use crate::audio::AudioManager;
use crate::board::Board;
use crate::config::{STEP_MS, WINDOW_HEIGHT, WINDOW_WIDTH};
use crate::context::{Carry, RunContext, Transition};
use crate::game::Game;
use crate::input::{GameKey, InputSnapshot, PLAYER_ONE_KEYS};
use crate::level_select::LevelSelect;
use crate::menu::Menu;
use crate::render::Renderer;

// --- Command Line Arguments ---
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Skip the menu and open the stage chooser at this level.
    #[arg(long)]
    level: Option<u32>,

    /// Debug filter to specify log topics (e.g., "game,ai,bullet,powerup")
    #[arg(long)]
    debug_filter: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Steel City".to_owned(),
        window_width: WINDOW_WIDTH,
        window_height: WINDOW_HEIGHT,
        window_resizable: false,
        ..Default::default()
    }
}

/// The four coarse program states. The driver below owns them and consumes
/// the transitions their ticks return.
enum Screen {
    Menu(Menu),
    Select(LevelSelect),
    Playing(Box<Game>),
    Board(Board),
}

fn start_level(level: u32, carry: &Carry) -> Box<Game> {
    match Game::new(level, carry.tier, carry.lives) {
        Ok(game) => Box::new(game),
        Err(e) => {
            // A missing or broken grid is fatal: there is nothing to play.
            error!("Cannot start level {}: {}", level, e);
            process::exit(1);
        }
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize the logger
    let log_level = match args.log_level.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };
    if let Err(e) = logging::init_logger(log_level, args.debug_filter) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }

    info!("Initializing Steel City...");

    let mut audio = AudioManager::new();
    audio.load_assets().await;

    let renderer = Renderer::new();
    info!("Renderer initialized.");

    let mut carry = Carry::default();
    let mut screen = match args.level {
        Some(level) => Screen::Select(LevelSelect::new(level, true, 0)),
        None => Screen::Menu(Menu::new()),
    };

    // Fixed-timestep loop: render at whatever rate the display runs, step
    // the simulation at exactly 30 steps per second.
    let step_duration = STEP_MS as f32 / 1000.0;
    let mut time_accumulator = 0.0_f32;
    let mut now_ms: u64 = 0;
    let mut snapshot = InputSnapshot::default();

    'run: loop {
        if is_key_down(KeyCode::Escape) || is_quit_requested() {
            break 'run;
        }

        time_accumulator += get_frame_time();
        // Release edges last one rendered frame, so they are folded into the
        // pending snapshot until a simulation step consumes them.
        snapshot.fold_frame(&InputSnapshot::poll(&PLAYER_ONE_KEYS));

        while time_accumulator >= step_duration {
            time_accumulator -= step_duration;
            now_ms += STEP_MS;

            if snapshot.held(GameKey::Escape) {
                break 'run;
            }

            let mut ctx = RunContext {
                now: now_ms,
                input: &snapshot,
                audio: &audio,
                carry: &mut carry,
            };

            let mut finished_level: Option<Board> = None;
            let transition = match &mut screen {
                Screen::Menu(menu) => menu.tick(&ctx),
                Screen::Select(select) => select.tick(&ctx),
                Screen::Board(board) => board.tick(&ctx),
                Screen::Playing(game) => {
                    if let Some(report) = game.tick(&mut ctx) {
                        // The report arrives with the level's score already
                        // folded into the carried total.
                        finished_level = Some(Board::new(&report, ctx.carry.score, now_ms));
                    }
                    Transition::Stay
                }
            };
            if let Some(board) = finished_level {
                screen = Screen::Board(board);
            }

            match transition {
                Transition::Stay => {}
                Transition::ToMenu => {
                    // A fresh run starts from scratch.
                    carry = Carry::default();
                    screen = Screen::Menu(Menu::new());
                }
                Transition::ToLevelSelect { level, choose } => {
                    screen = Screen::Select(LevelSelect::new(level, choose, now_ms));
                }
                Transition::ToGame { level } => {
                    screen = Screen::Playing(start_level(level, &carry));
                }
                Transition::Quit => break 'run,
            }

            // When one rendered frame carries several steps, release edges
            // only count once.
            snapshot = snapshot.held_only();
        }

        match &screen {
            Screen::Menu(menu) => renderer.draw_menu(menu),
            Screen::Select(select) => renderer.draw_level_select(select),
            Screen::Playing(game) => renderer.draw_game(game, now_ms),
            Screen::Board(board) => renderer.draw_board(board),
        }
        next_frame().await;
    }

    info!("Exiting Steel City.");
}

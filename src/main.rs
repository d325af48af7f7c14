/// Entry point and frame loop.
///
/// The terminal host around the engine: it polls keyboard, mouse and
/// gamepad, turns them into activation / heading / dismiss signals, advances
/// the engine on a millisecond clock, and paints whatever state it holds.

mod config;
mod domain;
mod logger;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use config::AppConfig;
use sim::engine::Engine;
use sim::event::EngineEvent;
use sim::state::EngineState;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

/// Banner highlight animation rate (presentation only).
const ANIM_RATE: Duration = Duration::from_millis(50);

// ── Key Constants ──

const KEYS_ACTIVATE: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
const KEYS_DISMISS: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];
const KEYS_PAUSE: &[KeyCode] = &[KeyCode::Char('p'), KeyCode::Char('P')];

fn main() {
    let (config, warnings) = AppConfig::load();

    if let Err(e) = logger::init(&config.log) {
        eprintln!("Logging disabled: could not open {}: {e}", config.log.file.display());
    }
    for w in &warnings {
        log::warn!("{w}; using defaults");
    }
    log::info!(
        "snake-loader starting (growth: {:?}, seed: {:?})",
        config.engine.growth, config.engine.seed
    );

    let mut engine = match config.engine.seed {
        Some(seed) => Engine::seeded(seed, config.engine.growth),
        None => Engine::from_os(config.engine.growth),
    };

    let mut renderer = Renderer::new(config.display.clone());

    if let Err(e) = renderer.init() {
        log::error!("terminal init failed: {e}");
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = frame_loop(&mut engine, &mut renderer, sound.as_ref(), &config);

    // Every exit path ends here: no timer survives the host.
    engine.teardown();

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        log::error!("frame loop failed: {e}");
        eprintln!("Error: {e}");
    }
}

fn frame_loop(
    engine: &mut Engine,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    if gp.connected {
        log::info!("gamepad detected");
    }

    let clock = Instant::now();
    let mut anim_tick: u64 = 0;
    let mut last_anim = Instant::now();
    let mut paused = false;

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() || kb.any_pressed(KEYS_DISMISS) || gp.dismiss_pressed() {
            log::info!("dismissed by user");
            break;
        }

        let now = clock.elapsed().as_millis() as u64;

        // Pause stops the ticks; resuming rescatters.
        if kb.any_pressed(KEYS_PAUSE) {
            if engine.is_running() {
                engine.deactivate();
                paused = true;
            } else {
                engine.activate(now);
                paused = false;
            }
        }

        let gp_headings = gp.headings();
        let layout = renderer.layout();
        let hovered = kb.pointer().iter().any(|&(col, row)| layout.cell_at(col, row).is_some());
        let steered = !kb.headings().is_empty() || !gp_headings.is_empty();
        let pressed = kb.any_pressed(KEYS_ACTIVATE) || gp.activate_pressed();

        if wants_activation(paused, hovered || steered || pressed) {
            if engine.activate(now).is_some() {
                if let Some(sfx) = sound {
                    sfx.play_activate();
                }
            }
        }

        // Arrival order: last one wins on the next tick.
        for &h in kb.headings().iter().chain(gp_headings.iter()) {
            engine.set_heading(h);
        }

        let events = engine.advance(now);
        process_sound_events(sound, &events, engine.state());

        if last_anim.elapsed() >= ANIM_RATE {
            anim_tick = anim_tick.wrapping_add(1);
            last_anim = Instant::now();
        }

        renderer.render(engine.state(), anim_tick, engine.respawn_pending())?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// While paused only the pause key resumes.
fn wants_activation(paused: bool, triggered: bool) -> bool {
    triggered && !paused
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[EngineEvent], state: &EngineState) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    let total = state.letters.len();
    let eaten = total - domain::letter::remaining(&state.letters);
    for event in events {
        match event {
            EngineEvent::LetterEaten { .. } => sfx.play_eat(eaten.saturating_sub(1), total),
            EngineEvent::AllEaten => sfx.play_complete(),
            EngineEvent::Respawned => sfx.play_respawn(),
            _ => {}
        }
    }
}

//! Bubble Pop entry point
//!
//! On the web this wires DOM events and `requestAnimationFrame` to the
//! simulation and publishes a snapshot per frame. Natively it runs a short
//! headless demo of both modes.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Element, Event, MouseEvent, TouchEvent};

    use bubble_pop::consts::*;
    use bubble_pop::sim::{GameState, Input, Mode, advance_to, apply_input};
    use bubble_pop::{Snapshot, Tuning};

    type Listener = Closure<dyn FnMut(Event)>;

    /// Buttons of the surrounding page and the input each one sends
    const BUTTONS: [(&str, Input); 8] = [
        ("start", Input::OpenModeSelect),
        ("mode-click", Input::SelectMode(Mode::Click)),
        ("mode-move", Input::SelectMode(Mode::Move)),
        ("back", Input::Back),
        ("home", Input::Back),
        ("pause", Input::TogglePause),
        ("resume", Input::TogglePause),
        ("theme-toggle", Input::ToggleTheme),
    ];

    /// Global listeners that only exist during a Move session
    const DRAG_EVENTS: [&str; 4] = ["mousemove", "touchmove", "mouseup", "touchend"];

    /// Game instance holding all state
    struct Game {
        state: GameState,
        drag_listeners: Vec<(&'static str, Listener)>,
    }

    impl Game {
        fn new(seed: u64, tuning: Tuning, viewport: Vec2) -> Self {
            Self {
                state: GameState::new(seed, tuning, viewport),
                drag_listeners: Vec::new(),
            }
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Bubble Pop starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let tuning = load_tuning(&document);
        let viewport = viewport_size(&window);
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, tuning, viewport)));
        log::info!("Game initialized with seed: {}", seed);

        setup_bubble_handlers(&document, game.clone());
        setup_buttons(&document, game.clone());
        setup_auto_pause(game.clone());
        setup_resize(game.clone());

        request_animation_frame(game);

        log::info!("Bubble Pop running!");
        Ok(())
    }

    /// Optional tuning overrides from `<script id="bubble-tuning" type="application/json">`
    fn load_tuning(document: &web_sys::Document) -> Tuning {
        let Some(json) = document
            .get_element_by_id("bubble-tuning")
            .and_then(|el| el.text_content())
        else {
            return Tuning::default();
        };

        match Tuning::from_json(&json) {
            Ok(tuning) => {
                log::info!("Loaded tuning overrides");
                tuning
            }
            Err(e) => {
                log::warn!("Ignoring malformed tuning: {}", e);
                Tuning::default()
            }
        }
    }

    fn viewport_size(window: &web_sys::Window) -> Vec2 {
        let w = window.inner_width().ok().and_then(|v| v.as_f64());
        let h = window.inner_height().ok().and_then(|v| v.as_f64());
        Vec2::new(
            w.map_or(DEFAULT_VIEWPORT_WIDTH, |w| w as f32),
            h.map_or(DEFAULT_VIEWPORT_HEIGHT, |h| h as f32),
        )
    }

    /// Apply one input, then attach or detach the drag listeners so they
    /// exist exactly while a Move session is running
    fn dispatch(game: &Rc<RefCell<Game>>, input: Input) -> bool {
        let (changed, in_move) = {
            let mut g = game.borrow_mut();
            let changed = apply_input(&mut g.state, input);
            (changed, g.state.mode() == Some(Mode::Move))
        };

        let attached = !game.borrow().drag_listeners.is_empty();
        if in_move && !attached {
            attach_drag_listeners(game);
        } else if !in_move && attached {
            detach_drag_listeners(game);
        }
        changed
    }

    fn attach_drag_listeners(game: &Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        let mut listeners = Vec::with_capacity(DRAG_EVENTS.len());
        for name in DRAG_EVENTS {
            let game_ref = game.clone();
            let is_move = name.ends_with("move");
            let closure = Listener::new(move |event: Event| {
                if is_move {
                    if let Some(pos) = pointer_position(&event) {
                        dispatch(&game_ref, Input::UpdateDrag(pos));
                    }
                } else {
                    dispatch(&game_ref, Input::EndDrag);
                }
            });
            let _ = window.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            listeners.push((name, closure));
        }

        game.borrow_mut().drag_listeners = listeners;
        log::debug!("Drag listeners attached");
    }

    fn detach_drag_listeners(game: &Rc<RefCell<Game>>) {
        let listeners = std::mem::take(&mut game.borrow_mut().drag_listeners);
        if let Some(window) = web_sys::window() {
            for (name, closure) in &listeners {
                let _ = window
                    .remove_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            }
        }
        log::debug!("Drag listeners detached");
    }

    fn pointer_position(event: &Event) -> Option<Vec2> {
        if let Some(touch) = event.dyn_ref::<TouchEvent>() {
            let first = touch.touches().get(0)?;
            return Some(Vec2::new(first.client_x() as f32, first.client_y() as f32));
        }
        let mouse = event.dyn_ref::<MouseEvent>()?;
        Some(Vec2::new(mouse.client_x() as f32, mouse.client_y() as f32))
    }

    /// Bubble id from the `data-bubble-id` attribute of the event target or
    /// one of its ancestors
    fn bubble_id(event: &Event) -> Option<u32> {
        let target = event.target()?.dyn_into::<Element>().ok()?;
        let bubble = target.closest("[data-bubble-id]").ok().flatten()?;
        bubble.get_attribute("data-bubble-id")?.parse().ok()
    }

    fn setup_bubble_handlers(document: &web_sys::Document, game: Rc<RefCell<Game>>) {
        let handlers: [(&str, fn(u32) -> Input); 3] = [
            ("click", Input::Activate),
            ("mousedown", Input::BeginDrag),
            ("touchstart", Input::BeginDrag),
        ];

        for (name, make_input) in handlers {
            let game = game.clone();
            let closure = Listener::new(move |event: Event| {
                // Only a started drag suppresses the default, so taps still click
                if let Some(id) = bubble_id(&event) {
                    if dispatch(&game, make_input(id)) && name != "click" {
                        event.prevent_default();
                    }
                }
            });
            let _ =
                document.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(document: &web_sys::Document, game: Rc<RefCell<Game>>) {
        for (id, input) in BUTTONS {
            let Some(btn) = document.get_element_by_id(id) else {
                log::warn!("Button #{} not found", id);
                continue;
            };
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                dispatch(&game, input);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Page hidden (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    dispatch(&game, Input::FocusLost);
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                dispatch(&game, Input::FocusLost);
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: Event| {
            if let Some(window) = web_sys::window() {
                dispatch(&game, Input::Resize(viewport_size(&window)));
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            log::error!("No window, game loop stopped");
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let frame = {
            let mut g = game.borrow_mut();
            advance_to(&mut g.state, time.max(0.0) as u64);
            (g.state.is_dark, Snapshot::capture(&g.state).to_json())
        };

        // Page listeners may send input back, so nothing is borrowed here
        match frame {
            (is_dark, Ok(json)) => present(is_dark, &json),
            (_, Err(e)) => log::warn!("Snapshot serialization failed: {}", e),
        }

        request_animation_frame(game);
    }

    /// Hand the frame to the page: theme class on `<html>` and the snapshot
    /// as JSON in a `bubble-frame` event on `window`
    fn present(is_dark: bool, json: &str) {
        let Some(window) = web_sys::window() else {
            return;
        };

        if let Some(root) = window.document().and_then(|d| d.document_element()) {
            let _ = root.class_list().toggle_with_force("dark", is_dark);
        }

        let init = web_sys::CustomEventInit::new();
        init.set_detail(&JsValue::from_str(json));
        if let Ok(event) = web_sys::CustomEvent::new_with_event_init_dict("bubble-frame", &init) {
            let _ = window.dispatch_event(&event);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Startup happens in wasm_main; the bin target still needs a main
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Bubble Pop (native) starting...");
    log::info!("Native mode runs a headless demo - serve the wasm build for the real game");

    let mut args = std::env::args().skip(1);
    let seed = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(bubble_pop::consts::DEFAULT_SEED);

    let tuning = match args.next() {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(json) => match bubble_pop::Tuning::from_json(&json) {
                Ok(tuning) => tuning,
                Err(e) => {
                    log::error!("Invalid tuning file {}: {}", path, e);
                    std::process::exit(2);
                }
            },
            Err(e) => {
                log::error!("Can't read tuning file {}: {}", path, e);
                std::process::exit(2);
            }
        },
        None => bubble_pop::Tuning::default(),
    };

    let click = demo::click_session(seed, tuning.clone());
    println!("Click demo: score {} (difficulty {:.1})", click.0, click.1);
    let moved = demo::move_session(seed, tuning);
    println!("Move demo: score {} (difficulty {:.1})", moved.0, moved.1);
}

/// Scripted players for the native demo
#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use bubble_pop::consts::*;
    use bubble_pop::sim::{GameState, Input, Mode, advance_to, apply_input};
    use bubble_pop::{Snapshot, Tuning};
    use glam::Vec2;

    const DEMO_LENGTH_MS: u64 = 60_000;
    const FRAME_MS: u64 = 16;
    /// The scripted player acts this often
    const REACTION_MS: u64 = 400;

    fn new_game(seed: u64, tuning: Tuning) -> GameState {
        let viewport = Vec2::new(DEFAULT_VIEWPORT_WIDTH, DEFAULT_VIEWPORT_HEIGHT);
        GameState::new(seed, tuning, viewport)
    }

    /// Run frames until `DEMO_LENGTH_MS`, letting `act` play every reaction period
    fn play(state: &mut GameState, mut act: impl FnMut(&mut GameState)) {
        let mut now = 0;
        while now < DEMO_LENGTH_MS {
            now += FRAME_MS;
            let report = advance_to(state, now);
            if report.difficulty_changed {
                log::info!("t={}s difficulty {:.1}", now / 1000, state.difficulty);
            }
            if now % REACTION_MS < FRAME_MS {
                act(state);
            }
        }
        if let Ok(json) = Snapshot::capture(state).to_json() {
            log::debug!("Final snapshot: {} bytes", json.len());
        }
    }

    /// Click the bubble closest to escaping
    pub fn click_session(seed: u64, tuning: Tuning) -> (u64, f32) {
        let mut state = new_game(seed, tuning);
        apply_input(&mut state, Input::OpenModeSelect);
        apply_input(&mut state, Input::SelectMode(Mode::Click));

        play(&mut state, |state| {
            let target = state
                .store
                .bubbles()
                .iter()
                .filter(|b| b.pos.y < state.viewport.y)
                .min_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
                .map(|b| b.id);
            if let Some(id) = target {
                apply_input(state, Input::Activate(id));
            }
        });

        let result = (state.score, state.difficulty);
        apply_input(&mut state, Input::Back);
        result
    }

    /// Drag the oldest visible bubble onto its zone
    pub fn move_session(seed: u64, tuning: Tuning) -> (u64, f32) {
        let mut state = new_game(seed, tuning);
        apply_input(&mut state, Input::SelectMode(Mode::Move));

        play(&mut state, |state| {
            let zone_w = state.tuning.zone.width;
            let zone_h = state.tuning.zone.height;
            let target = state.store.zones().iter().find_map(|zone| {
                let bubble = state.store.bubble(zone.bubble_id)?;
                if bubble.pos.y >= state.viewport.y {
                    return None;
                }
                let x = zone.side.zone_x(state.viewport.x, zone_w);
                Some((bubble.id, Vec2::new(x + zone_w / 2.0, zone.y + zone_h / 2.0)))
            });

            if let Some((id, drop_at)) = target {
                apply_input(state, Input::BeginDrag(id));
                apply_input(state, Input::UpdateDrag(drop_at));
                apply_input(state, Input::EndDrag);
            }
        });

        let result = (state.score, state.difficulty);
        apply_input(&mut state, Input::Back);
        result
    }
}

//! Gravity Well entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Event, EventTarget, HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent, WheelEvent};

    use gravity_well::audio::AudioManager;
    use gravity_well::persistence::LocalStorageStore;
    use gravity_well::platform::{InputController, InputEvent, PointerButton};
    use gravity_well::render::{HudData, RenderSurface};
    use gravity_well::renderer::RenderState;
    use gravity_well::sim::{GameEvent, GameMachine, GamePhase, LevelTable};
    use gravity_well::{GameLoop, Settings, Tuning};

    /// A DOM listener kept so it can be detached on teardown
    struct Listener {
        target: EventTarget,
        kind: &'static str,
        closure: Closure<dyn FnMut(Event)>,
    }

    /// Browser host holding the loop and everything attached to the page
    struct Host {
        game: GameLoop,
        render_state: Option<RenderState>,
        audio: AudioManager,
        settings: Settings,
        canvas: HtmlCanvasElement,
        raf_id: Option<i32>,
        listeners: Vec<Listener>,
    }

    impl Host {
        /// Run one display frame
        fn frame(&mut self, time: f64) {
            self.game.frame(time);
            self.game
                .render_to(self.render_state.as_mut().map(|s| s as &mut dyn RenderSurface));

            for cue in self.game.drain_cues() {
                self.audio.play(cue);
            }
            for event in self.game.drain_events() {
                report_event(&event);
            }

            self.update_hud();
        }

        /// Match the backing store to the displayed size
        fn resize(&mut self) {
            let Some(window) = web_sys::window() else { return };
            let dpr = window.device_pixel_ratio();
            let client_w = self.canvas.client_width();
            let client_h = self.canvas.client_height();
            let width = (client_w as f64 * dpr) as u32;
            let height = (client_h as f64 * dpr) as u32;
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            if let Some(render_state) = &mut self.render_state {
                render_state.resize(width, height);
            }
            self.game.push_event(InputEvent::Resize {
                width: client_w as f32,
                height: client_h as f32,
            });
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let hud: HudData = self.game.snapshot().hud;

            let set_text = |selector: &str, text: &str| {
                if let Some(el) = document.query_selector(selector).ok().flatten() {
                    if el.text_content().as_deref() != Some(text) {
                        el.set_text_content(Some(text));
                    }
                }
            };
            let show = |id: &str, visible: bool| {
                if let Some(el) = document.get_element_by_id(id) {
                    let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
                }
            };

            set_text("#hud-score .hud-value", &hud.score.to_string());
            set_text("#hud-best .hud-value", &hud.high_score.to_string());
            set_text(
                "#hud-level .hud-value",
                &format!("{} {}", hud.level, hud.level_name),
            );
            set_text("#hud-wells .hud-value", &hud.wells_left.to_string());

            show("hud-fps", self.settings.show_fps);
            if self.settings.show_fps {
                set_text("#hud-fps .hud-value", &self.game.fps().to_string());
            }

            show("menu", hud.phase == GamePhase::Menu);
            show("pause-menu", hud.phase == GamePhase::Playing && hud.paused);
            show("level-complete", hud.phase == GamePhase::LevelComplete);
            if let Some(score) = hud.level_score {
                set_text("#level-score", &score.to_string());
            }

            show("game-over", hud.phase == GamePhase::GameOver);
            if hud.phase == GamePhase::GameOver {
                set_text("#final-score", &hud.score.to_string());
                set_text("#final-level", &hud.level.to_string());
            }
            show("new-high-score", hud.new_high_score);
        }

        /// Stop the loop, cancel the pending frame and detach listeners
        fn teardown(&mut self) {
            if !self.game.is_alive() {
                return;
            }
            self.game.teardown();
            if let (Some(window), Some(id)) = (web_sys::window(), self.raf_id.take()) {
                let _ = window.cancel_animation_frame(id);
            }
            // Closures stay owned; the pagehide handler is still on the stack
            for listener in &self.listeners {
                let _ = listener.target.remove_event_listener_with_callback(
                    listener.kind,
                    listener.closure.as_ref().unchecked_ref(),
                );
            }
            log::info!("Detached {} listeners", self.listeners.len());
        }
    }

    /// Forward a game event to the console
    fn report_event(event: &GameEvent) {
        match serde_json::to_string(event) {
            Ok(json) => log::info!("game event: {}", json),
            Err(e) => log::warn!("Could not encode game event: {}", e),
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Gravity Well starting...");

        let Some(window) = web_sys::window() else { return };
        let Some(document) = window.document() else { return };

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No #canvas element on the page");
            return;
        };

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width();
        let client_h = canvas.client_height();
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let settings = Settings::load();
        let machine = match GameMachine::new(
            LevelTable::builtin(),
            Tuning::default(),
            Box::new(LocalStorageStore),
        ) {
            Ok(machine) => machine,
            Err(e) => {
                log::error!("Game configuration rejected: {}", e);
                return;
            }
        };
        let mut game = GameLoop::new(
            machine,
            InputController::new(client_w as f32, client_h as f32),
        );
        game.options = settings.snapshot_options();

        let render_state = create_render_state(&canvas, width, height).await;
        if render_state.is_none() {
            log::warn!("WebGPU unavailable, running without a display");
        }

        let host = Rc::new(RefCell::new(Host {
            game,
            render_state,
            audio: AudioManager::new(&settings),
            settings,
            canvas: canvas.clone(),
            raf_id: None,
            listeners: Vec::new(),
        }));

        let mut listeners = Vec::new();
        setup_input_handlers(&canvas, &host, &mut listeners);
        setup_restart_button(&host, &mut listeners);
        setup_auto_pause(&host, &mut listeners);
        setup_teardown(&host, &mut listeners);
        host.borrow_mut().listeners = listeners;

        // Show HUD
        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        // Start game loop
        request_animation_frame(host);

        log::info!("Gravity Well running!");
    }

    async fn create_render_state(
        canvas: &HtmlCanvasElement,
        width: u32,
        height: u32,
    ) -> Option<RenderState> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| log::error!("Failed to create surface: {}", e))
            .ok()?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| log::error!("Failed to get adapter: {}", e))
            .ok()?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        RenderState::new(surface, &adapter, width, height)
            .await
            .map_err(|e| log::error!("Failed to create device: {}", e))
            .ok()
    }

    /// Register `handler` for `kind` on `target`
    fn listen(
        listeners: &mut Vec<Listener>,
        target: &EventTarget,
        kind: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        if let Err(e) = target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref()) {
            log::warn!("Could not listen for {}: {:?}", kind, e);
            return;
        }
        listeners.push(Listener {
            target: target.clone(),
            kind,
            closure,
        });
    }

    /// Canvas-relative position of the first active touch
    fn first_touch(canvas: &HtmlCanvasElement, event: &TouchEvent) -> Option<(f32, f32)> {
        let touch = event.touches().get(0)?;
        let rect = canvas.get_bounding_client_rect();
        Some((
            touch.client_x() as f32 - rect.left() as f32,
            touch.client_y() as f32 - rect.top() as f32,
        ))
    }

    fn setup_input_handlers(
        canvas: &HtmlCanvasElement,
        host: &Rc<RefCell<Host>>,
        listeners: &mut Vec<Listener>,
    ) {
        let Some(window) = web_sys::window() else { return };
        let Some(document) = window.document() else { return };

        // Mouse down - place/remove wells, also unlocks audio
        {
            let host = host.clone();
            listen(listeners, canvas, "mousedown", move |event| {
                let Some(event) = event.dyn_ref::<MouseEvent>() else { return };
                let mut h = host.borrow_mut();
                h.audio.resume();
                h.game.push_event(InputEvent::PointerDown {
                    x: event.offset_x() as f32,
                    y: event.offset_y() as f32,
                    button: PointerButton::from_dom(event.button()),
                });
            });
        }

        // Mouse move - tracks the hovered well for wheel adjustment
        {
            let host = host.clone();
            listen(listeners, canvas, "mousemove", move |event| {
                let Some(event) = event.dyn_ref::<MouseEvent>() else { return };
                host.borrow_mut().game.push_event(InputEvent::PointerMove {
                    x: event.offset_x() as f32,
                    y: event.offset_y() as f32,
                });
            });
        }

        {
            let host = host.clone();
            listen(listeners, canvas, "mouseup", move |event| {
                let Some(event) = event.dyn_ref::<MouseEvent>() else { return };
                host.borrow_mut().game.push_event(InputEvent::PointerUp {
                    x: event.offset_x() as f32,
                    y: event.offset_y() as f32,
                    button: PointerButton::from_dom(event.button()),
                });
            });
        }

        // Wheel - adjust strength, page must not scroll
        {
            let host = host.clone();
            listen(listeners, canvas, "wheel", move |event| {
                let Some(event) = event.dyn_ref::<WheelEvent>() else { return };
                event.prevent_default();
                host.borrow_mut().game.push_event(InputEvent::Wheel {
                    delta_y: event.delta_y() as f32,
                });
            });
        }

        // Right click removes a well, not open a menu
        listen(listeners, canvas, "contextmenu", |event| event.prevent_default());

        // Touch start - tap, double tap, two-finger pause
        {
            let host = host.clone();
            let canvas_clone = canvas.clone();
            listen(listeners, canvas, "touchstart", move |event| {
                let Some(touch_event) = event.dyn_ref::<TouchEvent>() else { return };
                event.prevent_default();
                let Some((x, y)) = first_touch(&canvas_clone, touch_event) else { return };
                let mut h = host.borrow_mut();
                h.audio.resume();
                h.game.push_event(InputEvent::TouchStart {
                    x,
                    y,
                    touches: touch_event.touches().length(),
                    time_ms: event.time_stamp(),
                });
            });
        }

        // Touch move
        {
            let host = host.clone();
            let canvas_clone = canvas.clone();
            listen(listeners, canvas, "touchmove", move |event| {
                let Some(touch_event) = event.dyn_ref::<TouchEvent>() else { return };
                event.prevent_default();
                if let Some((x, y)) = first_touch(&canvas_clone, touch_event) {
                    host.borrow_mut().game.push_event(InputEvent::TouchMove { x, y });
                }
            });
        }

        {
            let host = host.clone();
            listen(listeners, canvas, "touchend", move |event| {
                let Some(touch_event) = event.dyn_ref::<TouchEvent>() else { return };
                host.borrow_mut().game.push_event(InputEvent::TouchEnd {
                    touches: touch_event.touches().length(),
                });
            });
        }

        // Keyboard
        {
            let host = host.clone();
            listen(listeners, &document, "keydown", move |event| {
                let Some(event) = event.dyn_ref::<KeyboardEvent>() else { return };
                let key = event.key();
                if key == " " {
                    event.prevent_default();
                }
                host.borrow_mut().game.push_event(InputEvent::KeyDown { key });
            });
        }

        // Resize
        {
            let host = host.clone();
            listen(listeners, &window, "resize", move |_event| {
                host.borrow_mut().resize();
            });
        }
    }

    fn request_animation_frame(host: Rc<RefCell<Host>>) {
        let Some(window) = web_sys::window() else { return };
        let frame_host = host.clone();
        let closure = Closure::once(move |time: f64| {
            game_loop(frame_host, time);
        });
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(id) => host.borrow_mut().raf_id = Some(id),
            Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
        }
        closure.forget();
    }

    fn game_loop(host: Rc<RefCell<Host>>, time: f64) {
        {
            let mut h = host.borrow_mut();
            h.raf_id = None;
            if !h.game.is_alive() {
                return;
            }
            h.frame(time);
        }

        request_animation_frame(host);
    }

    fn setup_restart_button(host: &Rc<RefCell<Host>>, listeners: &mut Vec<Listener>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        for id in ["restart-btn", "game-over-restart-btn"] {
            if let Some(btn) = document.get_element_by_id(id) {
                let host = host.clone();
                listen(listeners, &btn, "click", move |_event| {
                    host.borrow_mut().game.push_event(InputEvent::RestartRequest);
                    log::info!("Restart requested");
                });
            }
        }

        if let Some(btn) = document.get_element_by_id("resume-btn") {
            let host = host.clone();
            listen(listeners, &btn, "click", move |_event| {
                host.borrow_mut().game.push_event(InputEvent::KeyDown {
                    key: "Escape".into(),
                });
            });
        }
    }

    fn setup_auto_pause(host: &Rc<RefCell<Host>>, listeners: &mut Vec<Listener>) {
        let Some(window) = web_sys::window() else { return };
        let Some(document) = window.document() else { return };

        // Visibility change (tab switch, minimize)
        {
            let host = host.clone();
            let document_clone = document.clone();
            listen(listeners, &document, "visibilitychange", move |_event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    host.borrow_mut().game.push_event(InputEvent::FocusLost);
                    log::info!("Auto-pause (tab hidden)");
                }
            });
        }

        // Window blur (click outside)
        {
            let host = host.clone();
            listen(listeners, &window, "blur", move |_event| {
                let mut h = host.borrow_mut();
                h.game.push_event(InputEvent::FocusLost);
                if h.settings.mute_on_blur {
                    let muted = Settings {
                        muted: true,
                        ..h.settings.clone()
                    };
                    h.audio.apply_settings(&muted);
                }
            });
        }

        {
            let host = host.clone();
            listen(listeners, &window, "focus", move |_event| {
                let mut h = host.borrow_mut();
                let settings = h.settings.clone();
                h.audio.apply_settings(&settings);
            });
        }
    }

    fn setup_teardown(host: &Rc<RefCell<Host>>, listeners: &mut Vec<Listener>) {
        let Some(window) = web_sys::window() else { return };
        let host = host.clone();
        listen(listeners, &window, "pagehide", move |_event| {
            let mut h = host.borrow_mut();
            h.settings.save();
            h.teardown();
        });
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Gravity Well (native) starting...");
    log::info!("Native mode is headless - run with `trunk serve` for the web version");

    let levels = match std::env::args().nth(1) {
        Some(path) => match load_levels(&path) {
            Ok(levels) => levels,
            Err(e) => {
                log::error!("Could not load levels from {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => gravity_well::sim::LevelTable::builtin(),
    };

    if let Err(e) = headless_demo(levels) {
        log::error!("Demo failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn load_levels(path: &str) -> Result<gravity_well::sim::LevelTable, Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)?;
    Ok(gravity_well::sim::LevelTable::from_json(&json)?)
}

/// Play the first level with a scripted well and report what happened
#[cfg(not(target_arch = "wasm32"))]
fn headless_demo(levels: gravity_well::sim::LevelTable) -> Result<(), gravity_well::ConfigError> {
    use gravity_well::consts::CANVAS_WIDTH;
    use gravity_well::persistence::MemoryStore;
    use gravity_well::platform::{InputController, InputEvent, PointerButton};
    use gravity_well::sim::{GameMachine, GamePhase};
    use gravity_well::{GameLoop, Tuning};

    let machine = GameMachine::new(levels, Tuning::default(), Box::new(MemoryStore::new()))?;
    let mut game = GameLoop::new(machine, InputController::new(800.0, 600.0));

    // Start, then drop an attractor near the goal side
    game.push_event(InputEvent::KeyDown { key: "Enter".into() });
    game.frame(0.0);
    let goal = game.machine().bodies().goal.pos;
    let target = goal.lerp(glam::Vec2::new(CANVAS_WIDTH / 2.0, goal.y), 0.3);
    game.push_event(InputEvent::PointerDown {
        x: target.x,
        y: target.y,
        button: PointerButton::Primary,
    });

    // Simulate up to 30 seconds of 60 Hz frames
    let frame_ms = 1000.0 / 60.0;
    for frame in 1..=1800 {
        game.frame(frame as f64 * frame_ms);
        for event in game.drain_events() {
            match serde_json::to_string(&event) {
                Ok(json) => log::info!("game event: {}", json),
                Err(e) => log::warn!("Could not encode game event: {}", e),
            }
        }
        if game.machine().phase() != GamePhase::Playing {
            break;
        }
    }

    let session = game.machine().session();
    println!(
        "Level {} ({}): {:?}, score {}, {} ticks, {} wells",
        session.level_index + 1,
        game.machine().level_name(),
        session.phase,
        session.score,
        session.level_ticks,
        session.wells_used
    );
    game.teardown();
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

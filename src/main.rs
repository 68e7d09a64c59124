//! Cosmo Station entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use cosmo_station::game::SteerKey;
    use cosmo_station::persistence::{LocalStorage, Storage};
    use cosmo_station::platform::{BrowserClock, PointerGesture};
    use cosmo_station::sim::BoosterKind;
    use cosmo_station::{Game, InputEvent, Tuning};

    /// Browser wrapper around the game
    struct App {
        game: Game<LocalStorage>,
        clock: BrowserClock,
        canvas: HtmlCanvasElement,
        gesture: PointerGesture,
    }

    impl App {
        fn handle(&mut self, event: InputEvent) {
            self.game.handle(event, &self.clock);
            self.show_notices();
        }

        /// Position relative to the canvas
        fn local(&self, client_x: i32, client_y: i32) -> Vec2 {
            let rect = self.canvas.get_bounding_client_rect();
            Vec2::new(
                client_x as f32 - rect.left() as f32,
                client_y as f32 - rect.top() as f32,
            )
        }

        fn press(&mut self, pos: Vec2) {
            if let Some(event) = self.gesture.press(pos, self.game.in_flight()) {
                self.handle(event);
            }
        }

        fn moved(&mut self, pos: Vec2) {
            if let Some(event) = self.gesture.moved(pos) {
                self.handle(event);
            }
        }

        fn release(&mut self, pos: Option<Vec2>) {
            if let Some(event) = self.gesture.release(pos, self.game.in_flight()) {
                self.handle(event);
            }
        }

        fn resize(&mut self) {
            let w = self.canvas.client_width();
            let h = self.canvas.client_height();
            self.canvas.set_width(w.max(1) as u32);
            self.canvas.set_height(h.max(1) as u32);
            self.handle(InputEvent::Resize(Vec2::new(w as f32, h as f32)));
        }

        fn frame(&mut self) {
            self.game.frame(&self.clock);
            self.show_notices();
            self.update_hud();
            self.render();
        }

        /// Hand the frame snapshot to the page's `renderFrame(json)` hook
        fn render(&self) {
            let Some(window) = web_sys::window() else {
                return;
            };
            let Ok(hook) = js_sys::Reflect::get(&window, &JsValue::from_str("renderFrame")) else {
                return;
            };
            let Some(hook) = hook.dyn_ref::<js_sys::Function>() else {
                return;
            };
            match serde_json::to_string(&self.game.snapshot()) {
                Ok(json) => {
                    if let Err(e) = hook.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                        log::warn!("renderFrame failed: {:?}", e);
                    }
                }
                Err(e) => log::warn!("Snapshot encoding failed: {}", e),
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let state = self.game.state();
            let level = state.level();

            if let Some(el) = document.query_selector("#hud-energy .hud-value").ok().flatten() {
                el.set_text_content(Some(&format!(
                    "{:.0} / {:.0}",
                    state.energy, level.capacity
                )));
            }
            if let Some(el) = document.query_selector("#hud-level .hud-value").ok().flatten() {
                el.set_text_content(Some(&format!("{} ({})", level.level, level.name)));
            }
            if let Some(el) = document.query_selector("#hud-rate .hud-value").ok().flatten() {
                el.set_text_content(Some(&format!("{:.0}/h", level.energy_per_hour)));
            }
            if let Some(el) = document.query_selector("#hud-missions .hud-value").ok().flatten() {
                el.set_text_content(Some(&state.missions_completed.to_string()));
            }

            if let Some(el) = document.get_element_by_id("flight-overlay") {
                let class = if self.game.in_flight() { "" } else { "hidden" };
                let _ = el.set_attribute("class", class);
            }
        }

        fn show_notices(&mut self) {
            let notices = self.game.take_notices();
            let Some(last) = notices.last() else {
                return;
            };
            for notice in &notices {
                log::info!("{}", notice);
            }
            if let Some(el) = web_sys::window()
                .and_then(|w| w.document())
                .and_then(|d| d.get_element_by_id("notice"))
            {
                el.set_text_content(Some(&last.to_string()));
            }
        }
    }

    /// Optional balance override stored next to the save
    fn load_tuning(storage: &LocalStorage) -> Tuning {
        match storage.get(Tuning::STORAGE_KEY) {
            Ok(Some(json)) => {
                log::info!("Using tuning override from LocalStorage");
                Tuning::from_json(&json)
            }
            Ok(None) => Tuning::default(),
            Err(e) => {
                log::warn!("{}; using default tuning", e);
                Tuning::default()
            }
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&JsValue::from_str(&e.to_string()));
        }

        log::info!("Cosmo Station starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;
        let viewport = Vec2::new(canvas.client_width() as f32, canvas.client_height() as f32);

        let storage = LocalStorage;
        let tuning = load_tuning(&storage);
        let seed = js_sys::Date::now() as u64;
        let game = Game::new(storage, tuning, viewport, seed);
        log::info!("Game initialized with seed: {}", seed);

        let app = Rc::new(RefCell::new(App {
            game,
            clock: BrowserClock,
            canvas: canvas.clone(),
            gesture: PointerGesture::default(),
        }));
        app.borrow_mut().resize();

        setup_input_handlers(&window, &canvas, app.clone());
        setup_station_buttons(&document, app.clone());

        request_animation_frame(app);

        log::info!("Cosmo Station running!");
        Ok(())
    }

    fn setup_input_handlers(window: &web_sys::Window, canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        // Mouse
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut a = app.borrow_mut();
                let pos = a.local(event.client_x(), event.client_y());
                a.press(pos);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut a = app.borrow_mut();
                let pos = a.local(event.client_x(), event.client_y());
                a.moved(pos);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut a = app.borrow_mut();
                let pos = a.local(event.client_x(), event.client_y());
                a.release(Some(pos));
            });
            let _ = window
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let mut a = app.borrow_mut();
                    let pos = a.local(touch.client_x(), touch.client_y());
                    a.press(pos);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let mut a = app.borrow_mut();
                    let pos = a.local(touch.client_x(), touch.client_y());
                    a.moved(pos);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut a = app.borrow_mut();
                let pos = event
                    .changed_touches()
                    .get(0)
                    .map(|t| a.local(t.client_x(), t.client_y()));
                a.release(pos);
            });
            let _ = canvas
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard steering
        for (name, held) in [("keydown", true), ("keyup", false)] {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = match event.key().as_str() {
                    "ArrowLeft" | "a" | "A" => SteerKey::Left,
                    "ArrowRight" | "d" | "D" => SteerKey::Right,
                    _ => return,
                };
                app.borrow_mut().handle(InputEvent::Key { key, held });
            });
            let _ = window.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Resize
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                app.borrow_mut().resize();
            });
            let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Upgrade and booster buttons of the station panel
    fn setup_station_buttons(document: &web_sys::Document, app: Rc<RefCell<App>>) {
        let buttons = [
            ("upgrade-btn", InputEvent::UpgradeStation),
            ("booster-deposit", InputEvent::BuyBooster(BoosterKind::Deposit)),
            ("booster-credit", InputEvent::BuyBooster(BoosterKind::Credit)),
            ("booster-investment", InputEvent::BuyBooster(BoosterKind::Investment)),
            ("reset-btn", InputEvent::ResetProgress),
        ];
        for (id, event) in buttons {
            let Some(button) = document.get_element_by_id(id) else {
                log::debug!("No #{} button on the page", id);
                continue;
            };
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                app.borrow_mut().handle(event);
            });
            let _ = button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |_time: f64| {
            game_loop(app);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>) {
        app.borrow_mut().frame();
        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    log::info!("Cosmo Station (native) starting...");
    log::info!("The interactive game runs in the browser; running a headless flight instead");

    headless_flight();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Reveal one area, wait for the launch and fly until the run ends
#[cfg(not(target_arch = "wasm32"))]
fn headless_flight() {
    use cosmo_station::persistence::MemoryStorage;
    use cosmo_station::platform::{Clock, ManualClock, SystemClock};
    use cosmo_station::{Game, InputEvent, Tuning};
    use glam::Vec2;

    const FRAME_MS: f64 = 16.0;
    let viewport = Vec2::new(800.0, 600.0);

    let mut clock = ManualClock::new(SystemClock::default().wall_ms());
    let seed = rand::random::<u64>();
    let mut game = Game::new(MemoryStorage::new(), Tuning::default(), viewport, seed);
    log::info!("Game initialized with seed: {}", seed);

    game.frame(&clock);
    game.handle(InputEvent::Tap(Vec2::new(520.0, 180.0)), &clock);

    let mut launched = false;
    loop {
        clock.advance(FRAME_MS);
        game.frame(&clock);
        for notice in game.take_notices() {
            println!("{}", notice);
        }
        match (launched, game.in_flight()) {
            (false, true) => launched = true,
            (true, false) => break,
            _ => {}
        }
    }

    let state = game.state();
    println!(
        "Energy {:.1}/{:.0}, distance {:.0}, {} booster(s) active",
        state.energy,
        state.capacity(),
        state.total_distance,
        state.boosters.len()
    );
}

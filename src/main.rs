//! Plinko Rewards entry point
//!
//! On the web this wires both boards to their canvases, buttons and the
//! history list, then runs the frame loop. Natively it runs drops headlessly
//! and prints the revealed rewards.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;

    use anyhow::{Context, Result, anyhow};
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement};

    use plinko_rewards::renderer::{RenderState, board_vertices};
    use plinko_rewards::reward::fetch_reward_file;
    use plinko_rewards::sim::BoardKind;
    use plinko_rewards::{
        DropOutcome, History, Session, SessionEvent, Settings, now_ms, surface_size_for_width,
    };

    fn canvas_id(kind: BoardKind) -> &'static str {
        match kind {
            BoardKind::Big => "canvas-big",
            BoardKind::Small => "canvas-small",
        }
    }

    fn button_id(kind: BoardKind) -> &'static str {
        match kind {
            BoardKind::Big => "btn-big",
            BoardKind::Small => "btn-small",
        }
    }

    fn loading_id(kind: BoardKind) -> &'static str {
        match kind {
            BoardKind::Big => "big-loading",
            BoardKind::Small => "small-loading",
        }
    }

    /// Everything the page needs between frames
    struct App {
        session: Session,
        settings: Settings,
        canvases: [HtmlCanvasElement; 2],
        surfaces: [Option<RenderState>; 2],
        document: Document,
    }

    impl App {
        /// One display refresh: advance the drop, react to events, draw
        fn frame(&mut self) {
            for event in self.session.tick(now_ms()) {
                match event {
                    SessionEvent::BallLanded { kind, slot } => {
                        log::debug!("{} ball landed in slot {}", kind.as_str(), slot);
                        self.session.history().save();
                        render_history(&self.document, self.session.history());
                    }
                    SessionEvent::RewardRevealed(outcome) => {
                        show_result(&self.document, &outcome);
                    }
                }
            }
            self.update_buttons();
            self.render();
        }

        fn render(&mut self) {
            for kind in BoardKind::ALL {
                let Some(render_state) = self.surfaces[kind.index()].as_mut() else {
                    continue;
                };
                let vertices = board_vertices(self.session.board(kind), &self.settings);
                match render_state.render(&vertices) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        fn update_buttons(&self) {
            for kind in BoardKind::ALL {
                if let Some(btn) = self.document.get_element_by_id(button_id(kind)) {
                    if self.session.can_drop(kind) {
                        let _ = btn.remove_attribute("disabled");
                    } else {
                        let _ = btn.set_attribute("disabled", "");
                    }
                }
            }
        }

        /// Match each canvas to its container width and rebuild geometry
        fn resize(&mut self) {
            for kind in BoardKind::ALL {
                let canvas = &self.canvases[kind.index()];
                let (w, h) = canvas_size(canvas);
                canvas.set_width(w);
                canvas.set_height(h);
                if let Some(render_state) = self.surfaces[kind.index()].as_mut() {
                    render_state.resize(w, h);
                }
                self.session.board_mut(kind).resize(w as f32, h as f32);
            }
        }
    }

    fn canvas_size(canvas: &HtmlCanvasElement) -> (u32, u32) {
        let width = canvas
            .parent_element()
            .map(|p| p.client_width())
            .unwrap_or_else(|| canvas.client_width())
            .max(1) as u32;
        surface_size_for_width(width)
    }

    fn escape_html(s: &str) -> String {
        s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
    }

    fn render_history(document: &Document, history: &History) {
        let Some(list) = document.get_element_by_id("history-list") else {
            return;
        };
        if history.is_empty() {
            list.set_inner_html(r#"<p class="history-empty">No drops yet</p>"#);
            return;
        }
        let html: String = history
            .entries()
            .iter()
            .map(|entry| {
                format!(
                    r#"<div class="history-item {}"><div class="history-dot"></div><span class="history-reward">🎁 {}</span><span class="history-time">{}</span></div>"#,
                    entry.kind.as_str(),
                    escape_html(&entry.reward),
                    entry.time_label()
                )
            })
            .collect();
        list.set_inner_html(&html);
    }

    fn show_result(document: &Document, outcome: &DropOutcome) {
        if let Some(el) = document.get_element_by_id("result-label") {
            el.set_text_content(Some(outcome.result_label()));
        }
        if let Some(el) = document.get_element_by_id("result-text") {
            el.set_text_content(Some(&outcome.reward));
        }
        if let Some(el) = document.get_element_by_id("result-box") {
            let mut class = format!("result-box {}-result", outcome.kind.as_str());
            // Page script owns the confetti; it keys off this class
            if outcome.celebrates() {
                class.push_str(" celebrate");
            }
            let _ = el.set_attribute("class", &class);
        }
        if let Some(el) = document.get_element_by_id("result-overlay") {
            let _ = el.class_list().add_1("active");
        }
    }

    fn hide_result(document: &Document) {
        if let Some(el) = document.get_element_by_id("result-overlay") {
            let _ = el.class_list().remove_1("active");
        }
    }

    fn on_click(document: &Document, id: &str, handler: impl FnMut(web_sys::MouseEvent) + 'static) {
        if let Some(el) = document.get_element_by_id(id) {
            let closure = Closure::<dyn FnMut(_)>::new(handler);
            let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    pub async fn run() -> Result<()> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| anyhow!("logger init failed: {e}"))?;

        log::info!("Plinko Rewards starting...");

        let window = web_sys::window().context("no window")?;
        let document = window.document().context("no document")?;

        let mut canvases = Vec::with_capacity(2);
        for kind in BoardKind::ALL {
            let canvas: HtmlCanvasElement = document
                .get_element_by_id(canvas_id(kind))
                .with_context(|| format!("no #{}", canvas_id(kind)))?
                .dyn_into()
                .map_err(|_| anyhow!("#{} is not a canvas", canvas_id(kind)))?;
            let (w, h) = canvas_size(&canvas);
            canvas.set_width(w);
            canvas.set_height(h);
            canvases.push(canvas);
        }
        let canvases: [HtmlCanvasElement; 2] = canvases
            .try_into()
            .map_err(|_| anyhow!("expected two canvases"))?;

        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        let (w, h) = (canvases[0].width(), canvases[0].height());
        let mut session = Session::new(seed, w as f32, h as f32).with_history(History::load());
        session.apply_settings(&settings);
        for kind in BoardKind::ALL {
            let canvas = &canvases[kind.index()];
            session
                .board_mut(kind)
                .resize(canvas.width() as f32, canvas.height() as f32);
        }
        log::info!("Session initialized with seed: {}", seed);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });
        let mut raw_surfaces = Vec::with_capacity(2);
        for canvas in &canvases {
            raw_surfaces.push(
                instance
                    .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
                    .map_err(|e| anyhow!("Failed to create surface: {e}"))?,
            );
        }
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: raw_surfaces.first(),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| anyhow!("Failed to get adapter: {e}"))?;
        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let mut surfaces: [Option<RenderState>; 2] = [None, None];
        for (i, surface) in raw_surfaces.into_iter().enumerate() {
            let (w, h) = (canvases[i].width(), canvases[i].height());
            match RenderState::new(surface, &adapter, w, h).await {
                Ok(state) => surfaces[i] = Some(state),
                Err(e) => log::error!("Board {} has no GPU surface: {}", i, e),
            }
        }

        let app = Rc::new(RefCell::new(App {
            session,
            settings,
            canvases,
            surfaces,
            document: document.clone(),
        }));

        // Draw the placeholder state while rewards load
        app.borrow_mut().frame();

        for kind in BoardKind::ALL {
            let file = kind.reward_file();
            let loaded = fetch_reward_file(file).await;
            let mut a = app.borrow_mut();
            let loading = document.get_element_by_id(loading_id(kind));
            match loaded {
                Ok(items) => {
                    a.session.set_rewards(kind, items);
                    if let Some(el) = loading {
                        let _ = el.set_attribute("style", "display:none");
                    }
                }
                Err(e) => {
                    let message = format!("⚠ Cannot load {file}");
                    log::error!("{e:#}");
                    a.session.set_load_error(kind, message.clone());
                    if let Some(el) = loading {
                        el.set_text_content(Some(&message));
                    }
                }
            }
        }

        render_history(&document, app.borrow().session.history());
        setup_handlers(&document, app.clone());
        request_animation_frame(app);

        log::info!("Plinko Rewards running!");
        Ok(())
    }

    fn setup_handlers(document: &Document, app: Rc<RefCell<App>>) {
        for kind in BoardKind::ALL {
            let app = app.clone();
            on_click(document, button_id(kind), move |_| {
                let mut a = app.borrow_mut();
                if let Some(ticket) = a.session.request_drop(kind) {
                    log::debug!("Drop accepted: {:?}", ticket);
                }
                a.update_buttons();
            });
        }

        {
            let doc = document.clone();
            on_click(document, "result-close", move |_| hide_result(&doc));
        }

        {
            let doc = document.clone();
            on_click(document, "result-overlay", move |event| {
                let on_backdrop = event
                    .target()
                    .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
                    .is_some_and(|el| el.id() == "result-overlay");
                if on_backdrop {
                    hide_result(&doc);
                }
            });
        }

        {
            let app = app.clone();
            let doc = document.clone();
            on_click(document, "clear-history", move |_| {
                let mut a = app.borrow_mut();
                a.session.clear_history();
                History::remove_stored();
                render_history(&doc, a.session.history());
            });
        }

        if let Some(window) = web_sys::window() {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                app.borrow_mut().resize();
            });
            let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |_time: f64| {
            app.borrow_mut().frame();
            request_animation_frame(app);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_app::run().await {
        log::error!("Startup failed: {e:#}");
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use anyhow::{Context, Result, bail};
    use clap::Parser;

    use plinko_rewards::renderer::board_vertices;
    use plinko_rewards::reward::load_reward_file;
    use plinko_rewards::sim::BoardKind;
    use plinko_rewards::{History, Session, SessionEvent, Settings, now_ms, surface_size_for_width};

    /// Frames allowed per drop before giving up (landing plus reveal)
    const MAX_FRAMES_PER_DROP: u32 = 20_000;

    fn parse_kind(s: &str) -> Result<BoardKind, String> {
        BoardKind::from_str(s).ok_or_else(|| format!("unknown board '{s}' (use big or small)"))
    }

    /// Run Plinko reward drops without a window and print the results.
    #[derive(Debug, Parser)]
    #[command(author, version, about, long_about = None)]
    struct CliArgs {
        /// Board to drop on: big or small.
        #[arg(short, long, default_value = "big", value_parser = parse_kind)]
        board: BoardKind,
        /// Number of drops to run.
        #[arg(
            short = 'n',
            long,
            default_value_t = 1,
            value_parser = clap::value_parser!(u32).range(1..=1_000)
        )]
        drops: u32,
        /// Seed for the shared random source; defaults to the clock.
        #[arg(long)]
        seed: Option<u64>,
        /// Board width in pixels; height follows the 2:3 aspect.
        #[arg(
            long,
            value_name = "PIXELS",
            default_value_t = 360,
            value_parser = clap::value_parser!(u32).range(60..=4_096)
        )]
        width: u32,
        /// Reward list for the big board.
        #[arg(long, value_name = "PATH")]
        big_rewards: Option<PathBuf>,
        /// Reward list for the small board.
        #[arg(long, value_name = "PATH")]
        small_rewards: Option<PathBuf>,
        /// Where the rolling reward history is kept.
        #[arg(long, value_name = "PATH", default_value = "plinko_history.json")]
        history: PathBuf,
        /// Optional settings file (physics tuning, render quality).
        #[arg(long, value_name = "PATH")]
        settings: Option<PathBuf>,
        /// Wipe the history before dropping.
        #[arg(long)]
        clear_history: bool,
    }

    pub fn run() -> Result<()> {
        env_logger::init();
        let args = CliArgs::parse();

        let settings = match &args.settings {
            Some(path) => Settings::load_from(path)?,
            None => Settings::default(),
        };
        let mut history = History::load_from(&args.history)?;
        if args.clear_history {
            history.clear();
        }

        let seed = args.seed.unwrap_or_else(|| now_ms() as u64);
        let (w, h) = surface_size_for_width(args.width);
        let mut session = Session::new(seed, w as f32, h as f32).with_history(history);
        session.apply_settings(&settings);
        log::info!("Plinko Rewards (native) seed {} on a {}x{} board", seed, w, h);

        for kind in BoardKind::ALL {
            let path = match kind {
                BoardKind::Big => args.big_rewards.clone(),
                BoardKind::Small => args.small_rewards.clone(),
            }
            .unwrap_or_else(|| PathBuf::from(kind.reward_file()));
            match load_reward_file(&path) {
                Ok(items) => session.set_rewards(kind, items),
                Err(e) => session.set_load_error(kind, format!("{e:#}")),
            }
        }

        if !session.can_drop(args.board) {
            let reason = session
                .board(args.board)
                .load_error()
                .unwrap_or("no rewards loaded")
                .to_owned();
            bail!("{} board is unavailable: {}", args.board.as_str(), reason);
        }

        for drop_no in 1..=args.drops {
            let ticket = session
                .request_drop(args.board)
                .context("drop was rejected")?;
            log::debug!("Drop {} ticket: {:?}", drop_no, ticket);

            let mut revealed = None;
            for _ in 0..MAX_FRAMES_PER_DROP {
                for event in session.tick(now_ms()) {
                    match event {
                        SessionEvent::BallLanded { slot, .. } => {
                            let frame = board_vertices(session.board(args.board), &settings);
                            log::debug!("Landed in slot {}; frame has {} vertices", slot, frame.len());
                        }
                        SessionEvent::RewardRevealed(outcome) => revealed = Some(outcome),
                    }
                }
                if revealed.is_some() {
                    break;
                }
            }
            let outcome = revealed.context("drop never finished")?;
            println!(
                "#{drop_no} {} {} (ball came to rest in slot {})",
                outcome.result_label(),
                outcome.reward,
                outcome.landed_slot + 1
            );
        }

        session.history().save_to(&args.history)?;

        println!("\nRecent rewards:");
        for entry in session.history().entries() {
            println!("  {}  [{}] {}", entry.time_label(), entry.kind.as_str(), entry.reward);
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::run()
}

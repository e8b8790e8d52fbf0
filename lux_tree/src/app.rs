//! Top-level application state machine.
//!
//! `AppState` owns the `Scene` and the reading end of the tracking signal.
//! Once per frame it takes the latest gesture (or the manual override),
//! advances the scene, and hands everything to the visualizer.

use std::sync::mpsc::{self, Receiver};
use std::time::Instant;

use hand_gesture::{tracking_signal, GestureState, PointerSample, TrackingReader, TrackingWriter};
use log::{info, warn};
use lux_field::particles::FieldConfig;
use lux_field::theme::PARTICLE_COUNT;
use lux_field::{PanelId, PhotoHandle, Scene, ThemeConfig};

use crate::error::{AppError, TrackingError};
use crate::tracker::{HandTracker, SimHandSource, SimInput, TrackerStatus};
use crate::visualizer::{UiCommand, Visualizer};

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Where gestures come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackingMode {
    /// Mouse and keys drive a simulated hand.
    Simulated,
    /// A LeapMotion controller (feature `leap`).
    Leap,
    /// No tracking; `G` cycles gestures by hand.
    Off,
}

impl Default for TrackingMode {
    fn default() -> Self {
        if cfg!(feature = "leap") { TrackingMode::Leap } else { TrackingMode::Simulated }
    }
}

/// Configuration for the full application.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub theme:          &'static ThemeConfig,
    pub particle_count: usize,
    pub tracking:       TrackingMode,
    pub window_width:   usize,
    pub window_height:  usize,
    /// Photos hung on the tree at startup.
    pub photos:         Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            theme:          ThemeConfig::default_theme(),
            particle_count: PARTICLE_COUNT,
            tracking:       TrackingMode::default(),
            window_width:   960,
            window_height:  640,
            photos:         Vec::new(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    // ── world ────────────────────────────────────────────────────────────
    scene:      Scene,

    // ── input ────────────────────────────────────────────────────────────
    reader:     TrackingReader,
    gesture:    GestureState,
    pointer:    PointerSample,
    /// True when gestures come from `cycle_gesture` instead of the tracker.
    manual:     bool,

    // ── status ───────────────────────────────────────────────────────────
    last_error: Option<String>,
    pub status: String,
}

impl AppState {
    pub fn new(cfg: &AppConfig, reader: TrackingReader) -> Self {
        let field = FieldConfig { count: cfg.particle_count, ..FieldConfig::default() };
        let mut app = AppState {
            scene:      Scene::new(cfg.theme, field),
            reader,
            gesture:    GestureState::Neutral,
            pointer:    PointerSample::IDLE,
            manual:     cfg.tracking == TrackingMode::Off,
            last_error: None,
            status:     String::new(),
        };
        for path in &cfg.photos {
            app.add_photo(PhotoHandle::new(path.as_str()));
        }
        app.refresh_status();
        app
    }

    // ── commands ─────────────────────────────────────────────────────────

    /// Manual fallback: NEUTRAL → PINCH → OPEN → NEUTRAL.  Switches to manual
    /// mode; tracker gestures are ignored from then on.
    pub fn cycle_gesture(&mut self) {
        if !self.manual {
            info!("manual gesture control");
            self.manual = true;
        }
        self.gesture = self.gesture.cycle();
        self.refresh_status();
    }

    pub fn add_photo(&mut self, handle: PhotoHandle) -> PanelId {
        let id = self.scene.add_photo(handle);
        self.refresh_status();
        id
    }

    /// Switch palettes.  Selecting the current theme does nothing.
    pub fn set_theme(&mut self, theme: &'static ThemeConfig) {
        if theme.id == self.scene.theme().id {
            return;
        }
        info!("theme {} -> {}", self.scene.theme().id, theme.id);
        self.scene.rebuild(theme);
        self.refresh_status();
    }

    /// Tracking could not start or has stopped; fall back to manual control.
    pub fn tracking_failed(&mut self, err: &TrackingError) {
        warn!("falling back to manual gestures: {}", err);
        self.manual     = true;
        self.gesture    = GestureState::Neutral;
        self.last_error = Some(err.to_string());
        self.refresh_status();
    }

    pub fn handle_status(&mut self, status: TrackerStatus) {
        match status {
            TrackerStatus::Ready       => self.last_error = None,
            TrackerStatus::Failed(err) => self.tracking_failed(&err),
        }
        self.refresh_status();
    }

    // ── per-frame tick ───────────────────────────────────────────────────

    /// Read the tracking signal once and advance the scene by `delta` seconds.
    pub fn tick(&mut self, delta: f32) {
        self.pointer = self.reader.latest();
        let gesture = if self.manual { self.gesture } else { self.reader.gesture() };
        if gesture != self.gesture {
            self.gesture = gesture;
            self.refresh_status();
        }
        if self.scene.tick(delta, self.gesture, &self.pointer) {
            self.refresh_status();
        }
    }

    fn refresh_status(&mut self) {
        let mode = if self.manual { "manual" } else { "tracking" };
        let mut status = format!(
            "{}  -  {}  -  {}  -  photos {}",
            self.gesture.label(),
            mode,
            self.scene.theme().name,
            self.scene.gallery().len(),
        );
        if let Some(err) = &self.last_error {
            status.push_str("  -  ");
            status.push_str(err);
        }
        self.status = status;
    }

    // ── accessors for the render loop ────────────────────────────────────

    pub fn scene(&self)      -> &Scene          { &self.scene }
    pub fn gesture(&self)    -> GestureState    { self.gesture }
    pub fn pointer(&self)    -> &PointerSample  { &self.pointer }
    pub fn is_manual(&self)  -> bool            { self.manual }
    pub fn last_error(&self) -> Option<&str>    { self.last_error.as_deref() }
}

// ════════════════════════════════════════════════════════════════════════════
// run(): the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// Opens the window, starts the configured tracker, and drives the
/// input/tick/render loop at the window's refresh limit until the window is
/// closed or `Q` is pressed.
pub fn run(cfg: AppConfig) -> Result<(), AppError> {
    let (writer, reader) = tracking_signal();
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();

    let mut vis = Visualizer::new(cfg.window_width, cfg.window_height, sim_tx)?;
    let mut app = AppState::new(&cfg, reader);

    let tracker = match start_tracker(cfg.tracking, writer, sim_rx) {
        Ok(t) => t,
        Err(e @ TrackingError::Spawn(_)) => return Err(e.into()),
        Err(e) => {
            app.tracking_failed(&e);
            None
        }
    };

    let mut photos = app.scene().gallery().len();
    let mut last   = Instant::now();

    'frame: while vis.is_open() {
        for cmd in vis.poll_input() {
            match cmd {
                UiCommand::Quit         => break 'frame,
                UiCommand::CycleGesture => app.cycle_gesture(),
                UiCommand::NextTheme    => {
                    let next = app.scene().theme().next();
                    app.set_theme(next);
                }
                UiCommand::AddPhoto     => {
                    photos += 1;
                    app.add_photo(PhotoHandle::new(format!("memory-{}", photos)));
                }
            }
        }

        if let Some(t) = &tracker {
            while let Some(status) = t.poll_status() {
                app.handle_status(status);
            }
        }

        let now   = Instant::now();
        let delta = now.duration_since(last).as_secs_f32();
        last = now;

        app.tick(delta);
        vis.render(&app);
    }

    if let Some(t) = tracker {
        t.stop();
    }
    info!("bye");
    Ok(())
}

fn start_tracker(
    mode:   TrackingMode,
    writer: TrackingWriter,
    sim_rx: Receiver<SimInput>,
) -> Result<Option<HandTracker>, TrackingError> {
    match mode {
        TrackingMode::Off       => Ok(None),
        TrackingMode::Simulated => {
            HandTracker::spawn(move || SimHandSource::new(sim_rx), writer).map(Some)
        }
        #[cfg(feature = "leap")]
        TrackingMode::Leap => {
            HandTracker::spawn(crate::tracker::LeapHandSource::new, writer).map(Some)
        }
        #[cfg(not(feature = "leap"))]
        TrackingMode::Leap => {
            drop(writer);
            Err(TrackingError::Unavailable("built without the `leap` feature".into()))
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_gesture::Classification;

    const DT: f32 = 1.0 / 60.0;

    fn make_app(tracking: TrackingMode) -> (AppState, TrackingWriter) {
        let cfg = AppConfig { particle_count: 200, tracking, ..AppConfig::default() };
        let (writer, reader) = tracking_signal();
        (AppState::new(&cfg, reader), writer)
    }

    fn open_hand() -> Classification {
        Classification {
            gesture:        GestureState::Open,
            pointer:        PointerSample { x: 0.5, y: 0.5, z: 0.3, present: true },
            extended:       5,
            pinch_distance: 0.3,
        }
    }

    #[test]
    fn default_config() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.theme.id, "ICE");
        assert_eq!(cfg.particle_count, 8000);
        assert_eq!((cfg.window_width, cfg.window_height), (960, 640));
    }

    #[test]
    fn tick_reads_tracker_gesture() {
        let (mut app, mut writer) = make_app(TrackingMode::Simulated);
        writer.publish(&open_hand());
        app.tick(DT);
        assert_eq!(app.gesture(), GestureState::Open);
        assert!(app.pointer().present);
        assert!(app.status.starts_with("Cosmic Expansion"));
    }

    #[test]
    fn manual_cycle_order() {
        let (mut app, _w) = make_app(TrackingMode::Off);
        assert!(app.is_manual());
        app.cycle_gesture();
        assert_eq!(app.gesture(), GestureState::Pinch);
        app.cycle_gesture();
        assert_eq!(app.gesture(), GestureState::Open);
        app.cycle_gesture();
        assert_eq!(app.gesture(), GestureState::Neutral);
    }

    #[test]
    fn manual_mode_ignores_tracker() {
        let (mut app, mut writer) = make_app(TrackingMode::Simulated);
        app.cycle_gesture();
        writer.publish(&open_hand());
        app.tick(DT);
        assert_eq!(app.gesture(), GestureState::Pinch);
    }

    #[test]
    fn tracking_failure_falls_back_to_manual() {
        let (mut app, mut writer) = make_app(TrackingMode::Simulated);
        writer.publish(&open_hand());
        app.tick(DT);
        app.handle_status(TrackerStatus::Failed(TrackingError::SourceClosed));
        assert!(app.is_manual());
        assert_eq!(app.gesture(), GestureState::Neutral);
        assert_eq!(app.last_error(), Some("landmark source closed"));
        assert!(app.status.contains("landmark source closed"));
    }

    #[test]
    fn same_theme_does_not_rebuild() {
        let (mut app, _w) = make_app(TrackingMode::Off);
        let before: Vec<_> = app.scene().particles().particles().iter().map(|p| p.rest()).collect();
        app.set_theme(ThemeConfig::default_theme());
        let after: Vec<_> = app.scene().particles().particles().iter().map(|p| p.rest()).collect();
        assert_eq!(before, after);

        app.set_theme(&lux_field::theme::NEON);
        assert_eq!(app.scene().particles().theme_id(), "NEON");
        assert!(app.status.contains("Cyber Night"));
    }

    #[test]
    fn photos_from_config_are_hung() {
        let cfg = AppConfig {
            particle_count: 100,
            tracking:       TrackingMode::Off,
            photos:         vec!["a.jpg".into(), "b.jpg".into()],
            ..AppConfig::default()
        };
        let (_w, reader) = tracking_signal();
        let mut app = AppState::new(&cfg, reader);
        assert_eq!(app.scene().gallery().len(), 2);
        app.add_photo(PhotoHandle::new("c.jpg"));
        assert!(app.status.ends_with("photos 3"));
    }

    #[test]
    fn photo_selected_after_tick() {
        let (mut app, _w) = make_app(TrackingMode::Off);
        let id = app.add_photo(PhotoHandle::new("x.png"));
        app.tick(DT);
        assert_eq!(app.scene().gallery().nearest(), Some(id));
    }
}

//! Hand tracking worker: landmark sources and the classifier thread.
//!
//! A [`LandmarkSource`] yields 21-point hand frames at its own cadence.
//! [`HandTracker`] runs one on a dedicated thread, classifies every frame, and
//! is the only writer of the tracking signal.  The render loop never waits on
//! it: it just reads whatever was published last.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use hand_gesture::landmark::{
    FINGER_BASES, FINGER_TIPS, INDEX_TIP, THUMB_BASE, THUMB_CMC, THUMB_IP, THUMB_TIP, WRIST,
};
use hand_gesture::{classify, Landmark, LandmarkFrame, TrackingWriter};
use log::{debug, info, warn};

use crate::error::TrackingError;

/// Longest a source may block before the stop flag is checked again.
const POLL_TIMEOUT: Duration = Duration::from_millis(33);

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSource trait: unified interface for hw and sim
// ════════════════════════════════════════════════════════════════════════════

/// What one poll of a source produced.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceEvent {
    /// A camera frame; `None` when no hand was in view.
    Frame(Option<LandmarkFrame>),
    /// Nothing new within the timeout.
    Idle,
    /// The source has ended and will produce nothing more.
    Closed,
}

/// Anything that can deliver hand landmark frames.
///
/// Sources are built and used entirely on the tracker thread, so they need
/// not be `Send`.
pub trait LandmarkSource {
    fn open(&mut self) -> Result<(), TrackingError>;
    /// Wait at most `timeout` for the next frame.
    fn poll(&mut self, timeout: Duration) -> SourceEvent;
    fn close(&mut self);
}

// ════════════════════════════════════════════════════════════════════════════
// HandTracker
// ════════════════════════════════════════════════════════════════════════════

/// Reported once the source has been opened, or when tracking stops early.
#[derive(Debug)]
pub enum TrackerStatus {
    Ready,
    Failed(TrackingError),
}

/// Owns the tracking thread.  Stopping (or dropping) it joins the thread,
/// closes the source, and leaves the signal at `Neutral` with no hand.
pub struct HandTracker {
    stop:   Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    status: Receiver<TrackerStatus>,
}

impl HandTracker {
    /// Build a source with `factory` on a new thread and start publishing
    /// into `writer`.
    pub fn spawn<S, F>(factory: F, writer: TrackingWriter) -> Result<Self, TrackingError>
    where
        S: LandmarkSource,
        F: FnOnce() -> S + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let (tx, status) = mpsc::channel();
        let flag = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("hand-tracker".into())
            .spawn(move || track(factory(), writer, flag, tx))?;
        Ok(HandTracker { stop, handle: Some(handle), status })
    }

    /// Next status update, if any.  Never blocks.
    pub fn poll_status(&self) -> Option<TrackerStatus> {
        self.status.try_recv().ok()
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("hand tracker thread panicked");
            }
        }
    }
}

impl Drop for HandTracker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn track<S: LandmarkSource>(
    mut source: S,
    mut writer: TrackingWriter,
    stop:       Arc<AtomicBool>,
    status:     Sender<TrackerStatus>,
) {
    if let Err(e) = source.open() {
        warn!("{}", e);
        writer.reset();
        let _ = status.send(TrackerStatus::Failed(e));
        return;
    }
    info!("hand tracking started");
    let _ = status.send(TrackerStatus::Ready);

    while !stop.load(Ordering::Acquire) {
        match source.poll(POLL_TIMEOUT) {
            SourceEvent::Frame(frame) => writer.publish(&classify(frame.as_ref())),
            SourceEvent::Idle         => {}
            SourceEvent::Closed       => {
                warn!("landmark source closed");
                let _ = status.send(TrackerStatus::Failed(TrackingError::SourceClosed));
                break;
            }
        }
    }

    source.close();
    writer.reset();
    debug!("hand tracking stopped");
}

// ════════════════════════════════════════════════════════════════════════════
// SimHandSource: mouse + key simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Hand shape selected from the keyboard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SimPose {
    Fist,
    OpenPalm,
    /// Thumb and index tips touching, other fingers up.
    OkSign,
    /// No hand in view.
    #[default]
    Absent,
}

/// Raw input event from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    /// Window-relative mouse position, 0.0–1.0 on both axes.
    Pointer { x: f32, y: f32 },
    Pose(SimPose),
    /// Scroll wheel ticks; positive grows the hand.
    Zoom(f32),
}

pub const SIM_SCALE_DEFAULT: f32 = 0.06;
pub const SIM_SCALE_MIN:     f32 = 0.05;
pub const SIM_SCALE_MAX:     f32 = 0.12;
const SIM_ZOOM_STEP:         f32 = 0.005;

// Hand template in wrist-relative units, image y pointing down.
const SIM_THUMB_CMC:    [f32; 2] = [-0.35, -0.25];
const SIM_THUMB_BASE:   [f32; 2] = [-0.60, -0.45];
const SIM_THUMB_OUT:    [f32; 2] = [-1.50, -0.30];
const SIM_THUMB_TUCKED: [f32; 2] = [-0.20, -0.50];
const SIM_OK_TOUCH:     [f32; 2] = [-0.55, -0.75];
/// Index, middle, ring, pinky knuckles.
const SIM_KNUCKLES: [[f32; 2]; 4] = [[-0.30, -0.85], [0.0, -0.90], [0.25, -0.85], [0.45, -0.75]];
const SIM_EXTENDED: f32 = 2.2;
const SIM_CURLED:   f32 = 0.7;

/// The simulated hand's state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimHand {
    /// Mouse position, 0.0–1.0.
    pub x:     f32,
    pub y:     f32,
    /// Wrist-to-middle-knuckle span in image units.
    pub scale: f32,
    pub pose:  SimPose,
}

impl Default for SimHand {
    fn default() -> Self {
        SimHand { x: 0.5, y: 0.75, scale: SIM_SCALE_DEFAULT, pose: SimPose::Absent }
    }
}

impl SimHand {
    pub fn apply(&mut self, input: SimInput) {
        match input {
            SimInput::Pointer { x, y } => {
                if x.is_finite() && y.is_finite() {
                    self.x = x.clamp(0.0, 1.0);
                    self.y = y.clamp(0.0, 1.0);
                }
            }
            SimInput::Pose(pose) => self.pose = pose,
            SimInput::Zoom(ticks) => {
                if ticks.is_finite() {
                    self.scale = (self.scale + ticks * SIM_ZOOM_STEP).clamp(SIM_SCALE_MIN, SIM_SCALE_MAX);
                }
            }
        }
    }

    /// The 21 landmarks for the current pose, or `None` with no hand.
    ///
    /// The camera image is mirrored, so the wrist sits at `1 − x` and the
    /// classified pointer follows the mouse.
    pub fn frame(&self) -> Option<LandmarkFrame> {
        let (fingers_out, thumb_tip, index_tip) = match self.pose {
            SimPose::Absent   => return None,
            SimPose::Fist     => (false, SIM_THUMB_TUCKED, None),
            SimPose::OpenPalm => (true,  SIM_THUMB_OUT,    None),
            SimPose::OkSign   => (true,  SIM_OK_TOUCH,     Some(SIM_OK_TOUCH)),
        };

        let wrist = [1.0 - self.x, self.y];
        let at = |u: [f32; 2]| Landmark::new(wrist[0] + u[0] * self.scale, wrist[1] + u[1] * self.scale, 0.0);
        let mix = |a: [f32; 2], b: [f32; 2], t: f32| [a[0] + (b[0] - a[0]) * t, a[1] + (b[1] - a[1]) * t];

        let mut frame = LandmarkFrame::uniform(at([0.0, 0.0]));
        frame.set(WRIST,      at([0.0, 0.0]));
        frame.set(THUMB_CMC,  at(SIM_THUMB_CMC));
        frame.set(THUMB_BASE, at(SIM_THUMB_BASE));
        frame.set(THUMB_IP,   at(mix(SIM_THUMB_BASE, thumb_tip, 0.5)));
        frame.set(THUMB_TIP,  at(thumb_tip));

        for (i, (&base, &tip)) in FINGER_BASES.iter().zip(FINGER_TIPS.iter()).enumerate() {
            let knuckle = SIM_KNUCKLES[i];
            let reach   = if fingers_out { SIM_EXTENDED } else { SIM_CURLED };
            let end = match index_tip {
                Some(touch) if tip == INDEX_TIP => touch,
                _                              => [knuckle[0] * reach, knuckle[1] * reach],
            };
            frame.set(base,     at(knuckle));
            frame.set(base + 1, at(mix(knuckle, end, 1.0 / 3.0)));
            frame.set(base + 2, at(mix(knuckle, end, 2.0 / 3.0)));
            frame.set(tip,      at(end));
        }
        Some(frame)
    }
}

/// Landmark source driven by [`SimInput`] events from the visualizer window.
///
/// Emits a frame on every input and at least every poll timeout, like a
/// camera that keeps streaming while the hand holds still.
pub struct SimHandSource {
    rx:   Receiver<SimInput>,
    hand: SimHand,
}

impl SimHandSource {
    pub fn new(rx: Receiver<SimInput>) -> Self {
        SimHandSource { rx, hand: SimHand::default() }
    }

    pub fn hand(&self) -> &SimHand { &self.hand }
}

impl LandmarkSource for SimHandSource {
    fn open(&mut self) -> Result<(), TrackingError> {
        info!("simulated hand: 1=fist 2=open 3=ok 0=none, mouse moves, scroll resizes");
        Ok(())
    }

    fn poll(&mut self, timeout: Duration) -> SourceEvent {
        match self.rx.recv_timeout(timeout) {
            Ok(input)                           => self.hand.apply(input),
            Err(RecvTimeoutError::Timeout)      => {}
            Err(RecvTimeoutError::Disconnected) => return SourceEvent::Closed,
        }
        while let Ok(input) = self.rx.try_recv() {
            self.hand.apply(input);
        }
        SourceEvent::Frame(self.hand.frame())
    }

    fn close(&mut self) {}
}

// ════════════════════════════════════════════════════════════════════════════
// LeapHandSource: real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Millimetres of tracking volume mapped onto the unit image square.
#[cfg(feature = "leap")]
const LEAP_SPAN_MM:  f32 = 400.0;
/// Palm height that maps to the bottom of the image.
#[cfg(feature = "leap")]
const LEAP_FLOOR_MM: f32 = 100.0;

/// Landmark source backed by a LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
/// Joint positions are projected onto the 21-point layout: per digit the
/// proximal, intermediate, and distal bone bases followed by the tip.
#[cfg(feature = "leap")]
#[derive(Default)]
pub struct LeapHandSource {
    connection: Option<leaprs::Connection>,
}

#[cfg(feature = "leap")]
impl LeapHandSource {
    pub fn new() -> Self { Self::default() }
}

#[cfg(feature = "leap")]
impl LandmarkSource for LeapHandSource {
    fn open(&mut self) -> Result<(), TrackingError> {
        use leaprs::*;
        let mut connection = Connection::create(ConnectionConfig::default())
            .map_err(|e| TrackingError::Unavailable(format!("LeapC connection: {:?}", e)))?;
        connection.open()
            .map_err(|e| TrackingError::Unavailable(format!("LeapMotion device: {:?}", e)))?;
        self.connection = Some(connection);
        Ok(())
    }

    fn poll(&mut self, timeout: Duration) -> SourceEvent {
        use leaprs::*;
        let connection = match self.connection.as_mut() {
            Some(c) => c,
            None    => return SourceEvent::Closed,
        };
        let msg = match connection.poll(timeout.as_millis() as u32) {
            Ok(m)  => m,
            Err(_) => return SourceEvent::Idle,
        };
        match msg.event() {
            Event::Tracking(frame) => {
                SourceEvent::Frame(frame.hands().into_iter().next().map(|h| leap_frame(&h)))
            }
            _ => SourceEvent::Idle,
        }
    }

    fn close(&mut self) {
        if self.connection.take().is_some() {
            debug!("LeapC connection released");
        }
    }
}

#[cfg(feature = "leap")]
fn leap_frame(hand: &leaprs::Hand) -> LandmarkFrame {
    let to_image = |x: f32, y: f32, z: f32| {
        Landmark::new(0.5 - x / LEAP_SPAN_MM, 1.0 - (y - LEAP_FLOOR_MM) / LEAP_SPAN_MM, z / LEAP_SPAN_MM)
    };
    let wrist = hand.arm().next_joint();
    let mut frame = LandmarkFrame::uniform(to_image(wrist.x, wrist.y, wrist.z));
    for (d, digit) in hand.digits().into_iter().enumerate().take(5) {
        let joints = [
            digit.proximal().prev_joint(),
            digit.intermediate().prev_joint(),
            digit.distal().prev_joint(),
            digit.distal().next_joint(),
        ];
        for (k, j) in joints.iter().enumerate() {
            frame.set(1 + d * 4 + k, to_image(j.x, j.y, j.z));
        }
    }
    frame
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_gesture::{tracking_signal, GestureState};
    use std::collections::VecDeque;

    struct Scripted {
        events:    VecDeque<SourceEvent>,
        fail_open: bool,
        closed:    Arc<AtomicBool>,
    }

    impl Scripted {
        fn new(events: Vec<SourceEvent>) -> (Self, Arc<AtomicBool>) {
            let closed = Arc::new(AtomicBool::new(false));
            let s = Scripted { events: events.into(), fail_open: false, closed: Arc::clone(&closed) };
            (s, closed)
        }
    }

    impl LandmarkSource for Scripted {
        fn open(&mut self) -> Result<(), TrackingError> {
            if self.fail_open {
                Err(TrackingError::Unavailable("no device".into()))
            } else {
                Ok(())
            }
        }

        fn poll(&mut self, timeout: Duration) -> SourceEvent {
            self.events.pop_front().unwrap_or_else(|| {
                thread::sleep(timeout.min(Duration::from_millis(5)));
                SourceEvent::Idle
            })
        }

        fn close(&mut self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
        for _ in 0..400 {
            if cond() { return true; }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    fn posed(pose: SimPose) -> SimHand {
        SimHand { pose, ..SimHand::default() }
    }

    #[test]
    fn publishes_classified_frames() {
        let (writer, reader) = tracking_signal();
        let (source, closed) = Scripted::new(vec![SourceEvent::Frame(posed(SimPose::OpenPalm).frame())]);
        let tracker = HandTracker::spawn(move || source, writer).unwrap();

        assert!(wait_until(|| matches!(tracker.poll_status(), Some(TrackerStatus::Ready))));
        assert!(wait_until(|| reader.gesture() == GestureState::Open));
        assert!(reader.latest().present);

        tracker.stop();
        assert!(closed.load(Ordering::SeqCst));
        assert_eq!(reader.gesture(), GestureState::Neutral);
        assert!(!reader.latest().present);
        assert!(reader.is_orphaned());
    }

    #[test]
    fn open_failure_is_reported() {
        let (writer, reader) = tracking_signal();
        let (mut source, closed) = Scripted::new(vec![]);
        source.fail_open = true;
        let tracker = HandTracker::spawn(move || source, writer).unwrap();

        assert!(wait_until(|| matches!(
            tracker.poll_status(),
            Some(TrackerStatus::Failed(TrackingError::Unavailable(_)))
        )));
        assert!(wait_until(|| !tracker.is_running()));
        assert_eq!(reader.gesture(), GestureState::Neutral);
        assert!(!closed.load(Ordering::SeqCst));
    }

    #[test]
    fn closed_source_stops_tracking() {
        let (writer, reader) = tracking_signal();
        let (source, closed) = Scripted::new(vec![
            SourceEvent::Frame(posed(SimPose::OkSign).frame()),
            SourceEvent::Closed,
        ]);
        let tracker = HandTracker::spawn(move || source, writer).unwrap();

        let mut failed = false;
        assert!(wait_until(|| {
            if let Some(TrackerStatus::Failed(TrackingError::SourceClosed)) = tracker.poll_status() {
                failed = true;
            }
            failed
        }));
        assert!(wait_until(|| closed.load(Ordering::SeqCst)));
        assert!(wait_until(|| !tracker.is_running()));
        assert_eq!(reader.gesture(), GestureState::Neutral);
    }

    #[test]
    fn drop_releases_source() {
        let (writer, _reader) = tracking_signal();
        let (source, closed) = Scripted::new(vec![]);
        let tracker = HandTracker::spawn(move || source, writer).unwrap();
        drop(tracker);
        assert!(closed.load(Ordering::SeqCst));
    }

    #[test]
    fn sim_poses_classify_as_intended() {
        for scale in [SIM_SCALE_MIN, SIM_SCALE_DEFAULT, SIM_SCALE_MAX] {
            let with = |pose| classify(SimHand { pose, scale, ..SimHand::default() }.frame().as_ref());
            assert_eq!(with(SimPose::Fist).gesture,     GestureState::Neutral, "fist @ {}", scale);
            assert_eq!(with(SimPose::OpenPalm).gesture, GestureState::Open,    "open @ {}", scale);
            assert_eq!(with(SimPose::OkSign).gesture,   GestureState::Pinch,   "ok @ {}", scale);
            assert!(with(SimPose::Fist).pointer.present);
            assert!(!with(SimPose::Absent).pointer.present);
        }
    }

    #[test]
    fn sim_pointer_follows_mouse() {
        let mut hand = posed(SimPose::Fist);
        hand.apply(SimInput::Pointer { x: 0.3, y: 0.6 });
        let c = classify(hand.frame().as_ref());
        assert!((c.pointer.x - 0.3).abs() < 1e-5);
        assert!((c.pointer.y - 0.6).abs() < 1e-5);
    }

    #[test]
    fn sim_zoom_is_clamped_and_grows_hand() {
        let mut hand = posed(SimPose::Fist);
        let before = classify(hand.frame().as_ref()).pointer.z;
        hand.apply(SimInput::Zoom(4.0));
        assert!(classify(hand.frame().as_ref()).pointer.z > before);
        hand.apply(SimInput::Zoom(1000.0));
        assert_eq!(hand.scale, SIM_SCALE_MAX);
        hand.apply(SimInput::Zoom(-1000.0));
        assert_eq!(hand.scale, SIM_SCALE_MIN);
    }

    #[test]
    fn sim_source_applies_queued_input_then_closes() {
        let (tx, rx) = mpsc::channel();
        let mut source = SimHandSource::new(rx);
        assert_eq!(source.poll(Duration::from_millis(1)), SourceEvent::Frame(None));

        tx.send(SimInput::Pose(SimPose::OpenPalm)).unwrap();
        tx.send(SimInput::Pointer { x: 0.2, y: 0.4 }).unwrap();
        match source.poll(Duration::from_millis(10)) {
            SourceEvent::Frame(Some(f)) => assert_eq!(classify(Some(&f)).gesture, GestureState::Open),
            other                       => panic!("unexpected {:?}", other),
        }
        assert_eq!(source.hand().x, 0.2);

        drop(tx);
        assert_eq!(source.poll(Duration::from_millis(10)), SourceEvent::Closed);
    }
}

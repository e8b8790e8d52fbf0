//! Last-value-wins tracking signal.
//!
//! The classifier thread owns the only [`TrackingWriter`]; the render loop
//! owns the only [`TrackingReader`].  Each field is an independent atomic, so
//! a read may mix fields from two consecutive writes; consumers only ever
//! want the latest value and tolerate that.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;

use crate::classify::{Classification, GestureState, PointerSample};

#[derive(Debug)]
struct Shared {
    x:       AtomicU32,
    y:       AtomicU32,
    z:       AtomicU32,
    present: AtomicBool,
    gesture: AtomicU8,
}

impl Shared {
    fn store_pointer(&self, p: &PointerSample) {
        self.x.store(p.x.to_bits(), Ordering::Relaxed);
        self.y.store(p.y.to_bits(), Ordering::Relaxed);
        self.z.store(p.z.to_bits(), Ordering::Relaxed);
        self.present.store(p.present, Ordering::Release);
    }
}

/// Create a connected writer/reader pair, initialised to
/// [`PointerSample::IDLE`] and `Neutral`.
pub fn tracking_signal() -> (TrackingWriter, TrackingReader) {
    let idle = PointerSample::IDLE;
    let shared = Arc::new(Shared {
        x:       AtomicU32::new(idle.x.to_bits()),
        y:       AtomicU32::new(idle.y.to_bits()),
        z:       AtomicU32::new(idle.z.to_bits()),
        present: AtomicBool::new(false),
        gesture: AtomicU8::new(GestureState::Neutral.to_u8()),
    });
    (TrackingWriter { shared: Arc::clone(&shared) }, TrackingReader { shared })
}

// ════════════════════════════════════════════════════════════════════════════
// Writer
// ════════════════════════════════════════════════════════════════════════════

/// Sole writing end of the signal.  Not `Clone`.
#[derive(Debug)]
pub struct TrackingWriter {
    shared: Arc<Shared>,
}

impl TrackingWriter {
    /// Publish one classification.
    ///
    /// A present pointer overwrites the whole sample; an absent one only
    /// clears `present`, so readers keep the last known position.
    pub fn publish(&mut self, c: &Classification) {
        if c.pointer.present {
            self.shared.store_pointer(&c.pointer);
        } else {
            self.shared.present.store(false, Ordering::Release);
        }
        self.set_gesture(c.gesture);
    }

    pub fn set_gesture(&mut self, gesture: GestureState) {
        self.shared.gesture.store(gesture.to_u8(), Ordering::Release);
    }

    /// Fall back to `Neutral` with no hand present.
    pub fn reset(&mut self) {
        self.shared.present.store(false, Ordering::Release);
        self.set_gesture(GestureState::Neutral);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Reader
// ════════════════════════════════════════════════════════════════════════════

/// Sole reading end of the signal.  Not `Clone`.
#[derive(Debug)]
pub struct TrackingReader {
    shared: Arc<Shared>,
}

impl TrackingReader {
    /// Latest pointer sample.
    pub fn latest(&self) -> PointerSample {
        let present = self.shared.present.load(Ordering::Acquire);
        PointerSample {
            x: f32::from_bits(self.shared.x.load(Ordering::Relaxed)),
            y: f32::from_bits(self.shared.y.load(Ordering::Relaxed)),
            z: f32::from_bits(self.shared.z.load(Ordering::Relaxed)),
            present,
        }
    }

    /// Latest classified gesture.
    pub fn gesture(&self) -> GestureState {
        GestureState::from_u8(self.shared.gesture.load(Ordering::Acquire))
    }

    /// True once the writer has been dropped.
    pub fn is_orphaned(&self) -> bool {
        Arc::strong_count(&self.shared) == 1
    }
}

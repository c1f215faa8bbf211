//! The seam between this engine and the host's accessibility layer.
//!
//! The host (an OS accessibility service) implements [`AccessibilityBridge`]
//! and hands it to [`Session::connect`](crate::Session::connect) when the
//! OS reports the service connected. The tree behind the bridge is a
//! volatile external resource: two calls to [`AccessibilityBridge::active_root`]
//! may observe different trees if the foreground app has redrawn, so
//! callers re-fetch the root for every traversal.

use crate::node::UiNode;
use std::time::Duration;

pub mod simulated;

/// A synthesized single-stroke gesture in screen coordinates.
/// A tap is a stroke whose start and end coincide.
#[derive(Debug, Clone, PartialEq)]
pub struct Gesture {
    pub start: (f32, f32),
    pub end: (f32, f32),
    pub duration: Duration,
}

impl Gesture {
    pub fn tap(x: f32, y: f32) -> Self {
        Self {
            start: (x, y),
            end: (x, y),
            duration: Duration::from_millis(100),
        }
    }

    pub fn stroke(start: (f32, f32), end: (f32, f32), duration: Duration) -> Self {
        Self {
            start,
            end,
            duration,
        }
    }

    pub fn is_tap(&self) -> bool {
        self.start == self.end
    }
}

/// Host-implemented access to the live accessibility tree and the global
/// actions of the platform.
///
/// Interaction methods return plain booleans: a `false` means the platform
/// rejected or could not deliver the action, which callers treat through
/// fallback chains, never as a programming error.
pub trait AccessibilityBridge: Send + Sync {
    /// Root of the active window's tree, or `None` when no window is
    /// available (service starting up, secure screen, transient redraw).
    fn active_root(&self) -> Option<UiNode>;

    /// Display size in pixels, used to compute gesture coordinates
    fn display_size(&self) -> (u32, u32);

    /// Whether synthesized gestures can be dispatched at all. On platforms
    /// below the required capability level this is `false` and every
    /// gesture call fails closed.
    fn supports_gestures(&self) -> bool;

    /// Dispatch a synthesized gesture. Returns acceptance for dispatch,
    /// not visual success.
    fn dispatch_gesture(&self, gesture: &Gesture) -> bool;

    /// Press the global back affordance
    fn press_back(&self) -> bool;

    /// Resolve the package's launch entry point and start it, bringing an
    /// existing instance to the front rather than spawning a duplicate.
    /// `false` when no launch entry point resolves.
    fn launch_app(&self, package: &str) -> bool;
}

//! Pointer coordinate handling for the click overlay and the toolbar hot zone.

use device_query::{DeviceQuery, DeviceState};
use parking_lot::Mutex;
use std::sync::mpsc;
use std::thread;

use crate::geometry::{to_logical, Point, Rect};

/// macOS reports the cursor in points, which are already logical pixels.
/// Elsewhere the backend reports physical pixels.
pub const POINTER_IS_LOGICAL: bool = cfg!(target_os = "macos");

/// Convert a cursor position reported by the input backend to logical pixels.
pub fn pointer_to_logical(raw: (i32, i32), scale_factor: f64) -> Point {
    scale_pointer(raw, scale_factor, POINTER_IS_LOGICAL)
}

fn scale_pointer(raw: (i32, i32), scale_factor: f64, already_logical: bool) -> Point {
    if already_logical {
        return Point::new(f64::from(raw.0), f64::from(raw.1));
    }
    Point::new(to_logical(raw.0, scale_factor), to_logical(raw.1, scale_factor))
}

/// Convert a raw click to logical pixels and apply the recording bounds.
///
/// Returns the logical point to forward, or `None` when the click lies
/// outside `bounds`. Without bounds every click is forwarded.
pub fn process_click(raw: (i32, i32), scale_factor: f64, bounds: Option<&Rect>) -> Option<Point> {
    filter_click(pointer_to_logical(raw, scale_factor), bounds)
}

fn filter_click(point: Point, bounds: Option<&Rect>) -> Option<Point> {
    match bounds {
        Some(bounds) if !bounds.contains_point(point) => None,
        _ => Some(point),
    }
}

/// Reads the global cursor position as reported by the input backend.
pub trait CursorProbe: Send + Sync {
    fn position(&self) -> Option<(i32, i32)>;
}

type Reply = mpsc::SyncSender<Option<(i32, i32)>>;

/// Cursor probe backed by `device_query`.
///
/// The device state is not `Send` on every platform, so one sampler thread
/// owns it and answers position requests. When the state cannot be opened
/// (no display server, no input permission) the thread exits and the probe
/// keeps returning `None`.
pub struct DeviceCursor {
    requests: Mutex<Option<mpsc::Sender<Reply>>>,
}

impl DeviceCursor {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel::<Reply>();
        let spawned = thread::Builder::new()
            .name("cursor-probe".to_string())
            .spawn(move || {
                let Some(device) = DeviceState::checked_new() else {
                    log::warn!("[HOOK] Cursor position unavailable");
                    return;
                };
                // Ends once the probe and its sender are dropped
                for reply in rx {
                    let _ = reply.send(Some(device.get_mouse().coords));
                }
            });
        if let Err(e) = &spawned {
            log::warn!("[HOOK] Failed to spawn cursor probe: {}", e);
        }
        Self {
            requests: Mutex::new(spawned.ok().map(|_| tx)),
        }
    }
}

impl CursorProbe for DeviceCursor {
    fn position(&self) -> Option<(i32, i32)> {
        let mut requests = self.requests.lock();
        let (reply_tx, reply_rx) = mpsc::sync_channel(1);
        if requests.as_ref()?.send(reply_tx).is_err() {
            *requests = None;
            return None;
        }
        drop(requests);
        reply_rx.recv().ok().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_one_is_identity() {
        assert_eq!(process_click((640, 360), 1.0, None), Some(Point::new(640.0, 360.0)));
    }

    #[test]
    fn test_physical_to_logical_rounds() {
        assert_eq!(scale_pointer((301, 199), 2.0, false), Point::new(151.0, 100.0));
        assert_eq!(scale_pointer((100, 100), 1.25, false), Point::new(80.0, 80.0));
        assert_eq!(scale_pointer((101, 101), 1.5, false), Point::new(67.0, 67.0));
    }

    #[test]
    fn test_logical_pointer_is_not_rescaled() {
        assert_eq!(scale_pointer((800, 400), 2.0, true), Point::new(800.0, 400.0));
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn test_macos_clicks_are_already_points() {
        assert_eq!(process_click((800, 400), 2.0, None), Some(Point::new(800.0, 400.0)));
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn test_clicks_are_scaled_to_logical() {
        assert_eq!(process_click((800, 400), 2.0, None), Some(Point::new(400.0, 200.0)));
    }

    #[test]
    fn test_click_inside_bounds_is_forwarded() {
        let bounds = Rect::new(10.0, 10.0, 100.0, 50.0);
        assert_eq!(
            process_click((50, 30), 1.0, Some(&bounds)),
            Some(Point::new(50.0, 30.0))
        );
        // Bounds are compared in logical pixels
        assert_eq!(
            filter_click(scale_pointer((100, 60), 2.0, false), Some(&bounds)),
            Some(Point::new(50.0, 30.0))
        );
    }

    #[test]
    fn test_click_outside_bounds_is_dropped() {
        let bounds = Rect::new(10.0, 10.0, 100.0, 50.0);
        assert_eq!(process_click((200, 200), 1.0, Some(&bounds)), None);
        assert_eq!(process_click((5, 30), 1.0, Some(&bounds)), None);
    }

    #[test]
    fn test_probe_without_sampler_reports_nothing() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let probe = DeviceCursor {
            requests: Mutex::new(Some(tx)),
        };
        assert_eq!(probe.position(), None);
        assert!(probe.requests.lock().is_none());
        assert_eq!(probe.position(), None);
    }

    #[test]
    fn test_click_on_bounds_edge_is_forwarded() {
        let bounds = Rect::new(10.0, 10.0, 100.0, 50.0);
        assert!(process_click((110, 60), 1.0, Some(&bounds)).is_some());
        assert!(process_click((10, 10), 1.0, Some(&bounds)).is_some());
    }
}

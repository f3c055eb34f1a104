//! Route drawing animation
//!
//! A per-frame task that cycles the route line's dash pattern. Each tick
//! first checks the layer still exists and stops for good once it is gone.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use super::layers::{DASH_SEQUENCE, ROUTE_LINE_LAYER};
use crate::ports::{MapId, MapSurface};

/// Handle of a running dash animation; aborted on drop
#[derive(Debug)]
pub struct DashAnimation {
    task: JoinHandle<()>,
}

impl DashAnimation {
    /// Start animating the route line of `map`
    ///
    /// Returns `None` outside a Tokio runtime; the route is then drawn static.
    pub fn start(surface: Arc<dyn MapSurface>, map: MapId, frame: Duration) -> Option<Self> {
        let Ok(handle) = Handle::try_current() else {
            warn!("No async runtime, route animation disabled");
            return None;
        };

        let task = handle.spawn(async move {
            let mut ticker = tokio::time::interval(frame);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut step = 0usize;

            loop {
                ticker.tick().await;
                if !surface.has_layer(map, ROUTE_LINE_LAYER) {
                    debug!(map = map.0, "Route layer gone, animation stopped");
                    break;
                }

                step = (step + 1) % DASH_SEQUENCE.len();
                if let Err(e) = surface.set_paint_property(
                    map,
                    ROUTE_LINE_LAYER,
                    "line-dasharray",
                    json!(DASH_SEQUENCE[step]),
                ) {
                    debug!(map = map.0, error = %e, "Dash update rejected, animation stopped");
                    break;
                }
            }
        });

        Some(Self { task })
    }

    /// Whether the animation loop is still scheduled
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Cancel the animation
    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for DashAnimation {
    fn drop(&mut self) {
        self.task.abort();
    }
}

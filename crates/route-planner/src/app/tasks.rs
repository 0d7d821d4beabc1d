//! Background work and its hand-off to the UI thread
//!
//! Routing and geocoding run as spawned tasks. Each task ends by posting a
//! [`TaskEvent`] on a channel that the app drains once per frame.

use route_planner_lib::{
    GeocodeError, GeocodeTicket, PlaceSelection, RouteResult, RouteStatus, SelectionField,
};
use std::future::Future;
use tokio::sync::mpsc;

/// Outcome of a background task
#[derive(Debug)]
pub enum TaskEvent {
    /// A route computation finished
    Route(Result<RouteResult, RouteStatus>),

    /// A reverse geocode for the device position finished
    Address {
        ticket: GeocodeTicket,
        result: Result<String, GeocodeError>,
    },

    /// Autocomplete results for a search field
    Suggestions {
        field: SelectionField,
        query: String,
        result: Result<Vec<PlaceSelection>, GeocodeError>,
        /// Commit the first match right away (startup text)
        auto_commit: bool,
    },
}

/// Spawner plus the receiving end of the event channel
pub struct TaskQueue {
    tx: mpsc::UnboundedSender<TaskEvent>,
    rx: mpsc::UnboundedReceiver<TaskEvent>,
    ctx: egui::Context,
}

impl TaskQueue {
    pub fn new(ctx: egui::Context) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx, ctx }
    }

    /// Run `future` in the background and deliver its event
    #[cfg(not(target_arch = "wasm32"))]
    pub fn spawn<F>(&self, future: F)
    where
        F: Future<Output = TaskEvent> + Send + 'static,
    {
        let tx = self.tx.clone();
        let ctx = self.ctx.clone();
        tokio::spawn(async move {
            deliver(&tx, &ctx, future.await);
        });
    }

    /// Run `future` on the browser event loop and deliver its event
    #[cfg(target_arch = "wasm32")]
    pub fn spawn<F>(&self, future: F)
    where
        F: Future<Output = TaskEvent> + 'static,
    {
        let tx = self.tx.clone();
        let ctx = self.ctx.clone();
        wasm_bindgen_futures::spawn_local(async move {
            deliver(&tx, &ctx, future.await);
        });
    }

    /// Events that arrived since the last call
    pub fn drain(&mut self) -> Vec<TaskEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}

fn deliver(tx: &mpsc::UnboundedSender<TaskEvent>, ctx: &egui::Context, event: TaskEvent) {
    if tx.send(event).is_err() {
        tracing::debug!("Dropping task result, the app has shut down");
        return;
    }
    ctx.request_repaint();
}

//! Settled-text debouncer.
//!
//! Every raw change restarts the quiet period. Timers are not aborted;
//! each carries the generation it was armed for, and the controller drops
//! elapses whose generation is no longer current. Arming a new timer is
//! therefore also the cancellation of every older one.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::sleep;

use crate::event::ControllerEvent;

pub struct Debouncer {
    quiet_period: Duration,
    generation: u64,
    events: mpsc::UnboundedSender<ControllerEvent>,
}

impl Debouncer {
    pub fn new(quiet_period: Duration, events: mpsc::UnboundedSender<ControllerEvent>) -> Self {
        Self {
            quiet_period,
            generation: 0,
            events,
        }
    }

    /// Restart the quiet period; returns the newly armed generation.
    pub fn poke(&mut self) -> u64 {
        self.generation += 1;
        let generation = self.generation;
        let quiet_period = self.quiet_period;
        let events = self.events.clone();
        tokio::spawn(async move {
            sleep(quiet_period).await;
            let _ = events.send(ControllerEvent::QuietPeriodElapsed { generation });
        });
        generation
    }

    /// Invalidate any pending timer without arming a new one.
    pub fn cancel(&mut self) {
        self.generation += 1;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }
}

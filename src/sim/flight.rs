//! Reveal -> route preview -> flight launch scheduling
//!
//! A reveal schedules two deferred steps on the monotonic frame clock. Each
//! scheduled flight carries a ticket; scheduling again or cancelling bumps
//! the generation so stale tickets turn into no-ops instead of resurrecting
//! an old route.

use glam::Vec2;

/// Identifies one scheduled flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlightTicket(u64);

/// Dashed route from the station to the reveal target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoutePreview {
    /// World-space target of the flight
    pub target: Vec2,
    /// Heading from the station (radians)
    pub angle: f32,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    AwaitingPreview { due: f64 },
    AwaitingLaunch { due: f64 },
}

#[derive(Debug, Clone, Copy)]
struct PendingFlight {
    ticket: FlightTicket,
    stage: Stage,
}

/// Fired by `FlightScheduler::poll`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightEvent {
    PreviewShown(FlightTicket),
    Launch(FlightTicket),
}

#[derive(Debug, Clone)]
pub struct FlightScheduler {
    generation: u64,
    pending: Option<PendingFlight>,
    active: Option<FlightTicket>,
    route: Option<RoutePreview>,
    preview_delay_ms: f64,
    launch_delay_ms: f64,
}

impl FlightScheduler {
    pub fn new(preview_delay_ms: f64, launch_delay_ms: f64) -> Self {
        Self {
            generation: 0,
            pending: None,
            active: None,
            route: None,
            preview_delay_ms,
            launch_delay_ms,
        }
    }

    /// Schedule a flight to `target`, superseding any pending one
    pub fn schedule(&mut self, origin: Vec2, target: Vec2, now: f64) -> FlightTicket {
        if self.pending.is_some() {
            log::info!("Pending flight superseded by a new reveal");
        }
        self.generation += 1;
        let ticket = FlightTicket(self.generation);
        let heading = target - origin;
        self.route = Some(RoutePreview {
            target,
            angle: heading.y.atan2(heading.x),
            visible: false,
        });
        self.pending = Some(PendingFlight {
            ticket,
            stage: Stage::AwaitingPreview {
                due: now + self.preview_delay_ms,
            },
        });
        ticket
    }

    /// Drop any pending or active flight; outstanding tickets become stale
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.pending = None;
        self.active = None;
        self.route = None;
    }

    pub fn is_current(&self, ticket: FlightTicket) -> bool {
        ticket.0 == self.generation
    }

    /// A launched flight is in progress
    pub fn active(&self) -> Option<FlightTicket> {
        self.active
    }

    pub fn route(&self) -> Option<&RoutePreview> {
        self.route.as_ref()
    }

    /// Fire at most one due step
    pub fn poll(&mut self, now: f64) -> Option<FlightEvent> {
        let pending = self.pending?;
        match pending.stage {
            Stage::AwaitingPreview { due } if now >= due => {
                if let Some(route) = self.route.as_mut() {
                    route.visible = true;
                }
                self.pending = Some(PendingFlight {
                    ticket: pending.ticket,
                    stage: Stage::AwaitingLaunch {
                        due: due + self.launch_delay_ms,
                    },
                });
                Some(FlightEvent::PreviewShown(pending.ticket))
            }
            Stage::AwaitingLaunch { due } if now >= due => {
                self.pending = None;
                self.active = Some(pending.ticket);
                Some(FlightEvent::Launch(pending.ticket))
            }
            _ => None,
        }
    }

    /// Close out a flight; stale tickets are ignored
    pub fn finish(&mut self, ticket: FlightTicket) -> bool {
        if !self.is_current(ticket) || self.active != Some(ticket) {
            log::warn!("Ignoring completion of a stale flight");
            return false;
        }
        self.active = None;
        self.route = None;
        true
    }
}

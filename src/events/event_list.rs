use crate::Error;

use ordered_float::OrderedFloat;
use std::fmt::{Display, Formatter};

/// The two kinds of event a checkout simulation schedules.
///
/// The declaration order is the scan order used by [`EventList::advance()`]: when both kinds are due at the same
/// instant, the arrival fires first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Arrival,
    Departure,
}

impl EventKind {
    /// Every kind, in scan order.
    pub const ALL: [EventKind; 2] = [EventKind::Arrival, EventKind::Departure];

    fn slot(self) -> usize {
        match self {
            EventKind::Arrival => 0,
            EventKind::Departure => 1,
        }
    }
}

/// Fixed two-slot event list and the simulation clock.
///
/// Holds at most one pending entry per [`EventKind`]. Scheduling a kind that already has an entry replaces that entry,
/// so there can never be two outstanding arrivals or two outstanding departures. An unscheduled slot holds `+∞`.
///
/// Like any discrete-event clock, the one held here only moves forward: [`advance()`] sets it to the earliest
/// scheduled time, and [`schedule()`] refuses times that are already past.
///
/// [`advance()`]: EventList::advance
/// [`schedule()`]: EventList::schedule
#[derive(Clone, Debug, PartialEq)]
pub struct EventList {
    next_event_time: [OrderedFloat<f64>; 2],
    sim_time: f64,
}

impl EventList {
    /// Construct an [`EventList`] with nothing scheduled and a clock initialized to the provided time.
    pub fn new(start_time: f64) -> Self {
        Self {
            next_event_time: [OrderedFloat(f64::INFINITY); 2],
            sim_time: start_time,
        }
    }

    /// Schedule `kind` at `time`, replacing any entry it already had.
    ///
    /// # Errors
    ///
    /// If `time` is NaN or infinite, returns an [`Error::NonFiniteTime`]; use [`cancel()`] to unschedule a kind. If
    /// `time` is less than the current clock time, returns an [`Error::BackInTime`] to indicate the likely presence of
    /// a logical bug at the call site. Either way the list is left unmodified.
    ///
    /// [`cancel()`]: EventList::cancel
    pub fn schedule(&mut self, kind: EventKind, time: f64) -> crate::Result {
        if !time.is_finite() {
            return Err(Error::NonFiniteTime {
                scheduled: time,
                now: self.sim_time,
            });
        }
        if time < self.sim_time {
            return Err(Error::BackInTime {
                scheduled: time,
                now: self.sim_time,
            });
        }

        self.next_event_time[kind.slot()] = OrderedFloat(time);
        Ok(())
    }

    /// Remove `kind` from consideration until it is scheduled again.
    pub fn cancel(&mut self, kind: EventKind) {
        self.next_event_time[kind.slot()] = OrderedFloat(f64::INFINITY);
    }

    /// The time `kind` is due, or `None` if it is not scheduled.
    pub fn scheduled(&self, kind: EventKind) -> Option<f64> {
        let time = self.next_event_time[kind.slot()].into_inner();
        if time.is_finite() {
            Some(time)
        } else {
            None
        }
    }

    /// Move the clock to the earliest scheduled entry and report which kind it belongs to.
    ///
    /// The entry itself stays in place; the handler for that kind is expected to reschedule or cancel it. Ties go to
    /// the kind scanned first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExhaustedEventList`] if no kind is scheduled, leaving the clock untouched.
    pub fn advance(&mut self) -> crate::Result<EventKind> {
        let (kind, time) = EventKind::ALL
            .into_iter()
            .map(|kind| (kind, self.next_event_time[kind.slot()]))
            .min_by_key(|(_, time)| *time)
            .ok_or(Error::ExhaustedEventList)?;

        if !time.into_inner().is_finite() {
            return Err(Error::ExhaustedEventList);
        }

        self.sim_time = time.into_inner();
        Ok(kind)
    }

    /// Get the simulation's current clock time.
    pub fn current_time(&self) -> f64 {
        self.sim_time
    }
}

impl Default for EventList {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Display for EventList {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        write!(
            formatter,
            "EventList at time {} with next arrival {} and next departure {}",
            self.sim_time, self.next_event_time[0], self.next_event_time[1],
        )
    }
}

use crate::classes::ClassTable;
use crate::config::{StoreConfig, ValidatedConfig};
use crate::events::{arrive, depart, EventKind, EventList};
use crate::statistics::{Report, Statistics};
use crate::store::{ClassPlan, Store};
use crate::variates::{RngVariates, VariateSource};

use rand_pcg::Pcg64;
use std::fmt::Formatter;

/// Where a [`Simulation`] is in its run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Events fire in time order until the clock has passed the horizon.
    Running,
    /// No more events fire; customers still in line are served at the closing clock.
    Draining,
    /// The line is empty and the report can be read.
    Done,
}

/// Contains the event list, the store, and everything else belonging to one run of the checkout.
///
/// The expected workflow for a Simulation is:
///
/// 1. Build a [`StoreConfig`], or take the default reference store.
/// 2. Pass it and a [`VariateSource`] to [`new()`], or just the config to [`seeded()`]. The configuration is
///    validated, once-per-run service times are drawn, and the first arrival is scheduled.
/// 3. Call [`run()`] and handle any error it might return, or call [`step()`] repeatedly to observe the run as it
///    goes.
/// 4. Read the returned [`Report`], or use the accessors to inspect the final state.
///
/// The run has three phases. While [`Running`], each step advances the clock to the next event, integrates the
/// time-weighted statistics over the elapsed interval, and hands the event to its handler. The horizon is a minimum
/// run length rather than a hard cutoff: the check happens before each event, so the last event processed is the
/// first one past the horizon. The run then moves to [`Draining`], where the clock is frozen and each step serves the
/// customer at the front of the line until it is empty, and finally to [`Done`].
///
/// [`new()`]: Simulation::new
/// [`seeded()`]: Simulation::seeded
/// [`run()`]: Simulation::run
/// [`step()`]: Simulation::step
/// [`Running`]: Phase::Running
/// [`Draining`]: Phase::Draining
/// [`Done`]: Phase::Done
#[derive(Debug)]
pub struct Simulation<V> {
    config: ValidatedConfig,
    event_list: EventList,
    store: Store<V>,
    phase: Phase,
}

impl<V> Simulation<V>
where
    V: VariateSource,
{
    /// Validate `config` and set up a run drawing from `variates`, with the clock at zero and the first arrival
    /// scheduled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is rejected.
    ///
    /// [`Error::Config`]: crate::Error::Config
    pub fn new(config: StoreConfig, variates: V) -> crate::Result<Self> {
        let config = config.validate()?;
        let mut store = Store::new(&config, variates);
        let mut event_list = EventList::new(0.0);
        store.schedule_arrival(&mut event_list)?;

        tracing::info!(
            mean_interarrival = config.mean_interarrival(),
            horizon = config.horizon(),
            seed = config.seed(),
            "single-server queueing system with fixed run length"
        );

        Ok(Self {
            config,
            event_list,
            store,
            phase: Phase::Running,
        })
    }

    /// Perform one unit of work and report which handler, if any, ran.
    ///
    /// Follows this logic:
    ///
    /// 1. While running with the clock at or before the horizon, advance to the next event, update statistics, and
    ///    dispatch it. Once the clock has passed the horizon, switch to draining instead.
    /// 2. While draining with customers in line, invoke the departure handler at the current clock. Once the line is
    ///    empty, switch to done instead.
    /// 3. When done, do nothing.
    ///
    /// Phase switches return `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Fatal invariant violations ([`Error::ExhaustedEventList`], [`Error::DepartureWhileIdle`],
    /// [`Error::BackInTime`]) are passed back unchanged. The simulation should not be stepped again afterwards.
    ///
    /// [`Error::ExhaustedEventList`]: crate::Error::ExhaustedEventList
    /// [`Error::DepartureWhileIdle`]: crate::Error::DepartureWhileIdle
    /// [`Error::BackInTime`]: crate::Error::BackInTime
    pub fn step(&mut self) -> crate::Result<Option<EventKind>> {
        match self.phase {
            Phase::Running => {
                if self.event_list.current_time() > self.config.horizon() {
                    tracing::debug!(
                        time = self.event_list.current_time(),
                        num_in_q = self.store.num_in_q(),
                        "horizon passed, draining line"
                    );
                    self.phase = Phase::Draining;
                    return Ok(None);
                }

                let kind = self.event_list.advance()?;
                self.store.update_time_avg_stats(self.event_list.current_time());
                match kind {
                    EventKind::Arrival => arrive(&mut self.store, &mut self.event_list)?,
                    EventKind::Departure => depart(&mut self.store, &mut self.event_list)?,
                }
                Ok(Some(kind))
            },
            Phase::Draining => {
                if self.store.num_in_q() == 0 {
                    self.phase = Phase::Done;
                    let statistics = self.store.statistics();
                    tracing::info!(
                        final_clock = self.event_list.current_time(),
                        customers_served = statistics.customers_served(),
                        revenue = statistics.revenue(),
                        "simulation complete"
                    );
                    return Ok(None);
                }

                depart(&mut self.store, &mut self.event_list)?;
                Ok(Some(EventKind::Departure))
            },
            Phase::Done => Ok(None),
        }
    }

    /// Step until the run is done, then return its report.
    ///
    /// # Errors
    ///
    /// Any error from [`step()`] stops the run and is passed back unchanged.
    ///
    /// [`step()`]: Simulation::step
    pub fn run(&mut self) -> crate::Result<Report> {
        while self.phase != Phase::Done {
            self.step()?;
        }
        Ok(self.report())
    }
}

impl Simulation<RngVariates<Pcg64>> {
    /// Set up a run drawing from a PCG generator seeded with `config.seed`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is rejected.
    ///
    /// [`Error::Config`]: crate::Error::Config
    pub fn seeded(config: StoreConfig) -> crate::Result<Self> {
        let variates = RngVariates::seeded(config.seed);
        Self::new(config, variates)
    }
}

impl<V> Simulation<V> {
    /// Snapshot the derived metrics at the current clock. Meant to be read once the run is [`Done`].
    ///
    /// [`Done`]: Phase::Done
    pub fn report(&self) -> Report {
        self.store.statistics().report(self.event_list.current_time())
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_time(&self) -> f64 {
        self.event_list.current_time()
    }

    pub fn event_list(&self) -> &EventList {
        &self.event_list
    }

    pub fn store(&self) -> &Store<V> {
        &self.store
    }

    pub fn statistics(&self) -> &Statistics {
        self.store.statistics()
    }

    pub fn config(&self) -> &ValidatedConfig {
        &self.config
    }

    /// Per-class service rules for this run, with once-per-run draws resolved.
    pub fn service_plan(&self) -> &ClassTable<ClassPlan> {
        self.store.plan()
    }
}

impl<V> std::fmt::Display for Simulation<V> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Simulation at time {} ({:?}, {} in line)",
            self.event_list.current_time(),
            self.phase,
            self.store.num_in_q()
        )
    }
}

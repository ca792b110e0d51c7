use crate::classes::{ClassId, ClassTable, ClassWeights};
use crate::config::{ServiceModel, ValidatedConfig};
use crate::events::{EventKind, EventList};
use crate::statistics::Statistics;
use crate::variates::VariateSource;

use std::collections::VecDeque;

/// Whether the single server is free, and if not, which class it is serving.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ServerStatus {
    Idle,
    Busy { serving: ClassId },
}

impl ServerStatus {
    pub fn is_busy(self) -> bool {
        matches!(self, ServerStatus::Busy { .. })
    }
}

/// A class's service-time rule with any once-per-run draw already taken.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ServiceTime {
    /// Drawn afresh for each customer.
    Exponential { mean: f64 },
    /// The same duration for every customer of the class.
    Fixed(f64),
}

/// What happens when a customer of some class reaches the counter.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ClassPlan {
    pub service: ServiceTime,
    pub profit: f64,
}

/// Tracks the server, the line of waiting customers, the run's statistics, and the source from which class
/// assignments and service times are drawn.
///
/// The line holds arrival times in FIFO order and is the only record of how many customers are waiting, so the
/// queue length can never disagree with it.
#[derive(Debug)]
pub struct Store<V> {
    mean_interarrival: f64,
    weights: ClassWeights,
    plan: ClassTable<ClassPlan>,
    server_status: ServerStatus,
    time_arrival: VecDeque<f64>,
    statistics: Statistics,
    variates: V,
}

impl<V> Store<V>
where
    V: VariateSource,
{
    /// Creates an empty store with an idle server, taking the once-per-run service draws in class order.
    pub fn new(config: &ValidatedConfig, mut variates: V) -> Self {
        let plan = config.raw().classes.map(|class, class_config| {
            let service = match class_config.service {
                ServiceModel::Exponential { mean } => ServiceTime::Exponential { mean },
                ServiceModel::FixedPerRun { low, high } => {
                    let fixed = variates.uniform(low, high);
                    tracing::debug!(%class, service_time = fixed, "drew fixed service time for run");
                    ServiceTime::Fixed(fixed)
                },
            };
            ClassPlan {
                service,
                profit: class_config.profit,
            }
        });

        Self {
            mean_interarrival: config.mean_interarrival(),
            weights: config.weights().clone(),
            plan,
            server_status: ServerStatus::Idle,
            time_arrival: VecDeque::new(),
            statistics: Statistics::new(),
            variates,
        }
    }

    /// Draw the next interarrival gap and place the next arrival on the list.
    pub(crate) fn schedule_arrival(&mut self, events: &mut EventList) -> crate::Result {
        let gap = self.variates.exponential(self.mean_interarrival);
        events.schedule(EventKind::Arrival, events.current_time() + gap)
    }

    /// Put the next customer at the counter: draw their class, schedule their departure, and book the service start.
    ///
    /// If the departure cannot be scheduled, the error is returned with the server status and statistics untouched.
    pub(crate) fn begin_service(&mut self, events: &mut EventList) -> crate::Result<ClassId> {
        let class = self.variates.categorical(&self.weights);
        let ClassPlan { service, profit } = self.plan[class];
        let service_time = match service {
            ServiceTime::Exponential { mean } => self.variates.exponential(mean),
            ServiceTime::Fixed(duration) => duration,
        };

        events.schedule(EventKind::Departure, events.current_time() + service_time)?;
        self.server_status = ServerStatus::Busy { serving: class };
        self.statistics.record_service_start(class, profit);
        Ok(class)
    }

    /// Integrate time-weighted statistics up to `now` using the state that held since the previous event.
    pub(crate) fn update_time_avg_stats(&mut self, now: f64) {
        self.statistics
            .update(now, self.time_arrival.len(), self.server_status.is_busy());
    }

    pub(crate) fn join_line(&mut self, now: f64) {
        self.time_arrival.push_back(now);
    }

    pub(crate) fn leave_line(&mut self) -> Option<f64> {
        self.time_arrival.pop_front()
    }

    pub(crate) fn go_idle(&mut self) {
        self.server_status = ServerStatus::Idle;
    }

    pub(crate) fn statistics_mut(&mut self) -> &mut Statistics {
        &mut self.statistics
    }
}

impl<V> Store<V> {
    pub fn server_status(&self) -> ServerStatus {
        self.server_status
    }

    /// Number of customers waiting in line, not counting the one in service.
    pub fn num_in_q(&self) -> usize {
        self.time_arrival.len()
    }

    /// Arrival times of the waiting customers, front of the line first.
    pub fn wait_line(&self) -> impl Iterator<Item = f64> + '_ {
        self.time_arrival.iter().copied()
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Per-class service rules for this run, with once-per-run draws resolved.
    pub fn plan(&self) -> &ClassTable<ClassPlan> {
        &self.plan
    }

    pub fn variates(&self) -> &V {
        &self.variates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::variates::RngVariates;

    #[test]
    fn fixed_service_is_drawn_once_within_range() {
        let config = StoreConfig::default().validate().unwrap();
        let store = Store::new(&config, RngVariates::seeded(3));

        match store.plan().b.service {
            ServiceTime::Fixed(duration) => assert!((3.1..=3.8).contains(&duration), "drew {duration}"),
            other => panic!("class B should have a fixed service time, got {other:?}"),
        }
        assert_eq!(ServiceTime::Exponential { mean: 1.5 }, store.plan().a.service);
        assert_eq!(ServiceTime::Exponential { mean: 7.0 }, store.plan().c.service);
        assert_eq!(2500.0, store.plan().b.profit);
    }

    #[test]
    fn new_store_is_empty_and_idle() {
        let config = StoreConfig::default().validate().unwrap();
        let store = Store::new(&config, RngVariates::seeded(3));

        assert_eq!(ServerStatus::Idle, store.server_status());
        assert_eq!(0, store.num_in_q());
        assert_eq!(0, store.statistics().customers_served());
    }

    #[test]
    fn line_is_first_in_first_out() {
        let config = StoreConfig::default().validate().unwrap();
        let mut store = Store::new(&config, RngVariates::seeded(3));
        store.join_line(1.0);
        store.join_line(2.5);

        assert_eq!(vec![1.0, 2.5], store.wait_line().collect::<Vec<_>>());
        assert_eq!(Some(1.0), store.leave_line());
        assert_eq!(1, store.num_in_q());
    }

    #[test]
    fn begin_service_schedules_departure_and_counts_class() {
        let config = StoreConfig::default().validate().unwrap();
        let mut store = Store::new(&config, RngVariates::seeded(5));
        let mut events = EventList::new(0.0);

        let class = store.begin_service(&mut events).unwrap();

        assert_eq!(ServerStatus::Busy { serving: class }, store.server_status());
        assert_eq!(1, store.statistics().class_counts()[class]);
        assert!(events.scheduled(EventKind::Departure).is_some());
    }

    /// Always serves class C, for an unbounded time.
    struct EndlessService;

    impl VariateSource for EndlessService {
        fn exponential(&mut self, _mean: f64) -> f64 {
            f64::INFINITY
        }

        fn uniform(&mut self, low: f64, _high: f64) -> f64 {
            low
        }

        fn categorical(&mut self, _weights: &ClassWeights) -> ClassId {
            ClassId::C
        }
    }

    #[test]
    fn failed_departure_leaves_store_untouched() {
        let config = StoreConfig::default().validate().unwrap();
        let mut store = Store::new(&config, EndlessService);
        let mut events = EventList::new(0.0);

        let result = store.begin_service(&mut events);

        assert!(matches!(result, Err(crate::Error::NonFiniteTime { .. })), "got {result:?}");
        assert_eq!(ServerStatus::Idle, store.server_status());
        assert_eq!(0, store.statistics().customers_served());
        assert_eq!(0.0, store.statistics().revenue());
        assert_eq!(None, events.scheduled(EventKind::Departure));
    }
}

use crate::classes::{ClassId, ClassTable};

use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Time-weighted integrals and event counters for one run.
///
/// Areas are advanced by [`update()`] with the state that held over the interval since the previous event, so it must
/// be called once per event before the handler changes the queue length or the server status. Counters are advanced
/// whenever a customer begins service. Every field only ever grows, except the last-update marker which follows the
/// clock.
///
/// [`update()`]: Statistics::update
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Statistics {
    area_num_in_q: f64,
    area_server_status: f64,
    time_last_event: f64,
    total_of_delays: f64,
    customers_served: u64,
    class_counts: ClassTable<u64>,
    revenue: f64,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Integrate the queue length and busy indicator over `[time_last_event, now]`.
    pub fn update(&mut self, now: f64, num_in_q: usize, server_busy: bool) {
        let time_since_last_event = now - self.time_last_event;
        debug_assert!(
            time_since_last_event >= 0.0,
            "statistics updated at {now}, before last update at {}",
            self.time_last_event
        );
        self.time_last_event = now;

        self.area_num_in_q += num_in_q as f64 * time_since_last_event;
        if server_busy {
            self.area_server_status += time_since_last_event;
        }
    }

    /// Add one customer's wait in line to the delay total.
    pub fn record_delay(&mut self, delay: f64) {
        self.total_of_delays += delay;
    }

    /// Count a customer of `class` beginning service and book their revenue.
    pub fn record_service_start(&mut self, class: ClassId, profit: f64) {
        self.customers_served += 1;
        self.class_counts[class] += 1;
        self.revenue += profit;
    }

    pub fn area_num_in_q(&self) -> f64 {
        self.area_num_in_q
    }

    pub fn area_server_status(&self) -> f64 {
        self.area_server_status
    }

    pub fn time_last_event(&self) -> f64 {
        self.time_last_event
    }

    pub fn total_of_delays(&self) -> f64 {
        self.total_of_delays
    }

    pub fn customers_served(&self) -> u64 {
        self.customers_served
    }

    pub fn class_counts(&self) -> &ClassTable<u64> {
        &self.class_counts
    }

    pub fn revenue(&self) -> f64 {
        self.revenue
    }

    /// Derive the end-of-run metrics, taking `final_clock` as the run length.
    ///
    /// Averages over a zero-length run, and the mean delay of a run that served nobody, come back as `None`.
    pub fn report(&self, final_clock: f64) -> Report {
        let per_unit_time = |area: f64| if final_clock > 0.0 { Some(area / final_clock) } else { None };
        let mean_delay = if self.customers_served > 0 {
            Some(self.total_of_delays / self.customers_served as f64)
        } else {
            None
        };

        Report {
            revenue: self.revenue,
            customers_served: self.customers_served,
            avg_queue_length: per_unit_time(self.area_num_in_q),
            mean_delay,
            utilization: per_unit_time(self.area_server_status),
            final_clock,
            class_counts: self.class_counts,
        }
    }
}

/// Read-only snapshot of a finished run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    pub revenue: f64,
    pub customers_served: u64,
    /// Time-averaged number of customers waiting in line.
    pub avg_queue_length: Option<f64>,
    /// Mean wait in line per customer served, counting customers who never waited.
    pub mean_delay: Option<f64>,
    /// Fraction of the run the server was busy.
    pub utilization: Option<f64>,
    pub final_clock: f64,
    pub class_counts: ClassTable<u64>,
}

impl Report {
    /// Share of served customers that fell in each class, or `None` if nobody was served.
    pub fn class_shares(&self) -> Option<ClassTable<f64>> {
        if self.customers_served == 0 {
            return None;
        }
        let served = self.customers_served as f64;
        Some(self.class_counts.map(|_, count| *count as f64 / served))
    }
}

struct Metric(Option<f64>);

impl Display for Metric {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{value:.3}"),
            None => f.write_str("undefined"),
        }
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        writeln!(f, "Store profits: {}", self.revenue)?;
        writeln!(f, "Clients served: {}", self.customers_served)?;
        writeln!(f, "Average number in queue: {}", Metric(self.avg_queue_length))?;
        writeln!(f, "Mean delay in queue: {} minutes", Metric(self.mean_delay))?;
        writeln!(f, "Server utilization: {}", Metric(self.utilization))?;
        writeln!(f, "Time simulation ended: {:.3} minutes", self.final_clock)?;
        for (class, count) in self.class_counts.iter() {
            let share = self.class_shares().map(|shares| shares[class] * 100.0);
            writeln!(f, "Class {class} customers: {count} ({}%)", Metric(share))?;
        }
        Ok(())
    }
}

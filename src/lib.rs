//! # Overview
//!
//! checkout-sim is a discrete-event simulation of a store with a single checkout counter. Customers arrive as a
//! renewal process, wait in one FIFO line while the server is busy, and are assigned a service class when they reach
//! the counter. Each class has its own service-time distribution and revenue. A run reports time-averaged statistics
//! (queue length, server utilization) alongside mean delay, revenue, and the class mix over a fixed simulated horizon.
//!
//! The engine is deliberately small:
//!
//! * The [`EventList`] holds exactly one slot per [`EventKind`] and owns the clock. Advancing it picks the earliest
//!   slot, with arrivals winning ties.
//! * The [`Store`] holds the server, the wait line, the run's [`Statistics`], and the [`VariateSource`] every random
//!   draw comes from.
//! * The [`Simulation`] drives the run through its [`Phase`]s: running until the clock passes the horizon, then
//!   draining the line at the closing clock, then done.
//!
//! Every random draw goes through a [`VariateSource`]. [`RngVariates`] implements it over any [`rand::Rng`], and
//! [`Simulation::seeded()`] builds one from the configuration's seed, so two runs of the same configuration produce
//! bit-identical statistics. Tests and other callers can supply their own source to replay specific draws.
//!
//! # Example
//!
//! ```
//! use checkout_sim::{Simulation, StoreConfig};
//!
//! let mut sim = Simulation::seeded(StoreConfig::default().with_horizon(120.0))?;
//! let report = sim.run()?;
//! assert_eq!(0, sim.store().num_in_q());
//! assert!(report.final_clock > 120.0);
//! # Ok::<(), checkout_sim::Error>(())
//! ```

mod classes;
mod config;
mod error;
mod events;
mod simulation;
mod statistics;
mod store;
mod variates;

pub use classes::{ClassId, ClassTable, ClassWeights};
pub use config::{ClassConfig, ConfigError, ServiceModel, StoreConfig, ValidatedConfig};
pub use error::{Error, Result};
pub use events::{EventKind, EventList};
pub use simulation::{Phase, Simulation};
pub use statistics::{Report, Statistics};
pub use store::{ClassPlan, ServerStatus, ServiceTime, Store};
pub use variates::{RngVariates, VariateSource};

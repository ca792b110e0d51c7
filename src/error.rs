use crate::config::ConfigError;

/// Errors that may be encountered while building or
/// executing a simulation.
///
/// The [`ExhaustedEventList`] and [`DepartureWhileIdle`]
/// variants indicate that the scheduling logic has been
/// corrupted. Neither can occur while the arrival stream
/// keeps an entry on the event list, so seeing one means
/// the run must be abandoned rather than continued.
///
/// The [`BackInTime`] variant originates from the
/// [`EventList`] to indicate that an event's scheduled
/// execution time is prior to the list's current time.
/// As with the other two, this points at a logical bug,
/// e.g. forgetting to add an offset to the current time
/// when scheduling a new event. [`NonFiniteTime`] is its
/// sibling for times that are NaN or infinite; only
/// cancelling an entry may leave a slot at `+∞`.
///
/// The [`Config`] variant wraps a [`ConfigError`] raised
/// while validating a [`StoreConfig`] before the run
/// starts. Invoking [`std::error::Error::source()`] on
/// this variant will acquire a shared reference to the
/// wrapped error.
///
/// [`EventList`]: crate::EventList
/// [`StoreConfig`]: crate::StoreConfig
/// [`ExhaustedEventList`]: Error::ExhaustedEventList
/// [`DepartureWhileIdle`]: Error::DepartureWhileIdle
/// [`BackInTime`]: Error::BackInTime
/// [`NonFiniteTime`]: Error::NonFiniteTime
/// [`Config`]: Error::Config
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Every entry on the event list was unscheduled when
    /// the clock was asked to advance.
    #[error("all entries in the event list are unscheduled, nothing left to advance to")]
    ExhaustedEventList,
    /// A departure fired while the server had nobody in
    /// service.
    #[error("departure fired at time {time} while the server was idle")]
    DepartureWhileIdle { time: f64 },
    /// The event list rejected an event that would have
    /// been scheduled for a time that has already passed.
    #[error("event scheduled for time {scheduled} is before current simulation time {now}")]
    BackInTime { scheduled: f64, now: f64 },
    /// The event list rejected a scheduled time that is NaN
    /// or infinite.
    #[error("event scheduled for non-finite time {scheduled} at simulation time {now}")]
    NonFiniteTime { scheduled: f64, now: f64 },
    /// The configuration was rejected before the run
    /// started. Call [`source()`] or unpack this value to
    /// inspect the cause.
    ///
    /// [`source()`]: #method.source
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// [`std::result::Result`]`<T, `[`checkout_sim::Error`]`>`
///
/// A type alias that simplifies the signatures of
/// various functions in this crate. The success type
/// defaults to `()` since most operations only mutate
/// simulation state.
///
/// [`checkout_sim::Error`]: Error
pub type Result<T = ()> = std::result::Result<T, Error>;

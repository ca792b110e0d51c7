use super::{EventKind, EventList};
use crate::store::{ServerStatus, Store};
use crate::variates::VariateSource;
use crate::Error;

/// Handles the arrival of a customer to the checkout line.
///
/// The next arrival is always scheduled first, whatever the server is doing. If the server is busy, the customer gets
/// in line. If not, they go straight to the counter with zero delay.
pub(crate) fn arrive<V>(store: &mut Store<V>, events: &mut EventList) -> crate::Result
where
    V: VariateSource,
{
    let now = events.current_time();
    store.schedule_arrival(events)?;

    if store.server_status().is_busy() {
        store.join_line(now);
        tracing::trace!(time = now, num_in_q = store.num_in_q(), "server busy, customer joined line");
    } else {
        store.statistics_mut().record_delay(0.0);
        let class = store.begin_service(events)?;
        tracing::trace!(time = now, %class, "server idle, customer went to counter");
    }

    Ok(())
}

/// Handles the completion of a service at the counter.
///
/// With nobody waiting, the server goes idle and no departure remains scheduled. Otherwise the customer at the front
/// of the line leaves it, their wait is added to the delay total, and they begin service as a freshly drawn class.
///
/// # Errors
///
/// Returns [`Error::DepartureWhileIdle`] if the server had nobody in service.
pub(crate) fn depart<V>(store: &mut Store<V>, events: &mut EventList) -> crate::Result
where
    V: VariateSource,
{
    let now = events.current_time();
    if store.server_status() == ServerStatus::Idle {
        return Err(Error::DepartureWhileIdle { time: now });
    }

    match store.leave_line() {
        None => {
            store.go_idle();
            events.cancel(EventKind::Departure);
            tracing::trace!(time = now, "line empty, server idle");
        },
        Some(time_arrival) => {
            store.statistics_mut().record_delay(now - time_arrival);
            let class = store.begin_service(events)?;
            tracing::trace!(
                time = now,
                delay = now - time_arrival,
                %class,
                num_in_q = store.num_in_q(),
                "next customer in line went to counter"
            );
        },
    }

    Ok(())
}

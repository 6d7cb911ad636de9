//! Core types for thumbnail-dl

use std::fmt::Debug;
use std::hash::Hash;

/// Marker trait for the opaque request-slot identity supplied by the consumer.
///
/// A token identifies "which slot wants an image" (a grid cell, a list row, a
/// widget id). The coordinator only compares and hashes tokens; it never
/// inspects them. Any type meeting the bounds implements this automatically.
pub trait Token: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> Token for T where T: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

/// Lifecycle state of a [`ThumbnailDownloader`](crate::ThumbnailDownloader)
///
/// States progress one way: `Created → Running → Draining → Stopped`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    /// Constructed but not started; no tasks exist yet
    Created,
    /// Worker and dispatch tasks are running
    Running,
    /// Stop requested; the in-flight item may still finish
    Draining,
    /// Tasks terminated; no further fetches or deliveries
    Stopped,
}

impl LifecycleState {
    /// Convert the atomic integer encoding back to a state
    pub(crate) fn from_u8(state: u8) -> Self {
        match state {
            0 => LifecycleState::Created,
            1 => LifecycleState::Running,
            2 => LifecycleState::Draining,
            _ => LifecycleState::Stopped,
        }
    }

    /// Convert a state to its atomic integer encoding
    pub(crate) fn to_u8(self) -> u8 {
        match self {
            LifecycleState::Created => 0,
            LifecycleState::Running => 1,
            LifecycleState::Draining => 2,
            LifecycleState::Stopped => 3,
        }
    }
}

/// Event emitted on the broadcast bus during coordinator operation
///
/// Events carry tokens, URLs and error strings — never decoded images. They
/// exist for observability (logging subscribers, UIs showing failure badges,
/// tests); the success path to the consumer is the Listener, not this bus.
#[derive(Clone, Debug)]
pub enum Event<T> {
    /// A request was accepted into the table and posted to the worker
    Queued {
        /// Token identifying the request slot
        token: T,
        /// URL recorded for the slot
        url: String,
    },

    /// The network fetch for a request failed; the table entry remains
    FetchFailed {
        /// Token identifying the request slot
        token: T,
        /// URL that failed to fetch
        url: String,
        /// Transport error description
        error: String,
    },

    /// The fetched bytes could not be decoded; the table entry remains
    DecodeFailed {
        /// Token identifying the request slot
        token: T,
        /// URL whose payload failed to decode
        url: String,
        /// Decode error description
        error: String,
    },

    /// A completed fetch was discarded because the slot no longer wants it
    Stale {
        /// Token identifying the request slot
        token: T,
        /// URL that was fetched but is no longer current
        url: String,
    },

    /// A decoded image was handed to the delivery channel
    Delivered {
        /// Token identifying the request slot
        token: T,
        /// URL the delivered image was fetched from
        url: String,
    },

    /// All pending requests were dropped via `clear()`
    Cleared,

    /// The coordinator shut down
    Shutdown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_state_round_trips_through_u8_for_all_variants() {
        let cases = [
            (LifecycleState::Created, 0),
            (LifecycleState::Running, 1),
            (LifecycleState::Draining, 2),
            (LifecycleState::Stopped, 3),
        ];

        for (variant, expected_int) in cases {
            assert_eq!(
                variant.to_u8(),
                expected_int,
                "{variant:?} should encode to {expected_int}"
            );
            assert_eq!(
                LifecycleState::from_u8(expected_int),
                variant,
                "{expected_int} should decode to {variant:?}"
            );
        }
    }

    #[test]
    fn lifecycle_state_from_unknown_integer_defaults_to_stopped() {
        assert_eq!(
            LifecycleState::from_u8(99),
            LifecycleState::Stopped,
            "unknown state must fall back to Stopped so a corrupted flag fails closed"
        );
    }
}

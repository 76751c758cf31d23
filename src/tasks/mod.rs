//! Background Tasks Module
//!
//! Recurring work owned by the cache: the TTL expiry sweeper.

mod sweeper;

pub(crate) use sweeper::spawn_sweeper;

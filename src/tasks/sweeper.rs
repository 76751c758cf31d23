//! TTL Expiry Sweeper
//!
//! Background task that periodically scans expiry metadata and handles
//! lapsed entries.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::Shared;
use crate::hooks::{CacheEvent, ExpiredNotice, HookBus, HookPayload};
use crate::store::CacheStore;

/// Spawns the recurring expiry sweep.
///
/// The task sleeps for `period` between passes and runs until the returned
/// handle is aborted; the cache aborts it on disposal and on drop. A pass
/// that has already started is allowed to finish.
pub(crate) fn spawn_sweeper(
    shared: Arc<RwLock<Shared>>,
    period: Duration,
    delete_on_expire: bool,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("starting expiry sweeper with a period of {:?}", period);

        loop {
            tokio::time::sleep(period).await;

            let removed = {
                let mut guard = shared.write().unwrap_or_else(PoisonError::into_inner);
                let Shared { store, hooks } = &mut *guard;
                sweep_once(store, hooks, delete_on_expire)
            };

            if removed > 0 {
                info!("expiry sweep removed {} lapsed entries", removed);
            } else {
                debug!("expiry sweep found nothing to remove");
            }
        }
    })
}

/// One sweep pass over the store's expiry metadata.
///
/// With expired listeners registered, every lapsed entry is reported once
/// this pass and only removed when a listener invokes the notice's deletion
/// capability; a veto leaves value and metadata intact, so the entry is
/// reported again next pass. Without listeners, lapsed entries are removed
/// when `delete_on_expire` is set and otherwise reconsidered (and ignored)
/// every pass.
///
/// Keys deleted between the scan and their turn are skipped without error.
/// The explicit-delete hook pair never fires here; `Expired` is the only
/// event a sweeper-driven removal emits.
///
/// Returns how many entries were removed.
pub(crate) fn sweep_once(store: &mut CacheStore, hooks: &HookBus, delete_on_expire: bool) -> usize {
    let lapsed = store.lapsed();
    let notify = hooks.has_listeners(CacheEvent::Expired);

    let mut removed = 0;
    for (key, ttl) in lapsed {
        let delete = if notify {
            match store.peek(&key) {
                None => continue,
                Some(value) => {
                    let notice = ExpiredNotice::new(&key, value, ttl);
                    hooks.emit(CacheEvent::Expired, &HookPayload::Expired(&notice));
                    notice.delete_requested()
                }
            }
        } else {
            delete_on_expire
        };

        if delete && store.remove(&key) {
            removed += 1;
        }
    }
    removed
}

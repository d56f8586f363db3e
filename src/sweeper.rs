//! Background eviction of expired entries.
//!
//! Each cache owns exactly one `Sweeper`. The sweeper runs on a dedicated thread
//! driving a small future with `async_io::block_on`, which keeps the crate free
//! of any particular runtime. The thread only holds a `Weak` handle to the store,
//! and exits as soon as either the store goes away or the shutdown channel is
//! closed by the owning cache.
use std::sync::Weak;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use async_channel::{Receiver, Sender};
use async_io::Timer;
use futures_lite::{future, StreamExt};
use log::{debug, warn};

use crate::cache::{purge, Store};

/// Owned handle to a running sweeper thread.
pub(crate) struct Sweeper {
    shutdown: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl Sweeper {
    /// Spawn a sweeper over `store`, ticking every `frequency`.
    ///
    /// If the thread cannot be spawned the cache still works, but expired
    /// entries are then only evicted on access or via `Cache::purge`.
    pub(crate) fn spawn<K, V>(store: Weak<Store<K, V>>, frequency: Duration) -> Self
    where
        K: Ord + Send + Sync + 'static,
        V: Send + Sync + 'static,
    {
        let (shutdown, signal) = async_channel::bounded(1);

        let handle = thread::Builder::new()
            .name("lapse-sweeper".to_owned())
            .spawn(move || async_io::block_on(sweep(store, frequency, signal)))
            .map_err(|err| warn!("unable to spawn sweeper thread: {}", err))
            .ok();

        Self { shutdown, handle }
    }

    /// Signal the sweeper to stop; returns `false` if it was already signalled.
    pub(crate) fn stop(&self) -> bool {
        self.shutdown.close()
    }

    pub(crate) fn is_running(&self) -> bool {
        !self.shutdown.is_closed()
            && self
                .handle
                .as_ref()
                .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.stop();

        // closing the channel wakes the thread, so this returns promptly
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Sweep loop executed on the sweeper thread.
async fn sweep<K, V>(store: Weak<Store<K, V>>, frequency: Duration, signal: Receiver<()>)
where
    K: Ord,
{
    debug!("sweeper started, running every {:?}", frequency);

    let mut interval = Timer::interval(frequency);

    loop {
        // nothing is ever sent, so `recv` only resolves once the channel closes
        let stopped = async {
            let _ = signal.recv().await;
            true
        };
        let ticked = async {
            interval.next().await;
            false
        };

        if future::or(stopped, ticked).await {
            break;
        }

        match store.upgrade() {
            Some(store) => {
                purge(&store).await;
            }
            None => break,
        }
    }

    debug!("sweeper stopped");
}

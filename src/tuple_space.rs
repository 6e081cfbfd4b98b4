use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use futures::future::Future;
use futures::task::{Context, Poll, Waker};
use log::{debug, trace, warn};

use crate::errors::{ErrorKind, Result};
use crate::pattern::Pattern;
use crate::store::Store;
use crate::tuple::Tuple;

/// A shared associative store of tuples.
///
/// Every access to the store happens under one mutex. Blocking retrievals wait
/// on a condition variable and asynchronous ones park their waker; both are
/// woken by every insertion and re-scan the whole store.
#[derive(Debug)]
pub struct TupleSpace {
    name: String,
    state: Mutex<State>,
    inserted: Condvar,
}

#[derive(Debug, Default)]
struct State {
    store: Store,
    // Pending async retrievals, keyed by the id each took on its first miss.
    wakers: HashMap<u64, Waker>,
    next_waiter: u64,
}

impl Default for TupleSpace {
    fn default() -> Self {
        TupleSpace::new()
    }
}

impl TupleSpace {
    pub fn new() -> TupleSpace {
        TupleSpace::named("default")
    }

    pub fn named(name: &str) -> TupleSpace {
        TupleSpace {
            name: String::from(name),
            state: Mutex::new(State::default()),
            inserted: Condvar::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!("[{}] recovering poisoned tuple space lock", self.name);
            poisoned.into_inner()
        })
    }

    /// Inserts `tuple` and wakes every waiting retrieval.
    pub fn put(&self, tuple: Tuple) {
        debug!("[{}] put {}", self.name, tuple);
        let mut state = self.lock();
        state.store.insert(tuple);
        let wakers = std::mem::take(&mut state.wakers);
        drop(state);
        self.wake_all(wakers);
    }

    /// Inserts a batch under a single lock acquisition, then wakes once.
    pub fn put_all<I>(&self, tuples: I)
    where
        I: IntoIterator<Item = Tuple>,
    {
        let mut state = self.lock();
        let mut inserted = 0usize;
        for tuple in tuples {
            debug!("[{}] put {}", self.name, tuple);
            state.store.insert(tuple);
            inserted += 1;
        }
        if inserted == 0 {
            return;
        }
        let wakers = std::mem::take(&mut state.wakers);
        drop(state);
        self.wake_all(wakers);
    }

    fn wake_all(&self, wakers: HashMap<u64, Waker>) {
        trace!("[{}] waking all waiters ({} tasks)", self.name, wakers.len());
        self.inserted.notify_all();
        for waker in wakers.into_values() {
            waker.wake();
        }
    }

    fn try_copytake(&self, pattern: &Pattern, remove: bool) -> Option<Tuple> {
        let mut state = self.lock();
        Self::scan(&self.name, &mut state, pattern, remove)
    }

    fn scan(name: &str, state: &mut State, pattern: &Pattern, remove: bool) -> Option<Tuple> {
        match state.store.find(pattern, remove) {
            Some(tuple) => {
                debug!(
                    "[{}] {} {} for {}",
                    name,
                    if remove { "took" } else { "copied" },
                    tuple,
                    pattern
                );
                Some(tuple)
            }
            None => {
                trace!("[{}] no match for {}", name, pattern);
                None
            }
        }
    }

    /// Returns a copy of the first tuple matching `pattern`, or `None`.
    pub fn try_copy(&self, pattern: &Pattern) -> Option<Tuple> {
        self.try_copytake(pattern, false)
    }

    /// Removes and returns the first tuple matching `pattern`, or `None`.
    pub fn try_take(&self, pattern: &Pattern) -> Option<Tuple> {
        self.try_copytake(pattern, true)
    }

    fn copytake(&self, pattern: &Pattern, remove: bool) -> Tuple {
        let mut state = self.lock();
        loop {
            if let Some(tuple) = Self::scan(&self.name, &mut state, pattern, remove) {
                return tuple;
            }
            state = self
                .inserted
                .wait(state)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            trace!("[{}] woken, retrying {}", self.name, pattern);
        }
    }

    /// Blocks until a tuple matches `pattern` and returns a copy of it.
    pub fn copy(&self, pattern: &Pattern) -> Tuple {
        self.copytake(pattern, false)
    }

    /// Blocks until a tuple matches `pattern`, then removes and returns it.
    pub fn take(&self, pattern: &Pattern) -> Tuple {
        self.copytake(pattern, true)
    }

    fn copytake_timeout(
        &self,
        pattern: &Pattern,
        remove: bool,
        timeout: Duration,
    ) -> Result<Tuple> {
        // A deadline past what `Instant` can represent never expires.
        let deadline = match Instant::now().checked_add(timeout) {
            Some(deadline) => deadline,
            None => return Ok(self.copytake(pattern, remove)),
        };
        let mut state = self.lock();
        loop {
            if let Some(tuple) = Self::scan(&self.name, &mut state, pattern, remove) {
                return Ok(tuple);
            }
            let now = Instant::now();
            if now >= deadline {
                debug!("[{}] timed out waiting for {}", self.name, pattern);
                return Err(ErrorKind::Timeout(timeout).into());
            }
            state = match self.inserted.wait_timeout(state, deadline - now) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
    }

    /// Like [`copy`](Self::copy), but gives up once `timeout` has elapsed.
    pub fn copy_timeout(&self, pattern: &Pattern, timeout: Duration) -> Result<Tuple> {
        self.copytake_timeout(pattern, false, timeout)
    }

    /// Like [`take`](Self::take), but gives up once `timeout` has elapsed.
    pub fn take_timeout(&self, pattern: &Pattern, timeout: Duration) -> Result<Tuple> {
        self.copytake_timeout(pattern, true, timeout)
    }

    /// Resolves to a copy of the first tuple matching `pattern`.
    pub fn copy_async(&self, pattern: &Pattern) -> Retrieval<'_> {
        Retrieval::new(self, pattern, false)
    }

    /// Resolves to the first tuple matching `pattern`, removing it.
    pub fn take_async(&self, pattern: &Pattern) -> Retrieval<'_> {
        Retrieval::new(self, pattern, true)
    }

    /// Number of stored tuples, duplicates included.
    pub fn len(&self) -> usize {
        self.lock().store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of stored tuples `pattern` would match.
    pub fn count(&self, pattern: &Pattern) -> usize {
        self.lock().store.count(pattern)
    }

    /// All stored tuples in scan order.
    pub fn snapshot(&self) -> Vec<Tuple> {
        self.lock().store.snapshot()
    }
}

/// Future returned by [`TupleSpace::copy_async`] and [`TupleSpace::take_async`].
#[must_use = "futures do nothing unless polled"]
pub struct Retrieval<'a> {
    space: &'a TupleSpace,
    pattern: Pattern,
    remove: bool,
    waiter: Option<u64>,
}

impl<'a> Retrieval<'a> {
    fn new(space: &'a TupleSpace, pattern: &Pattern, remove: bool) -> Retrieval<'a> {
        Retrieval {
            space,
            pattern: pattern.clone(),
            remove,
            waiter: None,
        }
    }
}

impl Drop for Retrieval<'_> {
    fn drop(&mut self) {
        if let Some(id) = self.waiter.take() {
            self.space.lock().wakers.remove(&id);
        }
    }
}

impl Future for Retrieval<'_> {
    type Output = Tuple;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let space = this.space;
        let mut state = space.lock();
        match TupleSpace::scan(&space.name, &mut state, &this.pattern, this.remove) {
            Some(tuple) => {
                if let Some(id) = this.waiter.take() {
                    state.wakers.remove(&id);
                }
                Poll::Ready(tuple)
            }
            None => {
                let id = *this.waiter.get_or_insert_with(|| {
                    state.next_waiter += 1;
                    state.next_waiter
                });
                // Registered under the lock, so a put cannot slip in between.
                state.wakers.insert(id, cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{pattern, tuple};
    use futures::executor::block_on;
    use futures::task::noop_waker_ref;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn put_then_copy_and_take() {
        let space = TupleSpace::new();
        space.put(tuple![44, "meow"]);
        assert_eq!(space.try_copy(&pattern![44, "meow"]), Some(tuple![44, "meow"]));
        assert_eq!(space.copy(&pattern![44, "meow"]), tuple![44, "meow"]);
        assert_eq!(space.take(&pattern![?int, "meow"]), tuple![44, "meow"]);
        assert!(space.is_empty());
    }

    #[test]
    fn put_all_inserts_every_tuple() {
        let space = TupleSpace::named("batch");
        space.put_all((0..5).map(|i| tuple!["temp", i]));
        space.put_all(Vec::new());
        assert_eq!(space.len(), 5);
        assert_eq!(space.count(&pattern!["temp", ?int]), 5);
        assert_eq!(space.name(), "batch");
    }

    #[test]
    fn timeout_on_impossible_pattern() {
        let space = TupleSpace::new();
        space.put(tuple!["aqq", "zzz"]);
        let started = Instant::now();
        let result = space.take_timeout(&pattern!["qqq", ?int], Duration::from_millis(50));
        assert!(started.elapsed() >= Duration::from_millis(50));
        match result.unwrap_err().kind() {
            ErrorKind::Timeout(waited) => assert_eq!(*waited, Duration::from_millis(50)),
            other => panic!("expected a timeout, got {}", other),
        }
        assert_eq!(space.len(), 1);
    }

    #[test]
    fn zero_timeout_still_scans() {
        let space = TupleSpace::new();
        space.put(tuple![1]);
        assert_eq!(space.copy_timeout(&pattern![?int], Duration::ZERO).unwrap(), tuple![1]);
        assert!(space.take_timeout(&pattern![?str], Duration::ZERO).is_err());
    }

    #[test]
    fn unbounded_timeout_waits_without_deadline() {
        let space = TupleSpace::new();
        space.put(tuple![1]);
        assert_eq!(space.copy_timeout(&pattern![?int], Duration::MAX).unwrap(), tuple![1]);
        assert_eq!(space.take_timeout(&pattern![?int], Duration::MAX).unwrap(), tuple![1]);
        assert!(space.is_empty());
    }

    #[test]
    fn timed_take_succeeds_when_put_arrives() {
        let space = Arc::new(TupleSpace::new());
        let producer = {
            let space = space.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                space.put(tuple!["qqq", 777]);
            })
        };
        let tuple = space
            .take_timeout(&pattern!["qqq", ?int], Duration::from_secs(10))
            .unwrap();
        assert_eq!(tuple, tuple!["qqq", 777]);
        producer.join().unwrap();
    }

    #[test]
    fn async_copy_is_ready_immediately() {
        let space = TupleSpace::new();
        space.put(tuple![3, 1.2, "meow", 4]);
        let tuple = block_on(space.copy_async(&pattern![?int, 1.2, "meow", 4]));
        assert_eq!(tuple, tuple![3, 1.2, "meow", 4]);
        assert_eq!(space.len(), 1);
    }

    #[test]
    fn async_take_waits_for_put() {
        let space = Arc::new(TupleSpace::new());
        let producer = {
            let space = space.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(10));
                space.put(tuple!["aqq", "zzz"]);
                thread::sleep(Duration::from_millis(10));
                space.put(tuple!["qqq", 777]);
            })
        };
        let tuple = block_on(space.take_async(&pattern!["qqq", ?int]));
        assert_eq!(tuple, tuple!["qqq", 777]);
        producer.join().unwrap();
        assert_eq!(space.snapshot(), vec![tuple!["aqq", "zzz"]]);
    }

    #[test]
    fn pending_retrieval_registers_once_and_unregisters_on_drop() {
        let space = TupleSpace::new();
        let mut cx = Context::from_waker(noop_waker_ref());
        let mut retrieval = space.take_async(&pattern!["qqq", ?int]);

        assert!(Pin::new(&mut retrieval).poll(&mut cx).is_pending());
        assert!(Pin::new(&mut retrieval).poll(&mut cx).is_pending());
        assert_eq!(space.lock().wakers.len(), 1);

        drop(retrieval);
        assert!(space.lock().wakers.is_empty());
    }

    #[test]
    fn ready_retrieval_leaves_no_waker_behind() {
        let space = TupleSpace::new();
        let mut cx = Context::from_waker(noop_waker_ref());
        let mut retrieval = space.copy_async(&pattern![?int]);
        assert!(Pin::new(&mut retrieval).poll(&mut cx).is_pending());

        space.put(tuple![7]);
        assert!(space.lock().wakers.is_empty());
        assert_eq!(Pin::new(&mut retrieval).poll(&mut cx), Poll::Ready(tuple![7]));
        assert!(space.lock().wakers.is_empty());
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let space = Arc::new(TupleSpace::new());
        space.put(tuple![1]);
        let poisoner = space.clone();
        let _ = thread::spawn(move || {
            let _guard = poisoner.state.lock();
            panic!("poison the lock");
        })
        .join();
        assert_eq!(space.try_take(&pattern![1]), Some(tuple![1]));
    }
}

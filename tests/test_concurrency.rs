use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use futures::executor::block_on;
use tuplespace::{pattern, tuple, TupleSpace, Value};

#[test]
fn test_take_blocks_until_matching_put() {
    let space = TupleSpace::new();
    let started = Instant::now();

    let tuple = crossbeam::scope(|scope| {
        scope.spawn(|_| {
            thread::sleep(Duration::from_millis(200));
            space.put(tuple!["aqq", "zzz"]);
        });
        scope.spawn(|_| {
            thread::sleep(Duration::from_millis(300));
            space.put(tuple!["qqq", 777]);
        });

        space.take(&pattern!["qqq", ?int])
    })
    .unwrap();

    assert!(started.elapsed() >= Duration::from_millis(300));
    assert_eq!(tuple, tuple!["qqq", 777]);
    assert_eq!(pattern!["qqq", ?int].bind(&tuple), vec![Value::I(777)]);
    assert_eq!(space.snapshot(), vec![tuple!["aqq", "zzz"]]);
}

#[test]
fn test_take_does_not_return_before_match() {
    let space = TupleSpace::new();
    let returned = AtomicBool::new(false);

    crossbeam::scope(|scope| {
        scope.spawn(|_| {
            space.take(&pattern!["ready", ?int]);
            returned.store(true, Ordering::SeqCst);
        });

        space.put(tuple!["ready", "not an int"]);
        space.put(tuple!["steady", 1]);
        thread::sleep(Duration::from_millis(100));
        assert!(!returned.load(Ordering::SeqCst));

        space.put(tuple!["ready", 1]);
    })
    .unwrap();

    assert!(returned.load(Ordering::SeqCst));
    assert_eq!(space.len(), 2);
}

#[test]
fn test_one_put_wakes_every_copier() {
    let space = TupleSpace::new();
    let waiters = 4;

    let copies = crossbeam::scope(|scope| {
        let space = &space;
        let handles: Vec<_> = (0..waiters)
            .map(|_| scope.spawn(move |_| space.copy(&pattern!["go", ?int])))
            .collect();

        thread::sleep(Duration::from_millis(50));
        space.put(tuple!["go", 1]);

        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect::<Vec<_>>()
    })
    .unwrap();

    assert_eq!(copies.len(), waiters);
    assert!(copies.iter().all(|tuple| *tuple == tuple!["go", 1]));
    assert_eq!(space.len(), 1);
}

#[test]
fn test_concurrent_put_then_drain_conserves_tuples() {
    let space = TupleSpace::new();
    let threads = 8;
    let limit: i64 = 1000;

    crossbeam::scope(|scope| {
        for _ in 0..threads {
            scope.spawn(|_| {
                for j in 0..limit {
                    space.put(tuple!["threadtest", j]);
                }
            });
        }
    })
    .unwrap();
    assert_eq!(space.len(), threads * limit as usize);

    let sums = crossbeam::scope(|scope| {
        let space = &space;
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                scope.spawn(move |_| {
                    let mut sum = 0;
                    while let Some(tuple) = space.try_take(&pattern!["threadtest", ?int]) {
                        sum += tuple[1].as_int().unwrap();
                    }
                    sum
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect::<Vec<i64>>()
    })
    .unwrap();

    let total: i64 = sums.iter().sum();
    assert_eq!(total, threads as i64 * (limit - 1) * limit / 2);
    assert!(space.is_empty());
}

#[test]
fn test_blocking_takers_and_producers_interleave() {
    let space = Arc::new(TupleSpace::named("interleave"));
    let producers = 4;
    let per_producer = 250;

    let consumers: Vec<_> = (0..producers)
        .map(|_| {
            let space = space.clone();
            thread::spawn(move || {
                (0..per_producer)
                    .map(|_| space.take(&pattern!["job", ?int])[1].as_int().unwrap())
                    .sum::<i64>()
            })
        })
        .collect();

    let producers: Vec<_> = (0..producers)
        .map(|p| {
            let space = space.clone();
            thread::spawn(move || {
                for i in 0..per_producer {
                    space.put(tuple!["job", p * per_producer + i]);
                }
            })
        })
        .collect();

    for producer in producers {
        producer.join().unwrap();
    }
    let total: i64 = consumers.into_iter().map(|c| c.join().unwrap()).sum();
    let n = 4 * 250;
    assert_eq!(total, (n - 1) * n / 2);
    assert!(space.is_empty());
}

#[test]
fn test_async_takers_are_woken_by_put() {
    let space = Arc::new(TupleSpace::new());

    let takers: Vec<_> = (0..3)
        .map(|_| {
            let space = space.clone();
            thread::spawn(move || block_on(space.take_async(&pattern!["token", ?int])))
        })
        .collect();

    thread::sleep(Duration::from_millis(50));
    space.put_all((0..3).map(|i| tuple!["token", i]));

    let mut taken: Vec<i64> = takers
        .into_iter()
        .map(|t| t.join().unwrap()[1].as_int().unwrap())
        .collect();
    taken.sort();
    assert_eq!(taken, vec![0, 1, 2]);
    assert!(space.is_empty());
}

#[test]
fn test_copy_timeout_sees_late_put() {
    let space = TupleSpace::new();
    let result = crossbeam::scope(|scope| {
        scope.spawn(|_| {
            thread::sleep(Duration::from_millis(50));
            space.put(tuple![1.5]);
        });
        space.copy_timeout(&pattern![?float], Duration::from_secs(10))
    })
    .unwrap();
    assert_eq!(result.unwrap(), tuple![1.5]);
    assert!(space
        .take_timeout(&pattern![?str], Duration::from_millis(20))
        .is_err());
}

use std::env;
use std::fmt::Debug;
use std::thread;
use std::time::Duration;

use log::info;
use tuplespace::{pattern, tuple, TupleSpace, Value};

fn check<T: PartialEq + Debug>(label: &str, actual: T, expected: T) -> bool {
    let passed = actual == expected;
    let dots = ".".repeat(80usize.saturating_sub(label.len()));
    println!(
        "{}{}{}",
        label,
        dots,
        if passed { "[PASS]" } else { "[FAIL]" }
    );
    if !passed {
        println!("    expected {:?}, got {:?}", expected, actual);
    }
    passed
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = env::args().skip(1);
    let threads = args
        .next()
        .and_then(|arg| arg.parse().ok())
        .unwrap_or_else(|| thread::available_parallelism().map_or(4, |n| n.get()));
    let limit: i64 = args.next().and_then(|arg| arg.parse().ok()).unwrap_or(1000);

    let space = TupleSpace::named("scenarios");
    let mut results = Vec::new();

    space.put(tuple![3, 1.2, "meow", 4]);
    space.put(tuple![3, 1.2, "meow", 4]);
    space.put(tuple![44, "meow"]);

    results.push(check(
        "try_copy(3, 1.2, \"meow\", 4)",
        space.try_copy(&pattern![3, 1.2, "meow", 4]).is_some(),
        true,
    ));
    results.push(check(
        "try_copy(3, 1.2, \"thiswillfail\", 4)",
        space.try_copy(&pattern![3, 1.2, "thiswillfail", 4]).is_some(),
        false,
    ));

    let p = pattern![?int, 1.2, "meow", 4];
    let bound = space.try_copy(&p).map(|t| p.bind(&t));
    results.push(check(
        "try_copy(?int, 1.2, \"meow\", 4) binds 3",
        bound,
        Some(vec![Value::I(3)]),
    ));

    for _ in 0..3 {
        results.push(check(
            "try_copy(44, \"meow\")",
            space.try_copy(&pattern![44, "meow"]).is_some(),
            true,
        ));
    }
    results.push(check(
        "copy(44, \"meow\")",
        space.copy(&pattern![44, "meow"]),
        tuple![44, "meow"],
    ));
    results.push(check(
        "try_take(44, \"meow\")",
        space.try_take(&pattern![44, "meow"]).is_some(),
        true,
    ));
    results.push(check(
        "try_take(44, \"meow\") again",
        space.try_take(&pattern![44, "meow"]).is_some(),
        false,
    ));

    info!("this should take ~3 seconds");
    let taken = crossbeam::scope(|scope| {
        scope.spawn(|_| {
            thread::sleep(Duration::from_secs(2));
            space.put(tuple!["aqq", "zzz"]);
        });
        scope.spawn(|_| {
            thread::sleep(Duration::from_secs(3));
            space.put(tuple!["qqq", 777]);
        });
        space.take(&pattern!["qqq", ?int])
    });
    match taken {
        Ok(tuple) => {
            info!("took {}", tuple);
            results.push(check("take(\"qqq\", ?int)", tuple[1].clone(), Value::I(777)));
        }
        Err(_) => results.push(check("take(\"qqq\", ?int) threads", false, true)),
    }

    info!("{} threads putting {} tuples each", threads, limit);
    let drained = crossbeam::scope(|scope| {
        let space = &space;
        for _ in 0..threads {
            scope.spawn(move |_| {
                for j in 0..limit {
                    space.put(tuple!["threadtest", j]);
                }
            });
        }
    })
    .and_then(|_| {
        crossbeam::scope(|scope| {
            let space = &space;
            let handles: Vec<_> = (0..threads)
                .map(|_| {
                    scope.spawn(move |_| {
                        let mut sum = 0i64;
                        while let Some(tuple) = space.try_take(&pattern!["threadtest", ?int]) {
                            sum += tuple[1].as_int().unwrap_or(0);
                        }
                        sum
                    })
                })
                .collect();
            handles
                .into_iter()
                .filter_map(|handle| handle.join().ok())
                .collect::<Vec<i64>>()
        })
    });

    match drained {
        Ok(sums) => {
            let total: i64 = sums.iter().sum();
            info!("sums {:?} (total={})", sums, total);
            results.push(check(
                "sum of drained values",
                total,
                threads as i64 * (limit - 1) * limit / 2,
            ));
            results.push(check("space drained", space.len(), 0));
        }
        Err(_) => results.push(check("put/drain threads", false, true)),
    }

    let failed = results.iter().filter(|passed| !**passed).count();
    info!("{} checks, {} failed", results.len(), failed);
    if failed > 0 {
        std::process::exit(1);
    }
}

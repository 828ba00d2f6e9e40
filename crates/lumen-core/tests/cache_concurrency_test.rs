// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use lumen_core::{Cache, CacheElement, EngineContext};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

#[derive(Debug)]
struct Program {
    name: String,
}

impl CacheElement for Program {
    const TYPE_NAME: &'static str = "Program";

    fn name(&self) -> &str {
        &self.name
    }
}

#[test]
fn concurrent_adds_produce_one_element_per_key() {
    const THREADS: usize = 16;

    let produced = Arc::new(AtomicUsize::new(0));
    let counter = produced.clone();
    let cache: Arc<Cache<Program>> = Arc::new(Cache::new(
        Arc::new(EngineContext::new("concurrency")),
        move |name: &String, ()| {
            counter.fetch_add(1, Ordering::SeqCst);
            // Widen the window in which a second producer could sneak in.
            thread::yield_now();
            Program { name: name.clone() }
        },
    ));

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let cache = cache.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                cache.add("skinning".to_string(), ())
            })
        })
        .collect();

    let results: Vec<Arc<Program>> = handles
        .into_iter()
        .map(|handle| handle.join().expect("Worker thread panicked"))
        .collect();

    assert_eq!(produced.load(Ordering::SeqCst), 1);
    assert!(results.iter().all(|program| Arc::ptr_eq(program, &results[0])));
    assert_eq!(cache.len(), 1);
}

#[test]
fn concurrent_adds_across_many_keys() {
    let produced = Arc::new(AtomicUsize::new(0));
    let counter = produced.clone();
    let cache: Arc<Cache<Program, String, usize>> = Arc::new(Cache::new(
        Arc::new(EngineContext::default()),
        move |name: &String, _variant| {
            counter.fetch_add(1, Ordering::SeqCst);
            Program { name: name.clone() }
        },
    ));

    thread::scope(|scope| {
        for worker in 0..8 {
            let cache = &cache;
            scope.spawn(move || {
                for i in 0..50 {
                    cache.add(format!("program_{}", (i + worker) % 50), worker);
                }
            });
        }
    });

    assert_eq!(cache.len(), 50);
    assert_eq!(produced.load(Ordering::SeqCst), 50);
}

#[test]
fn opposite_merges_do_not_deadlock() {
    let context = Arc::new(EngineContext::default());
    let producer = |name: &String, ()| Program { name: name.clone() };
    let left: Arc<Cache<Program>> = Arc::new(Cache::new(context.clone(), producer));
    let right: Arc<Cache<Program>> = Arc::new(Cache::new(context, producer));

    for round in 0..200 {
        left.add(format!("left_{round}"), ());
        right.add(format!("right_{round}"), ());

        thread::scope(|scope| {
            scope.spawn(|| left.merge_into(&right));
            scope.spawn(|| right.merge_into(&left));
        });
    }

    // Everything ends up in exactly one of the two caches.
    assert_eq!(left.len() + right.len(), 400);
}

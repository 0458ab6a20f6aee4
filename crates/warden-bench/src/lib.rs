//! Benchmark profiles and utilities for the Warden registry.
//!
//! Provides pre-populated registries for the criterion benches:
//!
//! - [`probe_registry`]: a registry of [`Probe`] fixtures with
//!   sequentially named members.
//! - [`attach_counting_clients`]: registers `n` trivial clients so
//!   dispatch fan-out can be measured.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::cell::Cell;
use std::rc::Rc;

use warden_registry::{Handle, Registry};
use warden_test_utils::Probe;

/// Build a registry holding `count` probes named `probe-0..count`,
/// returning the member handles in insertion order.
pub fn probe_registry(count: usize) -> (Registry<Probe>, Vec<Handle<Probe>>) {
    let registry = Registry::new();
    let mut handles = Vec::with_capacity(count);
    registry.begin_cache().expect("fresh registry");
    for i in 0..count {
        let handle = Handle::new(Probe::new(format!("probe-{i}"), i as f64));
        registry.add(&handle).expect("unique identity");
        handles.push(handle);
    }
    registry.end_cache().expect("cache balanced");
    (registry, handles)
}

/// Register `n` clients that only count received messages; returns the
/// shared counter.
pub fn attach_counting_clients(registry: &Registry<Probe>, n: usize) -> Rc<Cell<u64>> {
    let counter = Rc::new(Cell::new(0));
    for _ in 0..n {
        let counter = Rc::clone(&counter);
        registry
            .register(move |_message| counter.set(counter.get() + 1))
            .expect("registry unlocked");
    }
    counter
}

#![allow(dead_code)]

use std::fmt::Debug;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing_subscriber::EnvFilter;
use typebus::{Event, Supertypes};

/// Installs a test-writer subscriber once; filter with `RUST_LOG=typebus=debug`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub trait Comparable: Send + Sync + Debug {
    fn rank(&self) -> i64;
}

pub trait CharSequence: Send + Sync + Debug {
    fn length(&self) -> usize;
}

pub type ComparableEvent = dyn Comparable;
pub type CharSequenceEvent = dyn CharSequence;

#[derive(Debug, Clone)]
pub struct Text(pub String);

#[derive(Debug, Clone, Copy)]
pub struct Integer(pub i64);

impl Comparable for Text {
    fn rank(&self) -> i64 {
        self.0.len() as i64
    }
}

impl CharSequence for Text {
    fn length(&self) -> usize {
        self.0.chars().count()
    }
}

impl Comparable for Integer {
    fn rank(&self) -> i64 {
        self.0
    }
}

impl Event for Text {
    fn supertypes(types: &mut Supertypes<Self>) {
        types
            .add::<CharSequenceEvent>(|e| e)
            .add::<ComparableEvent>(|e| e);
    }
}

impl Event for Integer {
    fn supertypes(types: &mut Supertypes<Self>) {
        types.add::<ComparableEvent>(|e| e);
    }
}

/// Event that embeds a `Text` and is delivered wherever a `Text` would be.
#[derive(Debug)]
pub struct Quoted {
    pub text: Text,
}

impl Event for Quoted {
    fn supertypes(types: &mut Supertypes<Self>) {
        types.inherit::<Text>(|e| &e.text);
    }
}

#[derive(Debug)]
pub struct Tick;

impl Event for Tick {}

/// Ordered record of handler calls.
#[derive(Default)]
pub struct Journal {
    entries: Mutex<Vec<String>>,
}

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.entries.lock().unwrap())
    }
}

/// Execution intervals of a handler.
#[derive(Default)]
pub struct Spans {
    spans: Mutex<Vec<(Instant, Instant)>>,
}

impl Spans {
    pub fn record(&self, body: Duration) {
        let start = Instant::now();
        std::thread::sleep(body);
        self.spans.lock().unwrap().push((start, Instant::now()));
    }

    pub fn len(&self) -> usize {
        self.spans.lock().unwrap().len()
    }

    /// True if any two recorded intervals overlap.
    pub fn any_overlap(&self) -> bool {
        let mut spans = self.spans.lock().unwrap().clone();
        spans.sort();
        spans.windows(2).any(|w| w[1].0 < w[0].1)
    }
}

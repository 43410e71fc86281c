mod common;

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::{Mutex, OnceLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, ThreadId};

use common::{CharSequence, CharSequenceEvent, ComparableEvent, Integer, Journal, Quoted, Text};
use typebus::{
    AnyEvent, BusError, EventBus, FailurePolicy, HandlerFailure, HandlerResult, Handlers,
    ObserveFailures, Subscribe, TypeKey,
};

#[derive(Default)]
struct Omni {
    journal: Journal,
}

impl Omni {
    fn on_any(&self, _: &AnyEvent) -> HandlerResult {
        self.journal.push("object");
        Ok(())
    }
    fn on_comparable(&self, _: &ComparableEvent) -> HandlerResult {
        self.journal.push("comparable");
        Ok(())
    }
    fn on_chars(&self, e: &CharSequenceEvent) -> HandlerResult {
        self.journal.push(format!("char_sequence:{}", e.length()));
        Ok(())
    }
    fn on_text(&self, _: &Text) -> HandlerResult {
        self.journal.push("string");
        Ok(())
    }
}

impl Subscribe for Omni {
    fn handlers(h: &mut Handlers<Self>) {
        h.on("on_any", Self::on_any)
            .on("on_comparable", Self::on_comparable)
            .on("on_chars", Self::on_chars)
            .on("on_text", Self::on_text);
    }
}

#[test]
fn test_event_reaches_every_assignable_handler() {
    let bus = EventBus::new();
    let omni = Arc::new(Omni::default());
    bus.register(&omni).expect("register");

    bus.post(&Text("hello".into())).expect("post text");
    assert_eq!(
        omni.journal.take(),
        vec!["string", "char_sequence:5", "comparable", "object"]
    );

    bus.post(&Integer(3)).expect("post integer");
    assert_eq!(omni.journal.take(), vec!["comparable", "object"]);
}

#[test]
fn test_inherited_event_reaches_parent_handlers() {
    let bus = EventBus::new();
    let omni = Arc::new(Omni::default());
    bus.register(&omni).expect("register");

    bus.post(&Quoted {
        text: Text("quote".into()),
    })
    .expect("post");
    assert_eq!(
        omni.journal.take(),
        vec!["string", "char_sequence:5", "comparable", "object"]
    );
    assert_eq!(
        bus.assignable_types::<Quoted>(),
        vec![
            TypeKey::of::<Quoted>(),
            TypeKey::of::<Text>(),
            TypeKey::of::<CharSequenceEvent>(),
            TypeKey::of::<ComparableEvent>(),
            TypeKey::of::<AnyEvent>(),
        ]
    );
}

#[test]
fn test_post_without_subscribers_is_silent() {
    let bus = EventBus::new();
    assert!(!bus.has_subscribers::<Integer>());
    bus.post(&Integer(1)).expect("dead events are dropped quietly");
}

#[test]
fn test_each_registered_object_receives_the_event() {
    let bus = EventBus::new();
    let a = Arc::new(Omni::default());
    let b = Arc::new(Omni::default());
    bus.register(&a).expect("a");
    bus.register(&b).expect("b");
    bus.register(&a).expect("re-registering is a no-op");
    assert_eq!(bus.subscriber_count(), 2);

    bus.post(&Integer(9)).expect("post");
    assert_eq!(a.journal.take().len(), 2);
    assert_eq!(b.journal.take().len(), 2);
}

#[derive(Default)]
struct ThreadProbe {
    seen: Mutex<Vec<ThreadId>>,
}

impl ThreadProbe {
    fn on_text(&self, _: &Text) -> HandlerResult {
        self.seen.lock().unwrap().push(thread::current().id());
        Ok(())
    }
}

impl Subscribe for ThreadProbe {
    fn handlers(h: &mut Handlers<Self>) {
        h.on("on_text", Self::on_text);
    }
}

#[test]
fn test_sync_handlers_run_on_posting_thread() {
    let bus = EventBus::new();
    let probe = Arc::new(ThreadProbe::default());
    bus.register(&probe).expect("register");

    bus.post(&Text("main".into())).expect("post");
    let worker_bus = bus.clone();
    let worker = thread::spawn(move || {
        worker_bus.post(&Text("worker".into())).expect("post");
        thread::current().id()
    })
    .join()
    .expect("join");

    let seen = probe.seen.lock().unwrap().clone();
    assert_eq!(seen, vec![thread::current().id(), worker]);
}

#[derive(Default)]
struct Faulty {
    journal: Journal,
}

impl Faulty {
    fn first(&self, _: &Text) -> HandlerResult {
        self.journal.push("first");
        Ok(())
    }
    fn fails(&self, _: &CharSequenceEvent) -> HandlerResult {
        self.journal.push("fails");
        Err("malformed text".into())
    }
    fn last(&self, _: &AnyEvent) -> HandlerResult {
        self.journal.push("last");
        Ok(())
    }
}

impl Subscribe for Faulty {
    fn handlers(h: &mut Handlers<Self>) {
        h.on("first", Self::first)
            .on("fails", Self::fails)
            .on("last", Self::last);
    }

    fn name(&self) -> &'static str {
        "faulty"
    }
}

#[derive(Default)]
struct Collector {
    failures: Mutex<Vec<(String, &'static str, bool)>>,
}

impl ObserveFailures for Collector {
    fn on_failure(&self, failure: &HandlerFailure) {
        self.failures
            .lock()
            .unwrap()
            .push((failure.bus().to_string(), failure.method(), failure.is_panic()));
    }
}

#[test]
fn test_propagate_stops_at_first_failure() {
    common::init_tracing();
    let collector = Arc::new(Collector::default());
    let bus = EventBus::builder()
        .identifier("strict")
        .with_observer(collector.clone())
        .build();
    let faulty = Arc::new(Faulty::default());
    bus.register(&faulty).expect("register");

    let err = bus.post(&Text("x".into())).unwrap_err();
    match &err {
        BusError::HandlerFailed(failure) => {
            assert_eq!(failure.subscriber(), "faulty");
            assert_eq!(failure.method(), "fails");
            assert_eq!(failure.event_type(), std::any::type_name::<Text>());
            assert!(failure.event().contains("Text"));
            assert!(failure.to_string().contains("malformed text"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(faulty.journal.take(), vec!["first", "fails"]);
    assert_eq!(
        *collector.failures.lock().unwrap(),
        vec![("strict".to_string(), "fails", false)]
    );
}

#[test]
fn test_continue_runs_every_handler_and_collects_failures() {
    common::init_tracing();
    let collector = Arc::new(Collector::default());
    let bus = EventBus::builder()
        .identifier("lenient")
        .on_failure(FailurePolicy::Continue)
        .with_observer(collector.clone())
        .build();
    let faulty = Arc::new(Faulty::default());
    bus.register(&faulty).expect("register");

    let err = bus.post(&Text("x".into())).unwrap_err();
    assert_eq!(err.as_label(), "bus_handlers_failed");
    assert_eq!(err.failures().len(), 1);
    assert_eq!(faulty.journal.take(), vec!["first", "fails", "last"]);
    assert_eq!(collector.failures.lock().unwrap().len(), 1);

    bus.post(&Integer(1)).expect("integer skips the failing handler");
    assert_eq!(faulty.journal.take(), vec!["last"]);
}

#[derive(Default)]
struct PanicsOnce {
    fired: AtomicBool,
    journal: Journal,
}

impl PanicsOnce {
    fn on_integer(&self, e: &Integer) -> HandlerResult {
        if !self.fired.swap(true, Ordering::SeqCst) {
            panic!("first delivery of {}", e.0);
        }
        self.journal.push(e.0.to_string());
        Ok(())
    }
}

impl Subscribe for PanicsOnce {
    fn handlers(h: &mut Handlers<Self>) {
        h.on("on_integer", Self::on_integer);
    }
}

#[test]
fn test_sync_panic_unwinds_to_caller_and_releases_handler() {
    let collector = Arc::new(Collector::default());
    let bus = EventBus::builder()
        .identifier("panicky")
        .with_observer(collector.clone())
        .build();
    let sub = Arc::new(PanicsOnce::default());
    bus.register(&sub).expect("register");

    let outcome = catch_unwind(AssertUnwindSafe(|| bus.post(&Integer(1))));
    assert!(outcome.is_err(), "panic must reach the poster");
    assert_eq!(
        *collector.failures.lock().unwrap(),
        vec![("panicky".to_string(), "on_integer", true)],
        "observers see the panic before it unwinds"
    );

    let other = thread::spawn({
        let bus = bus.clone();
        move || bus.post(&Integer(2))
    })
    .join()
    .expect("join");
    assert!(other.is_ok());
    assert_eq!(sub.journal.take(), vec!["2"]);
}

#[test]
fn test_unregistered_object_stops_receiving() {
    let bus = EventBus::new();
    let omni = Arc::new(Omni::default());
    bus.register(&omni).expect("register");
    bus.unregister(&omni).expect("unregister");

    bus.post(&Text("gone".into())).expect("post");
    assert!(omni.journal.take().is_empty());
    assert!(!bus.has_subscribers::<Text>());
}

#[derive(Default)]
struct Countdown {
    bus: OnceLock<EventBus>,
    journal: Journal,
}

impl Countdown {
    fn on_integer(&self, e: &Integer) -> HandlerResult {
        self.journal.push(e.0.to_string());
        if e.0 > 0 {
            if let Some(bus) = self.bus.get() {
                bus.post(&Integer(e.0 - 1))?;
            }
        }
        Ok(())
    }
}

impl Subscribe for Countdown {
    fn handlers(h: &mut Handlers<Self>) {
        h.on("on_integer", Self::on_integer);
    }
}

#[test]
fn test_exclusive_handler_may_post_back_to_itself() {
    let bus = EventBus::new();
    let countdown = Arc::new(Countdown::default());
    let _ = countdown.bus.set(bus.clone());
    bus.register(&countdown).expect("register");

    bus.post(&Integer(2)).expect("nested posts complete");
    assert_eq!(countdown.journal.take(), vec!["2", "1", "0"]);
}

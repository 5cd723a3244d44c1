//! Every event emitted while analyzing a batch lands inside the `analyze`
//! span, including the ones raised on rayon worker threads.
//!
//! Installs a global subscriber, so it lives in its own test binary.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use citation_forecast::app::analyze;
use citation_forecast::domain::{EntityHistory, Observation, YearRange};
use tracing::span::{Attributes, Id, Record};
use tracing_core::span::Current;
use tracing::{Event, Metadata, Subscriber};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);
static SPANS: Mutex<Option<HashMap<u64, &'static Metadata<'static>>>> = Mutex::new(None);
static EVENTS: Mutex<Vec<(String, Option<&'static str>)>> = Mutex::new(Vec::new());

thread_local! {
    static ENTERED: RefCell<Vec<u64>> = const { RefCell::new(Vec::new()) };
}

fn innermost() -> Option<u64> {
    ENTERED.with(|stack| stack.borrow().last().copied())
}

fn span_meta(id: u64) -> Option<&'static Metadata<'static>> {
    SPANS.lock().unwrap().as_ref().and_then(|spans| spans.get(&id).copied())
}

/// Records, for each event, the name of the span it was emitted in.
struct ScopeRecorder;

impl Subscriber for ScopeRecorder {
    fn enabled(&self, _: &Metadata<'_>) -> bool {
        true
    }

    fn new_span(&self, attrs: &Attributes<'_>) -> Id {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        SPANS
            .lock()
            .unwrap()
            .get_or_insert_with(HashMap::new)
            .insert(id, attrs.metadata());
        Id::from_u64(id)
    }

    fn record(&self, _: &Id, _: &Record<'_>) {}

    fn record_follows_from(&self, _: &Id, _: &Id) {}

    fn event(&self, event: &Event<'_>) {
        let module = event.metadata().module_path().unwrap_or_default().to_string();
        let span = innermost().and_then(span_meta).map(|m| m.name());
        EVENTS.lock().unwrap().push((module, span));
    }

    fn enter(&self, span: &Id) {
        ENTERED.with(|stack| stack.borrow_mut().push(span.into_u64()));
    }

    fn exit(&self, _: &Id) {
        ENTERED.with(|stack| {
            stack.borrow_mut().pop();
        });
    }

    fn current_span(&self) -> Current {
        match innermost().and_then(|id| span_meta(id).map(|m| (id, m))) {
            Some((id, meta)) => Current::new(Id::from_u64(id), meta),
            None => Current::none(),
        }
    }
}

#[test]
fn worker_events_stay_inside_the_batch_span() {
    tracing::subscriber::set_global_default(ScopeRecorder).unwrap();

    let entities: Vec<EntityHistory> = (0..8)
        .map(|k| {
            EntityHistory::new(
                format!("e{k}"),
                (2000..=2012)
                    .map(|y| Observation::new(y, (u64::from(y.unsigned_abs()) - 1990).pow(2) + k))
                    .collect(),
            )
        })
        .collect();
    let batch = analyze(&entities, YearRange::new(1950, 2050).unwrap(), 5);
    assert_eq!(batch.successes().count(), 8);

    let events = EVENTS.lock().unwrap();
    let ours: Vec<_> = events
        .iter()
        .filter(|(module, _)| module.starts_with("citation_forecast"))
        .collect();
    assert!(!ours.is_empty());
    for (module, span) in ours {
        assert_eq!(*span, Some("analyze"), "event from {module} emitted outside the batch span");
    }
}

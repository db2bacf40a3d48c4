//! Span timing for the search hot path.
//!
//! Enable with `--features instrumentation`. Instrumented functions are
//! counted and timed by a tracing layer; the totals are printed on exit.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

use once_cell::sync::Lazy;
use thread_local::ThreadLocal;
use tracing::span;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer};

/// Call count and total nanoseconds per span name.
type SpanTotals = HashMap<&'static str, (u64, u64)>;

/// One table per thread, so rayon workers never contend on the hot path.
static THREAD_TIMING_DATA: Lazy<ThreadLocal<Mutex<SpanTotals>>> = Lazy::new(ThreadLocal::new);

struct TimingLayer;

impl<S> Layer<S> for TimingLayer
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_enter(&self, id: &span::Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(Instant::now());
        }
    }

    fn on_exit(&self, id: &span::Id, ctx: Context<'_, S>) {
        let span = match ctx.span(id) {
            Some(span) => span,
            None => return,
        };
        let start = match span.extensions_mut().remove::<Instant>() {
            Some(start) => start,
            None => return,
        };

        let elapsed = start.elapsed().as_nanos() as u64;
        let cell = THREAD_TIMING_DATA.get_or(|| Mutex::new(HashMap::new()));
        if let Ok(mut data) = cell.lock() {
            let entry = data.entry(span.name()).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += elapsed;
        }
    }
}

/// Installs the timing layer. With `RUST_LOG` set, span events are printed too.
pub fn init_tracing() -> Result<(), SetGlobalDefaultError> {
    let verbose = std::env::var("RUST_LOG")
        .map_or(false, |filter| !filter.is_empty() && filter != "off");

    if verbose {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .compact();
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::from_default_env())
            .with(TimingLayer)
            .with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::new("trace"))
            .with(TimingLayer);
        tracing::subscriber::set_global_default(subscriber)
    }
}

/// Sums the per-thread tables into one.
fn merge_totals<'a, I>(tables: I) -> SpanTotals
where
    I: IntoIterator<Item = &'a SpanTotals>,
{
    let mut merged = SpanTotals::new();
    for table in tables {
        for (&name, &(count, nanos)) in table {
            let entry = merged.entry(name).or_insert((0, 0));
            entry.0 += count;
            entry.1 += nanos;
        }
    }
    merged
}

pub fn print_timing_statistics() {
    let tables: Vec<SpanTotals> = THREAD_TIMING_DATA
        .iter()
        .filter_map(|cell| cell.lock().ok().map(|data| data.clone()))
        .collect();
    let data = merge_totals(&tables);

    if data.is_empty() {
        eprintln!("\nNo timing data collected.");
        return;
    }

    let mut entries: Vec<_> = data.into_iter().collect();
    entries.sort_by_key(|(_, (_, total))| std::cmp::Reverse(*total));

    eprintln!("\n{:=<72}", "");
    eprintln!("{:<32} {:>12} {:>12} {:>12}", "Span", "Calls", "Total (ms)", "Avg (µs)");
    eprintln!("{:-<72}", "");
    for (name, (count, total_nanos)) in entries {
        let total_ms = total_nanos as f64 / 1_000_000.0;
        let avg_micros = total_nanos as f64 / count as f64 / 1_000.0;
        eprintln!("{:<32} {:>12} {:>12.2} {:>12.2}", name, count, total_ms, avg_micros);
    }
}

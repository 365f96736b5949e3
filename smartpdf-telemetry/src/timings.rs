use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::{Id, Subscriber};
use tracing_subscriber::{Layer, layer::Context, registry::LookupSpan};

/// Prefix of the span names the pipeline emits for its stages.
pub const STAGE_PREFIX: &str = "rag.";

/// One closed stage span.
#[derive(Debug, Clone, Serialize)]
pub struct StageTiming {
    /// Span name, e.g. `rag.load`.
    pub stage: String,
    /// Document the stage ran for, inherited from the enclosing span.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    /// Wall-clock time from span creation to close. Serialized as
    /// fractional milliseconds under `elapsed_ms`.
    #[serde(rename = "elapsed_ms", serialize_with = "as_millis")]
    pub elapsed: Duration,
    /// The span's other fields, e.g. `chunk_count` or `top_k`.
    pub fields: HashMap<String, serde_json::Value>,
}

fn as_millis<S: serde::Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_micros() as f64 / 1000.0)
}

/// Shared storage for recorded stage timings.
#[derive(Debug, Clone, Default)]
pub struct StageTimings {
    records: Arc<RwLock<Vec<StageTiming>>>,
}

impl StageTimings {
    /// Create empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// All records in the order the spans closed.
    pub fn snapshot(&self) -> Vec<StageTiming> {
        self.records.read().map(|r| r.clone()).unwrap_or_default()
    }

    /// Remove and return all records.
    pub fn take(&self) -> Vec<StageTiming> {
        self.records.write().map(|mut r| std::mem::take(&mut *r)).unwrap_or_default()
    }

    /// Records for one document.
    pub fn for_document(&self, document: &str) -> Vec<StageTiming> {
        self.snapshot().into_iter().filter(|t| t.document.as_deref() == Some(document)).collect()
    }

    /// Total elapsed time per stage name.
    pub fn totals(&self) -> BTreeMap<String, Duration> {
        let mut totals = BTreeMap::new();
        for timing in self.snapshot() {
            *totals.entry(timing.stage).or_insert(Duration::ZERO) += timing.elapsed;
        }
        totals
    }

    /// Append one record.
    pub fn record(&self, timing: StageTiming) {
        if let Ok(mut records) = self.records.write() {
            records.push(timing);
        }
    }
}

/// A tracing layer that times `rag.*` spans into a [`StageTimings`].
pub struct StageTimingLayer {
    storage: StageTimings,
}

impl StageTimingLayer {
    /// Create a layer that records into `storage`.
    pub fn new(storage: StageTimings) -> Self {
        Self { storage }
    }
}

struct Started(Instant);

#[derive(Clone, Default)]
struct SpanFields(HashMap<String, serde_json::Value>);

impl<S> Layer<S> for StageTimingLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &tracing::span::Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        if !attrs.metadata().name().starts_with(STAGE_PREFIX) {
            return;
        }
        let Some(span) = ctx.span(id) else { return };

        let mut visitor = JsonVisitor::default();
        attrs.record(&mut visitor);
        let mut fields = visitor.0;

        // Stage spans inherit the document from the enclosing ingest span.
        if !fields.contains_key("document") {
            let inherited = span.scope().skip(1).find_map(|ancestor| {
                let extensions = ancestor.extensions();
                extensions.get::<SpanFields>().and_then(|f| f.0.get("document").cloned())
            });
            if let Some(document) = inherited {
                fields.insert("document".to_string(), document);
            }
        }

        let mut extensions = span.extensions_mut();
        extensions.insert(Started(Instant::now()));
        extensions.insert(SpanFields(fields));
    }

    fn on_record(&self, id: &Id, values: &tracing::span::Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };
        let mut extensions = span.extensions_mut();
        if let Some(fields) = extensions.get_mut::<SpanFields>() {
            let mut visitor = JsonVisitor::default();
            values.record(&mut visitor);
            fields.0.extend(visitor.0);
        }
    }

    fn on_close(&self, id: Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(&id) else { return };
        let extensions = span.extensions();
        let Some(Started(started)) = extensions.get::<Started>() else { return };

        let mut fields = extensions.get::<SpanFields>().map(|f| f.0.clone()).unwrap_or_default();
        let document = match fields.remove("document") {
            Some(serde_json::Value::String(name)) => Some(name),
            Some(other) => Some(other.to_string()),
            None => None,
        };

        self.storage.record(StageTiming {
            stage: span.metadata().name().to_string(),
            document,
            elapsed: started.elapsed(),
            fields,
        });
    }
}

#[derive(Default)]
struct JsonVisitor(HashMap<String, serde_json::Value>);

impl tracing::field::Visit for JsonVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.insert(field.name().to_string(), serde_json::Value::String(format!("{value:?}")));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.insert(field.name().to_string(), serde_json::Value::String(value.to_string()));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.insert(field.name().to_string(), serde_json::Value::Bool(value));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }
}

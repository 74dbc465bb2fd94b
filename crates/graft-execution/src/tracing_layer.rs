//! Tracing layer that forwards migration outcome events to a channel.
//!
//! Only events with target [`MIGRATION_EVENT_TARGET`] are forwarded. The
//! fields of the enclosing run span (such as `run_id`) are attached to every
//! forwarded event so a collector can group outcomes by run.

use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::span::{Attributes, Id};
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;

use crate::event::MIGRATION_EVENT_TARGET;

/// Outcome event as handed to an external collector.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MigrationEvent {
    /// Log level (INFO for successes, WARN for failures)
    pub level: String,
    /// Human-readable message
    pub message: String,
    /// Structured fields (`resource_kind`, `source_id`, `outcome`, ...)
    pub fields: HashMap<String, Value>,
    /// Fields of the enclosing run span
    pub span: HashMap<String, Value>,
    pub timestamp: String,
}

impl MigrationEvent {
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

/// Span fields stored in the registry extensions.
struct SpanFields(HashMap<String, Value>);

/// A tracing layer that sends migration outcome events to a channel.
pub struct MigrationEventLayer {
    sender: mpsc::UnboundedSender<MigrationEvent>,
}

impl MigrationEventLayer {
    pub fn new(sender: mpsc::UnboundedSender<MigrationEvent>) -> Self {
        Self { sender }
    }
}

impl<S> Layer<S> for MigrationEventLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut fields = HashMap::new();
        attrs.record(&mut FieldVisitor(&mut fields));

        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(SpanFields(fields));
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        if event.metadata().target() != MIGRATION_EVENT_TARGET {
            return;
        }

        let mut fields = HashMap::new();
        event.record(&mut FieldVisitor(&mut fields));

        let mut span_fields = HashMap::new();
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope.from_root() {
                if let Some(stored) = span.extensions().get::<SpanFields>() {
                    span_fields.extend(stored.0.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
            }
        }

        let message = fields
            .remove("message")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();

        let migration_event = MigrationEvent {
            level: event.metadata().level().to_string(),
            message,
            fields,
            span: span_fields,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        // Receiver gone means nobody is collecting; drop the event.
        let _ = self.sender.send(migration_event);
    }
}

/// Field visitor that extracts tracing fields into a HashMap
struct FieldVisitor<'a>(&'a mut HashMap<String, Value>);

impl<'a> tracing::field::Visit for FieldVisitor<'a> {
    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.insert(
            field.name().to_string(),
            serde_json::json!(format!("{:?}", value)),
        );
    }
}

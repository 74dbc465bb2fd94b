//! Grafana REST API adapters.

pub mod client;
pub mod dto;
pub mod source_reader;
pub mod target_writer;

pub use client::{GrafanaClient, HttpFailure};
pub use source_reader::HttpSourceReader;
pub use target_writer::HttpTargetWriter;

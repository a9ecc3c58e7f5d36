// Application layer - Ingestion pipeline stages
pub mod classifier;
pub mod consumer;
pub mod ingestion_queue;
pub mod line_source;
pub mod parser;
pub mod reader_loop;

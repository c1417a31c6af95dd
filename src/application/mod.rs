pub mod controller;
pub mod export_writer;
pub mod report;
pub mod runtime;
pub mod scheduler;

//! # SQL Extract
//!
//! Extracts the results of a list of SQL queries into delimited text files,
//! several at a time, over one shared Oracle connection pool.
//!
//! The layout follows the Hexagonal Architecture (Ports and Adapters):
//! `domain` holds the data and pure transformations, `ports` the contract for
//! running a query, `infrastructure` the Oracle and filesystem adapters, and
//! `application` the export writer, scheduler and run controller.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ports;

#[cfg(test)]
pub(crate) mod test_support;

pub mod query_port;

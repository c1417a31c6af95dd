pub mod connection_manager;
pub mod oracle_query_adapter;

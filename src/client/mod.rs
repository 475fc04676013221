//! The widget side of the forum: transport, cached data store,
//! reconciliation protocol, filter/sort engine, vote ledger, and the
//! agent-code identity placeholder.

pub mod agent;
pub mod api;
pub mod filter;
pub mod ledger;
pub mod store;

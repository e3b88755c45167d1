pub mod command_handlers;
pub mod dispatcher;
pub mod hogql_reference;
pub mod main_types;
pub mod query_handlers;
pub mod resource_handlers;

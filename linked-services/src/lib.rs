pub mod config;
pub mod error;
pub mod events;
pub mod form;
pub mod gateway;
pub mod presenter;
pub mod registry;
pub mod schema;
pub mod selection;
pub mod upload;

#[cfg(test)]
pub(crate) mod testing;

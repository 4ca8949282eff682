#![forbid(unsafe_code)]

//! Channel showcase core: settings acquisition, the YouTube feed gateway and
//! the paginated feed controller consumed by the presentation layer.

pub mod config;
pub mod controller;
pub mod gateway;
pub mod logging;
pub mod mock;
pub mod models;
pub mod security;
pub mod session;
pub mod settings;
pub mod sheet;

#[cfg(test)]
pub(crate) mod test_support;

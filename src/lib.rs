pub mod config;
pub mod environment;
pub mod errors;
pub mod fields;
pub mod google;
pub mod pipeline;
pub mod rkg;
pub mod routes;
pub mod store;
pub mod table;
pub mod upload;
pub mod urls;

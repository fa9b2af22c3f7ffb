//! Browser front end: an upload form plus a table of uploaded files.
//!
//! The page is rendered once on the server; all interaction afterwards happens
//! in the browser against `/upload` and `/files`.

pub mod handlers;
pub mod routes;

pub use routes::routes;

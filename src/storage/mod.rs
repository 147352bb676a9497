pub mod db;
mod facas;
pub mod models;
mod tables;

pub use db::{Database, DatabaseError};
pub use tables::*;

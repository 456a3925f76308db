pub mod config;
pub mod dataset;
pub mod db;
pub mod error;
pub mod logger;
pub mod rsvp;
pub mod seed;
pub mod timestamp;

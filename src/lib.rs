// Library for tests to access modules

pub mod broadcaster;
pub mod collector;
pub mod config;
pub mod discovery;
pub mod gpu_probe;
pub mod models;
pub mod routes;
pub mod target;

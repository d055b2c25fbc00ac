pub mod database;
pub mod errors;
pub mod forms;
pub mod server;
pub mod services;

pub mod bags;
pub mod batches;
pub mod form_fields;
pub mod forms;
pub mod health;
pub mod submissions;

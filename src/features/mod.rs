pub mod notify;
pub mod session_store;

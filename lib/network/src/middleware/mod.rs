pub mod trace;

pub use trace::log_request;

pub mod btle;
pub mod constants;
pub mod decoder;
pub mod run_loop;
pub mod session;
pub mod state;
pub mod transport;
pub mod types;

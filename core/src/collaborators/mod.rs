pub mod connection;
pub mod registry;
pub mod stream;
pub mod values;
pub mod wait;

// Library root: re-exports all modules so integration tests and the binary
// can reach the controller, client, and host bridge.

pub mod client;
pub mod config;
pub mod controller;
pub mod protocol;
pub mod ws_server;

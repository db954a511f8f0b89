#![allow(dead_code)]
pub mod dns_server_mock;
pub mod mock_exchange;

pub use dns_server_mock::MockDnsServer;
pub use mock_exchange::MockExchange;

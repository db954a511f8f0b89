pub mod udp;

use std::net::{IpAddr, SocketAddr};

pub use udp::UdpTransport;

/// Socket address of a name server. `SocketAddr` renders IPv6 bracketed
/// (`[::1]:53`) and IPv4 bare (`127.0.0.1:53`).
pub fn server_addr(ip: IpAddr, port: u16) -> SocketAddr {
    SocketAddr::new(ip, port)
}

use std::fmt::Write;
use std::net::IpAddr;

/// Query name for a PTR lookup of `ip`.
///
/// IPv4 reverses the dotted octets under `in-addr.arpa`; IPv6 reverses the
/// 32 hex nibbles (low nibble of the last byte first) under `ip6.arpa`.
pub fn ip_to_reverse_domain(ip: &IpAddr) -> String {
    match ip {
        IpAddr::V4(ipv4) => {
            let octets = ipv4.octets();
            format!(
                "{}.{}.{}.{}.in-addr.arpa",
                octets[3], octets[2], octets[1], octets[0]
            )
        }
        IpAddr::V6(ipv6) => {
            let mut name = String::with_capacity(72);
            for byte in ipv6.octets().iter().rev() {
                let _ = write!(name, "{:x}.{:x}.", byte & 0x0f, byte >> 4);
            }
            name.push_str("ip6.arpa");
            name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ipv4_reverse() {
        let ip: IpAddr = "192.0.2.1".parse().unwrap();
        assert_eq!(ip_to_reverse_domain(&ip), "1.2.0.192.in-addr.arpa");
    }

    #[test]
    fn test_ipv6_reverses_nibbles_not_bytes() {
        let ip: IpAddr = "2001:db8::567:89ab".parse().unwrap();
        assert_eq!(
            ip_to_reverse_domain(&ip),
            "b.a.9.8.7.6.5.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.8.b.d.0.1.0.0.2.ip6.arpa"
        );
    }

    #[test]
    fn test_ipv6_loopback() {
        let ip: IpAddr = "::1".parse().unwrap();
        let name = ip_to_reverse_domain(&ip);
        assert!(name.starts_with("1.0.0.0."));
        assert!(name.ends_with(".0.ip6.arpa"));
        assert_eq!(name.split('.').count(), 34);
    }
}

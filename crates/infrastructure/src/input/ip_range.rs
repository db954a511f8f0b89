//! IPv4 ranges for PTR sweeps.
//!
//! Accepted forms:
//! - single address: `192.0.2.1`
//! - CIDR: `192.0.2.0/24` (iterates from the network address)
//! - min-max: `192.0.2.10-192.0.3.20`
//! - per-octet ranges: `192.0.1-2.*`, where `*` is `0-255`

use dnsweep_domain::{DomainError, NameSource};
use ipnetwork::Ipv4Network;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpRange {
    Single(Ipv4Addr),
    Cidr(Ipv4Network),
    MinMax { min: Ipv4Addr, max: Ipv4Addr },
    Octets { lower: [u8; 4], upper: [u8; 4] },
}

impl IpRange {
    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        match self {
            IpRange::Single(single) => *single == ip,
            IpRange::Cidr(network) => network.contains(ip),
            IpRange::MinMax { min, max } => *min <= ip && ip <= *max,
            IpRange::Octets { lower, upper } => ip
                .octets()
                .iter()
                .zip(lower.iter().zip(upper.iter()))
                .all(|(octet, (lo, hi))| lo <= octet && octet <= hi),
        }
    }

    pub fn count(&self) -> u64 {
        match self {
            IpRange::Single(_) => 1,
            IpRange::Cidr(network) => 1u64 << (32 - u32::from(network.prefix())),
            IpRange::MinMax { min, max } => u64::from(u32::from(*max) - u32::from(*min)) + 1,
            IpRange::Octets { lower, upper } => lower
                .iter()
                .zip(upper.iter())
                .map(|(lo, hi)| u64::from(hi - lo) + 1)
                .product(),
        }
    }

    /// Address at position `index` in iteration order, `None` past the end.
    pub fn nth(&self, index: u64) -> Option<Ipv4Addr> {
        if index >= self.count() {
            return None;
        }

        let addr = match self {
            IpRange::Single(single) => *single,
            IpRange::Cidr(network) => offset(network.network(), index),
            IpRange::MinMax { min, .. } => offset(*min, index),
            IpRange::Octets { lower, upper } => {
                // Mixed-radix decode, last octet varying fastest.
                let mut rest = index;
                let mut octets = [0u8; 4];
                for i in (0..4).rev() {
                    let span = u64::from(upper[i] - lower[i]) + 1;
                    octets[i] = lower[i] + (rest % span) as u8;
                    rest /= span;
                }
                Ipv4Addr::from(octets)
            }
        };

        Some(addr)
    }

    pub fn iter(&self) -> impl Iterator<Item = Ipv4Addr> + '_ {
        (0..self.count()).filter_map(move |i| self.nth(i))
    }
}

fn offset(base: Ipv4Addr, index: u64) -> Ipv4Addr {
    Ipv4Addr::from(u32::from(base).wrapping_add(index as u32))
}

impl FromStr for IpRange {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || DomainError::InvalidIpRange(s.to_string());

        if s.contains('/') {
            let network = Ipv4Network::from_str(s).map_err(|_| invalid())?;
            return Ok(IpRange::Cidr(network));
        }

        if let Ok(single) = Ipv4Addr::from_str(s) {
            return Ok(IpRange::Single(single));
        }

        if let Some((min, max)) = s.split_once('-') {
            if let (Ok(min), Ok(max)) = (Ipv4Addr::from_str(min), Ipv4Addr::from_str(max)) {
                if max < min {
                    return Err(invalid());
                }
                return Ok(IpRange::MinMax { min, max });
            }
        }

        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 4 {
            return Err(invalid());
        }

        let mut lower = [0u8; 4];
        let mut upper = [0u8; 4];
        for (i, part) in parts.iter().enumerate() {
            let (lo, hi) = parse_octet_range(part).ok_or_else(invalid)?;
            lower[i] = lo;
            upper[i] = hi;
        }

        Ok(IpRange::Octets { lower, upper })
    }
}

fn parse_octet_range(part: &str) -> Option<(u8, u8)> {
    if part == "*" {
        return Some((0, 255));
    }

    let (lo, hi) = match part.split_once('-') {
        Some((lo, hi)) => (parse_octet(lo)?, parse_octet(hi)?),
        None => {
            let octet = parse_octet(part)?;
            (octet, octet)
        }
    };

    (lo <= hi).then_some((lo, hi))
}

fn parse_octet(s: &str) -> Option<u8> {
    if s.is_empty() || s.len() > 3 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if s.len() > 1 && s.starts_with('0') {
        return None;
    }
    s.parse().ok()
}

impl fmt::Display for IpRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpRange::Single(ip) => write!(f, "{}", ip),
            IpRange::Cidr(network) => write!(f, "{}", network),
            IpRange::MinMax { min, max } => write!(f, "{}-{}", min, max),
            IpRange::Octets { lower, upper } => {
                let parts: Vec<String> = lower
                    .iter()
                    .zip(upper.iter())
                    .map(|(lo, hi)| match (lo, hi) {
                        (0, 255) => "*".to_string(),
                        (lo, hi) if lo == hi => lo.to_string(),
                        (lo, hi) => format!("{}-{}", lo, hi),
                    })
                    .collect();
                write!(f, "{}", parts.join("."))
            }
        }
    }
}

/// Addresses of several ranges in order, yielded as dotted-decimal text.
pub struct IpRangeSource {
    ranges: Vec<IpRange>,
    range: usize,
    index: u64,
}

impl IpRangeSource {
    pub fn new(ranges: Vec<IpRange>) -> Self {
        Self {
            ranges,
            range: 0,
            index: 0,
        }
    }

    /// Parses every entry; the first malformed one fails the whole list.
    pub fn parse<S: AsRef<str>>(ranges: &[S]) -> Result<Self, DomainError> {
        let ranges = ranges
            .iter()
            .map(|r| r.as_ref().parse())
            .collect::<Result<Vec<IpRange>, _>>()?;
        Ok(Self::new(ranges))
    }

    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        self.ranges.iter().any(|r| r.contains(ip))
    }

    pub fn next_ip(&mut self) -> Option<Ipv4Addr> {
        while let Some(range) = self.ranges.get(self.range) {
            if let Some(ip) = range.nth(self.index) {
                self.index += 1;
                return Some(ip);
            }
            self.range += 1;
            self.index = 0;
        }
        None
    }
}

impl NameSource for IpRangeSource {
    fn next(&mut self) -> Option<String> {
        self.next_ip().map(|ip| ip.to_string())
    }

    fn count(&self) -> u64 {
        self.ranges.iter().map(IpRange::count).sum()
    }

    fn reset(&mut self) -> Result<(), DomainError> {
        self.range = 0;
        self.index = 0;
        Ok(())
    }

    fn close(&mut self) -> Result<(), DomainError> {
        self.range = self.ranges.len();
        Ok(())
    }
}

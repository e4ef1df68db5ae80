//! Client access rules for NFS exports.
//!
//! Parses the comma separated CIDR list given for a volume, e.g.
//! `"192.168.1.0/24, 192.168.0.1/32"`, into the array's access records.
//! A full-width prefix selects a single host; anything shorter selects the
//! clients of a network.

use std::net::IpAddr;
use std::sync::LazyLock;

use compellent_api::{AccessDetails, ExportTo, TrustUsers};
use ipnet::{AddrParseError, IpNet};
use regex::Regex;

use crate::error::{ProvisionError, Result};

/// Runs of commas separate rules; empty tokens between them are not allowed.
static RULE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(",+").expect("Invalid regex pattern"));

/// Parse a CIDR list into read-write, no-root-squash access rules.
pub fn parse_access_rules(input: &str) -> Result<Vec<AccessDetails>> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(ProvisionError::EmptyAccessList);
    }

    RULE_SEPARATOR
        .split(&compact)
        .map(parse_access_rule)
        .collect()
}

/// Parse one `address/prefix` token. The address is kept as written, not
/// masked down to its network.
pub fn parse_access_rule(token: &str) -> Result<AccessDetails> {
    if token.is_empty() {
        return Err(ProvisionError::InvalidAccessRule {
            rule: token.to_string(),
            reason: "empty rule".to_string(),
        });
    }

    let net: IpNet = token
        .parse()
        .map_err(|e: AddrParseError| ProvisionError::InvalidAccessRule {
            rule: token.to_string(),
            reason: e.to_string(),
        })?;

    if net.prefix_len() == net.max_prefix_len() {
        Ok(single_host_access(net.addr()))
    } else {
        Ok(network_access(&net.addr().to_string(), net.prefix_len()))
    }
}

/// Rule admitting every client of `network/prefix`.
pub fn network_access(network: &str, prefix: u8) -> AccessDetails {
    AccessDetails {
        export_to: ExportTo::ClientsInNetwork,
        export_to_clients: network.to_string(),
        export_to_prefix: prefix,
        read_write: true,
        trust_users: TrustUsers::NoRootSquash,
    }
}

/// Rule admitting exactly one client.
pub fn single_host_access(host: IpAddr) -> AccessDetails {
    AccessDetails {
        export_to: ExportTo::OneClient,
        export_to_clients: host.to_string(),
        export_to_prefix: 0,
        read_write: true,
        trust_users: TrustUsers::NoRootSquash,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_host() {
        let rules = parse_access_rules("192.168.1.5/32").unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].export_to, ExportTo::OneClient);
        assert_eq!(rules[0].export_to_clients, "192.168.1.5");
        assert_eq!(rules[0].export_to_prefix, 0);
        assert!(rules[0].read_write);
        assert_eq!(rules[0].trust_users, TrustUsers::NoRootSquash);
    }

    #[test]
    fn test_network() {
        let rules = parse_access_rules("192.168.0.0/24").unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].export_to, ExportTo::ClientsInNetwork);
        assert_eq!(rules[0].export_to_clients, "192.168.0.0");
        assert_eq!(rules[0].export_to_prefix, 24);
    }

    #[test]
    fn test_list_with_whitespace_and_repeated_commas() {
        let rules = parse_access_rules(" 10.0.0.0/8,\t10.1.1.1/32 ,,\n172.16.0.0/12").unwrap();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[0].export_to_prefix, 8);
        assert_eq!(rules[1].export_to, ExportTo::OneClient);
        assert_eq!(rules[1].export_to_clients, "10.1.1.1");
        assert_eq!(rules[2].export_to_clients, "172.16.0.0");
    }

    #[test]
    fn test_host_bits_are_kept() {
        let rules = parse_access_rules("192.168.1.77/24").unwrap();
        assert_eq!(rules[0].export_to, ExportTo::ClientsInNetwork);
        assert_eq!(rules[0].export_to_clients, "192.168.1.77");
        assert_eq!(rules[0].export_to_prefix, 24);

        let rules = parse_access_rules("fd00::abcd/64").unwrap();
        assert_eq!(rules[0].export_to_clients, "fd00::abcd");
    }

    #[test]
    fn test_zero_prefix_is_a_network() {
        let rules = parse_access_rules("0.0.0.0/0").unwrap();
        assert_eq!(rules[0].export_to, ExportTo::ClientsInNetwork);
        assert_eq!(rules[0].export_to_prefix, 0);
    }

    #[test]
    fn test_ipv6() {
        let rules = parse_access_rules("fd00::/64, fd00::1/128").unwrap();
        assert_eq!(rules[0].export_to, ExportTo::ClientsInNetwork);
        assert_eq!(rules[0].export_to_prefix, 64);
        assert_eq!(rules[1].export_to, ExportTo::OneClient);
        assert_eq!(rules[1].export_to_clients, "fd00::1");
    }

    #[test]
    fn test_invalid_rules() {
        assert!(matches!(
            parse_access_rules(""),
            Err(ProvisionError::EmptyAccessList)
        ));
        assert!(matches!(
            parse_access_rules("  \n"),
            Err(ProvisionError::EmptyAccessList)
        ));

        for bad in [
            "192.168.1.5",
            "192.168.1.5/",
            "192.168.1.5/33",
            "192.168.1.5/+8",
            "192.168.1.5/-1",
            "192.168.1/24",
            "host.example/32",
            "fd00::/129",
            "10.0.0.0/8,",
            ",10.0.0.0/8",
            "10.0.0.0/8,bogus",
        ] {
            assert!(
                matches!(
                    parse_access_rules(bad),
                    Err(ProvisionError::InvalidAccessRule { .. })
                ),
                "'{}' should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_network_access_builder() {
        let rule = network_access("10.20.0.0", 16);
        assert_eq!(rule.export_to, ExportTo::ClientsInNetwork);
        assert_eq!(rule.export_to_clients, "10.20.0.0");
        assert_eq!(rule.export_to_prefix, 16);
        assert!(rule.read_write);
    }
}

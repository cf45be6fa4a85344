//! Conversion of nmap's XML report into the canonical result schema.
//!
//! Deserialization is deliberately loose (string port ids, optional
//! elements everywhere) so that a single malformed element can be skipped
//! with a warning instead of failing the whole document. Only a
//! structurally unusable document is a hard [`ScanError::Parse`].

use serde::Deserialize;

use crate::errors::ScanError;
use crate::types::{HostRecord, PortRecord, ScanResult, Transport};

/// Minimal nmap XML schema for host + port discovery. Intentionally partial:
/// only the parts the canonical schema needs are modeled, everything else in
/// the report is ignored.
#[derive(Debug, Deserialize)]
struct NmapRun {
    #[serde(rename = "host", default)]
    hosts: Vec<RawHost>,
}

#[derive(Debug, Deserialize)]
struct RawHost {
    #[serde(rename = "address", default)]
    addresses: Vec<RawAddress>,
    status: Option<RawStatus>,
    hostnames: Option<RawHostnames>,
    ports: Option<RawPorts>,
}

#[derive(Debug, Deserialize)]
struct RawAddress {
    #[serde(rename = "@addr")]
    addr: String,
    #[serde(rename = "@addrtype", default)]
    addr_type: String,
}

#[derive(Debug, Deserialize)]
struct RawStatus {
    #[serde(rename = "@state")]
    state: String,
}

#[derive(Debug, Deserialize)]
struct RawHostnames {
    #[serde(rename = "hostname", default)]
    entries: Vec<RawHostname>,
}

#[derive(Debug, Deserialize)]
struct RawHostname {
    #[serde(rename = "@name")]
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawPorts {
    #[serde(rename = "port", default)]
    ports: Vec<RawPort>,
}

#[derive(Debug, Deserialize)]
struct RawPort {
    #[serde(rename = "@portid", default)]
    portid: Option<String>,
    #[serde(rename = "@protocol", default)]
    protocol: Option<String>,
    state: Option<RawPortState>,
    service: Option<RawService>,
}

#[derive(Debug, Deserialize)]
struct RawPortState {
    #[serde(rename = "@state")]
    state: String,
}

#[derive(Debug, Deserialize)]
struct RawService {
    #[serde(rename = "@name")]
    name: Option<String>,
    #[serde(rename = "@product")]
    product: Option<String>,
    #[serde(rename = "@version")]
    version: Option<String>,
}

/// Parse a raw nmap XML report into a [`ScanResult`].
///
/// Hosts appear in document order; within a host, TCP ports come before UDP
/// ports, each group in document order. Parsing the same input twice yields
/// an identical result.
pub fn parse_scan_xml(raw: &str) -> Result<ScanResult, ScanError> {
    let run: NmapRun = quick_xml::de::from_str(raw)
        .map_err(|e| ScanError::Parse(format!("failed to parse scan output: {e}")))?;

    let hosts = run.hosts.into_iter().filter_map(convert_host).collect();
    Ok(ScanResult { hosts })
}

fn convert_host(raw: RawHost) -> Option<HostRecord> {
    let ip = pick_address(&raw.addresses);
    let status = raw.status.map(|s| s.state);

    // A host element carrying neither an address nor a status gives us
    // nothing to report.
    if ip.is_none() && status.is_none() {
        tracing::warn!("skipping host element without address or status");
        return None;
    }

    let hostname = raw
        .hostnames
        .and_then(|h| h.entries.into_iter().next())
        .map(|h| h.name);

    let raw_ports = raw.ports.map(|p| p.ports).unwrap_or_default();
    // TCP section first, UDP after; document order within each group.
    let (mut ports, udp): (Vec<PortRecord>, Vec<PortRecord>) = raw_ports
        .into_iter()
        .filter_map(convert_port)
        .partition(|p| p.protocol == Transport::Tcp);
    ports.extend(udp);

    Some(HostRecord {
        ip,
        hostname,
        status: status.unwrap_or_else(|| "unknown".to_string()),
        ports,
    })
}

/// First IPv4 address wins; otherwise the first non-MAC address (e.g. IPv6).
/// MAC addresses alone never populate `ip`.
fn pick_address(addresses: &[RawAddress]) -> Option<String> {
    addresses
        .iter()
        .find(|a| a.addr_type == "ipv4")
        .or_else(|| addresses.iter().find(|a| a.addr_type != "mac"))
        .map(|a| a.addr.clone())
}

fn convert_port(raw: RawPort) -> Option<PortRecord> {
    let portid = raw.portid?;
    let port: u16 = match portid.parse() {
        Ok(p) => p,
        Err(_) => {
            tracing::warn!(portid = %portid, "skipping port with non-numeric id");
            return None;
        }
    };
    let protocol = match raw.protocol.as_deref() {
        Some("tcp") => Transport::Tcp,
        Some("udp") => Transport::Udp,
        other => {
            tracing::warn!(port, protocol = ?other, "skipping port with unsupported protocol");
            return None;
        }
    };

    let (service, product, version) = match raw.service {
        Some(s) => (s.name, s.product, s.version),
        None => (None, None, None),
    };

    Some(PortRecord {
        port,
        protocol,
        // Missing <state> keeps the port, just without a state token.
        state: raw.state.map(|s| s.state),
        service,
        product,
        version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<nmaprun scanner="nmap" args="nmap -sV 192.168.1.1" version="7.94">
  <host>
    <status state="up" reason="arp-response"/>
    <address addr="AA:BB:CC:DD:EE:FF" addrtype="mac"/>
    <address addr="192.168.1.1" addrtype="ipv4"/>
    <hostnames>
      <hostname name="router.local" type="PTR"/>
    </hostnames>
    <ports>
      <port protocol="tcp" portid="80">
        <state state="open" reason="syn-ack"/>
        <service name="http" product="nginx" version="1.18.0"/>
      </port>
      <port protocol="udp" portid="53">
        <state state="open"/>
        <service name="domain"/>
      </port>
      <port protocol="tcp" portid="443">
        <state state="open" reason="syn-ack"/>
        <service name="https"/>
      </port>
    </ports>
  </host>
</nmaprun>"#;

    #[test]
    fn parses_sample_host_with_tcp_before_udp() {
        let result = parse_scan_xml(SAMPLE).unwrap();
        assert_eq!(result.hosts.len(), 1);

        let host = &result.hosts[0];
        assert_eq!(host.ip.as_deref(), Some("192.168.1.1"));
        assert_eq!(host.hostname.as_deref(), Some("router.local"));
        assert_eq!(host.status, "up");

        let summary: Vec<(u16, Transport)> =
            host.ports.iter().map(|p| (p.port, p.protocol)).collect();
        assert_eq!(
            summary,
            vec![
                (80, Transport::Tcp),
                (443, Transport::Tcp),
                (53, Transport::Udp),
            ]
        );

        assert_eq!(host.ports[0].service.as_deref(), Some("http"));
        assert_eq!(host.ports[0].product.as_deref(), Some("nginx"));
        assert_eq!(host.ports[0].version.as_deref(), Some("1.18.0"));
        // https port reported no product/version; they must be absent.
        assert_eq!(host.ports[1].product, None);
        assert_eq!(host.ports[1].version, None);
    }

    #[test]
    fn parse_is_idempotent() {
        let a = parse_scan_xml(SAMPLE).unwrap();
        let b = parse_scan_xml(SAMPLE).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        let err = parse_scan_xml("<nmaprun><host><status state=").unwrap_err();
        assert!(matches!(err, ScanError::Parse(_)));
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn empty_run_yields_zero_hosts() {
        let result = parse_scan_xml(r#"<nmaprun scanner="nmap"></nmaprun>"#).unwrap();
        assert!(result.hosts.is_empty());
    }

    #[test]
    fn port_without_state_element_is_kept() {
        let xml = r#"<nmaprun><host>
            <status state="up"/>
            <address addr="10.0.0.2" addrtype="ipv4"/>
            <ports><port protocol="tcp" portid="22"/></ports>
        </host></nmaprun>"#;
        let result = parse_scan_xml(xml).unwrap();
        let host = &result.hosts[0];
        assert_eq!(host.ports.len(), 1);
        assert_eq!(host.ports[0].port, 22);
        assert_eq!(host.ports[0].state, None);
    }

    #[test]
    fn non_numeric_port_id_is_skipped_not_fatal() {
        let xml = r#"<nmaprun><host>
            <status state="up"/>
            <address addr="10.0.0.3" addrtype="ipv4"/>
            <ports>
              <port protocol="tcp" portid="abc"><state state="open"/></port>
              <port protocol="tcp" portid="8080"><state state="open"/></port>
            </ports>
        </host></nmaprun>"#;
        let result = parse_scan_xml(xml).unwrap();
        let host = &result.hosts[0];
        assert_eq!(host.ports.len(), 1);
        assert_eq!(host.ports[0].port, 8080);
    }

    #[test]
    fn unsupported_protocol_is_skipped() {
        let xml = r#"<nmaprun><host>
            <status state="up"/>
            <address addr="10.0.0.4" addrtype="ipv4"/>
            <ports>
              <port protocol="sctp" portid="3868"><state state="open"/></port>
            </ports>
        </host></nmaprun>"#;
        let result = parse_scan_xml(xml).unwrap();
        assert!(result.hosts[0].ports.is_empty());
    }

    #[test]
    fn host_without_address_is_kept_when_status_parses() {
        let xml = r#"<nmaprun><host><status state="down"/></host></nmaprun>"#;
        let result = parse_scan_xml(xml).unwrap();
        assert_eq!(result.hosts.len(), 1);
        assert_eq!(result.hosts[0].ip, None);
        assert_eq!(result.hosts[0].status, "down");
    }

    #[test]
    fn mac_only_host_has_no_ip() {
        let xml = r#"<nmaprun><host>
            <status state="up"/>
            <address addr="AA:BB:CC:DD:EE:FF" addrtype="mac"/>
        </host></nmaprun>"#;
        let result = parse_scan_xml(xml).unwrap();
        assert_eq!(result.hosts[0].ip, None);
    }

    #[test]
    fn ipv6_address_is_used_when_no_ipv4_present() {
        let xml = r#"<nmaprun><host>
            <status state="up"/>
            <address addr="fe80::1" addrtype="ipv6"/>
        </host></nmaprun>"#;
        let result = parse_scan_xml(xml).unwrap();
        assert_eq!(result.hosts[0].ip.as_deref(), Some("fe80::1"));
    }
}

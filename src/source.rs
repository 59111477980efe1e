//! Candidate list loading and CIDR expansion

use crate::error::{AppError, Result};
use crate::logging::Logger;
use crate::types::CandidateAddress;
use ipnet::{IpNet, Ipv4AddrRange, Ipv6AddrRange};
use std::net::IpAddr;
use std::path::Path;

/// Every address of a block, network base through broadcast inclusive.
///
/// Host bits in the input are masked off first, so `10.0.0.5/30` yields the
/// same four addresses as `10.0.0.0/30`.
pub fn expand_cidr(net: IpNet) -> Box<dyn Iterator<Item = IpAddr> + Send> {
    match net {
        IpNet::V4(net) => Box::new(
            Ipv4AddrRange::new(net.network(), net.broadcast()).map(IpAddr::V4),
        ),
        IpNet::V6(net) => Box::new(
            Ipv6AddrRange::new(net.network(), net.broadcast()).map(IpAddr::V6),
        ),
    }
}

/// Expand one trimmed input line into candidates.
///
/// A line containing `/` is treated as a CIDR block; anything else is a
/// single candidate that may carry its own port.
pub fn expand_line(line: &str, default_port: u16) -> Result<Vec<CandidateAddress>> {
    let line = line.trim();

    if line.contains('/') {
        let net: IpNet = line
            .parse()
            .map_err(|e| AppError::parse(format!("Invalid CIDR block '{}': {}", line, e)))?;
        return Ok(expand_cidr(net)
            .map(|ip| CandidateAddress::from_ip(ip, default_port))
            .collect());
    }

    Ok(vec![CandidateAddress::parse(line, default_port)?])
}

/// Parse the contents of a candidate list.
///
/// Blank lines and `#` comments are ignored. Entries that fail to parse are
/// logged and skipped; the remaining lines are still processed.
pub async fn parse_candidates(content: &str, default_port: u16, logger: &Logger) -> Vec<CandidateAddress> {
    let mut candidates = Vec::new();

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match expand_line(line, default_port) {
            Ok(expanded) => candidates.extend(expanded),
            Err(e) => {
                logger.warn("Skipping unparseable input line")
                    .field("line", index + 1)
                    .field("entry", line)
                    .field("reason", e.to_string())
                    .log()
                    .await;
            }
        }
    }

    candidates
}

/// Read and expand the candidate list at `path`.
///
/// Failing to read the file is fatal to the run.
pub async fn read_candidates(path: &Path, default_port: u16, logger: &Logger) -> Result<Vec<CandidateAddress>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::io(format!("Failed to read candidate list {}: {}", path.display(), e)))?;

    let candidates = parse_candidates(&content, default_port, logger).await;

    logger.info("Loaded candidate list")
        .field("path", path.display().to_string())
        .field("candidates", candidates.len())
        .log()
        .await;

    Ok(candidates)
}

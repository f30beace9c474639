use anyhow::{Context, Result, bail};
use chrono::NaiveDateTime;
use pkg_types::lease::LeaseEntry;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// `cltt` timestamp after the weekday is dropped and date/time are joined by `T`.
const CLTT_FORMAT: &str = "%Y/%m/%dT%H:%M:%S;";

/// Fields collected for the lease block currently being read.
#[derive(Debug, Default)]
struct Block {
    address: String,
    hardware_id: Option<String>,
    last_transaction_time: Option<NaiveDateTime>,
}

impl Block {
    fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
            ..Default::default()
        }
    }

    /// Turn the block into an entry. Blocks without a hardware address or
    /// `cltt` (free/backup leases) cannot identify an arrival.
    fn into_entry(self) -> Result<LeaseEntry, Incomplete> {
        match (self.hardware_id, self.last_transaction_time) {
            (Some(hardware_id), Some(ltt)) => Ok(LeaseEntry::new(hardware_id, self.address, ltt)),
            (Some(_), None) => Err(Incomplete::MissingCltt),
            (None, Some(_)) => Err(Incomplete::MissingHardwareId),
            (None, None) => Err(Incomplete::Free),
        }
    }

    fn finish(self, entries: &mut Vec<LeaseEntry>) {
        let address = self.address.clone();
        match self.into_entry() {
            Ok(entry) => entries.push(entry),
            // A device whose lease has no cltt can never count as arriving.
            Err(Incomplete::MissingCltt) => {
                warn!("Dropping lease block {} (missing cltt)", address)
            }
            Err(Incomplete::MissingHardwareId) => {
                debug!("Dropping lease block {} (missing hardware ethernet)", address)
            }
            Err(Incomplete::Free) => debug!("Skipping free lease block {}", address),
        }
    }
}

/// Why a lease block did not produce an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Incomplete {
    Free,
    MissingHardwareId,
    MissingCltt,
}

/// Parse an ISC dhcpd lease log.
///
/// Only entries whose hardware id is in `tracked` are returned; an empty
/// `tracked` returns every entry. Entries keep file order, and a device
/// that renewed several times appears once per block.
pub fn parse_leases(text: &str, tracked: &[String]) -> Result<Vec<LeaseEntry>> {
    let mut entries = Vec::new();
    let mut current: Option<Block> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        let lineno = idx + 1;

        if line.split_whitespace().next() == Some("lease") {
            if let Some(block) = current.take() {
                block.finish(&mut entries);
            }
            let Some(address) = line.split_whitespace().nth(1) else {
                bail!("line {}: lease without an address: '{}'", lineno, line);
            };
            current = Some(Block::new(address));
            continue;
        }

        if line == "}" {
            if let Some(block) = current.take() {
                block.finish(&mut entries);
            }
            continue;
        }

        let Some(block) = current.as_mut() else {
            continue;
        };

        if line.starts_with("cltt") {
            let stamp = line.split_whitespace().skip(2).collect::<Vec<_>>().join("T");
            let ltt = NaiveDateTime::parse_from_str(&stamp, CLTT_FORMAT).with_context(|| {
                format!("line {}: malformed cltt timestamp '{}'", lineno, stamp)
            })?;
            block.last_transaction_time = Some(ltt);
        } else if line.starts_with("hardware ethernet") {
            if let Some(id) = line.split_whitespace().last() {
                block.hardware_id = Some(id.trim_end_matches(';').to_string());
            }
        }
    }

    if let Some(block) = current.take() {
        block.finish(&mut entries);
    }

    if tracked.is_empty() {
        return Ok(entries);
    }
    Ok(entries
        .into_iter()
        .filter(|e| tracked.iter().any(|id| *id == e.hardware_id))
        .collect())
}

/// Read and parse the lease log at `path`. The file is read in full.
pub async fn read_leases(path: impl AsRef<Path>, tracked: &[String]) -> Result<Vec<LeaseEntry>> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read lease log {}", path.display()))?;
    parse_leases(&text, tracked).with_context(|| format!("invalid lease log {}", path.display()))
}

/// Keep only the most recent entry per hardware id, ordered by hardware id.
pub fn latest_by_hardware_id(entries: &[LeaseEntry]) -> Vec<LeaseEntry> {
    let mut latest: BTreeMap<&str, &LeaseEntry> = BTreeMap::new();
    for entry in entries {
        latest
            .entry(entry.hardware_id.as_str())
            .and_modify(|seen| {
                if entry.last_transaction_time > seen.last_transaction_time {
                    *seen = entry;
                }
            })
            .or_insert(entry);
    }
    latest.into_values().cloned().collect()
}

//! Plain-text rendering of status snapshots.

use std::fmt::Write;

use opswatch_core::{RecordMap, Snapshot};

/// Render a snapshot for the terminal.
///
/// The first line is the headline (`name version: HEALTHY|UNHEALTHY`);
/// detailed snapshots add one block per tracker with its problems and
/// warnings.
pub fn snapshot_text(snapshot: &Snapshot) -> String {
    let status = snapshot.status();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} {}: {}",
        status.name,
        status.version,
        if status.healthy { "HEALTHY" } else { "UNHEALTHY" }
    );
    let _ = writeln!(out, "  built {}", status.build_date.to_rfc3339());
    if let Some(level) = status.level {
        let _ = writeln!(out, "  level {level}");
    }
    for line in &status.support {
        let _ = writeln!(out, "  support: {line}");
    }

    for tracker in snapshot.trackers().unwrap_or_default() {
        let mark = if tracker.is_healthy() { "ok" } else { "!!" };
        let _ = writeln!(out, "  [{mark}] {}", tracker.name);
        records(&mut out, "problem", &tracker.problems);
        records(&mut out, "warning", &tracker.warnings);
    }

    out
}

fn records(out: &mut String, label: &str, map: &RecordMap) {
    for (key, value) in map {
        let _ = writeln!(out, "       {label} {key}: {value}");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use opswatch_core::wire::{WireDetailedStatus, WireStatus, WireTracker};
    use opswatch_core::{DetailedStatusSnapshot, StatusSnapshot, WireRecord};

    fn wire() -> WireStatus {
        WireStatus {
            healthy: true,
            name: "X".to_string(),
            support: Some(vec!["ops@example.com".to_string()]),
            version: "1.0".to_string(),
            build_epoch_seconds: 1000,
            level: None,
        }
    }

    #[test]
    fn test_basic_snapshot() {
        let snapshot = Snapshot::from(StatusSnapshot::from_wire(wire()).unwrap());
        let text = snapshot_text(&snapshot);
        assert_eq!(
            text,
            "X 1.0: HEALTHY\n  built 1970-01-01T00:16:40+00:00\n  support: ops@example.com\n"
        );
    }

    #[test]
    fn test_detailed_snapshot_lists_trackers() {
        let mut status = wire();
        status.healthy = false;
        status.level = Some(2);
        let detailed = DetailedStatusSnapshot::from_wire(WireDetailedStatus {
            status,
            trackers: Some(vec![
                WireTracker {
                    name: "k3s".to_string(),
                    problems: WireRecord::from_pairs([("node:ready", "not ready")]),
                    warnings: WireRecord::Absent,
                },
                WireTracker {
                    name: "traefik".to_string(),
                    ..Default::default()
                },
            ]),
        })
        .unwrap();

        let text = snapshot_text(&Snapshot::from(detailed));
        assert!(text.starts_with("X 1.0: UNHEALTHY\n"));
        assert!(text.contains("  level 2\n"));
        assert!(text.contains("  [!!] k3s\n       problem node:ready: not ready\n"));
        assert!(text.contains("  [ok] traefik\n"));
    }
}

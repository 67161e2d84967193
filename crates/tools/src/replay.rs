//! Replays a JSON-lines script of host calls against a [`MapHost`].
//!
//! Each line is one call, stamped with the caller's monotonic time:
//!
//! ```text
//! {"at": 0.0, "op": "mount", "key": "m", "config": {"zoom": 4}}
//! {"at": 0.1, "op": "ack", "session": "m", "id": 0, "ack": {"type": "view_ready", "center": [0, 0], "zoom": 4}}
//! {"at": 0.2, "op": "event", "session": "m", "event": {"type": "pointer-leave"}}
//! {"at": 1.0, "op": "release"}
//! {"at": 7.0, "op": "tick"}
//! ```
//!
//! A line without `at` is stamped with the wall-clock time elapsed since
//! the replay started, so a live feed can be piped in unstamped.
//!
//! Output is one JSON line per dispatched command, emitted event, or
//! rejected call. Blank lines and lines starting with `#` are skipped.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use foundation::ids::{CommandId, SessionId};
use foundation::time::Time;
use runtime::tick::MonotonicClock;
use serde::Deserialize;
use serde_json::{Value, json};
use session::command::{Ack, Envelope};
use session::event::RawEngineEvent;
use session::host::MapHost;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScriptLine {
    #[serde(default)]
    pub at: Option<f64>,
    #[serde(flatten)]
    pub call: HostCall,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum HostCall {
    Mount {
        #[serde(default)]
        key: Option<String>,
        config: Value,
    },
    Ack {
        session: SessionId,
        id: CommandId,
        ack: Ack,
    },
    Event {
        session: SessionId,
        event: RawEngineEvent,
    },
    Release,
    Tick,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub calls: usize,
    pub commands: usize,
    pub events: usize,
    pub rejected: usize,
}

pub fn parse_line(line: &str) -> Result<Option<ScriptLine>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let parsed = serde_json::from_str(trimmed).context("malformed script line")?;
    Ok(Some(parsed))
}

/// Runs every line of `script` against `host`, writing results to `out`.
///
/// Rejected calls (invalid configs, bad acks) are reported in the output
/// and do not stop the replay; malformed lines do.
pub fn run<R: BufRead, W: Write>(script: R, out: &mut W, host: &mut MapHost) -> Result<ReplaySummary> {
    let clock = MonotonicClock::start();
    let mut summary = ReplaySummary::default();
    for (index, line) in script.lines().enumerate() {
        let number = index + 1;
        let line = line.with_context(|| format!("reading line {number}"))?;
        let Some(entry) = parse_line(&line).with_context(|| format!("line {number}"))? else {
            continue;
        };
        summary.calls += 1;
        let now = entry.at.map(Time).unwrap_or_else(|| clock.now());
        debug!(line = number, at = now.seconds(), "replaying call");

        let commands = match entry.call {
            HostCall::Mount { key, config } => host
                .mount_or_update(key.as_deref(), &config, now)
                .map_err(|e| e.to_string()),
            HostCall::Ack { session, id, ack } => host
                .acknowledge(&session, id, ack, now)
                .map_err(|e| e.to_string()),
            HostCall::Event { session, event } => {
                host.handle_engine_event(&session, event, now);
                Ok(Vec::new())
            }
            HostCall::Release => Ok(host.release(now)),
            HostCall::Tick => Ok(host.tick(now)),
        };

        match commands {
            Ok(commands) => {
                summary.commands += commands.len();
                for envelope in &commands {
                    write_command(out, envelope)?;
                }
            }
            Err(message) => {
                warn!(line = number, %message, "call rejected");
                summary.rejected += 1;
                writeln!(out, "{}", json!({"line": number, "error": message}))?;
            }
        }

        for stamped in host.drain_events() {
            summary.events += 1;
            let line = json!({"tick": stamped.tick_index, "event": stamped.event});
            writeln!(out, "{line}")?;
        }
    }
    Ok(summary)
}

fn write_command<W: Write>(out: &mut W, envelope: &Envelope) -> Result<()> {
    let line = serde_json::to_string(envelope).context("encoding command")?;
    writeln!(out, "{line}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{HostCall, ReplaySummary, parse_line, run};
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use session::backend::RenderBackend;
    use session::host::MapHost;
    use session::settings::SessionConfig;

    fn host() -> MapHost {
        MapHost::new(RenderBackend::default(), SessionConfig::default())
    }

    fn output_lines(out: &[u8]) -> Vec<Value> {
        std::str::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        assert!(parse_line("").unwrap().is_none());
        assert!(parse_line("  # setup").unwrap().is_none());
        let line = parse_line(r#"{"at": 1.5, "op": "tick"}"#).unwrap().unwrap();
        assert_eq!(line.at, Some(1.5));
        assert_eq!(line.call, HostCall::Tick);
        let unstamped = parse_line(r#"{"op": "release"}"#).unwrap().unwrap();
        assert_eq!(unstamped.at, None);
        assert!(parse_line(r#"{"at": 0, "op": "dance"}"#).is_err());
    }

    #[test]
    fn mount_ack_and_teardown() {
        let script = r#"
# mount with one layer
{"at": 0.0, "op": "mount", "key": "m", "config": {"zoom": 4, "layers": [{"kind": "feature", "id": "L1", "url": "https://example.com/FeatureServer/0"}]}}
{"at": 0.1, "op": "ack", "session": "m", "id": 0, "ack": {"type": "view_ready", "center": [0, 0], "zoom": 4}}
{"at": 0.2, "op": "ack", "session": "m", "id": 1, "ack": {"type": "layer_ready", "feature_count": 12}}
{"at": 1.0, "op": "mount", "key": "m", "config": {"zoom": 25}}
{"at": 2.0, "op": "release"}
{"at": 7.0, "op": "tick"}
"#;
        let mut out = Vec::new();
        let summary = run(script.as_bytes(), &mut out, &mut host()).unwrap();
        assert_eq!(
            summary,
            ReplaySummary {
                calls: 6,
                commands: 4,
                events: 1,
                rejected: 1
            }
        );
        let lines = output_lines(&out);
        let kinds: Vec<String> = lines
            .iter()
            .map(|l| {
                if let Some(c) = l.get("command") {
                    c["type"].as_str().unwrap().to_string()
                } else if let Some(e) = l.get("event") {
                    e["event"].as_str().unwrap().to_string()
                } else {
                    "error".to_string()
                }
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                "create_view",
                "load_layer",
                "map_loaded",
                "error",
                "remove_layer",
                "destroy_view"
            ]
        );
        assert_eq!(lines[2]["event"]["featureCount"], 12);
    }

    #[test]
    fn unstamped_lines_use_the_wall_clock() {
        let script = r#"
{"op": "mount", "key": "live", "config": {"zoom": 2}}
{"op": "release"}
"#;
        let mut out = Vec::new();
        let mut h = host();
        let summary = run(script.as_bytes(), &mut out, &mut h).unwrap();
        assert_eq!(summary.calls, 2);
        assert_eq!(summary.commands, 1);
        assert_eq!(h.draining(), 1);
        let lines = output_lines(&out);
        assert_eq!(lines[0]["command"]["type"], "create_view");
    }

    #[test]
    fn malformed_line_stops_replay() {
        let script = "{\"at\": 0.0, \"op\": \"tick\"}\nnot json\n";
        let mut out = Vec::new();
        let err = run(script.as_bytes(), &mut out, &mut host()).unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }
}

//! Newline-delimited JSON event stream for headless runs.

use anyhow::Result;
use serde::Serialize;
use skyscore_audio::journal::CallLog;
use skyscore_core::SimTick;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// One journalled call, stamped with the tick that issued it.
#[derive(Debug, Serialize)]
pub struct EventRecord<'a> {
    pub tick: SimTick,
    /// Event kind label (e.g. `sink.play`).
    pub kind: &'a str,
    /// Region key or playlist name.
    pub payload: &'a str,
}

pub struct JsonlSink {
    out: BufWriter<File>,
}

impl JsonlSink {
    /// Create a new sink at `path`, creating parent dirs if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        Ok(Self {
            out: BufWriter::new(file),
        })
    }

    pub fn write(&mut self, event: &EventRecord<'_>) -> Result<()> {
        serde_json::to_writer(&mut self.out, event)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    /// Drain `log` and append every call, stamped with `tick`.
    pub fn write_calls(&mut self, tick: SimTick, log: &CallLog) -> Result<usize> {
        let calls = log.take();
        for call in &calls {
            self.write(&EventRecord {
                tick,
                kind: call.kind(),
                payload: call.target(),
            })?;
        }
        self.out.flush()?;
        Ok(calls.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyscore_audio::journal::Call;

    #[test]
    fn writes_one_line_per_call() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events/run.jsonl");
        let log = CallLog::new();
        log.push(Call::SinkPlay("Kerbin".into()));
        log.push(Call::WorldStopTrack);

        let mut sink = JsonlSink::create(&path).unwrap();
        assert_eq!(sink.write_calls(SimTick(3), &log).unwrap(), 2);
        assert!(log.is_empty());

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"sink.play\""));
        assert!(lines[0].contains("\"Kerbin\""));
        assert!(lines[1].contains("\"tick\":3"));
    }
}

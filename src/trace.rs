use std::fs::File;
use std::io::{self, BufWriter, Write};

use anyhow::Context;
use serde::Serialize;

use crate::common::StepEvent;

#[derive(Serialize)]
struct TraceLine<'a> {
    algorithm: &'a str,
    seq: usize,
    #[serde(flatten)]
    event: &'a StepEvent,
}

/// Writes step events as JSON lines for an external renderer to replay.
pub struct TraceWriter<W: Write> {
    writer: W,
    seq: usize,
}

impl TraceWriter<BufWriter<File>> {
    pub fn create(path: &str) -> anyhow::Result<Self> {
        let file = File::create(path).with_context(|| format!("creating trace {path}"))?;
        Ok(TraceWriter::new(BufWriter::new(file)))
    }
}

impl<W: Write> TraceWriter<W> {
    pub fn new(writer: W) -> Self {
        TraceWriter { writer, seq: 0 }
    }

    pub fn write(&mut self, algorithm: &str, event: &StepEvent) -> anyhow::Result<()> {
        let line = TraceLine {
            algorithm,
            seq: self.seq,
            event,
        };
        serde_json::to_writer(&mut self.writer, &line)?;
        self.writer.write_all(b"\n")?;
        self.seq += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

//! Line-oriented parser for the topology text format.
//!
//! The format carries four ordered header lines (`type`, `start`, `end`,
//! `prob`) followed by one edge per line. Parsing is strict: every non-blank
//! line must carry exactly what the format expects, and the first offence
//! aborts the load with a typed error naming the line.

use std::{io::BufRead, str::FromStr};

use crate::error::TopologyError;

/// Raw parse output; the caller assembles the [`super::Topology`].
pub(crate) struct ParsedTopology {
    pub(crate) source: usize,
    pub(crate) sink: usize,
    pub(crate) reliability: f64,
    pub(crate) edges: Vec<(usize, usize)>,
}

pub(crate) fn parse_topology(reader: impl BufRead) -> Result<ParsedTopology, TopologyError> {
    let mut lines = ContentLines::new(reader);

    let type_line = lines.next_line()?.ok_or(TopologyError::MissingTypeHeader)?;
    let format = header_value(&type_line.text, "type").ok_or(TopologyError::MissingTypeHeader)?;
    if format != "edges" {
        return Err(TopologyError::UnsupportedFormat {
            format: format.to_owned(),
        });
    }

    let source = expect_field::<usize>(&mut lines, "start")?;
    let sink = expect_field::<usize>(&mut lines, "end")?;
    let reliability = expect_field::<f64>(&mut lines, "prob")?;
    if !(0.0..=1.0).contains(&reliability) {
        return Err(TopologyError::InvalidReliability { value: reliability });
    }

    let mut edges = Vec::new();
    while let Some(line) = lines.next_line()? {
        edges.push(parse_edge_line(&line)?);
    }
    if edges.is_empty() {
        return Err(TopologyError::EmptyTopology);
    }

    Ok(ParsedTopology {
        source,
        sink,
        reliability,
        edges,
    })
}

/// A non-blank line together with its one-based position in the input.
struct ContentLine {
    number: usize,
    text: String,
}

/// Iterates non-blank lines, tracking line numbers and surfacing I/O errors.
struct ContentLines<R> {
    reader: R,
    number: usize,
}

impl<R: BufRead> ContentLines<R> {
    fn new(reader: R) -> Self {
        Self { reader, number: 0 }
    }

    fn next_line(&mut self) -> Result<Option<ContentLine>, TopologyError> {
        let mut buffer = String::new();
        loop {
            buffer.clear();
            let read = self
                .reader
                .read_line(&mut buffer)
                .map_err(|source| TopologyError::Io { source })?;
            if read == 0 {
                return Ok(None);
            }
            self.number += 1;
            let text = buffer.trim();
            if !text.is_empty() {
                return Ok(Some(ContentLine {
                    number: self.number,
                    text: text.to_owned(),
                }));
            }
        }
    }
}

/// Returns the trimmed value of a `key: value` line when the key matches.
fn header_value<'line>(text: &'line str, key: &str) -> Option<&'line str> {
    let (found, value) = text.split_once(':')?;
    (found.trim() == key).then_some(value.trim())
}

fn expect_field<T: FromStr>(
    lines: &mut ContentLines<impl BufRead>,
    field: &'static str,
) -> Result<T, TopologyError> {
    let line = lines
        .next_line()?
        .ok_or(TopologyError::MissingField { field })?;
    let value = header_value(&line.text, field).ok_or(TopologyError::MissingField { field })?;
    value
        .parse()
        .map_err(|_| TopologyError::MalformedHeaderValue {
            field,
            value: value.to_owned(),
        })
}

fn parse_edge_line(line: &ContentLine) -> Result<(usize, usize), TopologyError> {
    let malformed = || TopologyError::MalformedEdgeLine {
        line: line.number,
        content: line.text.clone(),
    };
    let mut tokens = line.text.split_whitespace();
    let first = tokens.next().ok_or_else(malformed)?;
    let second = tokens.next().ok_or_else(malformed)?;
    if tokens.next().is_some() {
        return Err(malformed());
    }
    let first: usize = first.parse().map_err(|_| malformed())?;
    let second: usize = second.parse().map_err(|_| malformed())?;
    if first == second {
        return Err(TopologyError::SelfLoop { node: first });
    }
    Ok((first, second))
}

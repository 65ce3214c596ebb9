//! Want/have negotiation parsing.

use std::collections::HashSet;
use std::io::Read;

use bstr::ByteSlice;
use gitd_hash::ObjectId;

use crate::pktline::{Packet, PktReader};
use crate::ProtocolError;

/// The client's side of an upload negotiation.
#[derive(Debug, Default)]
pub struct Negotiation {
    pub wants: HashSet<ObjectId>,
    pub haves: HashSet<ObjectId>,
    /// Capability tokens from the first want line (other than `agent=`).
    pub caps: Vec<String>,
    /// The client's `agent=` capability, if sent.
    pub agent: Option<String>,
    /// An explicit `done` line was seen.
    pub done: bool,
    /// The stream ended before `done`.
    pub eof: bool,
}

/// Read the negotiation from the request stream.
///
/// Phase one collects `want` lines until a flush, `done`, or EOF; the
/// first want line may carry capabilities after the hash. Phase two runs
/// only when phase one ended on a flush and collects `have` batches —
/// a flush ends a batch and continues, `done` or EOF terminates. Empty
/// and unrecognized lines are ignored throughout.
pub fn negotiate<R: Read>(reader: &mut PktReader<R>) -> Result<Negotiation, ProtocolError> {
    let mut neg = Negotiation::default();
    let mut saw_want_line = false;

    // Phase one: wants.
    let flushed = loop {
        match reader.read_pkt()? {
            Packet::Eof => {
                neg.eof = true;
                break false;
            }
            Packet::Flush => break true,
            Packet::Line(line) => {
                if line.is_empty() {
                    continue;
                }
                if line.as_slice() == b"done" {
                    neg.done = true;
                    break false;
                }
                if let Some(rest) = line.strip_prefix(b"want ") {
                    let mut tokens = rest.split_str(" ").filter(|t| !t.is_empty());
                    let hex = tokens
                        .next()
                        .ok_or_else(|| malformed_want(&line))?;
                    neg.wants.insert(parse_oid(hex).ok_or_else(|| malformed_want(&line))?);

                    // Capabilities ride on the first want line only.
                    if !saw_want_line {
                        for token in tokens {
                            let token = String::from_utf8_lossy(token).into_owned();
                            if let Some(agent) = token.strip_prefix("agent=") {
                                neg.agent = Some(agent.to_string());
                            } else {
                                neg.caps.push(token);
                            }
                        }
                    }
                    saw_want_line = true;
                }
                // Anything else is ignored.
            }
        }
    };

    if !flushed {
        return Ok(neg);
    }

    // Phase two: haves, in flush-separated batches.
    loop {
        match reader.read_pkt()? {
            Packet::Eof => {
                neg.eof = true;
                break;
            }
            Packet::Flush => continue,
            Packet::Line(line) => {
                if line.is_empty() {
                    continue;
                }
                if line.as_slice() == b"done" {
                    neg.done = true;
                    break;
                }
                if let Some(hex) = line.strip_prefix(b"have ") {
                    if let Some(oid) = parse_oid(hex.trim()) {
                        neg.haves.insert(oid);
                    }
                }
            }
        }
    }

    Ok(neg)
}

fn parse_oid(hex: &[u8]) -> Option<ObjectId> {
    std::str::from_utf8(hex)
        .ok()
        .and_then(|s| ObjectId::from_hex(s).ok())
}

fn malformed_want(line: &[u8]) -> ProtocolError {
    ProtocolError::MalformedFrame(format!(
        "bad want line: {}",
        String::from_utf8_lossy(line)
    ))
}

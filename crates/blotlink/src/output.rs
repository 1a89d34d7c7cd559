use std::io::{IsTerminal, Write};
use std::path::Path;

use blotlink_frame::{events, RawFrame};
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
pub struct FrameOutput {
    pub event: String,
    pub known_event: bool,
    pub sequence: u8,
    pub payload_len: usize,
    pub payload: String,
    /// Typed view of well-known payloads, e.g. `x=10 y=20`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoded: Option<String>,
    /// Unstuffed message, present when printing an encoded frame.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    /// Stuffed wire bytes including the delimiter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame: Option<String>,
}

impl FrameOutput {
    pub fn from_raw(frame: &RawFrame) -> Self {
        Self {
            event: frame.event.clone(),
            known_event: events::is_known(&frame.event),
            sequence: frame.sequence,
            payload_len: frame.payload.len(),
            payload: hex::encode(&frame.payload),
            decoded: describe_payload(&frame.event, &frame.payload),
            raw: None,
            frame: None,
        }
    }
}

#[derive(Serialize)]
pub struct DeliveryOutput<'a> {
    pub port: &'a Path,
    pub tty: bool,
    pub frames_written: u64,
    pub bytes_written: u64,
    pub interrupted: bool,
}

pub fn print_frames(frames: &[FrameOutput], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = if frames.len() == 1 {
                serde_json::to_string(&frames[0])
            } else {
                serde_json::to_string(frames)
            };
            println!("{}", out.unwrap_or_else(|_| "{}".to_string()));
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SEQ", "EVENT", "SIZE", "PAYLOAD", "FRAME"]);
            for frame in frames {
                table.add_row(vec![
                    frame.sequence.to_string(),
                    frame.event.clone(),
                    frame.payload_len.to_string(),
                    frame
                        .decoded
                        .clone()
                        .unwrap_or_else(|| frame.payload.clone()),
                    frame.frame.clone().unwrap_or_default(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for frame in frames {
                print!(
                    "seq={} event={} size={} payload={}",
                    frame.sequence, frame.event, frame.payload_len, frame.payload
                );
                if let Some(decoded) = &frame.decoded {
                    print!(" ({decoded})");
                }
                if let Some(wire) = &frame.frame {
                    print!(" frame={wire}");
                }
                println!();
            }
        }
        OutputFormat::Raw => {
            for frame in frames {
                match &frame.frame {
                    Some(wire) => println!("{wire}"),
                    None => println!("{}", frame.payload),
                }
            }
        }
    }
}

pub fn print_delivery(out: &DeliveryOutput<'_>, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PORT", "TTY", "FRAMES", "BYTES"])
                .add_row(vec![
                    out.port.display().to_string(),
                    out.tty.to_string(),
                    out.frames_written.to_string(),
                    out.bytes_written.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            println!(
                "port={} tty={} frames={} bytes={}{}",
                out.port.display(),
                out.tty,
                out.frames_written,
                out.bytes_written,
                if out.interrupted { " (interrupted)" } else { "" }
            );
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn describe_payload(event: &str, payload: &[u8]) -> Option<String> {
    match (event, payload.len()) {
        (events::GO, 8) => {
            let x = f32::from_le_bytes(payload[0..4].try_into().ok()?);
            let y = f32::from_le_bytes(payload[4..8].try_into().ok()?);
            Some(format!("x={x} y={y}"))
        }
        (events::SERVO, 4) => {
            let pulse = i32::from_le_bytes(payload.try_into().ok()?);
            Some(format!("pulse_us={pulse}"))
        }
        _ => None,
    }
}

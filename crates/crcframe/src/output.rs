use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use crcframe_codec::{Decoded, Message, ProtocolFault};
use crcframe_session::SelfCheck;
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
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
struct FaultOutput {
    code: u8,
    name: &'static str,
    detail: String,
}

#[derive(Serialize)]
struct MessageOutput {
    kind: &'static str,
    tag: String,
    payload_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ack: Option<String>,
    faults: Vec<FaultOutput>,
    discarded: usize,
    timestamp: String,
}

impl MessageOutput {
    fn new(decoded: &Decoded) -> Self {
        let message = &decoded.message;
        let kind = message.kind();
        let payload = message.data().map(|data| payload_preview(data));
        let ack = match message {
            Message::Ack(outcome) => Some(outcome.to_string()),
            _ => None,
        };
        Self {
            kind: kind.name(),
            tag: tag_display(kind.tag()),
            payload_size: message.data().map_or(0, |data| data.len()),
            payload,
            ack,
            faults: decoded.faults.iter().map(fault_output).collect(),
            discarded: decoded.discarded,
            timestamp: now_unix_seconds(),
        }
    }
}

fn fault_output(fault: &ProtocolFault) -> FaultOutput {
    let code = fault.error_code();
    FaultOutput {
        code: code.as_byte(),
        name: code.name(),
        detail: fault.to_string(),
    }
}

pub fn print_decoded(decoded: &Decoded, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&MessageOutput::new(decoded)),
        OutputFormat::Table => {
            let out = MessageOutput::new(decoded);
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["KIND", "SIZE", "CONTENT", "FAULTS", "DISCARDED"])
                .add_row(vec![
                    out.kind.to_string(),
                    out.payload_size.to_string(),
                    out.payload.or(out.ack).unwrap_or_default(),
                    fault_summary(&decoded.faults),
                    out.discarded.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "{}: {} faults={} discarded={}",
                decoded.message.kind(),
                decoded.message,
                fault_summary(&decoded.faults),
                decoded.discarded
            );
        }
        OutputFormat::Raw => {
            if let Some(data) = decoded.message.data() {
                print_raw(data);
            }
        }
    }
}

#[derive(Serialize)]
struct CheckOutput<'a> {
    id: u8,
    passed: bool,
    payload: &'a str,
}

pub fn print_checks(checks: &[SelfCheck], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            for check in checks {
                let payload = check.payload();
                print_json(&CheckOutput {
                    id: check.id,
                    passed: check.passed,
                    payload: &payload,
                });
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CHECK", "RESULT"]);
            for check in checks {
                table.add_row(vec![check.id.to_string(), verdict(check.passed).to_string()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for check in checks {
                println!("check {:>2}: {}", check.id, verdict(check.passed));
            }
        }
        OutputFormat::Raw => {
            for check in checks {
                println!("{}", check.payload());
            }
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn verdict(passed: bool) -> &'static str {
    if passed {
        "pass"
    } else {
        "FAIL"
    }
}

fn fault_summary(faults: &[ProtocolFault]) -> String {
    if faults.is_empty() {
        return "-".to_string();
    }
    faults
        .iter()
        .map(|fault| fault.error_code().name())
        .collect::<Vec<_>>()
        .join(",")
}

fn tag_display(tag: u8) -> String {
    if tag.is_ascii_graphic() {
        char::from(tag).to_string()
    } else {
        format!("0x{tag:02X}")
    }
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", payload.len()),
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

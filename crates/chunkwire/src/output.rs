use std::io::{IsTerminal, Write};

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
struct ReplyOutput<'a> {
    descriptor: &'a str,
    size: usize,
    payload: String,
}

pub fn print_reply(payload: &[u8], descriptor: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = ReplyOutput {
                descriptor,
                size: payload.len(),
                payload: payload_preview(payload),
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = new_table(vec!["SIZE", "CONNECTION", "PAYLOAD"]);
            table.add_row(vec![
                payload.len().to_string(),
                descriptor.to_string(),
                payload_preview(payload),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "size={} connection={} payload={}",
                payload.len(),
                descriptor,
                payload_preview(payload)
            );
        }
        OutputFormat::Raw => print_raw(payload),
    }
}

/// Outcome of a health-check probe.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub target: String,
    pub descriptor: String,
    pub verdict: &'static str,
    pub detail: String,
}

pub fn print_probe(report: &ProbeReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(report),
        OutputFormat::Table => {
            let mut table = new_table(vec!["TARGET", "VERDICT", "DETAIL"]);
            table.add_row(vec![
                report.target.clone(),
                report.verdict.to_string(),
                report.detail.clone(),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "target={} verdict={} detail={}",
                report.target, report.verdict, report.detail
            );
        }
        OutputFormat::Raw => println!("{}", report.verdict),
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

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", payload.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_marks_binary_payloads() {
        assert_eq!(payload_preview(b"hello"), "hello");
        assert_eq!(payload_preview(&[0xff, 0xfe, 0x00]), "<binary 3 bytes>");
    }

    #[test]
    fn probe_report_serializes_verdict() {
        let report = ProbeReport {
            target: "127.0.0.1:7000".to_string(),
            descriptor: "Connection(Local: 'tcp:a' Remote: 'tcp:b')".to_string(),
            verdict: "ignored",
            detail: "no reply".to_string(),
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["verdict"], "ignored");
        assert_eq!(value["target"], "127.0.0.1:7000");
    }
}

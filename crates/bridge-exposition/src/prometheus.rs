//! Prometheus text exposition format.
//!
//! Renders sample families into the text format (version 0.0.4) for
//! scraping by a Prometheus server or compatible agent.

use std::collections::HashMap;
use std::fmt::Write;

use bridge_collector::BridgeExporter;
use bridge_core::{Sample, SampleFamily};

use crate::error::ExpositionResult;

/// Content type of [`render`] output.
pub const TEXT_FORMAT: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Render families into Prometheus text format.
///
/// Families sharing a name are written together under one `# HELP` /
/// `# TYPE` header, in order of first appearance. The header takes the
/// first family's help and kind.
pub fn render(families: &[SampleFamily]) -> String {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&SampleFamily>> = HashMap::new();
    for family in families {
        groups
            .entry(family.name())
            .or_insert_with(|| {
                order.push(family.name());
                Vec::new()
            })
            .push(family);
    }

    let mut out = String::new();
    for name in order {
        let group = &groups[name];
        let head = group[0];
        let _ = writeln!(out, "# HELP {name} {}", escape_help(head.help()));
        let _ = writeln!(out, "# TYPE {name} {}", head.kind());
        for family in group {
            for sample in family.samples() {
                write_sample(&mut out, sample);
            }
        }
    }

    out
}

/// Collect from `exporter` and render the result.
pub fn render_exporter(exporter: &BridgeExporter) -> ExpositionResult<String> {
    let families = exporter.collect()?;
    Ok(render(&families))
}

fn write_sample(out: &mut String, sample: &Sample) {
    out.push_str(&sample.name);
    if !sample.label_names.is_empty() {
        out.push('{');
        for (i, (name, value)) in sample.labels().enumerate() {
            if i > 0 {
                out.push(',');
            }
            let _ = write!(out, "{name}=\"{}\"", escape_label_value(value));
        }
        out.push('}');
    }
    out.push(' ');
    out.push_str(&format_value(sample.value));
    out.push('\n');
}

fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}

fn escape_label_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "+Inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

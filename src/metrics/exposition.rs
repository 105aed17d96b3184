//! Prometheus text exposition for one scrape.

use std::fmt::Write;

use super::{descriptor, MetricSink, Sample, DESCRIPTORS};

pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Sink collecting the samples of a single pass.
#[derive(Debug, Default)]
pub struct Exposition {
    samples: Vec<Sample>,
}

impl MetricSink for Exposition {
    fn emit(&mut self, name: &'static str, tags: &[(&'static str, &str)], value: f64) {
        self.samples.emit(name, tags, value);
    }
}

impl Exposition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render all samples, one family at a time.
    ///
    /// Known families come first in descriptor order; samples keep their
    /// emission order inside a family.
    pub fn render(&self) -> String {
        let mut out = String::new();

        for desc in DESCRIPTORS.iter() {
            let mut family = self.samples.iter().filter(|s| s.name == desc.name).peekable();
            if family.peek().is_none() {
                continue;
            }
            let _ = writeln!(out, "# HELP {} {}", desc.exposed_name, desc.help);
            let _ = writeln!(out, "# TYPE {} gauge", desc.exposed_name);
            for sample in family {
                write_sample(&mut out, desc.exposed_name, sample);
            }
        }

        for sample in self.samples.iter().filter(|s| descriptor(s.name).is_none()) {
            write_sample(&mut out, sample.name, sample);
        }

        out
    }
}

fn write_sample(out: &mut String, name: &str, sample: &Sample) {
    out.push_str(name);
    if !sample.labels.is_empty() {
        out.push('{');
        for (i, (key, value)) in sample.labels.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            let _ = write!(out, "{}=\"{}\"", key, escape_label_value(value));
        }
        out.push('}');
    }
    let _ = writeln!(out, " {}", format_value(sample.value));
}

fn escape_label_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "+Inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        value.to_string()
    }
}

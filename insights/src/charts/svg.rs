//! SVG markup for bar and line charts. Layout is a pure function of the inputs
//! and the canvas size, so equal inputs produce byte-identical markup.

use std::fmt::Write;

use crate::config::CanvasSize;
use crate::format::format_bar_value;

const FONT: &str = "Arial, Helvetica, sans-serif";
const COLOR_BAR: &str = "#4c72b0";
const COLOR_GRID: &str = "#d9d9d9";
const COLOR_AXIS: &str = "#333333";
const COLOR_TEXT: &str = "#222222";
const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];
const Y_TICKS: usize = 5;

/// One experiment's line: `(epoch, value)` pairs already in epoch order.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub name: String,
    pub points: Vec<(i64, f64)>,
}

struct Frame {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl Frame {
    fn new(size: CanvasSize, left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            width: (size.width as f64 - left - right).max(1.0),
            height: (size.height as f64 - top - bottom).max(1.0),
        }
    }

    fn bottom(&self) -> f64 {
        self.top + self.height
    }

    fn right(&self) -> f64 {
        self.left + self.width
    }
}

#[derive(Clone, Copy)]
struct Range {
    min: f64,
    max: f64,
}

impl Range {
    fn span(self) -> f64 {
        self.max - self.min
    }

    /// Maps `value` into `[from, from + length]`, growing upward when `invert`.
    fn project(self, value: f64, from: f64, length: f64, invert: bool) -> f64 {
        let t = (value - self.min) / self.span();
        if invert {
            from + length - t * length
        } else {
            from + t * length
        }
    }
}

pub fn bar_chart(
    title: &str,
    y_label: &str,
    names: &[String],
    values: &[f64],
    size: CanvasSize,
) -> String {
    let frame = Frame::new(size, 64.0, 40.0, 20.0, 110.0);
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let low = finite.iter().copied().fold(0.0, f64::min);
    let high = finite.iter().copied().fold(0.0, f64::max);
    let range = padded(low, high, 0.1);

    let mut svg = open(size);
    write_title(&mut svg, size, title);
    write_y_axis(&mut svg, &frame, range, y_label);

    let slots = values.len().max(1) as f64;
    let slot = frame.width / slots;
    let bar_width = slot * 0.6;
    let zero_y = range.project(0.0, frame.top, frame.height, true);

    for (idx, (name, value)) in names.iter().zip(values).enumerate() {
        let cx = frame.left + slot * (idx as f64 + 0.5);
        if value.is_finite() {
            let y = range.project(*value, frame.top, frame.height, true);
            let (top, height) = if y <= zero_y { (y, zero_y - y) } else { (zero_y, y - zero_y) };
            let _ = write!(
                svg,
                r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{COLOR_BAR}"/>"#,
                cx - bar_width / 2.0,
                top,
                bar_width,
                height
            );
            let _ = write!(
                svg,
                r#"<text x="{cx:.2}" y="{:.2}" text-anchor="middle" font-family="{FONT}" font-size="10" fill="{COLOR_TEXT}">{}</text>"#,
                top - 4.0,
                format_bar_value(*value)
            );
        }

        let label_y = frame.bottom() + 14.0;
        let _ = write!(
            svg,
            r#"<text x="{cx:.2}" y="{label_y:.2}" text-anchor="end" font-family="{FONT}" font-size="11" fill="{COLOR_TEXT}" transform="rotate(-45 {cx:.2} {label_y:.2})">{}</text>"#,
            escape_xml(name)
        );
    }

    write_axes(&mut svg, &frame);
    close(svg)
}

pub fn line_chart(
    title: &str,
    x_label: &str,
    y_label: &str,
    series: &[LineSeries],
    size: CanvasSize,
) -> String {
    let frame = Frame::new(size, 70.0, 40.0, 170.0, 60.0);

    let finite_points = || {
        series
            .iter()
            .flat_map(|s| s.points.iter())
            .filter(|(_, y)| y.is_finite())
    };
    let x_min = finite_points().map(|(x, _)| *x).min().unwrap_or(0);
    let x_max = finite_points().map(|(x, _)| *x).max().unwrap_or(1);
    let y_low = finite_points().map(|(_, y)| *y).fold(f64::INFINITY, f64::min);
    let y_high = finite_points().map(|(_, y)| *y).fold(f64::NEG_INFINITY, f64::max);

    let x_range = if x_min == x_max {
        Range {
            min: x_min as f64 - 1.0,
            max: x_max as f64 + 1.0,
        }
    } else {
        Range {
            min: x_min as f64,
            max: x_max as f64,
        }
    };
    let y_range = if y_low.is_finite() {
        padded(y_low, y_high, 0.05)
    } else {
        Range { min: 0.0, max: 1.0 }
    };

    let mut svg = open(size);
    write_title(&mut svg, size, title);
    write_y_axis(&mut svg, &frame, y_range, y_label);

    for epoch in epoch_ticks(x_range) {
        let x = x_range.project(epoch as f64, frame.left, frame.width, false);
        let _ = write!(
            svg,
            r#"<line x1="{x:.2}" y1="{:.2}" x2="{x:.2}" y2="{:.2}" stroke="{COLOR_GRID}" stroke-width="1"/>"#,
            frame.top,
            frame.bottom()
        );
        let _ = write!(
            svg,
            r#"<text x="{x:.2}" y="{:.2}" text-anchor="middle" font-family="{FONT}" font-size="11" fill="{COLOR_TEXT}">{epoch}</text>"#,
            frame.bottom() + 16.0
        );
    }
    let _ = write!(
        svg,
        r#"<text x="{:.2}" y="{:.2}" text-anchor="middle" font-family="{FONT}" font-size="13" fill="{COLOR_TEXT}">{}</text>"#,
        frame.left + frame.width / 2.0,
        frame.bottom() + 40.0,
        escape_xml(x_label)
    );

    write_axes(&mut svg, &frame);

    for (idx, line) in series.iter().enumerate() {
        let color = PALETTE[idx % PALETTE.len()];
        let mut path = String::new();
        let mut pen_down = false;
        for (epoch, value) in &line.points {
            if !value.is_finite() {
                pen_down = false;
                continue;
            }
            let x = x_range.project(*epoch as f64, frame.left, frame.width, false);
            let y = y_range.project(*value, frame.top, frame.height, true);
            let _ = write!(path, "{}{x:.2} {y:.2} ", if pen_down { "L" } else { "M" });
            pen_down = true;
        }
        if !path.is_empty() {
            let _ = write!(
                svg,
                r#"<path d="{}" fill="none" stroke="{color}" stroke-width="2"/>"#,
                path.trim_end()
            );
        }
        for (epoch, value) in line.points.iter().filter(|(_, y)| y.is_finite()) {
            let _ = write!(
                svg,
                r#"<circle cx="{:.2}" cy="{:.2}" r="3.5" fill="{color}"/>"#,
                x_range.project(*epoch as f64, frame.left, frame.width, false),
                y_range.project(*value, frame.top, frame.height, true)
            );
        }
    }

    write_legend(&mut svg, &frame, series);
    close(svg)
}

fn open(size: CanvasSize) -> String {
    let mut svg = String::with_capacity(8 * 1024);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = size.width,
        h = size.height
    );
    let _ = write!(
        svg,
        r##"<rect width="{}" height="{}" fill="#ffffff"/>"##,
        size.width,
        size.height
    );
    svg
}

fn close(mut svg: String) -> String {
    svg.push_str("</svg>");
    svg
}

fn write_title(svg: &mut String, size: CanvasSize, title: &str) {
    let _ = write!(
        svg,
        r#"<text x="{:.2}" y="26" text-anchor="middle" font-family="{FONT}" font-size="16" font-weight="bold" fill="{COLOR_TEXT}">{}</text>"#,
        size.width as f64 / 2.0,
        escape_xml(title)
    );
}

fn write_y_axis(svg: &mut String, frame: &Frame, range: Range, label: &str) {
    for i in 0..=Y_TICKS {
        let value = range.min + range.span() * i as f64 / Y_TICKS as f64;
        let y = range.project(value, frame.top, frame.height, true);
        let _ = write!(
            svg,
            r#"<line x1="{:.2}" y1="{y:.2}" x2="{:.2}" y2="{y:.2}" stroke="{COLOR_GRID}" stroke-width="1"/>"#,
            frame.left,
            frame.right()
        );
        let _ = write!(
            svg,
            r#"<text x="{:.2}" y="{:.2}" text-anchor="end" font-family="{FONT}" font-size="11" fill="{COLOR_TEXT}">{value:.2}</text>"#,
            frame.left - 8.0,
            y + 4.0
        );
    }
    let cy = frame.top + frame.height / 2.0;
    let _ = write!(
        svg,
        r#"<text x="18" y="{cy:.2}" text-anchor="middle" font-family="{FONT}" font-size="13" fill="{COLOR_TEXT}" transform="rotate(-90 18 {cy:.2})">{}</text>"#,
        escape_xml(label)
    );
}

fn write_axes(svg: &mut String, frame: &Frame) {
    let _ = write!(
        svg,
        r#"<line x1="{l:.2}" y1="{b:.2}" x2="{r:.2}" y2="{b:.2}" stroke="{COLOR_AXIS}" stroke-width="1.5"/><line x1="{l:.2}" y1="{t:.2}" x2="{l:.2}" y2="{b:.2}" stroke="{COLOR_AXIS}" stroke-width="1.5"/>"#,
        l = frame.left,
        r = frame.right(),
        t = frame.top,
        b = frame.bottom()
    );
}

fn write_legend(svg: &mut String, frame: &Frame, series: &[LineSeries]) {
    if series.is_empty() {
        return;
    }
    let x = frame.right() + 16.0;
    let height = 12.0 + 20.0 * series.len() as f64;
    let _ = write!(
        svg,
        r##"<rect x="{:.2}" y="{:.2}" width="146" height="{height:.2}" fill="#ffffff" stroke="{COLOR_GRID}"/>"##,
        x - 6.0,
        frame.top
    );
    for (idx, line) in series.iter().enumerate() {
        let color = PALETTE[idx % PALETTE.len()];
        let y = frame.top + 16.0 + 20.0 * idx as f64;
        let _ = write!(
            svg,
            r#"<line x1="{x:.2}" y1="{y:.2}" x2="{:.2}" y2="{y:.2}" stroke="{color}" stroke-width="2"/><circle cx="{:.2}" cy="{y:.2}" r="3.5" fill="{color}"/>"#,
            x + 22.0,
            x + 11.0
        );
        let _ = write!(
            svg,
            r#"<text x="{:.2}" y="{:.2}" font-family="{FONT}" font-size="11" fill="{COLOR_TEXT}">{}</text>"#,
            x + 28.0,
            y + 4.0,
            escape_xml(&truncate(&line.name, 18))
        );
    }
}

/// At most seven integer epoch ticks, evenly stepped.
fn epoch_ticks(range: Range) -> Vec<i64> {
    let first = range.min.ceil() as i64;
    let last = range.max.floor() as i64;
    if last < first {
        return Vec::new();
    }
    let step = (last.abs_diff(first) / 6).max(1);
    (first..=last)
        .step_by(usize::try_from(step).unwrap_or(usize::MAX))
        .collect()
}

fn padded(low: f64, high: f64, fraction: f64) -> Range {
    if high > low {
        let pad = (high - low) * fraction;
        let min = if low == 0.0 { 0.0 } else { low - pad };
        Range { min, max: high + pad }
    } else {
        let pad = if low == 0.0 { 1.0 } else { low.abs() * 0.5 };
        Range { min: low - pad, max: high + pad }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut short: String = text.chars().take(max_chars - 1).collect();
        short.push('…');
        short
    }
}

pub(crate) fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

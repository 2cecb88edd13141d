//! Unit conversion skill.
//!
//! Linear tables for length, mass, volume, time, and data (SI and IEC),
//! plus the affine temperature cases. The grammar is `N <unit> to <unit>`
//! with an optional "convert" lead; anything that misses every table is
//! "not mine".

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use super::Skill;

// Base units: meter, kilogram, liter, second, byte.
const LEN: &[(&str, f64)] = &[
    ("m", 1.0),
    ("meter", 1.0),
    ("meters", 1.0),
    ("km", 1000.0),
    ("kilometer", 1000.0),
    ("kilometers", 1000.0),
    ("cm", 0.01),
    ("centimeter", 0.01),
    ("centimeters", 0.01),
    ("mm", 0.001),
    ("millimeter", 0.001),
    ("millimeters", 0.001),
    ("mi", 1609.344),
    ("mile", 1609.344),
    ("miles", 1609.344),
    ("yd", 0.9144),
    ("yard", 0.9144),
    ("yards", 0.9144),
    ("ft", 0.3048),
    ("foot", 0.3048),
    ("feet", 0.3048),
    ("in", 0.0254),
    ("inch", 0.0254),
    ("inches", 0.0254),
];

const MASS: &[(&str, f64)] = &[
    ("kg", 1.0),
    ("kilogram", 1.0),
    ("kilograms", 1.0),
    ("g", 1e-3),
    ("gram", 1e-3),
    ("grams", 1e-3),
    ("lb", 0.453_592_37),
    ("lbs", 0.453_592_37),
    ("pound", 0.453_592_37),
    ("pounds", 0.453_592_37),
    ("oz", 0.028_349_523_125),
    ("ounce", 0.028_349_523_125),
    ("ounces", 0.028_349_523_125),
];

const VOL: &[(&str, f64)] = &[
    ("l", 1.0),
    ("liter", 1.0),
    ("liters", 1.0),
    ("ml", 1e-3),
    ("milliliter", 1e-3),
    ("milliliters", 1e-3),
    ("gal", 3.785_411_784),
    ("gallon", 3.785_411_784),
    ("gallons", 3.785_411_784),
    ("cup", 0.236_588_236_5),
    ("cups", 0.236_588_236_5),
    ("floz", 0.029_573_529_562_5),
    ("fluidounce", 0.029_573_529_562_5),
    ("fluidounces", 0.029_573_529_562_5),
];

const TIME: &[(&str, f64)] = &[
    ("s", 1.0),
    ("sec", 1.0),
    ("secs", 1.0),
    ("second", 1.0),
    ("seconds", 1.0),
    ("min", 60.0),
    ("mins", 60.0),
    ("minute", 60.0),
    ("minutes", 60.0),
    ("h", 3600.0),
    ("hr", 3600.0),
    ("hrs", 3600.0),
    ("hour", 3600.0),
    ("hours", 3600.0),
    ("day", 86400.0),
    ("days", 86400.0),
];

const DATA: &[(&str, f64)] = &[
    ("b", 1.0),
    ("byte", 1.0),
    ("bytes", 1.0),
    ("kb", 1e3),
    ("kilobyte", 1e3),
    ("kilobytes", 1e3),
    ("mb", 1e6),
    ("megabyte", 1e6),
    ("megabytes", 1e6),
    ("gb", 1e9),
    ("gigabyte", 1e9),
    ("gigabytes", 1e9),
    ("tb", 1e12),
    ("terabyte", 1e12),
    ("terabytes", 1e12),
    ("kib", 1024.0),
    ("kibibyte", 1024.0),
    ("kibibytes", 1024.0),
    ("mib", 1_048_576.0),
    ("mebibyte", 1_048_576.0),
    ("mebibytes", 1_048_576.0),
    ("gib", 1_073_741_824.0),
    ("gibibyte", 1_073_741_824.0),
    ("gibibytes", 1_073_741_824.0),
    ("tib", 1_099_511_627_776.0),
    ("tebibyte", 1_099_511_627_776.0),
    ("tebibytes", 1_099_511_627_776.0),
];

const TABLES: &[&[(&str, f64)]] = &[LEN, MASS, VOL, TIME, DATA];

static GENERIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:convert\s+)?(-?\d+(?:\.\d+)?)\s*([°a-zA-Z ]+?)\s*(?:to|in|->|→)\s*([°a-zA-Z ]+)\s*$")
        .unwrap()
});

static TEMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(-?\d+(?:\.\d+)?)\s*°?\s*([cfk]|celsius|fahrenheit|kelvin)\s*(?:to|in|->|→)\s*°?\s*([cfk]|celsius|fahrenheit|kelvin)\s*$",
    )
    .unwrap()
});

fn norm_unit(token: &str) -> String {
    token.trim().to_lowercase().split_whitespace().collect()
}

/// Map a temperature token to C/F/K, or `None`.
fn temp_scale(token: &str) -> Option<char> {
    match norm_unit(token).trim_start_matches('°') {
        "c" | "celsius" | "centigrade" => Some('C'),
        "f" | "fahrenheit" => Some('F'),
        "k" | "kelvin" => Some('K'),
        _ => None,
    }
}

fn table_factor(table: &[(&str, f64)], unit: &str) -> Option<f64> {
    table.iter().find(|(name, _)| *name == unit).map(|(_, f)| *f)
}

fn convert_linear(value: f64, src: &str, dst: &str, table: &[(&str, f64)]) -> Option<f64> {
    let s = table_factor(table, &norm_unit(src))?;
    let d = table_factor(table, &norm_unit(dst))?;
    Some(value * s / d)
}

fn convert_temp(value: f64, src: char, dst: char) -> f64 {
    let kelvin = match src {
        'C' => value + 273.15,
        'F' => (value - 32.0) * 5.0 / 9.0 + 273.15,
        _ => value,
    };
    match dst {
        'C' => kelvin - 273.15,
        'F' => (kelvin - 273.15) * 9.0 / 5.0 + 32.0,
        _ => kelvin,
    }
}

/// Round for display: more decimals the smaller the magnitude, trailing
/// zeros trimmed.
fn round_sig(x: f64) -> String {
    if x == 0.0 {
        return "0".to_string();
    }
    let decimals = match x.abs() {
        ax if ax >= 100.0 => 0,
        ax if ax >= 10.0 => 1,
        ax if ax >= 1.0 => 2,
        _ => 3,
    };
    // f64::round breaks ties away from zero, unlike {:.0} formatting.
    let scale = 10f64.powi(decimals);
    let rounded = (x * scale).round() / scale;
    let s = format!("{:.*}", decimals as usize, rounded);
    if s.contains('.') { s.trim_end_matches('0').trim_end_matches('.').to_string() } else { s }
}

fn display_unit(token: &str) -> String {
    match temp_scale(token) {
        Some('C') => "°C".to_string(),
        Some('F') => "°F".to_string(),
        Some('K') => "K".to_string(),
        _ => norm_unit(token),
    }
}

fn format_line(value: f64, src: &str, out: f64, dst: &str) -> String {
    format!("- {} {} ≈ {} {}", round_sig(value), display_unit(src), round_sig(out), display_unit(dst))
}

fn try_convert(query: &str) -> Option<String> {
    if let Some(caps) = TEMP_RE.captures(query) {
        let value: f64 = caps[1].parse().ok()?;
        let src = &caps[2];
        let dst = &caps[3];
        let out = convert_temp(value, temp_scale(src)?, temp_scale(dst)?);
        return Some(format_line(value, src, out, dst));
    }

    let caps = GENERIC_RE.captures(query)?;
    let value: f64 = caps[1].parse().ok()?;
    let src = &caps[2];
    let dst = &caps[3];

    for table in TABLES {
        if let Some(out) = convert_linear(value, src, dst, table) {
            return Some(format_line(value, src, out, dst));
        }
    }

    // Temperature tokens that slipped past TEMP_RE (odd spacing, "convert").
    if let (Some(s), Some(d)) = (temp_scale(src), temp_scale(dst)) {
        return Some(format_line(value, src, convert_temp(value, s, d), dst));
    }

    None
}

pub struct UnitsSkill;

#[async_trait]
impl Skill for UnitsSkill {
    fn name(&self) -> &'static str {
        "units"
    }

    async fn try_handle(&self, query: &str) -> Option<String> {
        try_convert(query)
    }
}

//! Frequency formatting, parsing and band lookup

use crate::error::{Result, SpectrumError};

/// Well-known allocations as (name, low Hz, high Hz), first match wins
pub const KNOWN_FREQUENCY_BANDS: [(&str, f64, f64); 10] = [
    ("FM Radio", 88e6, 108e6),
    ("LTE 700", 699e6, 760e6),
    ("GSM 850", 869e6, 894e6),
    ("GPS L1", 1575e6, 1576e6),
    ("GSM 1800", 1710e6, 1880e6),
    ("GSM 1900", 1930e6, 1990e6),
    ("AWS (LTE 1700/2100)", 1710e6, 2155e6),
    ("Wi-Fi 2.4 GHz", 2400e6, 2500e6),
    ("Bluetooth", 2400e6, 2483.5e6),
    ("Wi-Fi 5 GHz", 5150e6, 5850e6),
];

/// Format a frequency with a GHz/MHz/kHz/Hz unit
pub fn format_frequency(freq_hz: f64) -> String {
    let magnitude = freq_hz.abs();
    if magnitude >= 1e9 {
        format!("{:.3} GHz", freq_hz / 1e9)
    } else if magnitude >= 1e6 {
        format!("{:.3} MHz", freq_hz / 1e6)
    } else if magnitude >= 1e3 {
        format!("{:.3} kHz", freq_hz / 1e3)
    } else {
        format!("{:.1} Hz", freq_hz)
    }
}

/// Parse strings like "2.4 GHz", "100 M", "433.92MHz" or "1500" into Hz
pub fn parse_frequency(text: &str) -> Result<f64> {
    let invalid = || SpectrumError::invalid("frequency", text, "a number with an optional Hz/kHz/MHz/GHz unit");

    let upper = text.trim().to_ascii_uppercase();
    let split = upper
        .find(|c: char| c.is_ascii_alphabetic() && c != 'E')
        .unwrap_or(upper.len());
    let (number, unit) = upper.split_at(split);

    let value: f64 = number.trim().parse().map_err(|_| invalid())?;
    let scale = match unit.trim() {
        "" | "HZ" => 1.0,
        "K" | "KHZ" => 1e3,
        "M" | "MHZ" => 1e6,
        "G" | "GHZ" => 1e9,
        _ => return Err(invalid()),
    };

    let hz = value * scale;
    if !hz.is_finite() {
        return Err(invalid());
    }
    Ok(hz)
}

/// Name of the first known band containing `freq_hz`
pub fn known_band(freq_hz: f64) -> Option<&'static str> {
    KNOWN_FREQUENCY_BANDS
        .iter()
        .find(|(_, low, high)| (*low..=*high).contains(&freq_hz))
        .map(|(name, _, _)| *name)
}

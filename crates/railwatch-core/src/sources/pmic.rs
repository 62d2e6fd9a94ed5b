//! PmicAdcSource — adapts `vcgencmd pmic_read_adc` into per-rail watt
//! readings.
//!
//! The Raspberry Pi 5 PMIC reports one current and one voltage line per
//! rail:
//!
//! ```text
//!  VDD_CORE_A current(7)=2.48101000A
//!  VDD_CORE_V volt(15)=0.85108770V
//! ```
//!
//! Power per rail is current times voltage. A rail is only reported when
//! both lines are present; the PMIC exposes a few voltage-only channels
//! (EXT5V, BATT) that carry no current shunt and therefore no power figure.

use std::collections::HashMap;
use std::time::Duration;

use crate::error::SourceError;
use crate::reading::Reading;
use crate::source::PowerSource;

use super::helpers::{command_exists, run_command_timeout};

const VCGENCMD: &str = "vcgencmd";
const PMIC_READ_ADC: &[&str] = &["pmic_read_adc"];

/// Upper bound on one firmware query. A hung `vcgencmd` costs at most this
/// much of a tick and the affected rails come back unavailable.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(500);

/// Power source backed by the Pi firmware's PMIC ADC.
pub struct PmicAdcSource {
    timeout: Duration,
}

impl PmicAdcSource {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// One firmware query, parsed.
    fn query(&self) -> Result<PmicReport, SourceError> {
        let output = run_command_timeout(VCGENCMD, PMIC_READ_ADC, self.timeout)?;
        parse_pmic_output(&output)
    }
}

impl Default for PmicAdcSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerSource for PmicAdcSource {
    fn name(&self) -> &'static str {
        "pmic_adc"
    }

    fn is_available(&self) -> bool {
        command_exists(VCGENCMD)
    }

    fn detect_rails(&self) -> Result<Vec<String>, SourceError> {
        let report = self.query()?;
        Ok(report.rails.into_iter().map(|(rail, _)| rail).collect())
    }

    fn read(&self, rail: &str) -> Result<Reading, SourceError> {
        let report = self.query()?;
        report
            .watts(rail)
            .map(|w| Reading::new(rail, w))
            .ok_or_else(|| SourceError::Unavailable(format!("rail {rail} not reported by pmic")))
    }

    /// One `vcgencmd` invocation covers every rail, so a tick costs a single
    /// subprocess no matter how many rails are tracked.
    fn read_many(&self, rails: &[String]) -> Vec<(String, Result<Reading, SourceError>)> {
        match self.query() {
            Ok(report) => rails
                .iter()
                .map(|rail| {
                    let result = report.watts(rail).map(|w| Reading::new(rail.clone(), w)).ok_or_else(
                        || SourceError::Unavailable(format!("rail {rail} not reported by pmic")),
                    );
                    (rail.clone(), result)
                })
                .collect(),
            Err(e) => rails.iter().map(|rail| (rail.clone(), Err(e.clone()))).collect(),
        }
    }
}

/// Parsed per-rail powers, in the order the firmware reported them.
#[derive(Debug)]
struct PmicReport {
    rails: Vec<(String, f64)>,
}

impl PmicReport {
    fn watts(&self, rail: &str) -> Option<f64> {
        self.rails
            .iter()
            .find(|(name, _)| name == rail)
            .map(|(_, w)| *w)
    }
}

/// Parse the full `pmic_read_adc` output into per-rail watts.
///
/// Tokenizing on whitespace absorbs the firmware's variable padding. Label
/// tokens end in `_A`/`_V`, value tokens look like `current(7)=2.48101000A`
/// or `volt(15)=0.85108770V`.
fn parse_pmic_output(output: &str) -> Result<PmicReport, SourceError> {
    let mut currents: Vec<(String, f64)> = Vec::new();
    let mut volts: HashMap<String, f64> = HashMap::new();

    let tokens: Vec<&str> = output.split_whitespace().collect();
    for pair in tokens.windows(2) {
        let (label, entry) = (pair[0], pair[1]);
        if let Some(rail) = label.strip_suffix("_A")
            && entry.starts_with("current(")
        {
            currents.push((rail.to_string(), parse_entry(entry, 'A')?));
        } else if let Some(rail) = label.strip_suffix("_V")
            && entry.starts_with("volt(")
        {
            volts.insert(rail.to_string(), parse_entry(entry, 'V')?);
        }
    }

    let rails: Vec<(String, f64)> = currents
        .into_iter()
        .filter_map(|(rail, amps)| volts.get(&rail).map(|v| (rail, amps * v)))
        .collect();

    if rails.is_empty() {
        return Err(SourceError::Parse(
            "no rail current/voltage pairs in pmic output".into(),
        ));
    }

    Ok(PmicReport { rails })
}

/// Pull the numeric value out of `current(7)=2.48101000A` (or the volt
/// equivalent), checking the unit suffix.
fn parse_entry(entry: &str, unit: char) -> Result<f64, SourceError> {
    let value = entry
        .split_once('=')
        .map(|(_, v)| v)
        .and_then(|v| v.strip_suffix(unit))
        .ok_or_else(|| SourceError::Parse(format!("unexpected pmic entry '{entry}'")))?;

    value
        .parse::<f64>()
        .map_err(|_| SourceError::Parse(format!("bad numeric value in '{entry}'")))
}

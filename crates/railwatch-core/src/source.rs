//! Abstract power telemetry source.
//!
//! A source adapts a platform capability (a firmware command, a sysfs node,
//! a test script) into labeled watt readings. The monitor only ever
//! talks to this trait; everything platform-specific lives in
//! [`crate::sources`].

use crate::error::SourceError;
use crate::reading::Reading;

/// Trait every power telemetry source implements.
pub trait PowerSource: Send {
    /// Short identifier for logs and the scan listing.
    fn name(&self) -> &'static str;

    /// Whether the underlying capability exists on this machine.
    fn is_available(&self) -> bool;

    /// Discover the rail labels this source can report right now.
    fn detect_rails(&self) -> Result<Vec<String>, SourceError>;

    /// Read one rail. A failure affects only this rail for this tick; the
    /// caller substitutes a missing value and keeps going.
    fn read(&self, rail: &str) -> Result<Reading, SourceError>;

    /// Read a set of rails for one tick.
    ///
    /// The default issues one [`read`](Self::read) per rail. Sources whose
    /// capability reports every rail in a single query override this to ask
    /// the hardware once per tick.
    fn read_many(&self, rails: &[String]) -> Vec<(String, Result<Reading, SourceError>)> {
        rails
            .iter()
            .map(|rail| (rail.clone(), self.read(rail)))
            .collect()
    }
}

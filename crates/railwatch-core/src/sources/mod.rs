//! Power telemetry source implementations.

pub mod helpers;
pub mod mock;
pub mod pmic;

pub use mock::MockPowerSource;
pub use pmic::PmicAdcSource;

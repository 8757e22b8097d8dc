//! Driver catalogue for the PWM bus.
//!
//! The rig owns exactly one driver. [`DriverRegistry`] maps driver names to
//! factories, picks the one a run asks for (simulation flag, CLI override or
//! the configured `[pwm] driver`) and builds it.

use pumpkin_common::pwm::driver::{DriverError, DriverFactory, PwmDriver};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Name of the recording driver used when no hardware is wanted.
pub const SIMULATION_DRIVER: &str = "simulation";

/// One entry of the driver catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverInfo {
    /// Registered name
    pub name: &'static str,
    /// Version reported by the driver itself
    pub version: &'static str,
}

/// Named driver factories.
pub struct DriverRegistry {
    factories: BTreeMap<&'static str, DriverFactory>,
}

impl DriverRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Every driver this build can run: simulation always, PCA9685 on Linux.
    ///
    /// # Errors
    /// `DuplicateDriver` if two built-in drivers share a name.
    pub fn builtin() -> Result<Self, DriverError> {
        let mut registry = Self::new();
        crate::drivers::register_all_drivers(&mut registry)?;
        Ok(registry)
    }

    /// Add a driver under `name`.
    ///
    /// # Errors
    /// `DuplicateDriver` if the name is taken; the first factory stays.
    pub fn register(
        &mut self,
        name: &'static str,
        factory: DriverFactory,
    ) -> Result<(), DriverError> {
        if self.factories.contains_key(name) {
            return Err(DriverError::DuplicateDriver(name.to_string()));
        }
        debug!("Registered PWM driver '{name}'");
        self.factories.insert(name, factory);
        Ok(())
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Build the driver called `name`.
    ///
    /// # Errors
    /// `DriverNotFound` for an unknown name.
    pub fn create_driver(&self, name: &str) -> Result<Box<dyn PwmDriver>, DriverError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| DriverError::DriverNotFound(name.to_string()))?;
        Ok(factory())
    }

    /// Choose and build the driver for a run.
    ///
    /// `simulate` wins over `requested`, which wins over `configured`.
    pub fn select(
        &self,
        simulate: bool,
        requested: Option<&str>,
        configured: &str,
    ) -> Result<Box<dyn PwmDriver>, DriverError> {
        let name = match (simulate, requested) {
            (true, _) => {
                info!("Simulation mode enabled");
                SIMULATION_DRIVER
            }
            (false, Some(name)) => {
                info!("Driver from CLI: {name}");
                name
            }
            (false, None) => configured,
        };
        self.create_driver(name)
    }

    /// Catalogue sorted by name, each entry asking its driver for a version.
    ///
    /// Factories only construct; no hardware is opened.
    pub fn list_drivers(&self) -> Vec<DriverInfo> {
        self.factories
            .iter()
            .map(|(&name, factory)| DriverInfo {
                name,
                version: factory().version(),
            })
            .collect()
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pumpkin_common::pwm::config::PwmConfig;

    /// Accepts everything; reports itself as "bench".
    struct BenchDriver;

    impl PwmDriver for BenchDriver {
        fn name(&self) -> &'static str {
            "bench"
        }

        fn version(&self) -> &'static str {
            "2.0.0"
        }

        fn init(&mut self, _config: &PwmConfig) -> Result<(), DriverError> {
            Ok(())
        }

        fn set_frequency(&mut self, _hz: u32) -> Result<(), DriverError> {
            Ok(())
        }

        fn set_pulse(&mut self, _channel: u8, _on: u16, _off: u16) -> Result<(), DriverError> {
            Ok(())
        }
    }

    fn bench() -> Box<dyn PwmDriver> {
        Box::new(BenchDriver)
    }

    #[test]
    fn registered_driver_is_built_by_name() {
        let mut reg = DriverRegistry::new();
        reg.register("bench", bench).unwrap();
        assert!(reg.contains("bench"));
        assert_eq!(reg.create_driver("bench").unwrap().name(), "bench");
    }

    #[test]
    fn unknown_driver_is_not_found() {
        let reg = DriverRegistry::new();
        assert!(matches!(
            reg.create_driver("servo_hat"),
            Err(DriverError::DriverNotFound(name)) if name == "servo_hat"
        ));
    }

    #[test]
    fn duplicate_name_is_an_error_and_keeps_the_first() {
        let mut reg = DriverRegistry::builtin().unwrap();
        assert_eq!(
            reg.register(SIMULATION_DRIVER, bench),
            Err(DriverError::DuplicateDriver("simulation".to_string()))
        );
        let driver = reg.create_driver(SIMULATION_DRIVER).unwrap();
        assert_eq!(driver.name(), "simulation");
    }

    #[test]
    fn catalogue_is_sorted_with_versions() {
        let mut reg = DriverRegistry::new();
        reg.register("zeta", bench).unwrap();
        reg.register("alpha", bench).unwrap();
        let names: Vec<_> = reg.list_drivers().iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert!(reg.list_drivers().iter().all(|d| d.version == "2.0.0"));
    }

    #[test]
    fn builtin_catalogue_matches_platform() {
        let reg = DriverRegistry::builtin().unwrap();
        let names: Vec<_> = reg.list_drivers().iter().map(|d| d.name).collect();
        assert!(names.contains(&SIMULATION_DRIVER));
        assert_eq!(names.contains(&"pca9685"), cfg!(target_os = "linux"));
    }

    #[test]
    fn simulate_flag_overrides_cli_and_config() {
        let mut reg = DriverRegistry::builtin().unwrap();
        reg.register("bench", bench).unwrap();

        let driver = reg.select(true, Some("bench"), "pca9685").unwrap();
        assert_eq!(driver.name(), "simulation");

        let driver = reg.select(false, Some("bench"), "simulation").unwrap();
        assert_eq!(driver.name(), "bench");

        let driver = reg.select(false, None, "bench").unwrap();
        assert_eq!(driver.name(), "bench");

        assert!(matches!(
            reg.select(false, None, "servo_hat"),
            Err(DriverError::DriverNotFound(_))
        ));
    }
}

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use robot_xml_loader::{Config, ResourceConfig, RobotLoader, Specification};
use tempfile::TempDir;

/// Specification used by most integration tests
pub const ROBOT_SPECIFICATION: &str = r#"<?xml version="1.0"?>
<specifications>
  <robot>
    <footprint required="true">
      <radius/>
      <points><point><x required="true"/><y required="true"/></point></points>
    </footprint>
    <sensor><frequency/><range/><pose><x/><y/><theta/></pose></sensor>
    <kinematic><model/></kinematic>
    <parameter/>
  </robot>
</specifications>"#;

pub const SENSOR_NOT_MERGABLE: &str =
    "<multiple_allowed><tag>sensor</tag><tag>point</tag></multiple_allowed>";

/// Bundled resources shipped with the crate
pub fn bundled_resources() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("resources")
}

/// A throwaway resource directory holding the two specification files and any
/// robot or include files a test writes into it
pub struct ResourceFixture {
    pub dir: TempDir,
}

impl ResourceFixture {
    pub fn new(specification: &str, multiple_allowed: &str) -> Self {
        let fixture = Self {
            dir: TempDir::new().unwrap(),
        };
        fixture.write("specifications/specifications.xml", specification);
        fixture.write("specifications/multiple_allowed.xml", multiple_allowed);
        fixture
    }

    /// Fixture with [`ROBOT_SPECIFICATION`] and `sensor` marked non-mergable
    pub fn robot() -> Self {
        Self::new(ROBOT_SPECIFICATION, SENSOR_NOT_MERGABLE)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the resource root, creating parent directories
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.resources = ResourceConfig::with_base_path(self.path());
        config.processing.threads = Some(2);
        config
    }

    pub fn specification(&self) -> Arc<Specification> {
        Specification::load(&self.config().resources).unwrap()
    }

    pub fn loader(&self) -> RobotLoader {
        RobotLoader::from_config(&self.config()).unwrap()
    }
}

use serde_json::Value;
use std::{
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
};

/// Where the collections served in collections mode come from.
pub trait FixtureSource: Debug {
    fn load(&self) -> Result<Value, Box<dyn std::error::Error + Send + Sync>>;
}

/// A `db.json`-style file: one top-level key per entity.
#[derive(Debug, Clone)]
pub struct JsonFileFixture {
    path: PathBuf,
}

impl JsonFileFixture {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FixtureSource for JsonFileFixture {
    fn load(&self) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let contents = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

/// Collections given directly as a JSON value.
#[derive(Debug, Clone)]
pub struct InlineFixture(pub Value);

impl FixtureSource for InlineFixture {
    fn load(&self) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.0.clone())
    }
}

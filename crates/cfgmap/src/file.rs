//! yaml file backed configuration
//!
//! [FileConfig] is a root [ConfigTree] that remembers where it was loaded from, so it can be
//! written back with [FileConfig::save].
use crate::error::{Error, Result};
use crate::registry::ParserRegistry;
use crate::tree::ConfigTree;
use crate::value::Value;
use std::io::{Read, Write};
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub struct FileConfig {
    file: Option<PathBuf>,
    tree: ConfigTree,
}

impl FileConfig {
    /// An empty configuration without backing file
    pub fn new(registry: Rc<ParserRegistry>) -> Self {
        Self {
            file: None,
            tree: ConfigTree::new(registry),
        }
    }

    /// Load a yaml file, which becomes the backing file
    pub fn open(path: impl AsRef<Path>, registry: Rc<ParserRegistry>) -> Result<Self> {
        let file = path.as_ref().canonicalize()?;
        tracing::info!(path=%file.display(), "loading file");

        let document = std::fs::read_to_string(&file)?;
        Ok(Self::parse(&document, registry)?.with_file(file))
    }

    /// Load a yaml document, without backing file
    pub fn parse(document: &str, registry: Rc<ParserRegistry>) -> Result<Self> {
        let value = Value::from_yaml_str(document)?;
        Ok(Self {
            file: None,
            tree: ConfigTree::from_value(value, registry)?,
        })
    }

    pub fn from_reader(mut reader: impl Read, registry: Rc<ParserRegistry>) -> Result<Self> {
        let mut document = String::new();
        reader.read_to_string(&mut document)?;
        Self::parse(&document, registry)
    }

    /// Set the file [FileConfig::save] writes to
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Write the configuration to its backing file
    pub fn save(&self) -> Result<()> {
        match &self.file {
            Some(file) => self.save_to(file),
            None => Err(Error::NoBackingFile),
        }
    }

    /// Write the configuration to `path`, creating missing parent directories
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            std::fs::create_dir_all(parent)?;
        }

        tracing::info!(path=%path.display(), "saving file");
        let mut writer = std::io::BufWriter::new(std::fs::File::create(path)?);
        serde_yaml::to_writer(&mut writer, &self.tree.to_value())?;
        writer.flush()?;
        Ok(())
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.tree.to_value())?)
    }

    pub fn into_tree(self) -> ConfigTree {
        self.tree
    }
}

impl Deref for FileConfig {
    type Target = ConfigTree;

    fn deref(&self) -> &Self::Target {
        &self.tree
    }
}

impl DerefMut for FileConfig {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.tree
    }
}

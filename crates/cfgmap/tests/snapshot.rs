//! Snapshot tests
//!
//! Loads each *.yml file in /tests/ into a typed `Service`, writes it back
//! into an empty tree and compares the resulting document.

use cfgmap::error::Result;
use cfgmap::file::FileConfig;
use cfgmap::parsers::{FieldReader, FieldWriter, Structure};
use cfgmap::registry::ParserRegistry;
use cfgmap::tree::ConfigTree;
use cfgmap::types::{Enumeration, TypeInfo, Typed};
use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Typed for Level {
    fn type_info() -> TypeInfo {
        TypeInfo::enumeration::<Self>()
    }
}

impl Enumeration for Level {
    const VARIANTS: &'static [Self] = &[
        Level::Trace,
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
    ];

    fn name(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

#[derive(Debug, PartialEq)]
struct Listen {
    host: String,
    port: u16,
}

impl Default for Listen {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 0,
        }
    }
}

impl Typed for Listen {
    fn type_info() -> TypeInfo {
        TypeInfo::structure::<Self>()
    }
}

impl Structure for Listen {
    fn load_fields(&mut self, fields: &mut FieldReader<'_>) -> Result<()> {
        fields.field("host", &mut self.host)?;
        fields.field("port", &mut self.port)
    }

    fn dump_fields(&self, fields: &mut FieldWriter<'_>) -> Result<()> {
        fields.field("host", &self.host)?;
        fields.field("port", &self.port)
    }
}

#[derive(Debug, PartialEq)]
struct Service {
    name: String,
    level: Level,
    listen: Listen,
    tags: BTreeSet<String>,
    limits: IndexMap<String, u32>,
    origin: [i32; 2],
    replicas: u8,
}

impl Default for Service {
    fn default() -> Self {
        Self {
            name: String::new(),
            level: Level::Info,
            listen: Listen::default(),
            tags: BTreeSet::new(),
            limits: IndexMap::new(),
            origin: [0, 0],
            replicas: 1,
        }
    }
}

impl Typed for Service {
    fn type_info() -> TypeInfo {
        TypeInfo::structure::<Self>()
    }
}

impl Structure for Service {
    fn load_fields(&mut self, fields: &mut FieldReader<'_>) -> Result<()> {
        fields.field("name", &mut self.name)?;
        fields.field("level", &mut self.level)?;
        fields.field("listen", &mut self.listen)?;
        fields.field("tags", &mut self.tags)?;
        fields.field("limits", &mut self.limits)?;
        fields.field("origin", &mut self.origin)?;
        fields.field("replicas", &mut self.replicas)
    }

    fn dump_fields(&self, fields: &mut FieldWriter<'_>) -> Result<()> {
        fields.field("name", &self.name)?;
        fields.field("level", &self.level)?;
        fields.field("listen", &self.listen)?;
        fields.field("tags", &self.tags)?;
        fields.field("limits", &self.limits)?;
        fields.field("origin", &self.origin)?;
        fields.field("replicas", &self.replicas)
    }
}

#[test]
fn snapshots() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("CFGMAP_LOG"))
        .with_writer(std::io::stderr)
        .init();

    let registry = Rc::new(ParserRegistry::with_defaults());

    insta::glob!("*.yml", |path| {
        let config = FileConfig::open(path, registry.clone()).expect("must be a valid document");
        let service: Service = config.get_as("service").expect("must be a valid service");

        let mut tree = ConfigTree::new(registry.clone());
        tree.set("service", &service).expect("service must be writable");

        let reloaded: Service = tree.get_as("service").expect("written service must load");
        assert_eq!(reloaded, service);

        let rendered = tree.to_value();
        insta::assert_yaml_snapshot!(rendered);
    });
}

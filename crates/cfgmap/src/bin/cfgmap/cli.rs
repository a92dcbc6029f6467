//! cfgmap cli interface

use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Formatter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Change the work directory
    ///
    /// Can be specified multiple times. Note that all
    /// paths on the way to the final path must exist.
    ///
    /// This is equivalent to running { cd <directory>; cfgmap ... }
    #[clap(short = 'C', long = "directory", global(true))]
    pub directory: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the value stored at a dotted path
    ///
    /// Reads yaml from stdin unless --input-file is given
    Get(GetCommand),

    /// Store a yaml value at a dotted path
    ///
    /// Writes back to --input-file if given, otherwise reads stdin and prints the result
    Set(SetCommand),

    /// List the keys of the document
    #[command(alias = "ls")]
    Keys(KeysCommand),

    /// Print debug information for development
    Dev(DevCommand),
}

#[derive(Parser, Debug)]
pub struct GetCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    #[clap(flatten)]
    pub output: OutputArgs,

    /// Dotted path, e.g. `server.listen.port`
    pub path: String,
}

#[derive(Parser, Debug)]
pub struct SetCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    #[clap(flatten)]
    pub output: OutputArgs,

    /// Dotted path, e.g. `server.listen.port`
    pub path: String,

    /// Value to store, parsed as yaml (`~` removes the entry)
    pub value: String,
}

#[derive(Parser, Debug)]
pub struct KeysCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    /// Include the dotted keys of nested sections
    #[clap(short = 'r', long = "deep")]
    pub deep: bool,

    /// List the keys of this section instead of the root
    pub path: Option<String>,
}

#[derive(Parser, Debug)]
pub struct InputArgs {
    /// Load a yaml file
    ///
    /// Created on `set` if it does not exist yet.
    #[clap(short = 'f', long = "input-file")]
    pub file: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct OutputArgs {
    #[arg(short = 'F', long = "output-format", default_value_t)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Clone, Default, Debug)]
pub enum OutputFormat {
    Json,
    #[default]
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Yaml => f.write_str("yaml"),
        }
    }
}

#[derive(Parser, Debug)]
pub struct DevCommand {
    #[command(subcommand)]
    pub command: DevSubCommand,
}

#[derive(Subcommand, Debug)]
pub enum DevSubCommand {
    /// Registered parsers in resolution order
    Parsers,
    /// Decoded tree of the input
    Tree(InputArgs),
}

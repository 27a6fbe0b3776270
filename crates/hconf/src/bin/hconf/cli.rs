//! hconf cli interface

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
    /// This is equivalent to running { cd <directory>; hconf ... }
    #[clap(short = 'C', long = "directory", global(true))]
    pub directory: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a configuration file as data
    Show(ShowCommand),

    /// Print a single value
    ///
    /// When the section appears more than once the last value wins, like it does when decoding.
    Get(GetCommand),

    /// Set a single value in place
    ///
    /// Creates the file, the section or the key when missing. Everything else in the file is kept as is.
    Set(SetCommand),
}

#[derive(Parser, Debug)]
pub struct ShowCommand {
    /// Configuration file
    pub file: PathBuf,

    #[clap(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug)]
pub struct GetCommand {
    /// Configuration file
    pub file: PathBuf,

    pub section: String,

    pub key: String,

    #[clap(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug)]
pub struct SetCommand {
    /// Configuration file
    pub file: PathBuf,

    pub section: String,

    pub key: String,

    /// New value, interpreted according to --type
    pub value: String,

    /// How to write the value
    ///
    /// Lists are given in json notation: '["a", "b"]'
    #[arg(short = 't', long = "type", default_value_t)]
    pub kind: ValueKind,
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

#[derive(ValueEnum, Clone, Copy, Default, Debug)]
pub enum ValueKind {
    #[default]
    String,
    Int,
    Bool,
    List,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueKind::String => f.write_str("string"),
            ValueKind::Int => f.write_str("int"),
            ValueKind::Bool => f.write_str("bool"),
            ValueKind::List => f.write_str("list"),
        }
    }
}

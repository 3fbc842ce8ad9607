use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum BuiltinOverwriteAction {
    Deny,
    Warn,
    Allow,
}

impl From<BuiltinOverwriteAction> for dt_xsd::BuiltinOverwriteAction {
    fn from(action: BuiltinOverwriteAction) -> Self {
        match action {
            BuiltinOverwriteAction::Deny => Self::Deny,
            BuiltinOverwriteAction::Warn => Self::Warn,
            BuiltinOverwriteAction::Allow => Self::Allow,
        }
    }
}

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    #[arg(help = "The source file or URL")]
    pub input: String,

    #[arg(long, help = "Allow a XML Document Type Definition (DTD) to occur")]
    pub allow_dtd: bool,

    #[arg(long, help = "Package of the generated classes [default: derived from the target namespace]")]
    pub package: Option<String>,

    #[arg(
        long = "builtin-namespace",
        value_name = "NAMESPACE",
        help = "Package whose name is omitted from type names; replaces the default `core`"
    )]
    pub builtin_namespaces: Vec<String>,

    #[arg(long, value_enum, default_value = "deny")]
    pub builtin_overwrite: BuiltinOverwriteAction,

    #[arg(short, long, help = "Write the signature to this file instead of stdout")]
    pub output: Option<PathBuf>,

    #[arg(
        long,
        value_name = "GOLDEN",
        conflicts_with = "output",
        help = "Compare the signature with a previously written one instead of printing it"
    )]
    pub check: Option<PathBuf>,

    #[arg(short, long, action = ArgAction::Count, help = "Log more (repeatable)")]
    pub verbose: u8,
}

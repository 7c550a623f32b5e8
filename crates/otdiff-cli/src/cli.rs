use std::path::PathBuf;

use clap::Parser;

use otdiff_core::DiffAlgorithm;

#[derive(Parser)]
#[command(
    name = "otdiff",
    about = "Diff two JSON documents into operational-transform operations",
    version
)]
pub struct Cli {
    /// Document before the change (`-` reads stdin)
    pub before: PathBuf,

    /// Document after the change (`-` reads stdin)
    pub after: PathBuf,

    #[arg(short, long, default_value = "flat")]
    pub encoding: EncodingKind,

    /// Replace changed strings whole instead of patching them
    #[arg(long)]
    pub no_strings: bool,

    /// Character diff algorithm for string patches
    #[arg(long, default_value = "myers")]
    pub algorithm: AlgorithmArg,

    /// Apply the result to BEFORE and fail unless it reproduces AFTER
    #[arg(long)]
    pub verify: bool,

    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum EncodingKind {
    /// One self-contained record per operation
    Flat,
    /// A single composed operation
    Composed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum AlgorithmArg {
    Myers,
    Patience,
    Lcs,
}

impl From<AlgorithmArg> for DiffAlgorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::Myers => DiffAlgorithm::Myers,
            AlgorithmArg::Patience => DiffAlgorithm::Patience,
            AlgorithmArg::Lcs => DiffAlgorithm::Lcs,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

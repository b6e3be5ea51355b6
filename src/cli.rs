use std::path::PathBuf;

use clap::Parser;

use crate::export::DEFAULT_ARCHIVE;
use crate::models::{IdPattern, NormalizeScope, ReinsertMode, Strategy};

#[derive(Parser, Debug)]
#[command(
    name = "branch-splitr",
    about = "Normalize company names in license records and split them by branch ID",
    version
)]
pub struct Cli {
    /// Pipe-delimited license file (18 fields per line, no header)
    pub input: PathBuf,

    /// Config file [default: ./.branch-splitr/config.toml, fallback ~/.config/branch-splitr/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Normalization strategy (overrides config)
    #[arg(long, value_name = "STRATEGY")]
    pub strategy: Option<StrategyArg>,

    /// Fields to normalize (overrides config)
    #[arg(long, value_name = "SCOPE")]
    pub scope: Option<ScopeArg>,

    /// Branch ID shape: `variable` or a digit count such as `5` (overrides config)
    #[arg(long, value_name = "PATTERN", value_parser = parse_id_pattern)]
    pub id_pattern: Option<IdPattern>,

    /// Where relocated parenthetical text goes (relocate strategy only)
    #[arg(long, value_name = "MODE")]
    pub reinsert: Option<ReinsertArg>,

    /// Directory for output_with_id.txt and output_without_id.txt
    #[arg(long, default_value = ".", value_name = "DIR")]
    pub out: PathBuf,

    /// Bundle both outputs into one ZIP archive; use without value for processed_files.zip
    #[arg(long, value_name = "FILE", num_args = 0..=1, default_missing_value = DEFAULT_ARCHIVE)]
    pub zip: Option<PathBuf>,

    /// Report format
    #[arg(long, default_value = "terminal", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// Show per-group tables; repeat for more log output
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print summary line
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum StrategyArg {
    Relocate,
    Canonicalize,
}

impl From<&StrategyArg> for Strategy {
    fn from(arg: &StrategyArg) -> Self {
        match arg {
            StrategyArg::Relocate => Strategy::RelocateLastParenthetical,
            StrategyArg::Canonicalize => Strategy::CanonicalizeIdParentheses,
        }
    }
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum ScopeArg {
    CompanyName,
    AllFields,
}

impl From<&ScopeArg> for NormalizeScope {
    fn from(arg: &ScopeArg) -> Self {
        match arg {
            ScopeArg::CompanyName => NormalizeScope::CompanyNameOnly,
            ScopeArg::AllFields => NormalizeScope::AllFields,
        }
    }
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum ReinsertArg {
    Leading,
    InPlace,
    LegacyOffsets,
}

impl From<&ReinsertArg> for ReinsertMode {
    fn from(arg: &ReinsertArg) -> Self {
        match arg {
            ReinsertArg::Leading => ReinsertMode::Leading,
            ReinsertArg::InPlace => ReinsertMode::InPlace,
            ReinsertArg::LegacyOffsets => ReinsertMode::LegacyOffsets,
        }
    }
}

/// Longest fixed-length ID accepted on the command line.
const MAX_ID_DIGITS: usize = 32;

fn parse_id_pattern(s: &str) -> Result<IdPattern, String> {
    if s.eq_ignore_ascii_case("variable") {
        return Ok(IdPattern::Variable);
    }
    match s.parse::<usize>() {
        Ok(n) if (1..=MAX_ID_DIGITS).contains(&n) => Ok(IdPattern::Fixed(n)),
        _ => Err(format!(
            "expected `variable` or a digit count between 1 and {}",
            MAX_ID_DIGITS
        )),
    }
}

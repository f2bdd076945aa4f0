use clap::Parser;
use landmark_converter::config::{load_config_or_default, CONFIG_ENV_VAR};
use landmark_converter::logging;
use landmark_converter::*;
use std::ffi::OsString;
use std::path::PathBuf;

const FLAGS: [&str; 5] = ["in_file", "in_type", "out_dir", "out_type", "keep_all"];

#[derive(Parser, Debug)]
#[command(name = "lmkconv")]
#[command(about = "Convert landmark correspondences between registration tool formats")]
#[command(version = "0.1.0")]
struct Cli {
    /// Input landmark file
    #[arg(long = "in_file")]
    in_file: PathBuf,

    /// Input format: ix_pp or ireg
    #[arg(long = "in_type")]
    in_type: InputType,

    /// Directory the output files are written to
    #[arg(long = "out_dir")]
    out_dir: PathBuf,

    /// Output format: tfx_lmk, slr_fid or std_txt
    #[arg(long = "out_type")]
    out_type: OutputType,

    /// 1 keeps manually chosen points marked very unsure, 0 drops them
    #[arg(long = "keep_all", value_parser = clap::value_parser!(u8).range(0..=1))]
    keep_all: u8,
}

impl Cli {
    fn into_request(self) -> ConversionRequest {
        ConversionRequest {
            input_file: self.in_file,
            input_type: self.in_type,
            output_dir: self.out_dir,
            output_type: self.out_type,
            keep_all: self.keep_all == 1,
        }
    }
}

/// Accept the single-dash spelling (`-in_file path`) alongside `--in_file path`.
fn normalize_legacy_flags<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| {
            let legacy = arg
                .to_str()
                .and_then(|s| s.strip_prefix('-'))
                .filter(|rest| !rest.starts_with('-'))
                .filter(|rest| {
                    let name = rest.split('=').next().unwrap_or(rest);
                    FLAGS.contains(&name)
                })
                .map(|rest| OsString::from(format!("--{}", rest)));
            legacy.unwrap_or(arg)
        })
        .collect()
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_from(normalize_legacy_flags(std::env::args_os()));

    let config_path = std::env::var(CONFIG_ENV_VAR).ok();
    let config = load_config_or_default(config_path.as_deref());
    let _guard = logging::init_logging(&config.logging)?;

    let correlation_id = logging::new_correlation_id();
    tracing::debug!(%correlation_id, "Assigned correlation id");

    let request = cli.into_request();
    let outcome = run_conversion(&request, &config.conversion)?;

    tracing::info!(
        points = outcome.point_count,
        warnings = outcome.warnings.len(),
        files = outcome.written.len(),
        "Finished converting {}",
        request.input_file.display()
    );

    Ok(())
}

use super::{Outcome, output_writer};
use crate::cli::ScanArgs;
use crate::config::PartialAppConfig;
use crate::error::Result;
use foldqc::workflows::qc;
use tracing::info;

pub fn run(args: ScanArgs, config: &PartialAppConfig) -> Result<Outcome> {
    let scan_config = config.scan_config(&args)?;
    let mut out = output_writer(args.out.as_deref())?;
    let rows = qc::export_scan(&scan_config, &mut out)?;
    info!("Exported {} confidence record(s).", rows);
    Ok(Outcome::Completed)
}

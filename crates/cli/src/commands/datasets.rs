//! Dataset source listing

use anyhow::Result;

use crate::commands::CommandContext;
use crate::output::DatasetsReport;

/// `datasets` subcommand
pub fn list(ctx: &CommandContext) -> Result<()> {
    let report = DatasetsReport::from(ctx.registry().describe());
    ctx.print(&report)
}

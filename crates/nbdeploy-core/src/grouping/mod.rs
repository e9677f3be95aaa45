//! Grouping proposal: ask a collaborator how to split the catalog into files.

pub mod prompt;
pub mod proposer;
pub mod response;

use tracing::info;

use crate::errors::NbResult;
use crate::models::Grouping;

pub use prompt::{CodeStringMode, ProposalRequest};
pub use proposer::{build_proposer, GroupingProposer, OpenAiProposer, ProposerKind, ReplayProposer};
pub use response::parse_grouping;

/// Send `request` to `proposer` and shape-check the reply.
pub fn propose_grouping(
    proposer: &dyn GroupingProposer,
    request: &ProposalRequest,
) -> NbResult<Grouping> {
    let reply = proposer.propose(request)?;
    let grouping = parse_grouping(&reply)?;
    info!(
        proposer = proposer.name(),
        files = grouping.len(),
        "Received grouping proposal"
    );
    Ok(grouping)
}

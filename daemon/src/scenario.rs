//! Scripted demo election.
//!
//! Walks one election through its whole lifecycle in the order every client
//! script uses: add candidates, register voters, open voting, vote, end,
//! resolve the winner.

use anyhow::Context;
use ballot_election::ElectionLedger;
use ballot_types::{Address, Candidate, CandidateId, Stage};
use tracing::info;

pub const CANDIDATES: [&str; 2] = ["Candidate A", "Candidate B"];
pub const VOTERS: [&str; 3] = ["voter-1", "voter-2", "voter-3"];
/// Ballot of each voter in [`VOTERS`], by candidate index.
pub const BALLOTS: [u32; 3] = [0, 1, 0];

/// Run the demo against `ledger`, whose authority must be `authority`.
pub fn run(ledger: &ElectionLedger, authority: &Address) -> anyhow::Result<Candidate> {
    info!(authority = %authority, stage = %ledger.stage(), "1. initial state");

    for name in CANDIDATES {
        let id = ledger
            .add_candidate(authority, name)
            .with_context(|| format!("adding candidate {name}"))?;
        info!(candidate = %id, name, "candidate added");
    }

    let voters = VOTERS
        .iter()
        .map(|v| Address::new(*v))
        .collect::<Result<Vec<_>, _>>()?;
    for voter in &voters {
        ledger
            .register_voter(authority, voter)
            .with_context(|| format!("registering {voter}"))?;
    }
    info!(count = voters.len(), "2. voters registered");

    ledger.change_stage(authority, Stage::Voting)?;
    info!(stage = %ledger.stage(), "3. voting opened");

    for (voter, choice) in voters.iter().zip(BALLOTS) {
        ledger
            .vote(voter, CandidateId::new(choice))
            .with_context(|| format!("{voter} voting for {choice}"))?;
    }
    info!("4. votes cast");

    for candidate in ledger.tally() {
        info!(
            candidate = %candidate.id,
            name = %candidate.name,
            votes = candidate.vote_count,
            "5. tally"
        );
    }

    ledger.change_stage(authority, Stage::Ended)?;
    info!(stage = %ledger.stage(), "6. voting ended");

    let winner = ledger.winner()?;
    info!(name = %winner.name, votes = winner.vote_count, "7. winner");
    Ok(winner)
}

/// Outcome of a claim attempt on a broadcast prize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The claim was registered.
    Won,
    /// This user already holds a claim on this prize.
    AlreadyClaimed,
    /// The prize already has its full set of winners.
    TooLate,
}

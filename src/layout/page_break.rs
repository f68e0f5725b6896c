//! # Page Break Decisions
//!
//! Logic for deciding whether a block goes on the current page, moves to
//! the next one, or has to overflow. Blocks are atomic, so there is no
//! split case: the only questions are "does it fit" and "may we break
//! here".

/// What to do with a block at the current cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakDecision {
    /// The block fits below the cursor.
    Place,
    /// Close the page and place the block on a fresh one.
    MoveToNextPage,
    /// The block does not fit, but breaking here would not help (the page
    /// is empty) or is not allowed (it would strand a header). Place it
    /// anyway and report the overflow.
    Overflow,
}

/// Decide where a block of `height` goes, given the cursor and the lowest
/// y the content may reach.
///
/// `can_break` is false when the current page holds nothing a break could
/// leave behind: an empty page, or a page whose last block is a header
/// that must stay with what follows it.
pub fn decide_break(cursor: f64, height: f64, limit: f64, can_break: bool) -> BreakDecision {
    if cursor + height <= limit + EPSILON {
        BreakDecision::Place
    } else if can_break {
        BreakDecision::MoveToNextPage
    } else {
        BreakDecision::Overflow
    }
}

/// Slack for accumulated floating point error in the cursor.
const EPSILON: f64 = 1e-6;

//! Effective-query composition.
//!
//! The primary query and its optional refinement are kept separate in
//! session state; only the composed string is sent to the engine.

/// Fixed instruction header inserted between the primary query and its
/// refinement.
const REFINE_HEADER: &str = "Refine / adjust as follows:";

/// Merge a primary query with an optional refinement.
///
/// Both inputs are trimmed. An empty trimmed refinement leaves the trimmed
/// primary unchanged; otherwise the refinement follows the primary under
/// the fixed header, on new lines.
pub fn compose(primary: &str, refine: &str) -> String {
    let primary = primary.trim();
    let refine = refine.trim();

    if refine.is_empty() {
        primary.to_string()
    } else {
        format!("{primary}\n\n{REFINE_HEADER}\n{refine}")
    }
}

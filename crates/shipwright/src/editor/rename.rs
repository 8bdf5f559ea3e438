//! Whole-word rename in diagram source
//!
//! The substitution does not understand the diagram grammar. Every
//! word-bounded occurrence is replaced, including ones in unrelated nodes
//! or inside other labels.

use regex::{NoExpand, Regex};
use tracing::{debug, warn};

/// Replace every whole-word occurrence of `old` with `new`
///
/// `old` is matched literally; `new` is inserted verbatim (no `$` group
/// expansion). An empty `old` leaves the source unchanged.
pub fn rename_whole_word(source: &str, old: &str, new: &str) -> String {
    if old.is_empty() {
        return source.to_string();
    }
    let pattern = format!(r"\b{}\b", regex::escape(old));
    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(err) => {
            warn!(%err, "Rename pattern rejected");
            return source.to_string();
        }
    };

    let count = re.find_iter(source).count();
    debug!(old, new, count, "Whole-word rename");
    re.replace_all(source, NoExpand(new)).into_owned()
}

//! Opinion report rendering.
//!
//! Pure formatting over an already-ordered sequence of (opinion, creator)
//! pairs; no mutation, deterministic for the same input.

use opine_model::{Identity, Opinion};

const INDENT: &str = "    ";

/// Normalize an enumerated value or identity class for display:
/// separators become spaces, each word is title-cased. The stored value
/// stays verbatim; this is display-only.
pub fn title_case(value: &str) -> String {
    value
        .replace('-', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render one attributed text block per (opinion, creator) pair, in the
/// order given, separated by blank lines.
pub fn render_report<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = (&'a Opinion, &'a Identity)>,
{
    let mut out = String::new();
    for (opinion, creator) in entries {
        out.push_str(&format!(
            "# {} ({})\n",
            creator.name,
            title_case(&creator.identity_class)
        ));
        out.push_str(&format!(
            "  Opinion on effectiveness: {}\n",
            title_case(&opinion.opinion)
        ));
        out.push_str(&format!(
            "  Evaluated at: {}\n",
            opinion.created.format("%Y-%m-%d %H:%M:%S")
        ));
        out.push('\n');
        for line in opinion.explanation.lines() {
            out.push_str(INDENT);
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
        out.push('\n');
    }
    out
}

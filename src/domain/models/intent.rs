#[cfg(test)]
#[path = "intent_test.rs"]
mod tests;

use super::is_pdb_id;

/// Verbs stripped from a command before its subject is looked up.
pub const COMMAND_WORDS: &[&str] = &[
    "show",
    "display",
    "visualize",
    "load",
    "find",
    "get",
    "view",
    "fold",
];

const AMINO_ACIDS: &str = "ACDEFGHIKLMNPQRSTVWY";
const MIN_SEQUENCE_LENGTH: usize = 10;

#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum IntentTag {
    FoldSequence,
    VisualizeProtein,
    VisualizeMolecule,
    Chat,
}

/// Keyword rules, checked in order. Multi-word keywords match as phrases,
/// single words match whole tokens.
const INTENT_RULES: &[(&str, IntentTag)] = &[
    ("fold", IntentTag::FoldSequence),
    ("predict structure", IntentTag::FoldSequence),
    ("structure prediction", IntentTag::FoldSequence),
    ("protein", IntentTag::VisualizeProtein),
    ("pdb", IntentTag::VisualizeProtein),
    ("rcsb", IntentTag::VisualizeProtein),
    ("enzyme", IntentTag::VisualizeProtein),
    ("antibody", IntentTag::VisualizeProtein),
    ("receptor", IntentTag::VisualizeProtein),
    ("molecule", IntentTag::VisualizeMolecule),
    ("compound", IntentTag::VisualizeMolecule),
    ("chemical", IntentTag::VisualizeMolecule),
    ("drug", IntentTag::VisualizeMolecule),
    ("pubchem", IntentTag::VisualizeMolecule),
    ("3d", IntentTag::VisualizeMolecule),
    ("structure", IntentTag::VisualizeMolecule),
    ("caffeine", IntentTag::VisualizeMolecule),
    ("aspirin", IntentTag::VisualizeMolecule),
    ("glucose", IntentTag::VisualizeMolecule),
    ("water", IntentTag::VisualizeMolecule),
    ("ethanol", IntentTag::VisualizeMolecule),
    ("methane", IntentTag::VisualizeMolecule),
    ("benzene", IntentTag::VisualizeMolecule),
    ("acetone", IntentTag::VisualizeMolecule),
    ("ibuprofen", IntentTag::VisualizeMolecule),
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Intent {
    pub tag: IntentTag,
    /// Amino acid sequence found in the command, uppercased.
    pub sequence: Option<String>,
}

fn tokens(command: &str) -> Vec<String> {
    return command
        .split(|c: char| return !c.is_ascii_alphanumeric())
        .filter(|token| return !token.is_empty())
        .map(|token| return token.to_string())
        .collect();
}

fn find_sequence(command: &str) -> Option<String> {
    return tokens(command)
        .into_iter()
        .filter(|token| {
            return token.len() >= MIN_SEQUENCE_LENGTH
                && token
                    .to_uppercase()
                    .chars()
                    .all(|c| return AMINO_ACIDS.contains(c));
        })
        .max_by_key(|token| return token.len())
        .map(|token| return token.to_uppercase());
}

/// Classifies a raw command. Pure, so the orchestrator can decide on a
/// pending layer before any network call.
pub fn classify(command: &str) -> Intent {
    let lowered = command.to_lowercase();
    let words = tokens(&lowered);
    let phrase = words.join(" ");

    for (keyword, tag) in INTENT_RULES {
        let matched = if keyword.contains(' ') {
            phrase.contains(keyword)
        } else {
            words.iter().any(|word| return word == keyword)
        };
        if !matched {
            continue;
        }

        let sequence = if *tag == IntentTag::FoldSequence {
            find_sequence(command)
        } else {
            None
        };

        return Intent {
            tag: *tag,
            sequence,
        };
    }

    if tokens(command).iter().any(|token| return is_pdb_id(token)) {
        return Intent {
            tag: IntentTag::VisualizeProtein,
            sequence: None,
        };
    }

    return Intent {
        tag: IntentTag::Chat,
        sequence: None,
    };
}

/// Lowercases the command and drops command verbs, leaving the name to look
/// up. Falls back to the whole command when only verbs were given.
pub fn subject_of(command: &str) -> String {
    let lowered = command.trim().to_lowercase();
    let subject = lowered
        .split_whitespace()
        .filter(|word| {
            let bare = word.trim_matches(|c: char| return !c.is_alphanumeric());
            return !COMMAND_WORDS.contains(&bare);
        })
        .collect::<Vec<&str>>()
        .join(" ");

    if subject.is_empty() {
        return lowered;
    }

    return subject;
}

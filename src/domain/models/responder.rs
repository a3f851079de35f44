use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;

/// Which pipeline answers chat commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ResponderName {
    /// Resolve structures locally through PubChem and RCSB.
    Assistant,
    /// Forward commands to an external workflow webhook.
    Workflow,
}

impl ResponderName {
    pub fn parse(text: &str) -> Option<ResponderName> {
        return ResponderName::iter().find(|e| return e.to_string() == text);
    }
}

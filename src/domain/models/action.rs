#[derive(Debug)]
pub enum Action {
    /// A chat command typed by the user, answered by the orchestrator.
    Command(String),
    ModelList(),
    ModelSet(String),
    SuggestPrompts(),
}

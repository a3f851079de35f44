#[derive(Debug)]
pub enum Event {
    MessageUpdated {
        session_id: String,
        message_id: String,
    },
    LayerUpdated {
        session_id: String,
        layer_id: String,
    },
    Notice(String),
    PromptsSuggested(Vec<String>),
}

use super::BackendName;
use super::BackendPrompt;

#[test]
fn it_leaves_plain_prompts_untouched() {
    let prompt = BackendPrompt::new("Suggest prompts".to_string());

    assert!(!prompt.json);
    insta::assert_snapshot!(prompt.text, @"Suggest prompts");
}

#[test]
fn it_appends_json_instructions() {
    let mut prompt = BackendPrompt::new("Correct caffiene".to_string());
    prompt.expect_json(r#"{"correctedName": "string"}"#);

    assert!(prompt.json);
    insta::assert_snapshot!(prompt.text, @r###"
    Correct caffiene

    Respond only with a JSON object in the following shape, without markdown fences:
    {"correctedName": "string"}
    "###);
}

#[test]
fn it_parses_backend_names() {
    assert_eq!(BackendName::parse("openai"), Some(BackendName::OpenAI));
    assert_eq!(BackendName::parse("none"), Some(BackendName::None));
    assert_eq!(BackendName::parse("claude"), None);
}

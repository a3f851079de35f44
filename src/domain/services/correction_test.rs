use anyhow::Result;
use serde::Deserialize;

use super::correct_name;
use super::parse_json_answer;
use super::suggest_prompts;
use super::FALLBACK_PROMPTS;
use crate::domain::services::fake_backend::FakeBackend;

#[derive(Debug, Deserialize, PartialEq)]
struct Shape {
    name: String,
}

#[test]
fn it_parses_fenced_json_answers() -> Result<()> {
    let res = parse_json_answer::<Shape>("```json\n{\"name\": \"caffeine\"}\n```")?;
    assert_eq!(res.name, "caffeine");

    let res = parse_json_answer::<Shape>("Sure! {\"name\": \"aspirin\"} Hope that helps.")?;
    assert_eq!(res.name, "aspirin");

    assert!(parse_json_answer::<Shape>("no json here").is_err());
    assert!(parse_json_answer::<Shape>("} backwards {").is_err());

    return Ok(());
}

#[tokio::test]
async fn it_keeps_names_without_a_backend() {
    assert_eq!(correct_name(None, "caffiene").await, "caffiene");
}

#[tokio::test]
async fn it_corrects_names() {
    let backend = FakeBackend::answering(
        r#"```json
{"correctedName": " caffeine ", "reasoning": "Fixed spelling"}
```"#,
    );

    assert_eq!(correct_name(Some(&backend), "caffiene").await, "caffeine");
}

#[tokio::test]
async fn it_falls_back_on_unusable_answers() {
    let backend = FakeBackend::answering("I think you mean caffeine.");
    assert_eq!(correct_name(Some(&backend), "caffiene").await, "caffiene");

    let backend = FakeBackend::answering(r#"{"correctedName": "", "reasoning": "unsure"}"#);
    assert_eq!(correct_name(Some(&backend), "caffiene").await, "caffiene");

    let backend = FakeBackend::failing("connection refused");
    assert_eq!(correct_name(Some(&backend), "caffiene").await, "caffiene");
}

#[tokio::test]
async fn it_suggests_prompts() {
    let backend = FakeBackend::answering(
        r#"{"prompts": ["Show caffeine", "  ", "Fold MKTAYIAKQR", "Display 1CRN", "Find insulin", "Show water", "Show benzene"]}"#,
    );

    let res = suggest_prompts(Some(&backend)).await;
    assert_eq!(
        res,
        vec![
            "Show caffeine",
            "Fold MKTAYIAKQR",
            "Display 1CRN",
            "Find insulin",
            "Show water"
        ]
    );
}

#[tokio::test]
async fn it_falls_back_to_static_prompts() {
    let expected = FALLBACK_PROMPTS
        .iter()
        .map(|e| return e.to_string())
        .collect::<Vec<String>>();

    assert_eq!(suggest_prompts(None).await, expected);

    let backend = FakeBackend::failing("Quota exceeded");
    assert_eq!(suggest_prompts(Some(&backend)).await, expected);

    let backend = FakeBackend::answering(r#"{"prompts": []}"#);
    assert_eq!(suggest_prompts(Some(&backend)).await, expected);
}

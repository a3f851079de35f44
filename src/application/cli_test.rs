use super::build;
use super::format_lookup;
use crate::domain::models::ExternalId;
use crate::domain::models::StructureFormat;
use crate::domain::models::StructureLookup;

#[test]
fn it_builds_a_valid_command() {
    build().debug_assert();
}

#[test]
fn it_parses_global_args_after_subcommands() {
    let matches = build()
        .try_get_matches_from(vec![
            "biocopilot",
            "chat",
            "--backend",
            "ollama",
            "--responder",
            "workflow",
        ])
        .expect("valid args");
    let (_, chat_matches) = matches.subcommand().expect("chat subcommand");

    assert_eq!(
        chat_matches.get_one::<String>("backend").map(|e| return e.as_str()),
        Some("ollama")
    );
    assert_eq!(
        chat_matches.get_one::<String>("responder").map(|e| return e.as_str()),
        Some("workflow")
    );
}

#[test]
fn it_rejects_unknown_backends() {
    let res = build().try_get_matches_from(vec!["biocopilot", "--backend", "claude"]);

    assert!(res.is_err());
}

#[test]
fn it_formats_found_lookups() {
    let lookup = StructureLookup {
        format: Some(StructureFormat::Sdf),
        url: Some("https://pubchem.example/cid/2519/SDF".to_string()),
        external_id: Some(ExternalId::Cid(2519)),
        resolved_name: "caffeine".to_string(),
        original_name: "caffiene".to_string(),
    };

    assert_eq!(
        format_lookup(&lookup),
        "- caffiene (as caffeine): SDF 2519 https://pubchem.example/cid/2519/SDF"
    );
}

#[test]
fn it_formats_missing_lookups() {
    let lookup = StructureLookup::not_found("unobtainium", "unobtainium");

    assert_eq!(format_lookup(&lookup), "- unobtainium: No structure found");
}

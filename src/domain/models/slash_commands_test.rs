use super::SlashCommand;

#[test]
fn it_parse_empty_string() {
    let text = "";
    assert!(SlashCommand::parse(text).is_none());
}
#[test]
fn it_parse_space_only() {
    let text = " ";
    assert!(SlashCommand::parse(text).is_none());
}
#[test]
fn it_parse_single_slash() {
    let text = "/";
    assert!(SlashCommand::parse(text).is_none());
}
#[test]
fn it_parse_invalid_prefix() {
    let text = "!q";
    assert!(SlashCommand::parse(text).is_none());
}
#[test]
fn it_parse_plain_chat() {
    assert!(SlashCommand::parse("show caffeine").is_none());
}
#[test]
fn it_parse_valid_prefix() {
    let text = "/q";
    let cmd = SlashCommand::parse(text);
    assert!(cmd.is_some());
    assert_eq!(cmd.unwrap().command, "/q");
}

#[test]
fn it_is_short_quit() {
    let cmd = SlashCommand::parse("/q").unwrap();
    assert!(cmd.is_quit());
}
#[test]
fn it_is_exit() {
    let cmd = SlashCommand::parse("/exit").unwrap();
    assert!(cmd.is_quit());
}
#[test]
fn it_is_not_is_quit() {
    let cmd = SlashCommand::parse("/ml").unwrap();
    assert!(!cmd.is_quit());
}

#[test]
fn it_is_model_list_typo() {
    let cmd = SlashCommand::parse("/modelist").unwrap();
    assert!(cmd.is_model_list());
}
#[test]
fn it_is_short_model_set() {
    let cmd = SlashCommand::parse("/m llama2").unwrap();
    assert!(cmd.is_model_set());
    assert!(!cmd.is_model_list());
    assert_eq!(cmd.arg_text(), "llama2");
}

#[test]
fn it_is_help() {
    let cmd = SlashCommand::parse("/help").unwrap();
    assert!(cmd.is_help());
}

#[test]
fn it_is_new_session() {
    let cmd = SlashCommand::parse("/n").unwrap();
    assert!(cmd.is_new_session());
    assert!(!cmd.is_session_list());
}

#[test]
fn it_is_session_switch_with_index() {
    let cmd = SlashCommand::parse("/switch 3").unwrap();
    assert!(cmd.is_session_switch());
    assert_eq!(cmd.index_arg(), Some(3));
}
#[test]
fn it_rejects_zero_and_text_indexes() {
    assert_eq!(SlashCommand::parse("/sw 0").unwrap().index_arg(), None);
    assert_eq!(SlashCommand::parse("/sw two").unwrap().index_arg(), None);
    assert_eq!(SlashCommand::parse("/sw").unwrap().index_arg(), None);
}

#[test]
fn it_keeps_rename_titles_whole() {
    let cmd = SlashCommand::parse("/rename  Kinase   inhibitors ").unwrap();
    assert!(cmd.is_session_rename());
    assert_eq!(cmd.arg_text(), "Kinase inhibitors");
}

#[test]
fn it_requires_paths_for_export_and_import() {
    assert!(SlashCommand::parse("/export").is_none());
    assert!(SlashCommand::parse("/import").is_none());
    assert!(SlashCommand::parse("/export chat.json")
        .unwrap()
        .is_session_export());
    assert!(SlashCommand::parse("/import chat.json")
        .unwrap()
        .is_session_import());
}

#[test]
fn it_requires_indexes_for_layer_changes() {
    assert!(SlashCommand::parse("/layer").is_none());
    assert!(SlashCommand::parse("/rmlayer").is_none());
    assert!(SlashCommand::parse("/ly 1").unwrap().is_layer_select());
    assert!(SlashCommand::parse("/rl 2").unwrap().is_layer_remove());
    assert!(SlashCommand::parse("/layers").unwrap().is_layer_list());
}

#[test]
fn it_is_profile_commands() {
    assert!(SlashCommand::parse("/p").unwrap().is_profile());
    assert!(SlashCommand::parse("/name Ada").unwrap().is_profile_name());
    assert!(SlashCommand::parse("/resetgpu").unwrap().is_gpu_reset());
    assert!(SlashCommand::parse("/prompts").unwrap().is_prompts());
}

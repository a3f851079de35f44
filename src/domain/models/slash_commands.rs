#[cfg(test)]
#[path = "slash_commands_test.rs"]
mod tests;

pub struct SlashCommand {
    command: String,
    pub args: Vec<String>,
}

impl SlashCommand {
    pub fn parse(text: &str) -> Option<SlashCommand> {
        let mut args = text
            .split_whitespace()
            .map(|e| return e.to_string())
            .collect::<Vec<String>>();
        if args.is_empty() {
            return None;
        }
        let prefix = args.remove(0);

        let cmd = SlashCommand {
            command: prefix,
            args,
        };
        if cmd.is_quit()
            || cmd.is_help()
            || cmd.is_model_list()
            || cmd.is_model_set()
            || cmd.is_new_session()
            || cmd.is_session_list()
            || cmd.is_session_switch()
            || cmd.is_session_rename()
            || cmd.is_session_delete()
            || cmd.is_session_export()
            || cmd.is_session_import()
            || cmd.is_layer_list()
            || cmd.is_layer_select()
            || cmd.is_layer_remove()
            || cmd.is_layer_show()
            || cmd.is_profile()
            || cmd.is_profile_name()
            || cmd.is_gpu_reset()
            || cmd.is_prompts()
        {
            return Some(cmd);
        }

        return None;
    }

    /// Arguments joined back together, for free-text parameters like titles.
    pub fn arg_text(&self) -> String {
        return self.args.join(" ");
    }

    /// First argument as a 1-based list index.
    pub fn index_arg(&self) -> Option<usize> {
        return self
            .args
            .first()
            .and_then(|e| return e.parse::<usize>().ok())
            .filter(|e| return *e > 0);
    }

    fn is(&self, names: &[&str]) -> bool {
        return names.contains(&self.command.as_str());
    }

    pub fn is_quit(&self) -> bool {
        return self.is(&["/q", "/quit", "/exit"]);
    }

    pub fn is_help(&self) -> bool {
        return self.is(&["/h", "/help"]);
    }

    pub fn is_model_list(&self) -> bool {
        return self.is(&["/ml", "/modellist", "/modelist"]);
    }

    pub fn is_model_set(&self) -> bool {
        return self.is(&["/m", "/model"]);
    }

    pub fn is_new_session(&self) -> bool {
        return self.is(&["/n", "/new"]);
    }

    pub fn is_session_list(&self) -> bool {
        return self.is(&["/s", "/sessions"]);
    }

    pub fn is_session_switch(&self) -> bool {
        return self.is(&["/sw", "/switch"]);
    }

    pub fn is_session_rename(&self) -> bool {
        return self.is(&["/rn", "/rename"]);
    }

    pub fn is_session_delete(&self) -> bool {
        return self.is(&["/d", "/delete"]);
    }

    pub fn is_session_export(&self) -> bool {
        return self.is(&["/export"]) && !self.args.is_empty();
    }

    pub fn is_session_import(&self) -> bool {
        return self.is(&["/import"]) && !self.args.is_empty();
    }

    pub fn is_layer_list(&self) -> bool {
        return self.is(&["/l", "/layers"]);
    }

    pub fn is_layer_select(&self) -> bool {
        return self.is(&["/ly", "/layer"]) && !self.args.is_empty();
    }

    pub fn is_layer_remove(&self) -> bool {
        return self.is(&["/rl", "/rmlayer"]) && !self.args.is_empty();
    }

    pub fn is_layer_show(&self) -> bool {
        return self.is(&["/show"]);
    }

    pub fn is_profile(&self) -> bool {
        return self.is(&["/p", "/profile"]);
    }

    pub fn is_profile_name(&self) -> bool {
        return self.is(&["/name"]);
    }

    pub fn is_gpu_reset(&self) -> bool {
        return self.is(&["/resetgpu"]);
    }

    pub fn is_prompts(&self) -> bool {
        return self.is(&["/prompts"]);
    }
}

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
            || cmd.is_new_chat()
            || cmd.is_refresh()
            || cmd.is_sessions()
            || cmd.is_open()
            || cmd.is_settings()
            || cmd.is_export()
            || cmd.is_clear()
        {
            return Some(cmd);
        }

        return None;
    }

    pub fn is_quit(&self) -> bool {
        return ["/q", "/quit", "/exit"].contains(&self.command.as_str());
    }

    pub fn is_help(&self) -> bool {
        return ["/h", "/help"].contains(&self.command.as_str());
    }

    pub fn is_new_chat(&self) -> bool {
        return ["/n", "/new"].contains(&self.command.as_str());
    }

    pub fn is_refresh(&self) -> bool {
        return ["/r", "/refresh"].contains(&self.command.as_str());
    }

    pub fn is_sessions(&self) -> bool {
        return ["/s", "/sessions"].contains(&self.command.as_str());
    }

    pub fn is_open(&self) -> bool {
        return ["/o", "/open"].contains(&self.command.as_str());
    }

    pub fn is_settings(&self) -> bool {
        return ["/settings", "/preferences"].contains(&self.command.as_str());
    }

    pub fn is_export(&self) -> bool {
        return self.command == "/export";
    }

    pub fn is_clear(&self) -> bool {
        return self.command == "/clear";
    }
}

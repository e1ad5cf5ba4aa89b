//! Bot command recognition and reply formatting.


/// Known bot commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `/silpo` -- today's foresight.
    Foresight,
}

impl Command {
    /// Parse a command from message text.
    ///
    /// Accepts `/name`, `/name@bot_username`, and either followed by
    /// arguments. The name is case-insensitive. A command addressed to a
    /// different bot, or any suffix while our own username is unknown,
    /// yields `None`, as does any unknown command.
    pub fn parse(text: &str, bot_username: Option<&str>) -> Option<Self> {
        let first = text.split(char::is_whitespace).next()?;
        let rest = first.strip_prefix('/')?;

        let (name, target) = match rest.split_once('@') {
            Some((name, target)) => (name, Some(target)),
            None => (rest, None),
        };

        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphabetic() || c == '_') {
            return None;
        }

        if let Some(target) = target {
            match bot_username {
                Some(me) if target.eq_ignore_ascii_case(me) => {}
                _ => return None,
            }
        }

        match name.to_ascii_lowercase().as_str() {
            "silpo" => Some(Self::Foresight),
            _ => None,
        }
    }
}

/// Markdown reply: the intro in italics, the foresight in bold.
pub fn format_foresight(intro: &str, foresight: &str) -> String {
    format!("_{intro}_\n*{foresight}*")
}

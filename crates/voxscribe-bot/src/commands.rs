use crate::telegram::BotCommandSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BotCommand {
    Start,
    Help,
    About,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CommandDef {
    command: BotCommand,
    pattern: &'static str,
    telegram_spec: BotCommandSpec,
}

const COMMAND_DEFS: &[CommandDef] = &[
    CommandDef {
        command: BotCommand::Start,
        pattern: "/start",
        telegram_spec: BotCommandSpec {
            command: "start",
            description: "Start the bot and see the welcome message",
        },
    },
    CommandDef {
        command: BotCommand::Help,
        pattern: "/help",
        telegram_spec: BotCommandSpec {
            command: "help",
            description: "Show usage instructions",
        },
    },
    CommandDef {
        command: BotCommand::About,
        pattern: "/about",
        telegram_spec: BotCommandSpec {
            command: "about",
            description: "Information about the bot",
        },
    },
];

/// Inline keyboard actions carried in `callback_data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CallbackAction {
    Help,
    About,
    TranscribeAnother,
}

impl CallbackAction {
    pub const HELP: &str = "HELP";
    pub const ABOUT: &str = "ABOUT";
    pub const TRANSCRIBE_ANOTHER: &str = "TRANSCRIBE_ANOTHER";

    pub fn parse(data: &str) -> Option<Self> {
        match data {
            Self::HELP => Some(Self::Help),
            Self::ABOUT => Some(Self::About),
            Self::TRANSCRIBE_ANOTHER => Some(Self::TranscribeAnother),
            _ => None,
        }
    }
}

pub(crate) fn telegram_command_specs() -> Vec<BotCommandSpec> {
    COMMAND_DEFS.iter().map(|def| def.telegram_spec).collect()
}

pub(crate) fn parse_command(text: &str) -> Option<BotCommand> {
    let trimmed = text.trim();

    COMMAND_DEFS
        .iter()
        .find(|def| command_matches(trimmed, def.pattern))
        .map(|def| def.command)
}

/// Matches `/cmd`, `/cmd@bot_name` and either form followed by arguments
/// (deep links arrive as `/start <payload>`).
fn command_matches(trimmed_text: &str, command: &str) -> bool {
    let Some(rest) = trimmed_text.strip_prefix(command) else {
        return false;
    };

    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        return true;
    }

    rest.strip_prefix('@').is_some_and(|mention| {
        let name = mention.split_whitespace().next().unwrap_or_default();
        !name.is_empty()
    })
}

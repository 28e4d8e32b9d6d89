/// The classified meaning of one free-text command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    Play,
    GiveUp,
    EndGame,
    ShowHelp,
    Unknown,
}

/// Lowercases the input and strips every leading/trailing character that is
/// not a Unicode letter. Interior characters, spaces included, are kept.
pub fn normalize(text: &str) -> String {
    text.to_lowercase().trim_matches(|ch: char| !ch.is_alphabetic()).to_owned()
}

/// Maps free text onto the fixed phrase table. Exact match after
/// [`normalize`]; anything else is [`Intent::Unknown`].
pub fn classify(text: &str) -> Intent {
    match normalize(text).as_str() {
        "begin" | "go" | "hello" | "hi" | "now" | "play" | "start" | "yes" | "1" => Intent::Play,
        "continue" | "dunno" | "give up" | "idk" | "i dont know" | "i don't know"
        | "i give up" | "service" | "support" | "ugh" => Intent::GiveUp,
        "bye" | "end" | "end game" | "finish" | "no" | "stop" | "0" => Intent::EndGame,
        "advice" | "aid" | "assist" | "command" | "commands" | "control" | "controls" | "help"
        | "help me" | "list" | "ls" | "option" | "options" => Intent::ShowHelp,
        _ => Intent::Unknown,
    }
}

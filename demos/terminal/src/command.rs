//! Parsing of the lines typed at the prompt.

/// One line of player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Join,
    Move { row: usize, col: usize },
    Leave,
    Reconnect,
    Help,
    Quit,
}

pub const HELP: &str = "commands: join | move <row> <col> | leave | reconnect | help | quit";

impl Command {
    /// Parses one line. Rows and columns are 0-based.
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err("empty command".to_string());
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "join" | "j" => Command::Join,
            "leave" | "l" => Command::Leave,
            "reconnect" | "r" => Command::Reconnect,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            "move" | "m" => {
                let row = coordinate(words.next(), "row")?;
                let col = coordinate(words.next(), "col")?;
                Command::Move { row, col }
            }
            other => return Err(format!("unknown command {other:?}; {HELP}")),
        };

        match words.next() {
            Some(extra) => Err(format!("unexpected argument {extra:?}")),
            None => Ok(command),
        }
    }
}

fn coordinate(word: Option<&str>, name: &str) -> Result<usize, String> {
    let word = word.ok_or_else(|| format!("missing {name}; usage: move <row> <col>"))?;
    word.parse()
        .map_err(|_| format!("{name} must be a number, got {word:?}"))
}

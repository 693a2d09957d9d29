//! Parsing of typed commands.

use anyhow::{bail, Context, Result};
use skirmish_core::{BoardSize, CellIndex};
use skirmish_presentation::UserInput;

/// Usage line printed on start and on `help`.
pub(crate) const HELP: &str =
    "commands: click N | hover N | leave N | new | help | quit   (N is a cell index)";

/// A parsed command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Line {
    /// Interaction forwarded to the controller.
    Input(UserInput),
    /// Print the usage line.
    Help,
    /// Save and leave.
    Quit,
}

/// Parses one line of input. Blank lines yield `None`.
pub(crate) fn parse_line(line: &str, board: BoardSize) -> Result<Option<Line>> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };

    let parsed = match command.to_ascii_lowercase().as_str() {
        "click" | "c" => Line::Input(UserInput::CellClick(cell(words.next(), board)?)),
        "hover" | "h" => Line::Input(UserInput::CellHoverEnter(cell(words.next(), board)?)),
        "leave" | "l" => Line::Input(UserInput::CellHoverLeave(cell(words.next(), board)?)),
        "new" => Line::Input(UserInput::NewGame),
        "help" | "?" => Line::Help,
        "quit" | "q" | "exit" => Line::Quit,
        other => bail!("unknown command `{other}`, try `help`"),
    };

    if let Some(extra) = words.next() {
        bail!("unexpected argument `{extra}`");
    }
    Ok(Some(parsed))
}

fn cell(word: Option<&str>, board: BoardSize) -> Result<CellIndex> {
    let word = word.context("missing cell index")?;
    let index: u32 = word
        .parse()
        .with_context(|| format!("`{word}` is not a cell index"))?;
    let cell = CellIndex::new(index);
    if !board.contains(cell) {
        bail!(
            "cell {index} is off the board (0..{})",
            board.cell_count()
        );
    }
    Ok(cell)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<Option<Line>> {
        parse_line(line, BoardSize::default())
    }

    #[test]
    fn parses_cell_commands() {
        assert_eq!(
            parse("click 12").expect("parse"),
            Some(Line::Input(UserInput::CellClick(CellIndex::new(12))))
        );
        assert_eq!(
            parse("  H 63 ").expect("parse"),
            Some(Line::Input(UserInput::CellHoverEnter(CellIndex::new(63))))
        );
        assert_eq!(
            parse("leave 0").expect("parse"),
            Some(Line::Input(UserInput::CellHoverLeave(CellIndex::new(0))))
        );
    }

    #[test]
    fn parses_bare_commands() {
        assert_eq!(parse("").expect("parse"), None);
        assert_eq!(parse("new").expect("parse"), Some(Line::Input(UserInput::NewGame)));
        assert_eq!(parse("?").expect("parse"), Some(Line::Help));
        assert_eq!(parse("quit").expect("parse"), Some(Line::Quit));
    }

    #[test]
    fn rejects_bad_input() {
        for line in ["click", "click x", "click 64", "click 1 2", "dance", "new game"] {
            assert!(parse(line).is_err(), "{line} should be rejected");
        }
    }
}

//! Chat input recognised while an encounter is waiting on the user.

use crate::errors::{Error, Result};

/// An in-encounter command, parsed from the text after the guild prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `accept <n>` - take the n-th offered quest (1-based)
    Accept(usize),
    /// `roll <dice>` - roll a dice expression
    Roll(String),
    /// `stack <card#> <amount>` - stack copies of a card (card number is 1-based)
    Stack {
        /// Hand position, 1-based as typed
        card: usize,
        /// Copies to commit
        amount: usize,
    },
    /// `attack` - end the turn and strike
    Attack,
}

impl Command {
    /// Parses a single command. Matching is case-insensitive on the command word.
    pub fn parse(input: &str) -> Result<Self> {
        let unrecognized = || Error::UnrecognizedCommand {
            input: input.to_string(),
        };

        let mut words = input.split_whitespace();
        let name = words.next().ok_or_else(unrecognized)?.to_lowercase();
        let args: Vec<&str> = words.collect();
        let number = |arg: &str| arg.parse::<usize>().map_err(|_| unrecognized());

        match (name.as_str(), args.as_slice()) {
            ("accept", [n]) => Ok(Self::Accept(number(*n)?)),
            ("roll", dice) => Ok(Self::Roll(dice.concat())),
            ("stack", [card, amount]) => Ok(Self::Stack {
                card: number(*card)?,
                amount: number(*amount)?,
            }),
            ("attack", []) => Ok(Self::Attack),
            _ => Err(unrecognized()),
        }
    }

    /// Strips `prefix` from a chat message and parses the rest.
    ///
    /// Messages that do not start with the prefix are unrecognized.
    pub fn parse_prefixed(content: &str, prefix: &str) -> Result<Self> {
        match content.strip_prefix(prefix) {
            Some(rest) => Self::parse(rest),
            None => Err(Error::UnrecognizedCommand {
                input: content.to_string(),
            }),
        }
    }
}

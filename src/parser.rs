//! Turns a token sequence into a [`Command`]: redirection operators and their
//! filename operands are pulled out, everything else becomes `argv`.

use crate::command::{Command, RedirectMode, Redirection, StreamTarget};
use crate::lexer::{Token, TokenOrigin};
use log::debug;

/// Match a token's decoded text against the recognized redirection operators.
///
/// `>`/`1>` truncate stdout, `>>`/`1>>` append to it, `2>`/`2>>` do the same
/// for stderr. Anything else is an ordinary
/// argument, including lookalikes such as `2>>x` or `3>`.
fn operator(text: &str) -> Option<(StreamTarget, RedirectMode)> {
    match text {
        ">" | "1>" => Some((StreamTarget::Stdout, RedirectMode::Truncate)),
        ">>" | "1>>" => Some((StreamTarget::Stdout, RedirectMode::Append)),
        "2>" => Some((StreamTarget::Stderr, RedirectMode::Truncate)),
        "2>>" => Some((StreamTarget::Stderr, RedirectMode::Append)),
        _ => None,
    }
}

/// Scan tokens left to right and build the command.
///
/// An operator consumes the following token as its target filename. An
/// operator with nothing after it is dropped. Operators are recognized only
/// in unquoted tokens, so quoting an operator turns it into a literal
/// argument. Returns `None` when no argument tokens remain: a blank line or
/// a line made only of redirections runs nothing.
pub fn resolve(tokens: Vec<Token>) -> Option<Command> {
    let mut argv = Vec::new();
    let mut redirections = Vec::new();

    let mut tokens = tokens.into_iter();
    while let Some(token) = tokens.next() {
        if token.origin == TokenOrigin::Unquoted {
            if let Some((target, mode)) = operator(&token.text) {
                match tokens.next() {
                    Some(file) => redirections.push(Redirection {
                        target,
                        path: file.text,
                        mode,
                    }),
                    None => debug!("dropping trailing `{}` with no target file", token.text),
                }
                continue;
            }
        }
        argv.push(token.text);
    }

    if argv.is_empty() {
        return None;
    }
    Some(Command { argv, redirections })
}

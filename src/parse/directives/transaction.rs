//! `DATE txn|*|transaction ["description"] [; comment]` with a block of
//! `FROM AMOUNT ARROW TO` movement lines.

use super::{block_follows, source_of, unexpected, Machine};
use crate::parse::registry::{DirectiveHandler, DirectiveParser};
use crate::parse::token::{Token, TokenKind};
use crate::utils::{comment_text, parse_decimal, remove_quotes};
use crate::{Directive, Document, EntryHeader, Error, Movement, Transaction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum State {
    FirstLine,
    ExpectIndent,
    From,
    Amount,
    Arrow,
    To,
    LineEnd,
}

/// A transaction and the movement line being read.
#[derive(Debug)]
pub(crate) struct Draft {
    txn: Transaction,
    pending: Movement,
}

pub(crate) fn transition(
    state: State,
    token: &Token<'_>,
    next: &Token<'_>,
    draft: &mut Draft,
) -> Result<Option<State>, Error> {
    let txn = &mut draft.txn;
    let next_state = match (state, token.kind) {
        (State::FirstLine, TokenKind::String)
            if txn.description.is_empty() && txn.comment.is_empty() =>
        {
            txn.description = remove_quotes(token.text).to_string();
            State::FirstLine
        }
        (State::FirstLine, TokenKind::Comment) if txn.comment.is_empty() => {
            txn.comment = comment_text(token.text).to_string();
            State::FirstLine
        }
        (State::FirstLine, TokenKind::Newline) if block_follows(next) => State::ExpectIndent,
        (State::FirstLine, TokenKind::Newline | TokenKind::Eof) => return Ok(None),
        (State::ExpectIndent, TokenKind::Indent) => State::From,
        (State::From, TokenKind::Ident) => {
            draft.pending.from = token.text.to_string();
            State::Amount
        }
        (State::Amount, TokenKind::Number) => {
            draft.pending.amount = parse_decimal(token.text, &source_of(&txn.header, token))?;
            State::Arrow
        }
        (State::Arrow, TokenKind::Arrow) => {
            draft.pending.arrow = token.text.to_string();
            State::To
        }
        (State::To, TokenKind::Ident) => {
            let mut movement = std::mem::take(&mut draft.pending);
            movement.to = token.text.to_string();
            txn.movements.push(movement);
            State::LineEnd
        }
        (State::From | State::LineEnd, TokenKind::Comment) => {
            txn.header.comments.push(comment_text(token.text).to_string());
            State::LineEnd
        }
        (State::LineEnd, TokenKind::Newline) => State::From,
        (State::From | State::LineEnd, TokenKind::Dedent) => return Ok(None),
        _ => return Err(unexpected(&txn.header, token, "transaction")),
    };
    Ok(Some(next_state))
}

fn new_parser(header: EntryHeader, keyword: &str) -> Box<dyn DirectiveParser> {
    let draft = Draft {
        txn: Transaction {
            header,
            keyword: keyword.to_string(),
            description: String::new(),
            comment: String::new(),
            movements: Vec::new(),
        },
        pending: Movement::default(),
    };
    Machine::boxed(State::FirstLine, draft, transition, finish)
}

fn finish(draft: Draft) -> Directive {
    Directive::Transaction(draft.txn)
}

pub(crate) fn handler() -> DirectiveHandler {
    DirectiveHandler {
        new: new_parser,
        add: Document::push,
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::parse_text;
    use crate::{Decimal, ErrorType};

    #[test]
    fn movements_in_order() {
        let text = "2024-01-01 txn \"Pay day\" ; monthly\n    income:salary 1000.00 -> assets:checking\n    assets:checking 250 ⇒ liabilities:card ; card bill\n";
        let doc = parse_text(text).unwrap();
        let txn = &doc.transactions()[0];
        assert_eq!(txn.keyword, "txn");
        assert_eq!(txn.description, "Pay day");
        assert_eq!(txn.comment, "monthly");
        assert_eq!(txn.header.comments, ["card bill"]);
        assert_eq!(txn.movements.len(), 2);
        assert_eq!(txn.movements[0].from, "income:salary");
        assert_eq!(txn.movements[0].amount, Decimal::new(100000, 2));
        assert_eq!(txn.movements[1].arrow, "⇒");
        assert_eq!(txn.movements[1].to, "liabilities:card");
    }

    #[test]
    fn keyword_aliases() {
        let text = "2024-01-01 * \"a\"\n2024-01-02 transaction\n    x 1 -> y\n";
        let doc = parse_text(text).unwrap();
        let keywords: Vec<&str> = doc.transactions().iter().map(|t| t.keyword.as_str()).collect();
        assert_eq!(keywords, ["*", "transaction"]);
        assert!(doc.transactions()[0].movements.is_empty());
    }

    #[test]
    fn movement_parts_are_strictly_ordered() {
        let cases = [
            "2024-01-01 txn\n    food -> 3.51 assets:cash\n",
            "2024-01-01 txn\n    3.51 food -> assets:cash\n",
            "2024-01-01 txn\n    food 3.51 assets:cash\n",
            "2024-01-01 txn\n    food 3.51 ->\n",
        ];
        for text in cases {
            let err = parse_text(text).unwrap_err();
            assert_eq!(err.r#type, ErrorType::Syntax, "{}", text);
            assert!(err.msg.contains("transaction"), "{}", err.msg);
            assert_eq!(err.src.start.line, 2, "{}", text);
        }
    }

    #[test]
    fn amounts_are_kept_exactly() {
        let doc = parse_text("2024-01-01 txn\n    x 0.0000000000000000000000000001 -> y\n").unwrap();
        let amount = doc.transactions()[0].movements[0].amount;
        assert_eq!(amount, Decimal::new(1, 28));
        assert!(doc.to_text().contains("x 0.0000000000000000000000000001 -> y"));

        let err = parse_text("2024-01-01 txn\n    x 0.00000000000000000000000000001 -> y\n")
            .unwrap_err();
        assert_eq!(err.r#type, ErrorType::Syntax);
        assert!(err.msg.starts_with("Invalid number"), "{}", err.msg);
        assert_eq!(err.src.start.line, 2);
    }
}

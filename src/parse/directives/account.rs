//! `DATE open NAME [COMMODITY] ["description"] [; comment]`, optionally
//! followed by a block of `description "text"` lines. The detail keyword is
//! matched ignoring case.

use super::{block_follows, unexpected, Machine};
use crate::parse::registry::{DirectiveHandler, DirectiveParser};
use crate::parse::token::{Token, TokenKind};
use crate::utils::{comment_text, remove_quotes};
use crate::{Account, Directive, Document, EntryHeader, Error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum State {
    LookForName,
    LookForCommodity,
    IndentOrNew,
    ExpectIndent,
    DetailStart,
    DetailDescription,
    DetailEnd,
}

pub(crate) fn transition(
    state: State,
    token: &Token<'_>,
    next: &Token<'_>,
    account: &mut Account,
) -> Result<Option<State>, Error> {
    let next_state = match (state, token.kind) {
        (State::LookForName, TokenKind::Ident) => {
            account.name = token.text.to_string();
            State::LookForCommodity
        }
        (State::LookForCommodity, TokenKind::Ident) => {
            account.commodity = Some(token.text.to_string());
            State::IndentOrNew
        }
        (State::LookForCommodity | State::IndentOrNew, TokenKind::String)
            if account.description.is_empty() =>
        {
            account.description = remove_quotes(token.text).to_string();
            State::IndentOrNew
        }
        (State::LookForCommodity | State::IndentOrNew, TokenKind::Comment) => {
            account
                .header
                .comments
                .push(comment_text(token.text).to_string());
            State::IndentOrNew
        }
        (State::DetailStart | State::DetailEnd, TokenKind::Comment) => {
            account
                .header
                .comments
                .push(comment_text(token.text).to_string());
            State::DetailEnd
        }
        (State::LookForCommodity | State::IndentOrNew, TokenKind::Newline)
            if block_follows(next) =>
        {
            State::ExpectIndent
        }
        (
            State::LookForCommodity | State::IndentOrNew,
            TokenKind::Newline | TokenKind::Eof,
        ) => return Ok(None),
        (State::ExpectIndent, TokenKind::Indent) => State::DetailStart,
        (State::DetailStart, TokenKind::Ident)
            if token.text.eq_ignore_ascii_case("description") =>
        {
            State::DetailDescription
        }
        (State::DetailDescription, TokenKind::String) => {
            account.description = remove_quotes(token.text).to_string();
            State::DetailEnd
        }
        (State::DetailEnd, TokenKind::Newline) => State::DetailStart,
        (State::DetailStart | State::DetailEnd, TokenKind::Dedent) => return Ok(None),
        _ => return Err(unexpected(&account.header, token, "account")),
    };
    Ok(Some(next_state))
}

fn new_parser(header: EntryHeader, _keyword: &str) -> Box<dyn DirectiveParser> {
    let account = Account {
        header,
        name: String::new(),
        commodity: None,
        description: String::new(),
    };
    Machine::boxed(State::LookForName, account, transition, Directive::Account)
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
    use crate::ErrorType;
    use rstest::rstest;

    #[rstest]
    #[case::name_only("2024-01-01 open assets:cash\n", None, "")]
    #[case::with_commodity("2024-01-01 open assets:checking USD\n", Some("USD"), "")]
    #[case::inline_description(
        "2024-01-01 open assets:checking USD \"Checking\"\n",
        Some("USD"),
        "Checking"
    )]
    #[case::block_description(
        "2024-01-01 open assets:checking\n    description \"Checking Account\"\n",
        None,
        "Checking Account"
    )]
    #[case::capitalized_keyword(
        "2024-01-01 open assets:checking EUR\n    Description \"Savings\"\n",
        Some("EUR"),
        "Savings"
    )]
    fn open_forms(#[case] text: &str, #[case] commodity: Option<&str>, #[case] description: &str) {
        let doc = parse_text(text).unwrap();
        let account = &doc.accounts()[0];
        assert_eq!(account.commodity.as_deref(), commodity);
        assert_eq!(account.description, description);
    }

    #[test]
    fn comments_join_the_header() {
        let text = "; opened at the branch\n2024-01-01 open assets:cash GBP ; wallet\n    ; petty cash\n";
        let doc = parse_text(text).unwrap();
        assert_eq!(
            doc.accounts()[0].header.comments,
            ["opened at the branch", "wallet", "petty cash"]
        );
    }

    #[test]
    fn second_commodity_is_rejected() {
        let err = parse_text("2024-01-01 open assets:cash GBP USD\n").unwrap_err();
        assert_eq!(err.r#type, ErrorType::Syntax);
        assert!(err.msg.contains("Ident(USD)"), "{}", err.msg);
        assert!(err.msg.contains("account"), "{}", err.msg);
    }
}

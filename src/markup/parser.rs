//! Recursive-descent markup parser.
//!
//! Produces a declarative [`Node`] tree from textual markup. Inline text is
//! normalised as it is read: a run of character data under a `Text` element
//! appends to that element's `text` attribute, while a run under any other
//! element becomes a synthetic `Text` child, so downstream layers only ever
//! see text as attributes.

use logos::{Lexer, Logos};

use crate::markup::tokenizer::{ContentToken, TagToken};
use crate::tree::Node;

/// Markup parse failure, with a byte offset into the source.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParseError {
    #[error("unexpected input at byte {position}: {message}")]
    UnexpectedToken { position: usize, message: String },

    #[error("unexpected end of input: {0}")]
    UnexpectedEof(String),

    #[error("mismatched closing tag at byte {position}: expected </{expected}>, found </{found}>")]
    MismatchedClosingTag {
        position: usize,
        expected: String,
        found: String,
    },
}

/// Parse one markup document into its root node.
///
/// The document must contain exactly one root element; comments and
/// whitespace may surround it.
pub fn parse(input: &str) -> Result<Node, ParseError> {
    let mut lexer = ContentToken::lexer(input);

    let mut root = None;
    while let Some(token) = lexer.next() {
        match token {
            Ok(ContentToken::Comment) => {}
            Ok(ContentToken::Text) if lexer.slice().trim().is_empty() => {}
            Ok(ContentToken::TagStart) if root.is_none() => {
                let (rest, node) = parse_element(lexer.morph(), None)?;
                lexer = rest;
                root = Some(node);
            }
            _ => {
                return Err(ParseError::UnexpectedToken {
                    position: lexer.span().start,
                    message: if root.is_none() {
                        "expected an element".to_string()
                    } else {
                        "content after the root element".to_string()
                    },
                });
            }
        }
    }

    root.ok_or_else(|| ParseError::UnexpectedEof("document contains no element".to_string()))
}

/// Parse an element whose `<` has already been consumed. Returns the lexer
/// positioned just past the element.
fn parse_element<'s>(
    mut tag: Lexer<'s, TagToken>,
    parent: Option<&Node>,
) -> Result<(Lexer<'s, ContentToken>, Node), ParseError> {
    let name = expect_name(&mut tag, "expected an element name")?;
    let node = match parent {
        Some(parent) => parent.append(&name),
        None => Node::new(&name),
    };

    // Attributes until the tag ends.
    loop {
        match tag.next() {
            Some(Ok(TagToken::Name)) => {
                let key = tag.slice().to_string();
                expect(&mut tag, TagToken::Equals, "expected `=` after attribute name")?;
                match tag.next() {
                    Some(Ok(TagToken::Quoted)) => {
                        let quoted = tag.slice();
                        let value = decode_entities(&quoted[1..quoted.len() - 1]);
                        node.set_attribute(&key, value);
                    }
                    Some(_) => {
                        return Err(unexpected(&tag, "expected a quoted attribute value"));
                    }
                    None => {
                        return Err(ParseError::UnexpectedEof(format!(
                            "attribute `{key}` has no value",
                        )));
                    }
                }
            }
            Some(Ok(TagToken::SelfCloseEnd)) => return Ok((tag.morph(), node)),
            Some(Ok(TagToken::End)) => break,
            Some(_) => return Err(unexpected(&tag, "expected an attribute or `>`")),
            None => {
                return Err(ParseError::UnexpectedEof(format!(
                    "tag <{name}> is not closed",
                )));
            }
        }
    }

    // Children and character data until the matching closing tag.
    let mut content: Lexer<'_, ContentToken> = tag.morph();
    loop {
        match content.next() {
            Some(Ok(ContentToken::Comment)) => {}
            Some(Ok(ContentToken::Text)) => {
                let text = decode_entities(content.slice().trim());
                if !text.is_empty() {
                    absorb_text(&node, &text);
                }
            }
            Some(Ok(ContentToken::TagStart)) => {
                let (rest, _) = parse_element(content.morph(), Some(&node))?;
                content = rest;
            }
            Some(Ok(ContentToken::CloseTagStart)) => {
                let mut closing: Lexer<'_, TagToken> = content.morph();
                let found = expect_name(&mut closing, "expected a closing tag name")?;
                if found != name {
                    return Err(ParseError::MismatchedClosingTag {
                        position: closing.span().start,
                        expected: name,
                        found,
                    });
                }
                expect(&mut closing, TagToken::End, "expected `>` after closing tag name")?;
                return Ok((closing.morph(), node));
            }
            Some(Err(())) => return Err(unexpected(&content, "unrecognised content")),
            None => {
                return Err(ParseError::UnexpectedEof(format!(
                    "element <{name}> is not closed",
                )));
            }
        }
    }
}

/// Fold a run of character data into the tree.
fn absorb_text(node: &Node, text: &str) {
    if node.type_name() == "Text" {
        let existing = node.attribute_as::<String>("text").unwrap_or_default();
        if existing.is_empty() {
            node.set_attribute("text", text);
        } else {
            node.set_attribute("text", format!("{existing} {text}"));
        }
    } else {
        let child = node.append("Text");
        child.set_attribute("text", text);
    }
}

fn expect_name(tag: &mut Lexer<'_, TagToken>, message: &str) -> Result<String, ParseError> {
    match tag.next() {
        Some(Ok(TagToken::Name)) => Ok(tag.slice().to_string()),
        Some(_) => Err(unexpected(tag, message)),
        None => Err(ParseError::UnexpectedEof(message.to_string())),
    }
}

fn expect(
    tag: &mut Lexer<'_, TagToken>,
    token: TagToken,
    message: &str,
) -> Result<(), ParseError> {
    match tag.next() {
        Some(Ok(found)) if found == token => Ok(()),
        Some(_) => Err(unexpected(tag, message)),
        None => Err(ParseError::UnexpectedEof(message.to_string())),
    }
}

fn unexpected<'s, T: Logos<'s, Source = str>>(lexer: &Lexer<'s, T>, message: &str) -> ParseError {
    ParseError::UnexpectedToken {
        position: lexer.span().start,
        message: message.to_string(),
    }
}

const ENTITIES: &[(&str, char)] = &[
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&amp;", '&'),
    ("&quot;", '"'),
    ("&apos;", '\''),
];

fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match ENTITIES.iter().find(|(name, _)| rest.starts_with(name)) {
            Some((name, ch)) => {
                out.push(*ch);
                rest = &rest[name.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

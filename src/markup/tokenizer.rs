//! logos-based markup tokenizer.
//!
//! Markup lexing is modal: between tags, everything up to the next `<` is
//! text and whitespace is significant; inside a tag, whitespace merely
//! separates names and quoted values. The two modes are two token enums over
//! the same source, and the parser switches between them with
//! [`logos::Lexer::morph`].
//!
//! Token priority in logos is determined by longest match, so `</` lexes as
//! [`ContentToken::CloseTagStart`] rather than `<` followed by text, and a
//! comment beats [`ContentToken::TagStart`] at the same position.

use logos::Logos;

/// Tokens between tags.
#[derive(Logos, Debug, Clone, PartialEq)]
pub enum ContentToken {
    /// `<!-- ... -->`, dropped by the parser.
    #[regex(r"<!--([^-]|-[^-]|--[^>])*-->")]
    Comment,

    /// `</`, opening a closing tag.
    #[token("</")]
    CloseTagStart,

    /// `<`, opening a tag.
    #[token("<")]
    TagStart,

    /// A run of character data.
    #[regex(r"[^<]+")]
    Text,
}

/// Tokens inside a tag, from its `<` to its `>` or `/>`.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum TagToken {
    /// An element or attribute name.
    #[regex(r"[A-Za-z_][A-Za-z0-9_:.-]*")]
    Name,

    #[token("=")]
    Equals,

    /// A quoted attribute value, either quote style.
    #[regex(r#""[^"]*"|'[^']*'"#)]
    Quoted,

    /// `>`, ending an open or closing tag.
    #[token(">")]
    End,

    /// `/>`, ending a self-closing tag.
    #[token("/>")]
    SelfCloseEnd,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content_tokens(input: &str) -> Vec<(ContentToken, String)> {
        ContentToken::lexer(input)
            .spanned()
            .map(|(result, span)| (result.unwrap(), input[span].to_string()))
            .collect()
    }

    fn tag_tokens(input: &str) -> Vec<(TagToken, String)> {
        TagToken::lexer(input)
            .spanned()
            .map(|(result, span)| (result.unwrap(), input[span].to_string()))
            .collect()
    }

    // ── Content mode ─────────────────────────────────────────────────

    #[test]
    fn test_text_runs_to_next_tag() {
        let result = content_tokens("hello <");
        assert_eq!(result[0], (ContentToken::Text, "hello ".into()));
        assert_eq!(result[1], (ContentToken::TagStart, "<".into()));
    }

    #[test]
    fn test_close_tag_start_beats_tag_start() {
        let result = content_tokens("</");
        assert_eq!(result, vec![(ContentToken::CloseTagStart, "</".into())]);
    }

    #[test]
    fn test_comment_beats_tag_start() {
        let result = content_tokens("<!-- a - b -->x");
        assert_eq!(result[0], (ContentToken::Comment, "<!-- a - b -->".into()));
        assert_eq!(result[1], (ContentToken::Text, "x".into()));
    }

    // ── Tag mode ─────────────────────────────────────────────────────

    #[test]
    fn test_tag_tokens() {
        let result = tag_tokens(r#"Button id="ok" flex-grow='2'>"#);
        assert_eq!(result[0], (TagToken::Name, "Button".into()));
        assert_eq!(result[1], (TagToken::Name, "id".into()));
        assert_eq!(result[2], (TagToken::Equals, "=".into()));
        assert_eq!(result[3], (TagToken::Quoted, "\"ok\"".into()));
        assert_eq!(result[4], (TagToken::Name, "flex-grow".into()));
        assert_eq!(result[5], (TagToken::Equals, "=".into()));
        assert_eq!(result[6], (TagToken::Quoted, "'2'".into()));
        assert_eq!(result[7], (TagToken::End, ">".into()));
    }

    #[test]
    fn test_self_close_end_is_one_token() {
        let result = tag_tokens("Image/>");
        assert_eq!(result[0], (TagToken::Name, "Image".into()));
        assert_eq!(result[1], (TagToken::SelfCloseEnd, "/>".into()));
    }

    #[test]
    fn test_tag_whitespace_is_skipped() {
        let result = tag_tokens("  Window \n  width = \"300\"  >");
        assert_eq!(result.len(), 5);
        assert_eq!(result[0], (TagToken::Name, "Window".into()));
    }
}

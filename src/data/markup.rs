//! Minimal tag scanner for report pages with inline SVG.
//!
//! The pages are HTML, not XML: void elements are left open, scripts carry
//! bare `<` characters and attribute values may be unquoted. The scanner
//! only splits the text into start tags, end tags and text runs; deciding
//! what the tags mean is the walker's job.

/// One lexical unit of the document.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    Start(StartTag<'a>),
    End(&'a str),
    Text(&'a str),
}

/// An opening tag with its raw (undecoded) attribute values.
#[derive(Debug, Clone, PartialEq)]
pub struct StartTag<'a> {
    pub name: &'a str,
    pub attrs: Vec<(&'a str, &'a str)>,
    pub self_closing: bool,
}

impl<'a> StartTag<'a> {
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn attr(&self, key: &str) -> Option<&'a str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| *v)
    }

    /// Whitespace-separated tokens of the `class` attribute.
    pub fn classes(&self) -> impl Iterator<Item = &'a str> {
        self.attr("class").unwrap_or("").split_ascii_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }
}

/// Iterator over the tokens of a document.
pub struct Tokenizer<'a> {
    src: &'a str,
    pos: usize,
    /// Set after `<script>`/`<style>`: everything up to the matching close
    /// tag is one text run.
    raw_text_until: Option<&'static str>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            raw_text_until: None,
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn raw_text(&mut self, close: &'static str) -> Token<'a> {
        let rest = self.rest();
        let end = find_ignore_case(rest, close).unwrap_or(rest.len());
        self.pos += end;
        Token::Text(&rest[..end])
    }

    /// Skip past `terminator`, or to the end of input if it never shows up.
    fn skip_past(&mut self, terminator: &str) {
        match self.rest().find(terminator) {
            Some(i) => self.pos += i + terminator.len(),
            None => self.pos = self.src.len(),
        }
    }

    fn text_run(&mut self) -> Token<'a> {
        let rest = self.rest();
        // A '<' that does not open a tag is ordinary text.
        let mut end = rest.len();
        for (i, _) in rest.match_indices('<').filter(|&(i, _)| i > 0) {
            if opens_markup(&rest[i..]) {
                end = i;
                break;
            }
        }
        self.pos += end;
        Token::Text(&rest[..end])
    }

    fn end_tag(&mut self) -> Token<'a> {
        let rest = &self.rest()[2..];
        let name_len = rest
            .find(|c: char| c.is_ascii_whitespace() || c == '>')
            .unwrap_or(rest.len());
        let name = &rest[..name_len];
        self.pos += 2 + name_len;
        self.skip_past(">");
        Token::End(name)
    }

    fn start_tag(&mut self) -> Token<'a> {
        let bytes = self.src.as_bytes();
        let mut i = self.pos + 1;
        let name_start = i;
        while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' && bytes[i] != b'/' {
            i += 1;
        }
        let name = &self.src[name_start..i];

        let mut attrs = Vec::new();
        let mut self_closing = false;
        loop {
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i >= bytes.len() {
                break;
            }
            match bytes[i] {
                b'>' => {
                    i += 1;
                    break;
                }
                b'/' => {
                    self_closing = true;
                    i += 1;
                    continue;
                }
                _ => {}
            }
            self_closing = false;

            let key_start = i;
            while i < bytes.len()
                && !bytes[i].is_ascii_whitespace()
                && !matches!(bytes[i], b'=' | b'>' | b'/')
            {
                i += 1;
            }
            let key = &self.src[key_start..i];
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i < bytes.len() && bytes[i] == b'=' {
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                let value = if i < bytes.len() && (bytes[i] == b'"' || bytes[i] == b'\'') {
                    let quote = bytes[i];
                    let value_start = i + 1;
                    let value_end = bytes[value_start..]
                        .iter()
                        .position(|&b| b == quote)
                        .map(|p| value_start + p)
                        .unwrap_or(bytes.len());
                    i = (value_end + 1).min(bytes.len());
                    &self.src[value_start..value_end]
                } else {
                    let value_start = i;
                    while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                        i += 1;
                    }
                    &self.src[value_start..i]
                };
                attrs.push((key, value));
            } else if !key.is_empty() {
                attrs.push((key, ""));
            }
        }
        self.pos = i;

        if !self_closing {
            if name.eq_ignore_ascii_case("script") {
                self.raw_text_until = Some("</script");
            } else if name.eq_ignore_ascii_case("style") {
                self.raw_text_until = Some("</style");
            }
        }

        Token::Start(StartTag {
            name,
            attrs,
            self_closing,
        })
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        loop {
            if self.pos >= self.src.len() {
                return None;
            }
            if let Some(close) = self.raw_text_until.take() {
                let token = self.raw_text(close);
                if matches!(token, Token::Text(t) if t.is_empty()) {
                    continue;
                }
                return Some(token);
            }

            let rest = self.rest();
            if !rest.starts_with('<') || !opens_markup(rest) {
                return Some(self.text_run());
            }
            if rest.starts_with("<!--") {
                self.skip_past("-->");
                continue;
            }
            if rest.starts_with("<![CDATA[") {
                let body = &rest["<![CDATA[".len()..];
                // An unterminated section runs to the end of input.
                let (text, consumed) = match body.find("]]>") {
                    Some(end) => (&body[..end], end + "]]>".len()),
                    None => (body, body.len()),
                };
                self.pos += "<![CDATA[".len() + consumed;
                return Some(Token::Text(text));
            }
            if rest.starts_with("<!") || rest.starts_with("<?") {
                self.skip_past(">");
                continue;
            }
            if rest.starts_with("</") {
                return Some(self.end_tag());
            }
            return Some(self.start_tag());
        }
    }
}

fn opens_markup(s: &str) -> bool {
    let mut chars = s.chars().skip(1);
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => true,
        Some('/') => matches!(chars.next(), Some(c) if c.is_ascii_alphabetic()),
        Some('!') | Some('?') => true,
        _ => false,
    }
}

fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|w| w.eq_ignore_ascii_case(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(src: &str) -> Vec<Token<'_>> {
        Tokenizer::new(src).collect()
    }

    #[test]
    fn splits_tags_and_text() {
        let toks = tokens(r#"<g class="axis x"><text x=3>0.5</text></g>"#);
        assert_eq!(toks.len(), 5);
        match &toks[0] {
            Token::Start(tag) => {
                assert!(tag.is("g"));
                assert!(tag.has_class("axis"));
                assert!(tag.has_class("x"));
            }
            other => panic!("unexpected {other:?}"),
        }
        match &toks[1] {
            Token::Start(tag) => assert_eq!(tag.attr("x"), Some("3")),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(toks[2], Token::Text("0.5"));
        assert_eq!(toks[3], Token::End("text"));
        assert_eq!(toks[4], Token::End("g"));
    }

    #[test]
    fn self_closing_and_single_quotes() {
        let toks = tokens("<path d='M0 1 L2 3'/>");
        match &toks[0] {
            Token::Start(tag) => {
                assert!(tag.self_closing);
                assert_eq!(tag.attr("d"), Some("M0 1 L2 3"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn comments_doctype_and_scripts_are_skipped() {
        let src = "<!DOCTYPE html><!-- <g class=\"plot\"> --><script>if (a<b) { x = '</g>'; }</script><p>hi</p>";
        let toks = tokens(src);
        let starts: Vec<&str> = toks
            .iter()
            .filter_map(|t| match t {
                Token::Start(tag) => Some(tag.name),
                _ => None,
            })
            .collect();
        assert_eq!(starts, vec!["script", "p"]);
        assert!(toks.contains(&Token::End("script")));
        assert!(!toks.contains(&Token::End("g")));
    }

    #[test]
    fn cdata_bodies_are_text() {
        let toks = tokens("<desc><![CDATA[1:2]]></desc>");
        assert_eq!(toks[1], Token::Text("1:2"));
        assert_eq!(toks[2], Token::End("desc"));
    }

    #[test]
    fn unterminated_cdata_runs_to_end_of_input() {
        let toks = tokens("<g><![CDATA[a\u{1F600}");
        assert_eq!(toks.len(), 2);
        assert_eq!(toks[1], Token::Text("a\u{1F600}"));
    }

    #[test]
    fn stray_less_than_is_text() {
        let toks = tokens("a < b <b>c</b>");
        assert_eq!(toks[0], Token::Text("a < b "));
    }
}

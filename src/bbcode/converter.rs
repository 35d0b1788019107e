//! BBCode → HTML conversion.
//!
//!     The converter is a four-state machine driven one `char` at a time, with an explicit stack
//!     of open canonical tags:
//!
//!     Default:
//!         Outside any tag. `[` starts a tag, `<`, `>` and `&` are entity-escaped, everything
//!         else passes through.
//!
//!     TagOpenStart:
//!         Just saw `[`. A second `[` is an escaped bracket, `/` starts a closing tag, a letter
//!         or `*` starts an opening tag name.
//!
//!     TagOpenName:
//!         Scanning an opening tag name. `]` completes it, `=` and ` ` mark argument forms.
//!
//!     TagClose:
//!         Scanning a closing tag name. `]` closes the matching open tag and everything opened
//!         after it.
//!
//!     Anything the machine cannot make sense of is written back out as the literal source text
//!     it consumed, and scanning resumes in Default. Output is append-only: every rollback is a
//!     single push of known text, so [`Converter::take_output`] can hand out finished output
//!     while the input is still streaming in.
//!
//!     When the input ends, a partially scanned tag is handled per [`TrailingTagPolicy`] and
//!     every tag still open is closed, innermost first.

use super::config::{ConvertOptions, TrailingTagPolicy};
use super::tags::{self, ArgumentForm, OpenDecision};
use tracing::{debug, trace};

/// Convert BBCode to an HTML fragment with default options.
pub fn convert(input: &str) -> String {
    convert_with(input, &ConvertOptions::default())
}

/// Convert BBCode to an HTML fragment.
pub fn convert_with(input: &str, options: &ConvertOptions) -> String {
    let mut converter = Converter::new(options.clone());
    converter.push_str(input);
    converter.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Default,
    TagOpenStart,
    TagOpenName,
    TagClose,
}

/// Incremental converter. Feed it text with [`push_str`](Self::push_str) or
/// [`push_char`](Self::push_char), then call [`finish`](Self::finish).
#[derive(Debug)]
pub struct Converter {
    options: ConvertOptions,
    mode: Mode,
    name: String,
    stack: Vec<&'static str>,
    output: String,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            options,
            mode: Mode::Default,
            name: String::new(),
            stack: Vec::new(),
            output: String::new(),
        }
    }

    /// Number of tags currently open.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Canonical names of the open tags, outermost first.
    pub fn open_tags(&self) -> &[&'static str] {
        &self.stack
    }

    /// Take the output produced so far. Later output continues where this leaves off.
    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }

    pub fn push_str(&mut self, text: &str) {
        self.output.reserve(text.len());
        for ch in text.chars() {
            self.push_char(ch);
        }
    }

    pub fn push_char(&mut self, ch: char) {
        match self.mode {
            Mode::Default => self.on_default(ch),
            Mode::TagOpenStart => self.on_tag_open_start(ch),
            Mode::TagOpenName => self.on_tag_open_name(ch),
            Mode::TagClose => self.on_tag_close(ch),
        }
    }

    /// End the input: resolve any partial tag, close everything still open and return the
    /// remaining output.
    pub fn finish(mut self) -> String {
        if self.mode != Mode::Default {
            match self.options.trailing_tag {
                TrailingTagPolicy::Drop => {
                    debug!(mode = ?self.mode, name = %self.name, "dropping unterminated tag");
                }
                TrailingTagPolicy::Flush => self.flush_partial_tag(),
            }
            self.enter(Mode::Default);
        }

        while let Some(tag) = self.stack.pop() {
            self.write_close(tag);
        }
        self.output
    }

    fn on_default(&mut self, ch: char) {
        if ch == '[' {
            self.enter(Mode::TagOpenStart);
        } else {
            push_escaped(&mut self.output, ch);
        }
    }

    fn on_tag_open_start(&mut self, ch: char) {
        match ch {
            '[' => {
                self.output.push('[');
                self.enter(Mode::Default);
            }
            '/' => {
                self.name.clear();
                self.enter(Mode::TagClose);
            }
            ch if tags::is_name_start(ch) => {
                self.name.clear();
                self.name.push(ch);
                self.enter(Mode::TagOpenName);
            }
            ch => {
                self.output.push('[');
                push_escaped(&mut self.output, ch);
                self.enter(Mode::Default);
            }
        }
    }

    fn on_tag_open_name(&mut self, ch: char) {
        if ch == ']' {
            self.complete_open_tag();
            self.enter(Mode::Default);
        } else if let Some(form) = ArgumentForm::from_terminator(ch) {
            self.begin_arguments(form);
            self.enter(Mode::Default);
        } else if ch.is_ascii_alphabetic() {
            self.name.push(ch);
        } else {
            self.unparse_open(ch);
            self.enter(Mode::Default);
        }
    }

    fn on_tag_close(&mut self, ch: char) {
        if ch == ']' {
            self.complete_close_tag();
            self.enter(Mode::Default);
        } else if tags::is_name_start(ch) {
            self.name.push(ch);
        } else {
            self.output.push_str("[/");
            self.output.push_str(&self.name);
            push_escaped(&mut self.output, ch);
            self.enter(Mode::Default);
        }
    }

    fn complete_open_tag(&mut self) {
        let canonical = tags::canonical_name(&self.name);
        match tags::resolve_open(&canonical, &self.stack) {
            OpenDecision::Open(tag) => {
                self.stack.push(tag);
                self.output.push('<');
                self.output.push_str(tag);
                self.output.push('>');
            }
            OpenDecision::Misplaced => {
                debug!(tag = %canonical, open = ?self.stack, "tag not allowed here");
                self.unparse_open(']');
            }
            OpenDecision::Unrecognized => {
                debug!(tag = %canonical, "unrecognized tag");
                self.unparse_open(']');
            }
        }
    }

    // Argument grammars hook in here. Until one exists, every argument form is echoed.
    fn begin_arguments(&mut self, form: ArgumentForm) {
        let canonical = tags::canonical_name(&self.name);
        if tags::accepts_arguments(&canonical, form) {
            debug!(tag = %canonical, ?form, "tag arguments are not supported");
        }
        self.unparse_open(form.terminator());
    }

    fn complete_close_tag(&mut self) {
        let canonical = tags::canonical_name(&self.name);
        if !self.stack.iter().any(|open| *open == canonical) {
            debug!(tag = %canonical, "closing tag without matching open tag");
            self.output.push_str("[/");
            self.output.push_str(&self.name);
            self.output.push(']');
            return;
        }

        while let Some(tag) = self.stack.pop() {
            self.write_close(tag);
            if tag == canonical {
                break;
            }
            debug!(tag, closed_by = %canonical, "auto-closing unterminated tag");
        }
    }

    /// Write `[` + name + `last` back out as literal text.
    fn unparse_open(&mut self, last: char) {
        self.output.push('[');
        self.output.push_str(&self.name);
        push_escaped(&mut self.output, last);
    }

    fn flush_partial_tag(&mut self) {
        match self.mode {
            Mode::Default => {}
            Mode::TagOpenStart => self.output.push('['),
            Mode::TagOpenName => {
                self.output.push('[');
                self.output.push_str(&self.name);
            }
            Mode::TagClose => {
                self.output.push_str("[/");
                self.output.push_str(&self.name);
            }
        }
    }

    fn write_close(&mut self, tag: &str) {
        self.output.push_str("</");
        self.output.push_str(tag);
        self.output.push('>');
    }

    fn enter(&mut self, mode: Mode) {
        trace!(from = ?self.mode, to = ?mode, "mode transition");
        if mode == Mode::Default {
            self.name.clear();
        }
        self.mode = mode;
    }
}

fn push_escaped(output: &mut String, ch: char) {
    match ch {
        '<' => output.push_str("&lt;"),
        '>' => output.push_str("&gt;"),
        '&' => output.push_str("&amp;"),
        _ => output.push(ch),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flushing() -> ConvertOptions {
        ConvertOptions {
            trailing_tag: TrailingTagPolicy::Flush,
        }
    }

    #[test]
    fn escapes_reserved_characters() {
        assert_eq!(convert("a < b && c > d"), "a &lt; b &amp;&amp; c &gt; d");
    }

    #[test]
    fn passes_plain_text_through() {
        assert_eq!(convert("héllo wörld ✓"), "héllo wörld ✓");
        assert_eq!(convert(""), "");
    }

    #[test]
    fn balanced_tag() {
        assert_eq!(convert("[b]x[/b]"), "<b>x</b>");
    }

    #[test]
    fn closing_outer_tag_closes_inner() {
        assert_eq!(convert("[b][i]x[/b]"), "<b><i>x</i></b>");
    }

    #[test]
    fn escaped_bracket() {
        assert_eq!(convert("[[b]"), "[b]");
        assert_eq!(convert("[[b]]"), "[b]]");
    }

    #[test]
    fn list_item_needs_list() {
        assert_eq!(convert("[li]x[/li]"), "[li]x[/li]");
        assert_eq!(convert("[ul][li]x[/li][/ul]"), "<ul><li>x</li></ul>");
        assert_eq!(convert("[ol][*]x[/*][/ol]"), "<ol><li>x</li></ol>");
    }

    #[test]
    fn unmatched_close_is_literal() {
        let mut converter = Converter::new(ConvertOptions::default());
        converter.push_str("[/b]");
        assert_eq!(converter.depth(), 0);
        assert_eq!(converter.finish(), "[/b]");
    }

    #[test]
    fn open_tags_closed_at_end() {
        assert_eq!(convert("[b]x"), "<b>x</b>");
        assert_eq!(convert("[b][i][u]x"), "<b><i><u>x</u></i></b>");
    }

    #[test]
    fn alias_resolved_before_close_lookup() {
        assert_eq!(convert("[quote]x[/quote]"), "<blockquote>x</blockquote>");
        assert_eq!(convert("[code]x[/CODE]"), "<pre>x</pre>");
        assert_eq!(convert("[B]x[/b]"), "<b>x</b>");
    }

    #[test]
    fn unrecognized_tag_keeps_original_case() {
        assert_eq!(convert("[Foo]x[/Foo]"), "[Foo]x[/Foo]");
    }

    #[test]
    fn bare_argument_tags_are_literal() {
        assert_eq!(convert("[url]x[/url]"), "[url]x[/url]");
        assert_eq!(convert("[img]x[/img]"), "[img]x[/img]");
    }

    #[test]
    fn argument_forms_are_echoed() {
        assert_eq!(convert("[url=x]y"), "[url=x]y");
        assert_eq!(convert("[color=red]y"), "[color=red]y");
        assert_eq!(convert("[font a]y"), "[font a]y");
        assert_eq!(convert("[b=1]y"), "[b=1]y");
    }

    #[test]
    fn illegal_name_characters_roll_back() {
        assert_eq!(convert("[1]"), "[1]");
        assert_eq!(convert("[b1]"), "[b1]");
        assert_eq!(convert("[/b1]"), "[/b1]");
        assert_eq!(convert("[**]"), "[**]");
        assert_eq!(convert("[ b]"), "[ b]");
    }

    #[test]
    fn rollback_escapes_offending_character() {
        assert_eq!(convert("[<b>"), "[&lt;b&gt;");
        assert_eq!(convert("[b<i>"), "[b&lt;i&gt;");
        assert_eq!(convert("[/b&]"), "[/b&amp;]");
    }

    #[test]
    fn rolled_back_character_is_not_rescanned() {
        assert_eq!(convert("[b[i]x"), "[b[i]x");
    }

    #[test]
    fn trailing_partial_tag_dropped_by_default() {
        assert_eq!(convert("x["), "x");
        assert_eq!(convert("[b]x[/b"), "<b>x</b>");
        assert_eq!(convert("x[ur"), "x");
    }

    #[test]
    fn trailing_partial_tag_flushed_on_request() {
        assert_eq!(convert_with("x[", &flushing()), "x[");
        assert_eq!(convert_with("[b]x[/b", &flushing()), "<b>x[/b</b>");
        assert_eq!(convert_with("x[ur", &flushing()), "x[ur");
    }

    #[test]
    fn table_structure() {
        assert_eq!(
            convert("[table][tr][td]a[/td][th]b[/th][/tr][/table]"),
            "<table><tr><td>a</td><th>b</th></tr></table>"
        );
        assert_eq!(convert("[tr]x[/tr]"), "[tr]x[/tr]");
        assert_eq!(convert("[table][td]x"), "<table>[td]x</table>");
    }

    #[test]
    fn preformatted_content_is_still_markup() {
        assert_eq!(convert("[code][b]x[/b][/code]"), "<pre><b>x</b></pre>");
    }

    #[test]
    fn streaming_matches_one_shot() {
        let input = "[ul][*]one [b]bold[/*][*]two & <three>[/ul] tail [";
        let mut converter = Converter::new(ConvertOptions::default());
        let mut streamed = String::new();
        for chunk in input.as_bytes().chunks(3) {
            converter.push_str(std::str::from_utf8(chunk).expect("ascii input"));
            streamed.push_str(&converter.take_output());
        }
        streamed.push_str(&converter.finish());
        assert_eq!(streamed, convert(input));
    }

    #[test]
    fn open_tags_reports_stack() {
        let mut converter = Converter::new(ConvertOptions::default());
        converter.push_str("[table][tr][b]");
        assert_eq!(converter.open_tags(), &["table", "tr", "b"]);
        converter.push_str("[/tr]");
        assert_eq!(converter.open_tags(), &["table"]);
    }
}

//! Indentation check
//!
//! tree-sitter's Python scanner recovers from indentation mistakes without
//! leaving ERROR nodes, so block structure is checked here on the raw text.
//! Logical lines are tracked the way Python's tokenizer does: lines inside
//! brackets, strings or after a trailing backslash continue the previous one.

use crate::parser::SyntaxIssue;

const TAB_WIDTH: usize = 8;

/// Lexical state carried from one physical line to the next
#[derive(Default)]
struct Scanner {
    /// Open bracket depth
    depth: usize,
    /// Quote character and whether the string is triple-quoted
    string: Option<(char, bool)>,
    /// Previous line ended with an explicit `\` join
    joined: bool,
    /// Last significant character of the current logical line
    last: Option<char>,
}

impl Scanner {
    fn at_logical_start(&self) -> bool {
        self.depth == 0 && self.string.is_none() && !self.joined
    }

    fn scan_line(&mut self, line: &str) {
        let chars: Vec<char> = line.chars().collect();
        let mut escaped_eol = false;
        let mut i = 0;
        self.joined = false;

        while i < chars.len() {
            let c = chars[i];

            if let Some((quote, triple)) = self.string {
                if c == '\\' {
                    escaped_eol = i + 1 == chars.len();
                    i += 2;
                    continue;
                }
                if c == quote {
                    if !triple {
                        self.string = None;
                        self.last = Some(c);
                    } else if chars.get(i + 1) == Some(&quote) && chars.get(i + 2) == Some(&quote) {
                        self.string = None;
                        self.last = Some(c);
                        i += 3;
                        continue;
                    }
                }
                i += 1;
                continue;
            }

            match c {
                '#' => break,
                '"' | '\'' => {
                    self.last = Some(c);
                    if chars.get(i + 1) == Some(&c) && chars.get(i + 2) == Some(&c) {
                        self.string = Some((c, true));
                        i += 3;
                        continue;
                    }
                    self.string = Some((c, false));
                }
                '(' | '[' | '{' => self.depth += 1,
                ')' | ']' | '}' => self.depth = self.depth.saturating_sub(1),
                '\\' if i + 1 == chars.len() => self.joined = true,
                _ => {}
            }

            if !c.is_whitespace() && c != '\\' {
                self.last = Some(c);
            }
            i += 1;
        }

        // An unterminated single-quoted string ends with its line
        if matches!(self.string, Some((_, false))) && !escaped_eol {
            self.string = None;
        }
    }

    /// Takes the last character of a finished logical line
    fn finish_logical_line(&mut self) -> Option<char> {
        if self.at_logical_start() {
            self.last.take()
        } else {
            None
        }
    }
}

/// Indentation width of a line, with tabs advancing to the next tab stop
fn indent_width(line: &str) -> (usize, &str) {
    let mut width = 0;
    for (pos, c) in line.char_indices() {
        match c {
            ' ' => width += 1,
            '\t' => width = (width / TAB_WIDTH + 1) * TAB_WIDTH,
            '\x0c' => width = 0,
            _ => return (width, &line[pos..]),
        }
    }
    (width, "")
}

fn issue(row: usize, message: &str) -> SyntaxIssue {
    SyntaxIssue {
        line: row + 1,
        message: message.to_string(),
    }
}

/// Returns the first indentation error in `source`
pub(crate) fn indentation_issue(source: &str) -> Option<SyntaxIssue> {
    let mut levels = vec![0usize];
    let mut scanner = Scanner::default();
    let mut opens_block = false;

    for (row, line) in source.lines().enumerate() {
        if scanner.at_logical_start() {
            let (width, rest) = indent_width(line);
            if rest.is_empty() || rest.starts_with('#') {
                continue;
            }

            let current = levels.last().copied().unwrap_or_default();
            if width > current {
                if !opens_block {
                    return Some(issue(row, "unexpected indent"));
                }
                levels.push(width);
            } else if opens_block {
                return Some(issue(row, "expected an indented block"));
            } else if width < current {
                while levels.last().is_some_and(|&level| level > width) {
                    levels.pop();
                }
                if levels.last() != Some(&width) {
                    return Some(issue(
                        row,
                        "unindent does not match any outer indentation level",
                    ));
                }
            }
            opens_block = false;
        }

        scanner.scan_line(line);

        if let Some(last) = scanner.finish_logical_line() {
            opens_block = last == ':';
        }
    }

    None
}

//! Source locations and the low-level character cursor shared by the readers

use std::fmt;

/// Region of the input text covered by a token or statement
///
/// Lines and columns are 1-based. A default `Loc` (all zeros) stands for
/// "no location" and displays as `?`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Loc {
    /// First line of the region
    pub line: u32,
    /// First column of the region
    pub col: u32,
    /// Last line of the region
    pub end_line: u32,
    /// Last column of the region
    pub end_col: u32,
}

impl Loc {
    /// Smallest region covering both `self` and `other`
    pub fn merge(self, other: Loc) -> Loc {
        if self == Loc::default() {
            return other;
        }
        if other == Loc::default() {
            return self;
        }
        let (line, col) = if (other.line, other.col) < (self.line, self.col) {
            (other.line, other.col)
        } else {
            (self.line, self.col)
        };
        let (end_line, end_col) = if (other.end_line, other.end_col) > (self.end_line, self.end_col)
        {
            (other.end_line, other.end_col)
        } else {
            (self.end_line, self.end_col)
        };
        Loc {
            line,
            col,
            end_line,
            end_col,
        }
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Loc::default() {
            write!(f, "?")
        } else if self.line == self.end_line {
            if self.col == self.end_col {
                write!(f, "{}:{}", self.line, self.col)
            } else {
                write!(f, "{}:{}-{}", self.line, self.col, self.end_col)
            }
        } else {
            write!(
                f,
                "{}:{}-{}:{}",
                self.line, self.col, self.end_line, self.end_col
            )
        }
    }
}

/// Byte cursor over the input text, tracking line and column positions
pub(crate) struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    line: u32,
    col: u32,
    tok_line: u32,
    tok_col: u32,
    last_line: u32,
    last_col: u32,
}

impl<'a> Cursor<'a> {
    pub fn new(text: &'a str) -> Cursor<'a> {
        Cursor {
            bytes: text.as_bytes(),
            pos: 0,
            line: 1,
            col: 1,
            tok_line: 1,
            tok_col: 1,
            last_line: 1,
            last_col: 1,
        }
    }

    /// Next byte without consuming it
    pub fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    /// Consume and return the next byte
    pub fn bump(&mut self) -> Option<u8> {
        let b = *self.bytes.get(self.pos)?;
        self.last_line = self.line;
        self.last_col = self.col;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(b)
    }

    /// Remember the current position as the start of the next token
    pub fn mark(&mut self) {
        self.tok_line = self.line;
        self.tok_col = self.col;
    }

    /// Region from the last `mark` to the last consumed byte
    pub fn loc(&self) -> Loc {
        Loc {
            line: self.tok_line,
            col: self.tok_col,
            end_line: self.last_line,
            end_col: self.last_col,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_positions() {
        let mut cur = Cursor::new("ab\ncd");
        cur.mark();
        assert_eq!(cur.bump(), Some(b'a'));
        assert_eq!(cur.bump(), Some(b'b'));
        assert_eq!(
            cur.loc(),
            Loc {
                line: 1,
                col: 1,
                end_line: 1,
                end_col: 2
            }
        );
        assert_eq!(cur.bump(), Some(b'\n'));
        cur.mark();
        assert_eq!(cur.bump(), Some(b'c'));
        assert_eq!(cur.loc().line, 2);
        assert_eq!(cur.loc().col, 1);
        assert_eq!(cur.bump(), Some(b'd'));
        assert_eq!(cur.bump(), None);
    }

    #[test]
    fn test_loc_display() {
        let l = Loc {
            line: 3,
            col: 5,
            end_line: 3,
            end_col: 9,
        };
        assert_eq!(format!("{}", l), "3:5-9");
        assert_eq!(format!("{}", Loc::default()), "?");
    }

    #[test]
    fn test_loc_merge() {
        let a = Loc {
            line: 1,
            col: 4,
            end_line: 1,
            end_col: 6,
        };
        let b = Loc {
            line: 1,
            col: 10,
            end_line: 1,
            end_col: 12,
        };
        let m = a.merge(b);
        assert_eq!(m.col, 4);
        assert_eq!(m.end_col, 12);
        assert_eq!(Loc::default().merge(a), a);
    }
}

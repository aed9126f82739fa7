//! Blif format support
//!
//! Reads the subset of the blif format describing a single gate-level model:
//! `.model`, `.inputs`, `.outputs`, `.names` with its cube rows, `.gate`
//! resolved against a [`CellLibrary`], `.latch` with an optional reset value
//! and `.end`. Timing statements are skipped, `.exdc` sections are skipped
//! through their `.end`.

use std::io::Read;

use log::trace;

use crate::io::diag::Diagnostics;
use crate::io::ident::IdentTable;
use crate::io::scan::{Cursor, Loc};
use crate::library::{CellLibrary, CellPin};
use crate::model::{Model, ModelBuilder, NodeId, ResetKind};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token {
    Newline,
    Eq,
    Model,
    Inputs,
    Outputs,
    Names,
    Latch,
    Gate,
    End,
    Exdc,
    /// Timing statements and `.clock`, skipped line by line
    Ignored,
    Str(String),
    Eof,
}

fn check_word(word: String, dot: bool) -> Token {
    if !dot {
        return Token::Str(word);
    }
    match word.as_str() {
        "model" => Token::Model,
        "inputs" => Token::Inputs,
        "outputs" => Token::Outputs,
        "names" => Token::Names,
        "latch" => Token::Latch,
        "gate" => Token::Gate,
        "end" => Token::End,
        "exdc" => Token::Exdc,
        "clock" | "area" | "delay" | "wire" | "wire_load_slope" | "input_arrival"
        | "default_input_arrival" | "output_required" | "default_output_required"
        | "input_drive" | "default_input_drive" | "output_load" | "default_output_load" => {
            Token::Ignored
        }
        _ => Token::Str(word),
    }
}

struct Scanner<'a> {
    cur: Cursor<'a>,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Scanner<'a> {
        Scanner {
            cur: Cursor::new(text),
        }
    }

    fn read_token(&mut self) -> (Token, Loc) {
        let tok = self.scan();
        let loc = self.cur.loc();
        trace!("blif token {:?} at {}", tok, loc);
        (tok, loc)
    }

    fn scan(&mut self) -> Token {
        let mut word = String::new();
        let mut dot = false;
        loop {
            self.cur.mark();
            let c = match self.cur.bump() {
                None => return Token::Eof,
                Some(c) => c,
            };
            match c {
                b' ' | b'\t' | b'\r' => continue,
                b'\n' => return Token::Newline,
                b'=' => return Token::Eq,
                b'.' => {
                    dot = true;
                    break;
                }
                b'#' => loop {
                    match self.cur.bump() {
                        None => return Token::Eof,
                        Some(b'\n') => return Token::Newline,
                        Some(_) => (),
                    }
                },
                b'/' if self.cur.peek() == Some(b'*') => {
                    self.cur.bump();
                    // unterminated block comment degrades to end of input
                    if !self.skip_block_comment() {
                        return Token::Eof;
                    }
                }
                b'\\' => match self.cur.bump() {
                    None => return Token::Eof,
                    Some(b'\n') => continue,
                    Some(c) => {
                        word.push(c as char);
                        break;
                    }
                },
                c => {
                    word.push(c as char);
                    break;
                }
            }
        }
        loop {
            match self.cur.peek() {
                None | Some(b' ' | b'\t' | b'\r' | b'\n' | b'=' | b'#') => break,
                Some(b'\\') => {
                    self.cur.bump();
                    match self.cur.bump() {
                        None => break,
                        // a word can continue on the next line
                        Some(b'\n') => (),
                        Some(c) => word.push(c as char),
                    }
                }
                Some(c) => {
                    self.cur.bump();
                    word.push(c as char);
                }
            }
        }
        check_word(word, dot)
    }

    fn skip_block_comment(&mut self) -> bool {
        loop {
            match self.cur.bump() {
                None => return false,
                Some(b'*') if self.cur.peek() == Some(b'/') => {
                    self.cur.bump();
                    return true;
                }
                Some(_) => (),
            }
        }
    }
}

struct Parser<'a> {
    scanner: Scanner<'a>,
    library: Option<&'a dyn CellLibrary>,
    idents: IdentTable,
    builder: ModelBuilder,
    diags: Diagnostics,
    tok: Token,
    loc: Loc,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str, library: Option<&'a dyn CellLibrary>) -> Parser<'a> {
        Parser {
            scanner: Scanner::new(text),
            library,
            idents: IdentTable::new(),
            builder: ModelBuilder::new(),
            diags: Diagnostics::new(),
            tok: Token::Newline,
            loc: Loc::default(),
        }
    }

    fn next_token(&mut self) {
        let (tok, loc) = self.scanner.read_token();
        self.tok = tok;
        self.loc = loc;
    }

    fn find_id(&mut self, name: &str, loc: Loc) -> NodeId {
        self.idents.find_or_create(name, loc, &mut self.builder)
    }

    /// Consume the rest of the current line after an error
    fn skip_line(&mut self) {
        loop {
            match self.tok {
                Token::Newline => {
                    self.next_token();
                    return;
                }
                Token::Eof => return,
                _ => self.next_token(),
            }
        }
    }

    fn read(mut self) -> Result<Model, Diagnostics> {
        self.next_token();
        if !self.read_model_header() {
            return Err(self.diags);
        }
        loop {
            match self.tok {
                Token::Newline => self.next_token(),
                Token::Eof => {
                    self.diags
                        .warning(self.loc, "unexpected end of file, '.end' assumed");
                    break;
                }
                Token::End => {
                    self.next_token();
                    self.skip_after_end();
                    break;
                }
                Token::Model => {
                    self.diags.error(self.loc, "multiple '.model' statements");
                    self.skip_line();
                }
                Token::Inputs => {
                    if !self.read_inputs() {
                        self.skip_line();
                    }
                }
                Token::Outputs => {
                    if !self.read_outputs() {
                        self.skip_line();
                    }
                }
                Token::Names => {
                    if !self.read_names() {
                        self.skip_line();
                    }
                }
                Token::Gate => {
                    if !self.read_gate() {
                        self.skip_line();
                    }
                }
                Token::Latch => {
                    if !self.read_latch() {
                        self.skip_line();
                    }
                }
                Token::Exdc => self.skip_exdc(),
                Token::Ignored => self.skip_line(),
                Token::Eq | Token::Str(_) => {
                    self.diags.error(self.loc, "syntax error");
                    self.skip_line();
                }
            }
        }
        self.idents.check_defined(&self.builder, &mut self.diags);
        if self.diags.has_errors() {
            Err(self.diags)
        } else {
            Ok(self.builder.finish())
        }
    }

    fn read_model_header(&mut self) -> bool {
        loop {
            match self.tok {
                Token::Newline => self.next_token(),
                Token::Model => break,
                _ => {
                    self.diags.error(self.loc, "no '.model' statement");
                    return false;
                }
            }
        }
        self.next_token();
        match &self.tok {
            Token::Str(name) => {
                let name = name.clone();
                self.builder.set_name(&name);
            }
            _ => {
                self.diags
                    .error(self.loc, "model name expected after '.model'");
                return false;
            }
        }
        self.next_token();
        if self.tok != Token::Newline {
            self.diags
                .error(self.loc, "newline expected after model name");
            return false;
        }
        self.next_token();
        true
    }

    /// Define a name, or report where it was already defined
    fn define(&mut self, id: NodeId, loc: Loc) -> bool {
        match self.idents.mark_defined(id, loc) {
            Ok(()) => true,
            Err(prev) => {
                let name = self.builder.name_of(id).to_string();
                self.diags.error(
                    loc,
                    format!(
                        "{}: defined more than once, previous definition at {}",
                        name, prev
                    ),
                );
                false
            }
        }
    }

    fn read_inputs(&mut self) -> bool {
        let mut n = 0;
        loop {
            self.next_token();
            match &self.tok {
                Token::Str(name) => {
                    let name = name.clone();
                    let loc = self.loc;
                    let id = self.find_id(&name, loc);
                    if self.define(id, loc) {
                        self.builder.set_input(id);
                    }
                    n += 1;
                }
                Token::Newline => {
                    if n == 0 {
                        self.diags.warning(self.loc, "empty '.inputs' statement");
                    }
                    self.next_token();
                    return true;
                }
                _ => {
                    self.diags
                        .error(self.loc, "syntax error in '.inputs' statement");
                    return false;
                }
            }
        }
    }

    fn read_outputs(&mut self) -> bool {
        let mut n = 0;
        loop {
            self.next_token();
            match &self.tok {
                Token::Str(name) => {
                    let name = name.clone();
                    let loc = self.loc;
                    let id = self.find_id(&name, loc);
                    self.builder.add_output(id);
                    n += 1;
                }
                Token::Newline => {
                    if n == 0 {
                        self.diags.warning(self.loc, "empty '.outputs' statement");
                    }
                    self.next_token();
                    return true;
                }
                _ => {
                    self.diags
                        .error(self.loc, "syntax error in '.outputs' statement");
                    return false;
                }
            }
        }
    }

    fn read_names(&mut self) -> bool {
        let mut ids = Vec::new();
        let mut names_loc = self.loc;
        loop {
            self.next_token();
            match &self.tok {
                Token::Str(name) => {
                    let name = name.clone();
                    names_loc = self.loc;
                    let id = self.find_id(&name, names_loc);
                    ids.push(id);
                }
                Token::Newline => break,
                _ => {
                    self.diags
                        .error(self.loc, "syntax error in '.names' statement");
                    return false;
                }
            }
        }
        if ids.is_empty() {
            self.diags.error(self.loc, "empty '.names' statement");
            self.next_token();
            return true;
        }
        let num_inputs = ids.len() - 1;
        let mut cubes: Vec<String> = Vec::new();
        let mut output = '-';
        loop {
            self.next_token();
            match &self.tok {
                Token::Newline => continue,
                Token::Str(row) => {
                    let row = row.clone();
                    let row_loc = self.loc;
                    if num_inputs == 0 {
                        // no fanin, the row is the output value alone
                        if !self.read_output_value(&row, row_loc, &mut output) {
                            return false;
                        }
                        cubes.push(String::new());
                    } else {
                        if row.len() != num_inputs
                            || !row.chars().all(|c| matches!(c, '0' | '1' | '-'))
                        {
                            self.diags.error(
                                row_loc,
                                "input cube does not fit the number of fanins",
                            );
                            return false;
                        }
                        self.next_token();
                        let value = match &self.tok {
                            Token::Str(value) => value.clone(),
                            _ => {
                                self.diags.error(self.loc, "output value expected");
                                return false;
                            }
                        };
                        let value_loc = self.loc;
                        if !self.read_output_value(&value, value_loc, &mut output) {
                            return false;
                        }
                        cubes.push(row);
                    }
                    self.next_token();
                    if self.tok != Token::Newline {
                        self.diags
                            .error(self.loc, "newline expected after cube row");
                        return false;
                    }
                }
                // the next statement starts here
                _ => break,
            }
        }
        let gate = ids[num_inputs];
        if self.define(gate, names_loc) {
            let cover = self.builder.intern_cover(num_inputs, cubes, output);
            ids.truncate(num_inputs);
            self.builder.set_cover(gate, ids, cover);
        }
        true
    }

    fn read_output_value(&mut self, value: &str, loc: Loc, output: &mut char) -> bool {
        let c = match value {
            "0" => '0',
            "1" => '1',
            _ => {
                self.diags.error(loc, "illegal output value in cube row");
                return false;
            }
        };
        if *output != '-' && *output != c {
            self.diags
                .error(loc, "inconsistent output values in '.names' statement");
            return false;
        }
        *output = c;
        true
    }

    fn read_gate(&mut self) -> bool {
        let gate_loc = self.loc;
        let Some(library) = self.library else {
            self.diags
                .error(gate_loc, "'.gate' statement without a cell library");
            return false;
        };
        self.next_token();
        let cell_name = match &self.tok {
            Token::Str(name) => name.clone(),
            _ => {
                self.diags.error(self.loc, "cell name expected");
                return false;
            }
        };
        let Some(cell) = library.find_cell(&cell_name) else {
            self.diags
                .error(self.loc, format!("{}: no such cell", cell_name));
            return false;
        };
        let num_inputs = library.num_inputs(cell);
        let mut fanin: Vec<Option<NodeId>> = vec![None; num_inputs];
        let mut out: Option<(NodeId, Loc)> = None;
        let mut num_pins = 0;
        loop {
            self.next_token();
            match &self.tok {
                Token::Str(pin_name) => {
                    let pin_name = pin_name.clone();
                    let pin_loc = self.loc;
                    let Some(pin) = library.find_pin(cell, &pin_name) else {
                        self.diags.error(
                            pin_loc,
                            format!("{}: no such pin of cell {}", pin_name, cell_name),
                        );
                        return false;
                    };
                    self.next_token();
                    if self.tok != Token::Eq {
                        self.diags.error(self.loc, "'=' expected after pin name");
                        return false;
                    }
                    self.next_token();
                    let net = match &self.tok {
                        Token::Str(net) => net.clone(),
                        _ => {
                            self.diags.error(self.loc, "net name expected after '='");
                            return false;
                        }
                    };
                    let net_loc = self.loc;
                    let id = self.find_id(&net, net_loc);
                    match pin {
                        CellPin::Output => {
                            if out.is_some() {
                                self.diags.error(
                                    pin_loc,
                                    format!("{}: pin bound more than once", pin_name),
                                );
                                return false;
                            }
                            out = Some((id, net_loc));
                        }
                        CellPin::Input(i) => {
                            if fanin[i].is_some() {
                                self.diags.error(
                                    pin_loc,
                                    format!("{}: pin bound more than once", pin_name),
                                );
                                return false;
                            }
                            fanin[i] = Some(id);
                        }
                    }
                    num_pins += 1;
                }
                Token::Newline => {
                    if num_pins == 0 {
                        self.diags.error(self.loc, "pin bindings expected");
                        self.next_token();
                        return true;
                    }
                    let Some((gate, out_loc)) = out else {
                        self.diags.error(
                            gate_loc.merge(self.loc),
                            format!("output pin of cell {} is not bound", cell_name),
                        );
                        self.next_token();
                        return true;
                    };
                    let fanin: Option<Vec<NodeId>> = fanin.iter().copied().collect();
                    let Some(fanin) = fanin else {
                        self.diags.error(
                            gate_loc.merge(self.loc),
                            format!("missing input pin bindings for cell {}", cell_name),
                        );
                        self.next_token();
                        return true;
                    };
                    if self.define(gate, out_loc) {
                        self.builder.set_cell(gate, fanin, cell);
                    }
                    self.next_token();
                    return true;
                }
                _ => {
                    self.diags
                        .error(self.loc, "syntax error in '.gate' statement");
                    return false;
                }
            }
        }
    }

    fn read_latch(&mut self) -> bool {
        self.next_token();
        let data = match &self.tok {
            Token::Str(name) => {
                let name = name.clone();
                self.find_id(&name, self.loc)
            }
            _ => {
                self.diags
                    .error(self.loc, "data input name expected after '.latch'");
                return false;
            }
        };
        self.next_token();
        let (out, out_loc) = match &self.tok {
            Token::Str(name) => {
                let name = name.clone();
                (self.find_id(&name, self.loc), self.loc)
            }
            _ => {
                self.diags
                    .error(self.loc, "output name expected in '.latch' statement");
                return false;
            }
        };
        self.next_token();
        let mut reset = ResetKind::None;
        if let Token::Str(value) = &self.tok {
            reset = match value.as_str() {
                "0" => ResetKind::Clear,
                "1" => ResetKind::Preset,
                // 2 and 3 are don't-care initial values
                "2" | "3" => ResetKind::None,
                _ => {
                    self.diags
                        .error(self.loc, "illegal reset value in '.latch' statement");
                    return false;
                }
            };
            self.next_token();
        }
        if self.tok != Token::Newline {
            self.diags
                .error(self.loc, "syntax error in '.latch' statement");
            return false;
        }
        if self.define(out, out_loc) {
            self.builder.set_dff(out, data, reset);
            self.builder.ensure_clock();
            if reset != ResetKind::None {
                self.builder.ensure_reset();
            }
        }
        self.next_token();
        true
    }

    /// Skip a don't-care section through its '.end'
    fn skip_exdc(&mut self) {
        loop {
            match self.tok {
                Token::End => {
                    self.next_token();
                    return;
                }
                Token::Eof => return,
                _ => self.next_token(),
            }
        }
    }

    fn skip_after_end(&mut self) {
        let mut warned = false;
        loop {
            match self.tok {
                Token::Eof => return,
                Token::Newline => self.next_token(),
                _ => {
                    if !warned {
                        self.diags
                            .warning(self.loc, "content after '.end' is ignored");
                        warned = true;
                    }
                    self.next_token();
                }
            }
        }
    }
}

/// Read a netlist in blif format
///
/// `.gate` statements are rejected; use [`read_blif_with_library`] to
/// resolve them.
pub fn read_blif<R: Read>(r: R) -> Result<Model, Diagnostics> {
    read_blif_impl(r, None)
}

/// Read a netlist in blif format, resolving `.gate` statements against a
/// cell library
pub fn read_blif_with_library<R: Read>(
    r: R,
    library: &dyn CellLibrary,
) -> Result<Model, Diagnostics> {
    read_blif_impl(r, Some(library))
}

fn read_blif_impl<R: Read>(
    mut r: R,
    library: Option<&dyn CellLibrary>,
) -> Result<Model, Diagnostics> {
    let mut text = String::new();
    if let Err(e) = r.read_to_string(&mut text) {
        let mut diags = Diagnostics::new();
        diags.failure(format!("error reading input: {}", e));
        return Err(diags);
    }
    Parser::new(&text, library).read()
}

//! Bench format support (ISCAS89 circuits)
//!
//! Reads `INPUT(n)`, `OUTPUT(n)`, `n = DFF(d)` and `n = GATE(a, b, ...)`
//! statements with case-insensitive keywords. Extension gate keywords can be
//! registered on a [`BenchReader`] with a [`GateHandler`]; `MUX` is built in
//! and expands to inverters, and gates and a final or gate.

use std::io::Read;

use fxhash::FxHashMap;
use log::trace;

use crate::io::diag::Diagnostics;
use crate::io::ident::IdentTable;
use crate::io::scan::{Cursor, Loc};
use crate::model::{GateType, Model, ModelBuilder, NodeId, ResetKind};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token {
    Lpar,
    Rpar,
    Comma,
    Eq,
    Input,
    Output,
    Dff,
    Gate(GateType),
    /// Keyword registered with a gate handler, by handler index
    ExGate(usize),
    Name(String),
    Eof,
}

fn check_word(word: String, keywords: &FxHashMap<String, usize>) -> Token {
    let upper = word.to_ascii_uppercase();
    match upper.as_str() {
        "INPUT" => Token::Input,
        "OUTPUT" => Token::Output,
        "DFF" => Token::Dff,
        "BUF" | "BUFF" => Token::Gate(GateType::Buf),
        "NOT" | "INV" => Token::Gate(GateType::Not),
        "AND" => Token::Gate(GateType::And),
        "NAND" => Token::Gate(GateType::Nand),
        "OR" => Token::Gate(GateType::Or),
        "NOR" => Token::Gate(GateType::Nor),
        "XOR" => Token::Gate(GateType::Xor),
        "XNOR" => Token::Gate(GateType::Xnor),
        "CONST0" => Token::Gate(GateType::Const0),
        "CONST1" => Token::Gate(GateType::Const1),
        _ => match keywords.get(&upper) {
            Some(&handler) => Token::ExGate(handler),
            None => Token::Name(word),
        },
    }
}

struct Scanner<'a> {
    cur: Cursor<'a>,
    keywords: &'a FxHashMap<String, usize>,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str, keywords: &'a FxHashMap<String, usize>) -> Scanner<'a> {
        Scanner {
            cur: Cursor::new(text),
            keywords,
        }
    }

    fn read_token(&mut self) -> (Token, Loc) {
        let tok = self.scan();
        let loc = self.cur.loc();
        trace!("bench token {:?} at {}", tok, loc);
        (tok, loc)
    }

    fn scan(&mut self) -> Token {
        let mut word = String::new();
        loop {
            self.cur.mark();
            let c = match self.cur.bump() {
                None => return Token::Eof,
                Some(c) => c,
            };
            match c {
                b' ' | b'\t' | b'\r' | b'\n' => continue,
                b'(' => return Token::Lpar,
                b')' => return Token::Rpar,
                b',' => return Token::Comma,
                b'=' => return Token::Eq,
                b'#' => loop {
                    match self.cur.bump() {
                        None => return Token::Eof,
                        Some(b'\n') => break,
                        Some(_) => (),
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
                None
                | Some(
                    b' ' | b'\t' | b'\r' | b'\n' | b'#' | b'(' | b')' | b',' | b'=',
                ) => break,
                Some(c) => {
                    self.cur.bump();
                    word.push(c as char);
                }
            }
        }
        check_word(word, self.keywords)
    }
}

/// Parser for an extension gate statement
///
/// The handler is called with the statement's output already resolved and
/// the token stream positioned right after the keyword; it parses the
/// argument list and defines the output. Returning `false` triggers
/// statement-level error recovery.
pub trait GateHandler {
    /// Parse the remainder of a `name = KEYWORD(...)` statement
    fn read(&self, ctx: &mut BenchContext, first_loc: Loc, output: NodeId) -> bool;
}

/// Bench format reader with registered extension gate keywords
///
/// `MUX` is registered by default.
pub struct BenchReader {
    handlers: Vec<Box<dyn GateHandler>>,
    keywords: FxHashMap<String, usize>,
}

impl Default for BenchReader {
    fn default() -> BenchReader {
        BenchReader::new()
    }
}

impl BenchReader {
    /// Create a reader with the default handlers
    pub fn new() -> BenchReader {
        let mut ret = BenchReader {
            handlers: Vec::new(),
            keywords: FxHashMap::default(),
        };
        ret.register("MUX", Box::new(MuxHandler));
        ret
    }

    /// Bind a gate keyword to a handler; matching is case-insensitive
    ///
    /// Registering an already bound keyword replaces its handler. The
    /// built-in gate types cannot be overridden.
    pub fn register(&mut self, keyword: &str, handler: Box<dyn GateHandler>) {
        let index = self.handlers.len();
        self.handlers.push(handler);
        self.keywords.insert(keyword.to_ascii_uppercase(), index);
    }

    /// Read a netlist in bench format
    pub fn read<R: Read>(&self, mut r: R) -> Result<Model, Diagnostics> {
        let mut text = String::new();
        if let Err(e) = r.read_to_string(&mut text) {
            let mut diags = Diagnostics::new();
            diags.failure(format!("error reading input: {}", e));
            return Err(diags);
        }
        BenchContext {
            scanner: Scanner::new(&text, &self.keywords),
            reader: self,
            idents: IdentTable::new(),
            builder: ModelBuilder::new(),
            diags: Diagnostics::new(),
        }
        .read()
    }
}

/// Read a netlist in bench format with the default reader
pub fn read_bench<R: Read>(r: R) -> Result<Model, Diagnostics> {
    BenchReader::new().read(r)
}

/// Parsing state handed to gate handlers
pub struct BenchContext<'a> {
    scanner: Scanner<'a>,
    reader: &'a BenchReader,
    idents: IdentTable,
    builder: ModelBuilder,
    diags: Diagnostics,
}

impl<'a> BenchContext<'a> {
    fn read(mut self) -> Result<Model, Diagnostics> {
        loop {
            let (tok, loc) = self.scanner.read_token();
            match tok {
                Token::Eof => break,
                Token::Input => {
                    if !self.read_input(loc) {
                        self.recover();
                    }
                }
                Token::Output => {
                    if !self.read_output() {
                        self.recover();
                    }
                }
                Token::Name(name) => {
                    let id = self.find_id(&name, loc);
                    if !self.read_gate(loc, id) {
                        self.recover();
                    }
                }
                _ => {
                    self.diags.error(loc, "syntax error");
                    self.recover();
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

    /// Skip to the closing parenthesis of the broken statement
    fn recover(&mut self) {
        loop {
            let (tok, _) = self.scanner.read_token();
            if tok == Token::Rpar || tok == Token::Eof {
                return;
            }
        }
    }

    fn find_id(&mut self, name: &str, loc: Loc) -> NodeId {
        self.idents.find_or_create(name, loc, &mut self.builder)
    }

    fn expect(&mut self, want: Token) -> Option<Loc> {
        let (tok, loc) = self.scanner.read_token();
        if tok == want {
            Some(loc)
        } else {
            let what = match want {
                Token::Lpar => "'('",
                Token::Rpar => "')'",
                Token::Comma => "','",
                Token::Eq => "'='",
                _ => "token",
            };
            self.diags
                .error(loc, format!("syntax error: {} expected", what));
            None
        }
    }

    fn expect_name(&mut self) -> Option<(NodeId, Loc)> {
        let (tok, loc) = self.scanner.read_token();
        match tok {
            Token::Name(name) => Some((self.find_id(&name, loc), loc)),
            _ => {
                self.diags.error(loc, "syntax error: name expected");
                None
            }
        }
    }

    /// Parse `( name )`
    fn parse_name(&mut self) -> Option<(NodeId, Loc)> {
        self.expect(Token::Lpar)?;
        let (id, _) = self.expect_name()?;
        let loc = self.expect(Token::Rpar)?;
        Some((id, loc))
    }

    /// Parse `( name, name, ... )`, possibly empty
    ///
    /// Returns the arguments and the location of the closing parenthesis.
    pub fn parse_name_list(&mut self) -> Option<(Vec<NodeId>, Loc)> {
        self.expect(Token::Lpar)?;
        let (mut tok, mut loc) = self.scanner.read_token();
        if tok == Token::Rpar {
            return Some((Vec::new(), loc));
        }
        let mut ids = Vec::new();
        loop {
            match tok {
                Token::Name(name) => ids.push(self.find_id(&name, loc)),
                _ => {
                    self.diags.error(loc, "syntax error: name expected");
                    return None;
                }
            }
            let (sep, sep_loc) = self.scanner.read_token();
            match sep {
                Token::Rpar => return Some((ids, sep_loc)),
                Token::Comma => (tok, loc) = self.scanner.read_token(),
                _ => {
                    self.diags
                        .error(sep_loc, "syntax error: ')' or ',' expected");
                    return None;
                }
            }
        }
    }

    /// Name of a node, for diagnostics and derived node names
    pub fn node_name(&self, id: NodeId) -> &str {
        self.builder.name_of(id)
    }

    /// Record an error diagnostic
    pub fn error(&mut self, loc: Loc, message: impl Into<String>) {
        self.diags.error(loc, message);
    }

    /// Create a gate node that has no name of its own in the file
    pub fn add_gate(&mut self, name: String, gate: GateType, fanin: Vec<NodeId>) -> NodeId {
        self.builder.add_gate(name, gate, fanin)
    }

    /// Install a gate on the statement's output name
    ///
    /// Reports a redefinition if the name already has a definition; the
    /// first definition wins.
    pub fn define_gate(
        &mut self,
        id: NodeId,
        loc: Loc,
        gate: GateType,
        fanin: Vec<NodeId>,
    ) -> bool {
        match self.idents.mark_defined(id, loc) {
            Ok(()) => {
                self.builder.set_gate(id, gate, fanin);
                true
            }
            Err(prev) => {
                let name = self.builder.name_of(id).to_string();
                self.diags.error(
                    loc,
                    format!(
                        "{}: defined more than once, previous definition at {}",
                        name, prev
                    ),
                );
                true
            }
        }
    }

    fn read_input(&mut self, first_loc: Loc) -> bool {
        let Some((id, last_loc)) = self.parse_name() else {
            return false;
        };
        let loc = first_loc.merge(last_loc);
        match self.idents.mark_defined(id, loc) {
            Ok(()) => {
                self.builder.set_input(id);
            }
            Err(prev) => {
                let name = self.builder.name_of(id).to_string();
                self.diags.error(
                    loc,
                    format!(
                        "{}: defined more than once, previous definition at {}",
                        name, prev
                    ),
                );
            }
        }
        true
    }

    fn read_output(&mut self) -> bool {
        let Some((id, _)) = self.parse_name() else {
            return false;
        };
        self.builder.add_output(id);
        true
    }

    fn read_gate(&mut self, first_loc: Loc, id: NodeId) -> bool {
        if self.expect(Token::Eq).is_none() {
            return false;
        }
        if self.idents.is_defined(id) {
            let name = self.builder.name_of(id).to_string();
            let prev = self.idents.def_loc(id).unwrap_or_default();
            self.diags.error(
                first_loc,
                format!(
                    "{}: defined more than once, previous definition at {}",
                    name, prev
                ),
            );
            return false;
        }
        let (tok, gate_loc) = self.scanner.read_token();
        match tok {
            Token::Gate(gate) => {
                let Some((fanin, last_loc)) = self.parse_name_list() else {
                    return false;
                };
                let loc = first_loc.merge(last_loc);
                if !gate.valid_arity(fanin.len()) {
                    let name = self.builder.name_of(id).to_string();
                    self.diags.error(
                        loc,
                        format!("{}: wrong number of inputs for {}", name, gate),
                    );
                    return true;
                }
                self.define_gate(id, loc, gate, fanin)
            }
            Token::Dff => {
                let Some((data, last_loc)) = self.parse_name() else {
                    return false;
                };
                let loc = first_loc.merge(last_loc);
                if self.idents.mark_defined(id, loc).is_ok() {
                    self.builder.set_dff(id, data, ResetKind::None);
                    self.builder.ensure_clock();
                }
                true
            }
            Token::ExGate(handler) => {
                let reader = self.reader;
                reader.handlers[handler].read(self, first_loc, id)
            }
            _ => {
                self.diags
                    .error(gate_loc, "syntax error: gate type expected");
                false
            }
        }
    }
}

/// Built-in handler expanding `MUX` statements into primitive gates
///
/// An n input mux takes nc control bits followed by 2^nc data bits, with
/// n = nc + 2^nc. It expands to an inverter per control bit, an and gate per
/// data bit selecting it, and an or gate on the statement's name.
struct MuxHandler;

impl GateHandler for MuxHandler {
    fn read(&self, ctx: &mut BenchContext, first_loc: Loc, output: NodeId) -> bool {
        let Some((inputs, last_loc)) = ctx.parse_name_list() else {
            return false;
        };
        let loc = first_loc.merge(last_loc);
        let num_inputs = inputs.len();
        let mut nc = 0usize;
        let mut nd = 1usize;
        while nc + nd < num_inputs {
            nc += 1;
            nd <<= 1;
        }
        if nc + nd != num_inputs {
            let name = ctx.node_name(output).to_string();
            ctx.error(loc, format!("{}: wrong number of inputs for MUX", name));
            return true;
        }
        let name = ctx.node_name(output).to_string();
        let mut inverted = Vec::with_capacity(nc);
        for (j, &control) in inputs[..nc].iter().enumerate() {
            inverted.push(ctx.add_gate(format!("{}$not{}", name, j), GateType::Not, vec![control]));
        }
        let mut selected = Vec::with_capacity(nd);
        for p in 0..nd {
            let mut fanin = Vec::with_capacity(nc + 1);
            for j in 0..nc {
                fanin.push(if p & (1 << j) != 0 {
                    inputs[j]
                } else {
                    inverted[j]
                });
            }
            fanin.push(inputs[nc + p]);
            selected.push(ctx.add_gate(format!("{}$and{}", name, p), GateType::And, fanin));
        }
        ctx.define_gate(output, loc, GateType::Or, selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeKind;

    #[test]
    fn test_basic_circuit() {
        let src = "# a small circuit\n\
                   INPUT(x)\n\
                   INPUT(y)\n\
                   OUTPUT(z)\n\
                   z = AND(x, y)\n";
        let m = read_bench(src.as_bytes()).unwrap();
        assert_eq!(m.nb_inputs(), 2);
        assert_eq!(m.nb_outputs(), 1);
        let z = m.find("z").unwrap();
        assert_eq!(m.gates(), &[z]);
        assert_eq!(m.node(z).kind(), NodeKind::Gate { gate: GateType::And });
        let x = m.find("x").unwrap();
        let y = m.find("y").unwrap();
        assert_eq!(m.node(z).fanin(), &[x, y]);
    }

    #[test]
    fn test_case_insensitive_keywords() {
        let src = "input(a)\noutput(y)\ny = nand(a, a)\n";
        let m = read_bench(src.as_bytes()).unwrap();
        let y = m.find("y").unwrap();
        assert_eq!(
            m.node(y).kind(),
            NodeKind::Gate {
                gate: GateType::Nand
            }
        );
    }

    #[test]
    fn test_gate_aliases() {
        let src = "INPUT(a)\nOUTPUT(y)\nx = INV(a)\ny = BUFF(x)\n";
        let m = read_bench(src.as_bytes()).unwrap();
        let x = m.find("x").unwrap();
        assert_eq!(m.node(x).kind(), NodeKind::Gate { gate: GateType::Not });
    }

    #[test]
    fn test_constants() {
        let src = "OUTPUT(y)\ny = CONST1()\n";
        let m = read_bench(src.as_bytes()).unwrap();
        let y = m.find("y").unwrap();
        assert_eq!(m.node(y).fanin().len(), 0);
    }

    #[test]
    fn test_dff_and_clock() {
        let src = "INPUT(d)\nOUTPUT(q)\nq = DFF(d)\n";
        let m = read_bench(src.as_bytes()).unwrap();
        assert_eq!(m.nb_dffs(), 1);
        assert!(m.clock().is_some());
        assert!(m.reset().is_none());
        let q = m.find("q").unwrap();
        assert_eq!(
            m.node(q).kind(),
            NodeKind::Dff {
                reset: ResetKind::None
            }
        );
    }

    #[test]
    fn test_forward_reference() {
        let src = "INPUT(a)\nOUTPUT(y)\ny = NOT(x)\nx = BUF(a)\n";
        let m = read_bench(src.as_bytes()).unwrap();
        let x = m.find("x").unwrap();
        let y = m.find("y").unwrap();
        assert_eq!(m.gates(), &[x, y]);
    }

    #[test]
    fn test_mux_expansion() {
        let src = "INPUT(c0)\nINPUT(c1)\n\
                   INPUT(d0)\nINPUT(d1)\nINPUT(d2)\nINPUT(d3)\n\
                   OUTPUT(y)\n\
                   y = MUX(c0, c1, d0, d1, d2, d3)\n";
        let m = read_bench(src.as_bytes()).unwrap();
        let y = m.find("y").unwrap();
        assert_eq!(m.node(y).kind(), NodeKind::Gate { gate: GateType::Or });
        assert_eq!(m.node(y).fanin().len(), 4);
        let mut nb_not = 0;
        let mut nb_and = 0;
        for &id in m.gates() {
            match m.node(id).kind() {
                NodeKind::Gate {
                    gate: GateType::Not,
                } => nb_not += 1,
                NodeKind::Gate {
                    gate: GateType::And,
                } => {
                    nb_and += 1;
                    assert_eq!(m.node(id).fanin().len(), 3);
                }
                _ => (),
            }
        }
        assert_eq!(nb_not, 2);
        assert_eq!(nb_and, 4);
        // and0 selects d0 when both controls are 0
        let and0 = m.find("y$and0").unwrap();
        let d0 = m.find("d0").unwrap();
        assert_eq!(m.node(and0).fanin()[2], d0);
        assert_eq!(
            m.node(and0).fanin()[0],
            m.find("y$not0").unwrap()
        );
    }

    #[test]
    fn test_mux_trivial() {
        // a single data input needs no control bit
        let src = "INPUT(d)\nOUTPUT(y)\ny = MUX(d)\n";
        let m = read_bench(src.as_bytes()).unwrap();
        let y = m.find("y").unwrap();
        let d = m.find("d").unwrap();
        assert_eq!(m.node(y).kind(), NodeKind::Gate { gate: GateType::Or });
        let and0 = m.node(y).fanin()[0];
        assert_eq!(m.node(and0).fanin(), &[d]);
    }

    #[test]
    fn test_mux_bad_arity() {
        let src = "INPUT(a)\nINPUT(b)\nINPUT(c)\nINPUT(d)\nINPUT(e)\n\
                   OUTPUT(y)\n\
                   y = MUX(a, b, c, d, e)\n";
        let diags = read_bench(src.as_bytes()).unwrap_err();
        assert!(diags
            .iter()
            .any(|d| d.message.contains("wrong number of inputs for MUX")));
    }

    #[test]
    fn test_gate_arity_check() {
        let src = "INPUT(a)\nINPUT(b)\nOUTPUT(y)\ny = NOT(a, b)\n";
        let diags = read_bench(src.as_bytes()).unwrap_err();
        assert!(diags
            .iter()
            .any(|d| d.message.contains("wrong number of inputs for NOT")));
    }

    #[test]
    fn test_redefinition() {
        let src = "INPUT(a)\nINPUT(b)\nOUTPUT(y)\ny = NOT(a)\ny = BUF(b)\n";
        let diags = read_bench(src.as_bytes()).unwrap_err();
        assert_eq!(diags.len(), 1);
        let d = diags.iter().next().unwrap();
        assert!(d.message.contains("y: defined more than once"));
    }

    #[test]
    fn test_undefined_output() {
        let src = "INPUT(a)\nOUTPUT(y)\n";
        let diags = read_bench(src.as_bytes()).unwrap_err();
        assert_eq!(diags.len(), 1);
        assert!(diags.iter().next().unwrap().message.contains("y: undefined"));
    }

    #[test]
    fn test_error_recovery() {
        // the broken statement is reported, the rest is still read
        let src = "INPUT(a)\nOUTPUT(y)\nOUTPUT(z)\ny = NOT(\nz = BUF(a)\n";
        let diags = read_bench(src.as_bytes()).unwrap_err();
        assert!(diags.has_errors());
        assert!(diags.iter().any(|d| d.message.contains("y: undefined")));
    }

    #[test]
    fn test_custom_handler() {
        // a keyword that reads one name and installs a buffer
        struct AliasHandler;
        impl GateHandler for AliasHandler {
            fn read(&self, ctx: &mut BenchContext, first_loc: Loc, output: NodeId) -> bool {
                let Some((inputs, last_loc)) = ctx.parse_name_list() else {
                    return false;
                };
                let loc = first_loc.merge(last_loc);
                if inputs.len() != 1 {
                    let name = ctx.node_name(output).to_string();
                    ctx.error(loc, format!("{}: wrong number of inputs for ALIAS", name));
                    return true;
                }
                ctx.define_gate(output, loc, GateType::Buf, inputs)
            }
        }
        let mut reader = BenchReader::new();
        reader.register("ALIAS", Box::new(AliasHandler));
        let src = "INPUT(a)\nOUTPUT(y)\ny = alias(a)\n";
        let m = reader.read(src.as_bytes()).unwrap();
        let y = m.find("y").unwrap();
        assert_eq!(m.node(y).kind(), NodeKind::Gate { gate: GateType::Buf });
    }
}

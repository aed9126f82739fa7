//! Identifier resolution with forward references
//!
//! Both readers allow a name to be used before the statement that defines it.
//! The table interns each name to its node, remembers where it was first
//! referenced and where it was defined, and reports the names that were
//! referenced but never defined once the whole file has been read.

use fxhash::FxHashMap;

use crate::io::diag::Diagnostics;
use crate::io::scan::Loc;
use crate::model::{ModelBuilder, NodeId};

struct IdentRecord {
    ref_loc: Loc,
    def_loc: Option<Loc>,
}

/// Name to node mapping with definition tracking
///
/// Records are indexed by node, with gaps for the anonymous nodes created
/// outside the table.
#[derive(Default)]
pub(crate) struct IdentTable {
    dict: FxHashMap<String, NodeId>,
    records: Vec<Option<IdentRecord>>,
}

impl IdentTable {
    pub fn new() -> IdentTable {
        IdentTable::default()
    }

    /// Node for a name, reserving a fresh node on first sight
    pub fn find_or_create(&mut self, name: &str, loc: Loc, builder: &mut ModelBuilder) -> NodeId {
        if let Some(&id) = self.dict.get(name) {
            return id;
        }
        let id = builder.new_node(name);
        self.dict.insert(name.to_string(), id);
        if self.records.len() <= id.index() {
            self.records.resize_with(id.index() + 1, || None);
        }
        self.records[id.index()] = Some(IdentRecord {
            ref_loc: loc,
            def_loc: None,
        });
        id
    }

    /// Whether the name has already been defined
    pub fn is_defined(&self, id: NodeId) -> bool {
        matches!(
            self.records.get(id.index()),
            Some(Some(IdentRecord {
                def_loc: Some(_),
                ..
            }))
        )
    }

    /// Where the name was defined, if it was
    pub fn def_loc(&self, id: NodeId) -> Option<Loc> {
        self.records.get(id.index())?.as_ref()?.def_loc
    }

    /// Record the defining statement of a name
    ///
    /// On redefinition the previous definition location is returned and the
    /// record is left untouched, so the first definition wins.
    pub fn mark_defined(&mut self, id: NodeId, loc: Loc) -> Result<(), Loc> {
        let rec = self.records[id.index()]
            .as_mut()
            .expect("not an interned name");
        match rec.def_loc {
            Some(prev) => Err(prev),
            None => {
                rec.def_loc = Some(loc);
                Ok(())
            }
        }
    }

    /// Report every name that was referenced but never defined
    pub fn check_defined(&self, builder: &ModelBuilder, diags: &mut Diagnostics) {
        for (index, rec) in self.records.iter().enumerate() {
            if let Some(rec) = rec {
                if rec.def_loc.is_none() {
                    let id = NodeId::from_index(index);
                    diags.error(
                        rec.ref_loc,
                        format!("{}: undefined", builder.name_of(id)),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(line: u32, col: u32) -> Loc {
        Loc {
            line,
            col,
            end_line: line,
            end_col: col,
        }
    }

    #[test]
    fn test_interning() {
        let mut builder = ModelBuilder::new();
        let mut idents = IdentTable::new();
        let a = idents.find_or_create("a", loc(1, 1), &mut builder);
        let b = idents.find_or_create("b", loc(1, 3), &mut builder);
        assert_ne!(a, b);
        assert_eq!(idents.find_or_create("a", loc(2, 1), &mut builder), a);
    }

    #[test]
    fn test_redefinition() {
        let mut builder = ModelBuilder::new();
        let mut idents = IdentTable::new();
        let a = idents.find_or_create("a", loc(1, 1), &mut builder);
        assert!(!idents.is_defined(a));
        assert_eq!(idents.mark_defined(a, loc(2, 1)), Ok(()));
        assert!(idents.is_defined(a));
        assert_eq!(idents.mark_defined(a, loc(3, 1)), Err(loc(2, 1)));
        assert_eq!(idents.def_loc(a), Some(loc(2, 1)));
    }

    #[test]
    fn test_undefined_check() {
        let mut builder = ModelBuilder::new();
        let mut idents = IdentTable::new();
        let a = idents.find_or_create("a", loc(1, 1), &mut builder);
        let _b = idents.find_or_create("b", loc(1, 3), &mut builder);
        idents.mark_defined(a, loc(2, 1)).unwrap();
        let mut diags = Diagnostics::new();
        idents.check_defined(&builder, &mut diags);
        assert_eq!(diags.len(), 1);
        assert!(diags.has_errors());
        let d = diags.iter().next().unwrap();
        assert!(d.message.contains("b"));
    }
}

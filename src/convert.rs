//! Conversion of a model into a consumer's own network representation
//!
//! Consumers implement [`NetworkBuilder`] and call [`build_network`]; the
//! walk follows the model's stored order, so every fanin net exists before
//! the gates that read it. Flip-flop outputs are created before any
//! combinational logic and their data inputs are bound last, which lets a
//! flip-flop read logic that transitively depends on it.

use crate::expr::Expr;
use crate::library::CellId;
use crate::model::{GateType, Model, NodeKind, ResetKind};

/// Sink interface for [`build_network`]
pub trait NetworkBuilder {
    /// The consumer's representation of a net
    type Net: Copy;

    /// Create a primary input
    fn create_input(&mut self, name: &str) -> Self::Net;

    /// Mark a net as a primary output
    fn create_output(&mut self, name: &str, source: Self::Net);

    /// Create a flip-flop output; the data input is bound later with
    /// [`bind_dff_data`](NetworkBuilder::bind_dff_data)
    fn create_dff(
        &mut self,
        name: &str,
        clock: Option<Self::Net>,
        reset: Option<(Self::Net, ResetKind)>,
    ) -> Self::Net;

    /// Bind the data input of a flip-flop created earlier
    fn bind_dff_data(&mut self, dff: Self::Net, data: Self::Net);

    /// Create a primitive gate
    fn create_gate(&mut self, name: &str, gate: GateType, fanin: &[Self::Net]) -> Self::Net;

    /// Create a gate computing an expression over its fanins
    fn create_expr(&mut self, name: &str, expr: &Expr, fanin: &[Self::Net]) -> Self::Net;

    /// Create a library cell instance
    fn create_cell(&mut self, name: &str, cell: CellId, fanin: &[Self::Net]) -> Self::Net;
}

/// Replay a model into a network builder
pub fn build_network<B: NetworkBuilder>(model: &Model, builder: &mut B) {
    let mut nets: Vec<Option<B::Net>> = vec![None; model.nb_nodes()];
    let clock = model.clock().map(|id| {
        let net = builder.create_input(model.node(id).name());
        nets[id.index()] = Some(net);
        net
    });
    let reset = model.reset().map(|id| {
        let net = builder.create_input(model.node(id).name());
        nets[id.index()] = Some(net);
        net
    });
    for &id in model.inputs() {
        nets[id.index()] = Some(builder.create_input(model.node(id).name()));
    }
    for &id in model.dffs() {
        let node = model.node(id);
        let NodeKind::Dff { reset: kind } = node.kind() else {
            unreachable!()
        };
        let reset = match kind {
            ResetKind::None => None,
            kind => reset.map(|net| (net, kind)),
        };
        nets[id.index()] = Some(builder.create_dff(node.name(), clock, reset));
    }
    for &id in model.gates() {
        let node = model.node(id);
        let fanin: Vec<B::Net> = node
            .fanin()
            .iter()
            .map(|f| nets[f.index()].expect("fanin created before its reader"))
            .collect();
        let net = match node.kind() {
            NodeKind::Gate { gate } => builder.create_gate(node.name(), gate, &fanin),
            NodeKind::Cover { cover } => {
                let expr = model.cover(cover).expr();
                builder.create_expr(node.name(), &expr, &fanin)
            }
            NodeKind::Cell { cell } => builder.create_cell(node.name(), cell, &fanin),
            NodeKind::Input | NodeKind::Dff { .. } => unreachable!(),
        };
        nets[id.index()] = Some(net);
    }
    for &id in model.dffs() {
        let node = model.node(id);
        let data = nets[node.fanin()[0].index()].expect("dff data created");
        let dff = nets[id.index()].expect("dff created");
        builder.bind_dff_data(dff, data);
    }
    for &id in model.outputs() {
        let source = nets[id.index()].expect("output source created");
        builder.create_output(model.node(id).name(), source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{read_bench, read_blif};

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
        next: usize,
    }

    impl Recorder {
        fn next_net(&mut self) -> usize {
            self.next += 1;
            self.next - 1
        }
    }

    impl NetworkBuilder for Recorder {
        type Net = usize;

        fn create_input(&mut self, name: &str) -> usize {
            self.calls.push(format!("input {}", name));
            self.next_net()
        }

        fn create_output(&mut self, name: &str, source: usize) {
            self.calls.push(format!("output {} <- {}", name, source));
        }

        fn create_dff(
            &mut self,
            name: &str,
            clock: Option<usize>,
            reset: Option<(usize, ResetKind)>,
        ) -> usize {
            self.calls.push(format!(
                "dff {} clock={} reset={}",
                name,
                clock.is_some(),
                reset.is_some()
            ));
            self.next_net()
        }

        fn bind_dff_data(&mut self, dff: usize, data: usize) {
            self.calls.push(format!("bind {} <- {}", dff, data));
        }

        fn create_gate(&mut self, name: &str, gate: GateType, fanin: &[usize]) -> usize {
            self.calls.push(format!("gate {} {} {:?}", gate, name, fanin));
            self.next_net()
        }

        fn create_expr(&mut self, name: &str, expr: &Expr, fanin: &[usize]) -> usize {
            self.calls
                .push(format!("expr {} = {} {:?}", name, expr, fanin));
            self.next_net()
        }

        fn create_cell(&mut self, name: &str, cell: CellId, fanin: &[usize]) -> usize {
            self.calls
                .push(format!("cell {} {} {:?}", cell.index(), name, fanin));
            self.next_net()
        }
    }

    #[test]
    fn test_combinational() {
        let src = "INPUT(a)\nINPUT(b)\nOUTPUT(y)\nx = AND(a, b)\ny = NOT(x)\n";
        let m = read_bench(src.as_bytes()).unwrap();
        let mut rec = Recorder::default();
        build_network(&m, &mut rec);
        assert_eq!(
            rec.calls,
            vec![
                "input a",
                "input b",
                "gate AND x [0, 1]",
                "gate NOT y [2]",
                "output y <- 3",
            ]
        );
    }

    #[test]
    fn test_dff_bound_last() {
        // the flip-flop reads its own inverted output
        let src = "OUTPUT(q)\nq = DFF(d)\nd = NOT(q)\n";
        let m = read_bench(src.as_bytes()).unwrap();
        let mut rec = Recorder::default();
        build_network(&m, &mut rec);
        assert_eq!(
            rec.calls,
            vec![
                "input $clock",
                "dff q clock=true reset=false",
                "gate NOT d [1]",
                "bind 1 <- 2",
                "output q <- 1",
            ]
        );
    }

    #[test]
    fn test_cover_expr() {
        let src = ".model c\n.inputs a b\n.outputs y\n.names a b y\n1- 1\n-1 1\n.end\n";
        let m = read_blif(src.as_bytes()).unwrap();
        let mut rec = Recorder::default();
        build_network(&m, &mut rec);
        assert!(rec.calls.contains(&"expr y = x0 | x1 [0, 1]".to_string()));
    }

    #[test]
    fn test_reset_kind_forwarded() {
        let src = ".model c\n.inputs d\n.outputs q\n.latch d q 1\n.end\n";
        let m = read_blif(src.as_bytes()).unwrap();
        let mut rec = Recorder::default();
        build_network(&m, &mut rec);
        assert!(rec
            .calls
            .contains(&"dff q clock=true reset=true".to_string()));
    }
}

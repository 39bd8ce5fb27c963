//! Transposition-aware variation DAG: arena-style node/edge storage with
//! opaque handles, a secondary position-key index for transposition merge,
//! and principal-path navigation.
//!
//! Re-architected per the design notes away from a cyclic id-map graph into
//! an arena (`Vec<Node>`/`Vec<Edge>`) indexed by `NodeId`/`EdgeId` newtypes,
//! the same shape the teacher uses for its transposition table (`tt.rs`)
//! keyed by Zobrist hash.

use std::collections::HashMap;

use crate::error::{AnnotatorError, Result};
use crate::position::PositionKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeId(pub usize);

#[derive(Debug, Clone)]
pub struct Node {
    pub position_key: PositionKey,
    pub fen: String,
    pub ply: u32,
    pub incoming: Vec<EdgeId>,
    pub outgoing: Vec<EdgeId>,
    pub principal_child: Option<EdgeId>,
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub uci: String,
    pub san: String,
}

pub struct VariationDag {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    by_key: HashMap<PositionKey, Vec<NodeId>>,
    root: NodeId,
    cursor: NodeId,
    transposition_merges: u64,
}

impl VariationDag {
    pub fn new(root_key: PositionKey, root_fen: String) -> Self {
        let root_node = Node {
            position_key: root_key.clone(),
            fen: root_fen,
            ply: 0,
            incoming: Vec::new(),
            outgoing: Vec::new(),
            principal_child: None,
        };
        let mut by_key = HashMap::new();
        by_key.insert(root_key, vec![NodeId(0)]);
        Self {
            nodes: vec![root_node],
            edges: Vec::new(),
            by_key,
            root: NodeId(0),
            cursor: NodeId(0),
            transposition_merges: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn cursor(&self) -> NodeId {
        self.cursor
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.0]
    }

    pub fn find_node_by_position_key(&self, key: &PositionKey) -> Option<NodeId> {
        self.by_key.get(key).and_then(|ids| ids.first().copied())
    }

    /// Central mutation: add a move from `from`, reaching `to_key`/`to_fen`.
    /// If a node for `to_key` already exists, the new edge is merged onto it
    /// (transposition) instead of creating a duplicate node. Returns the
    /// edge id and whether this was a transposition merge.
    pub fn add_move(
        &mut self,
        from: NodeId,
        uci: &str,
        san: &str,
        to_key: PositionKey,
        to_fen: String,
    ) -> Result<(EdgeId, bool)> {
        // Re-adding a move already played from this node is a no-op.
        if let Some(existing) = self.nodes[from.0]
            .outgoing
            .iter()
            .find(|e| self.edges[e.0].uci == uci)
        {
            return Ok((*existing, false));
        }

        let from_ply = self.nodes[from.0].ply;
        let (to_id, merged) = match self.find_node_by_position_key(&to_key) {
            Some(existing_id) => {
                self.transposition_merges += 1;
                (existing_id, true)
            }
            None => {
                let new_id = NodeId(self.nodes.len());
                self.nodes.push(Node {
                    position_key: to_key.clone(),
                    fen: to_fen,
                    ply: from_ply + 1,
                    incoming: Vec::new(),
                    outgoing: Vec::new(),
                    principal_child: None,
                });
                self.by_key.entry(to_key).or_default().push(new_id);
                (new_id, false)
            }
        };

        let edge_id = EdgeId(self.edges.len());
        self.edges.push(Edge {
            from,
            to: to_id,
            uci: uci.to_string(),
            san: san.to_string(),
        });
        self.nodes[from.0].outgoing.push(edge_id);
        self.nodes[to_id.0].incoming.push(edge_id);

        if self.nodes[from.0].principal_child.is_none() {
            self.nodes[from.0].principal_child = Some(edge_id);
        }

        Ok((edge_id, merged))
    }

    pub fn set_principal_child(&mut self, node: NodeId, edge: EdgeId) -> Result<()> {
        if self.edges[edge.0].from != node {
            return Err(AnnotatorError::NavigationError(
                "edge does not originate at the given node".to_string(),
            ));
        }
        self.nodes[node.0].principal_child = Some(edge);
        Ok(())
    }

    pub fn get_principal_path(&self) -> Vec<EdgeId> {
        let mut path = Vec::new();
        let mut current = self.root;
        while let Some(edge) = self.nodes[current.0].principal_child {
            path.push(edge);
            current = self.edges[edge.0].to;
        }
        path
    }

    pub fn navigate_to_child(&mut self, edge: EdgeId) -> Result<()> {
        if self.edges[edge.0].from != self.cursor {
            return Err(AnnotatorError::NavigationError(
                "edge does not originate at the current cursor".to_string(),
            ));
        }
        self.cursor = self.edges[edge.0].to;
        Ok(())
    }

    pub fn go_to_node(&mut self, id: NodeId) -> Result<()> {
        if id.0 >= self.nodes.len() {
            return Err(AnnotatorError::NavigationError(format!("no such node: {:?}", id)));
        }
        self.cursor = id;
        Ok(())
    }

    pub fn go_to_fen(&mut self, fen: &str) -> Result<()> {
        let id = self
            .nodes
            .iter()
            .position(|n| n.fen == fen)
            .map(NodeId)
            .ok_or_else(|| AnnotatorError::NavigationError(format!("no node for fen: {fen}")))?;
        self.cursor = id;
        Ok(())
    }

    pub fn go_to_parent(&mut self) -> Result<()> {
        let incoming = &self.nodes[self.cursor.0].incoming;
        let parent_edge = incoming
            .first()
            .ok_or_else(|| AnnotatorError::NavigationError("already at root".to_string()))?;
        self.cursor = self.edges[parent_edge.0].from;
        Ok(())
    }

    pub fn go_to_root(&mut self) {
        self.cursor = self.root;
    }

    pub fn stats(&self) -> DagStats {
        DagStats {
            node_count: self.nodes.len(),
            edge_count: self.edges.len(),
            transposition_merges: self.transposition_merges,
            max_ply: self.nodes.iter().map(|n| n.ply).max().unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DagStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub transposition_merges: u64,
    pub max_ply: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(fen: &str) -> PositionKey {
        PositionKey::from_fen(fen).unwrap()
    }

    const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn transposition_merges_into_one_node() {
        let mut dag = VariationDag::new(key(STARTPOS), STARTPOS.to_string());
        let after_nf3 = "rnbqkbnr/pppppppp/8/8/8/5N2/PPPPPPPP/RNBQKB1R b KQkq - 1 1";
        let (e1, merged1) = dag
            .add_move(dag.root(), "g1f3", "Nf3", key(after_nf3), after_nf3.to_string())
            .unwrap();
        assert!(!merged1);
        dag.navigate_to_child(e1).unwrap();

        let after_nf3_d5 = "rnbqkbnr/ppp1pppp/8/3p4/8/5N2/PPPPPPPP/RNBQKB1R w KQkq - 0 2";
        let (e2, _) = dag
            .add_move(dag.cursor(), "d7d5", "d5", key(after_nf3_d5), after_nf3_d5.to_string())
            .unwrap();
        dag.navigate_to_child(e2).unwrap();

        let after_nf3_d5_d4 = "rnbqkbnr/ppp1pppp/8/3p4/3P4/5N2/PPP1PPPP/RNBQKB1R b KQkq - 0 2";
        dag.add_move(dag.cursor(), "d2d4", "d4", key(after_nf3_d5_d4), after_nf3_d5_d4.to_string())
            .unwrap();

        // Now build 1.d4 d5 2.Nf3 reaching the same position via a different move order.
        let after_d4 = "rnbqkbnr/pppppppp/8/8/3P4/8/PPP1PPPP/RNBQKBNR b KQkq - 0 1";
        let (e3, _) = dag
            .add_move(dag.root(), "d2d4", "d4", key(after_d4), after_d4.to_string())
            .unwrap();
        dag.navigate_to_child(e3).unwrap();

        let after_d4_d5 = "rnbqkbnr/ppp1pppp/8/3p4/3P4/8/PPP1PPPP/RNBQKBNR w KQkq - 0 2";
        let (e4, _) = dag
            .add_move(dag.cursor(), "d7d5", "d5", key(after_d4_d5), after_d4_d5.to_string())
            .unwrap();
        dag.navigate_to_child(e4).unwrap();

        let (_, merged) = dag
            .add_move(dag.cursor(), "g1f3", "Nf3", key(after_nf3_d5_d4), after_nf3_d5_d4.to_string())
            .unwrap();
        assert!(merged);
        assert_eq!(dag.stats().transposition_merges, 1);
    }

    #[test]
    fn principal_path_follows_first_child_by_default() {
        let mut dag = VariationDag::new(key(STARTPOS), STARTPOS.to_string());
        let after_e4 = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
        let (e1, _) = dag
            .add_move(dag.root(), "e2e4", "e4", key(after_e4), after_e4.to_string())
            .unwrap();
        let path = dag.get_principal_path();
        assert_eq!(path, vec![e1]);
    }

    #[test]
    fn navigation_rejects_edges_not_at_cursor() {
        let mut dag = VariationDag::new(key(STARTPOS), STARTPOS.to_string());
        let after_e4 = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
        let (e1, _) = dag
            .add_move(dag.root(), "e2e4", "e4", key(after_e4), after_e4.to_string())
            .unwrap();
        dag.navigate_to_child(e1).unwrap();
        // e1 now originates from root, not the new cursor; navigating again must fail.
        assert!(dag.navigate_to_child(e1).is_err());
    }
}

use super::index::GraphIndex;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Children,
    Parents,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    pub node: usize,
    /// The node whose expansion reached this one; `None` for the start node.
    pub from: Option<usize>,
    pub depth: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Do not expand the current node.
    Prune,
    Stop,
}

impl GraphIndex {
    /// Neighbors one hop away in `direction`, in relationship input order. A neighbor
    /// appears once per parallel edge.
    pub fn neighbors(&self, index: usize, direction: Direction) -> impl Iterator<Item = usize> + '_ {
        let edges = match direction {
            Direction::Children => self.outgoing_edges(index),
            Direction::Parents => self.incoming_edges(index),
        };
        edges.iter().map(move |&edge| {
            let (source, target) = self.edge(edge);
            match direction {
                Direction::Children => target,
                Direction::Parents => source,
            }
        })
    }

    /// Preorder depth-first walk from `start`. Each node is visited at most once per
    /// call, so cycles terminate. Visit order matches a recursive walk that follows
    /// edges in input order.
    pub fn depth_first(
        &self,
        start: usize,
        direction: Direction,
        mut visit: impl FnMut(Step) -> Flow,
    ) {
        if start >= self.len() {
            return;
        }

        let mut visited = vec![false; self.len()];
        let mut stack = vec![Step {
            node: start,
            from: None,
            depth: 0,
        }];

        while let Some(step) = stack.pop() {
            if visited[step.node] {
                continue;
            }
            visited[step.node] = true;

            match visit(step) {
                Flow::Stop => return,
                Flow::Prune => continue,
                Flow::Continue => {}
            }

            let next = self
                .neighbors(step.node, direction)
                .filter(|&neighbor| !visited[neighbor])
                .collect::<Vec<_>>();
            stack.extend(next.into_iter().rev().map(|neighbor| Step {
                node: neighbor,
                from: Some(step.node),
                depth: step.depth + 1,
            }));
        }
    }

    pub fn reachable(&self, start: usize, direction: Direction) -> Vec<usize> {
        let mut found = Vec::new();
        self.depth_first(start, direction, |step| {
            if step.node != start {
                found.push(step.node);
            }
            Flow::Continue
        });
        found
    }

    pub fn children(&self, index: usize) -> Vec<usize> {
        let mut children = Vec::new();
        for child in self.neighbors(index, Direction::Children) {
            if !children.contains(&child) {
                children.push(child);
            }
        }
        children
    }

    pub fn depth(&self, index: usize) -> usize {
        let mut deepest = 0;
        self.depth_first(index, Direction::Children, |step| {
            deepest = deepest.max(step.depth);
            Flow::Continue
        });
        deepest
    }
}

use studyplan_core::{HeadingEvent, OutlineNode};

/// Node under construction. Children are arena indices.
#[derive(Debug)]
struct OpenNode {
    title: String,
    level: usize,
    start_page: usize,
    end_page: Option<usize>,
    body: String,
    children: Vec<usize>,
}

/// Stack-based outline reconstruction.
///
/// Nodes live in a flat arena; the stack holds the indices of headings that
/// are still open. A heading of level `L` closes every open node of level
/// `>= L` (ending it on the page before the new heading) and becomes a child
/// of the nearest remaining, shallower node.
#[derive(Debug, Default)]
pub struct OutlineBuilder {
    arena: Vec<OpenNode>,
    roots: Vec<usize>,
    open: Vec<usize>,
    last_page: usize,
}

impl OutlineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of headings seen so far.
    pub fn heading_count(&self) -> usize {
        self.arena.len()
    }

    pub fn push_heading(&mut self, event: HeadingEvent) {
        let HeadingEvent { level, title, page } = event;
        self.note_page(page);

        while let Some(&top) = self.open.last()
            && self.arena[top].level >= level
        {
            self.open.pop();
            let node = &mut self.arena[top];
            node.end_page = Some(page.saturating_sub(1).max(node.start_page));
        }

        let idx = self.arena.len();
        self.arena.push(OpenNode {
            title,
            level,
            start_page: page,
            end_page: None,
            body: String::new(),
            children: Vec::new(),
        });

        match self.open.last() {
            Some(&parent) => self.arena[parent].children.push(idx),
            None => self.roots.push(idx),
        }
        self.open.push(idx);
    }

    /// Append a non-heading line to the most recently opened heading.
    /// Blank lines, and text before the first heading, are dropped.
    pub fn push_body(&mut self, page: usize, line: &str) {
        self.note_page(page);
        let line = line.trim_end();
        if line.trim_start().is_empty() {
            return;
        }
        if let Some(&top) = self.open.last() {
            let body = &mut self.arena[top].body;
            body.push_str(line);
            body.push('\n');
        }
    }

    fn note_page(&mut self, page: usize) {
        self.last_page = self.last_page.max(page);
    }

    /// Close every remaining node on `last_page` (or the highest page seen,
    /// whichever is later) and return the root nodes in reading order.
    pub fn finish(mut self, last_page: usize) -> Vec<OutlineNode> {
        let last_page = last_page.max(self.last_page);
        for idx in self.open.drain(..) {
            let node = &mut self.arena[idx];
            node.end_page = Some(last_page.max(node.start_page));
        }

        // Children always have a larger index than their parent, so building
        // from the back sees every child before its parent.
        let mut built: Vec<Option<OutlineNode>> = Vec::with_capacity(self.arena.len());
        built.resize_with(self.arena.len(), || None);

        for (idx, node) in self.arena.into_iter().enumerate().rev() {
            let children = node
                .children
                .iter()
                .filter_map(|&c| built[c].take())
                .collect();
            built[idx] = Some(OutlineNode {
                title: node.title,
                level: node.level,
                start_page: node.start_page,
                end_page: node.end_page.unwrap_or(node.start_page),
                body: node.body,
                children,
            });
        }

        self.roots
            .iter()
            .filter_map(|&r| built[r].take())
            .collect()
    }
}

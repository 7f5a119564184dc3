//! Append-only block output

use tracing::debug;
use vcsql_ir::{Block, BlockKind, SelectInto, SubPlan};

#[derive(Debug, Default)]
pub struct BlockEmitter {
    blocks: Vec<Block>,
    depth: usize,
}

impl BlockEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn enter_loop(&mut self) {
        self.depth += 1;
    }

    pub fn leave_loop(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Append a block at the current depth.
    pub fn emit(&mut self, stage: &str, kind: BlockKind) {
        debug!(stage, depth = self.depth, "emit block");
        self.blocks.push(Block::new(stage, self.depth, kind));
    }

    /// A select nested one level below the current depth, for use inside another block.
    pub fn sub_plan(&self, stage: &str, select: SelectInto) -> SubPlan {
        SubPlan {
            stage: stage.to_string(),
            depth: self.depth + 1,
            select,
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_tags_depth() {
        let mut emitter = BlockEmitter::new();
        emitter.emit("initdropcur", BlockKind::DropTable { table: "cur".to_string() });
        emitter.enter_loop();
        emitter.emit("dropmessage", BlockKind::DropTable { table: "message".to_string() });
        emitter.leave_loop();
        emitter.leave_loop();

        let depths: Vec<_> = emitter.blocks().iter().map(|b| b.depth).collect();
        assert_eq!(depths, vec![0, 1]);
        assert_eq!(emitter.depth(), 0);
    }
}

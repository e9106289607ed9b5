use anyhow::{anyhow, Result};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::output::{CompileReport, DocumentCompiler, DocumentRenderer, Layout};
use crate::quiz::QuizSet;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RenderEntry {
    pub set_id: u32,
    pub layout: &'static str,
    pub mcq_count: usize,
    pub subjective_count: usize,
}

#[derive(Clone, Default)]
pub struct MockRenderer {
    renders: Arc<RwLock<Vec<RenderEntry>>>,
    failing_sets: HashSet<u32>,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(set_ids: &[u32]) -> Self {
        MockRenderer {
            failing_sets: set_ids.iter().copied().collect(),
            ..Default::default()
        }
    }

    pub fn renders(&self) -> Vec<RenderEntry> {
        self.renders.read().clone()
    }
}

impl DocumentRenderer for MockRenderer {
    fn render(&self, quiz_set: &QuizSet, layout: &Layout) -> Result<String> {
        if self.failing_sets.contains(&quiz_set.set_id) {
            return Err(anyhow!("Mock render failure for set {}", quiz_set.set_id));
        }
        self.renders.write().push(RenderEntry {
            set_id: quiz_set.set_id,
            layout: layout.key,
            mcq_count: quiz_set.mcq.len(),
            subjective_count: quiz_set.subjective.len(),
        });
        let mut source = format!("set {} ({})\n", quiz_set.set_id, layout.key);
        for question in &quiz_set.mcq {
            source += &format!("{} [{}]\n", question.question, question.options.join(" | "));
        }
        for question in &quiz_set.subjective {
            source += &format!("{}\n", question.question);
        }
        Ok(source)
    }
}

#[derive(Clone)]
pub struct MockCompiler {
    compiled: Arc<RwLock<Vec<(PathBuf, PathBuf)>>>,
    succeed: bool,
}

impl MockCompiler {
    pub fn new(succeed: bool) -> Self {
        MockCompiler {
            compiled: Arc::new(RwLock::new(Vec::new())),
            succeed,
        }
    }

    pub fn compiled(&self) -> Vec<(PathBuf, PathBuf)> {
        self.compiled.read().clone()
    }
}

impl DocumentCompiler for MockCompiler {
    fn compile(&self, source: &Path, output_dir: &Path) -> CompileReport {
        self.compiled
            .write()
            .push((source.to_path_buf(), output_dir.to_path_buf()));
        if self.succeed {
            CompileReport::success(format!("Output written for {:?}", source))
        } else {
            CompileReport::failure(format!("! Undefined control sequence in {:?}", source))
        }
    }
}

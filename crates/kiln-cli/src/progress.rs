//! Terminal progress for builds

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use kiln_build::BuildObserver;
use std::cell::RefCell;
use std::collections::HashMap;

/// One progress bar per project being compiled
pub struct ProgressObserver {
    multi: MultiProgress,
    bars: RefCell<HashMap<String, ProgressBar>>,
    style: ProgressStyle,
}

impl ProgressObserver {
    pub fn new() -> Self {
        let style = ProgressStyle::default_bar()
            .template("{prefix:>12.cyan.bold} [{bar:30}] {pos}/{len} objects")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");

        Self {
            multi: MultiProgress::new(),
            bars: RefCell::new(HashMap::new()),
            style,
        }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildObserver for ProgressObserver {
    fn project_started(&self, project: &str, total: usize) {
        let bar = self.multi.add(ProgressBar::new(total as u64));
        bar.set_style(self.style.clone());
        bar.set_prefix(project.to_string());
        self.bars.borrow_mut().insert(project.to_string(), bar);
    }

    fn unit_finished(&self, project: &str, done: usize, _total: usize) {
        if let Some(bar) = self.bars.borrow().get(project) {
            bar.set_position(done as u64);
        }
    }

    fn project_finished(&self, project: &str, success: bool) {
        if let Some(bar) = self.bars.borrow_mut().remove(project) {
            if success {
                bar.finish_and_clear();
            } else {
                bar.abandon();
            }
        }
    }
}

use rustc_hash::FxHashSet;
use trimpack_common::{ModuleIdx, DUMMY_MODULE_IDX};

use super::LinkStage;

/// A module on the current import path and the next of its dependencies to visit.
struct Frame {
  module_idx: ModuleIdx,
  dependencies: Vec<ModuleIdx>,
  cursor: usize,
}

impl LinkStage {
  fn frame(&self, module_idx: ModuleIdx) -> Frame {
    let dependencies = self.module_table[module_idx]
      .import_records()
      .iter()
      .filter(|rec| rec.kind.is_static() && rec.state != DUMMY_MODULE_IDX)
      .map(|rec| rec.state)
      .collect();
    Frame { module_idx, dependencies, cursor: 0 }
  }

  /// Execution order is the post-order of static imports, walking entry points in order. Dynamic
  /// import targets are entries themselves, so they run after whatever they statically reach.
  pub(crate) fn sort_modules(&mut self) {
    let mut visited = FxHashSet::default();
    let mut next_exec_order = 0;
    let mut sorted_modules = Vec::with_capacity(self.module_table.len());

    let entries = self.entry_points.iter().map(|entry| entry.idx).collect::<Vec<_>>();
    for entry in entries {
      if !visited.insert(entry) {
        continue;
      }
      let mut path = vec![self.frame(entry)];

      while let Some(frame) = path.last_mut() {
        let module_idx = frame.module_idx;
        let next = frame.dependencies.get(frame.cursor).copied();
        frame.cursor += 1;

        match next {
          Some(dep) if visited.insert(dep) => path.push(self.frame(dep)),
          Some(dep) => {
            if let Some(start) = path.iter().position(|frame| frame.module_idx == dep) {
              self.log_cycle(path[start..].iter().map(|frame| frame.module_idx).chain([dep]));
            }
          }
          None => {
            path.pop();
            let module = &mut self.module_table[module_idx];
            module.set_exec_order(next_exec_order);
            next_exec_order += 1;
            if !module.is_external() {
              sorted_modules.push(module_idx);
            }
          }
        }
      }
    }

    self.sorted_modules = sorted_modules;
  }

  fn log_cycle(&self, cycle: impl Iterator<Item = ModuleIdx>) {
    let ids = cycle
      .filter_map(|idx| self.module_table[idx].as_normal())
      .map(|module| module.stable_id.as_str())
      .collect::<Vec<_>>();
    tracing::debug!(cycle = %ids.join(" -> "), "circular dependency");
  }
}

use arcstr::ArcStr;
use trimpack_common::Module;

use super::LinkStage;

impl LinkStage {
  pub(crate) fn compute_dependencies(&mut self) {
    for module in self.module_table.iter().filter_map(Module::as_normal) {
      let meta = &mut self.metas[module.idx];

      for rec in module.import_records.iter().filter(|rec| !rec.is_dropped()) {
        let target = &self.module_table[rec.state];
        if rec.kind.is_static() {
          meta.dependencies.insert(rec.state);
          if target.is_external() {
            meta
              .imported_external_bindings
              .entry(rec.state)
              .or_default()
              .extend(rec.used_names().into_iter().map(ArcStr::from));
          }
        } else if !target.is_external() {
          meta.dynamic_dependencies.insert(rec.state);
        }
      }
    }
  }
}

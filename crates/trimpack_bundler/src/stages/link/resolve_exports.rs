use arcstr::ArcStr;
use trimpack_common::Module;
use trimpack_utils::indexmap::FxIndexSet;

use super::LinkStage;

impl LinkStage {
  /// Walks modules in execution order, so the target of an `export *` is usually done before its
  /// importer. Inside a cycle the target only contributes the names it declares itself.
  pub(crate) fn resolve_exports(&mut self) {
    for &idx in &self.sorted_modules {
      let Module::Normal(module) = &self.module_table[idx] else {
        continue;
      };

      let mut names = module.local_exports.clone();
      let mut externals = FxIndexSet::default();

      for rec in module.star_export_records() {
        match &self.module_table[rec.state] {
          Module::External(_) => {
            externals.insert(rec.state);
          }
          Module::Normal(target) => {
            let target_meta = &self.metas[rec.state];
            let target_names = if target.exec_order < module.exec_order {
              &target_meta.resolved_exports
            } else {
              &target.local_exports
            };
            names.extend(
              target_names.iter().filter(|name| name.as_str() != "default").map(ArcStr::clone),
            );
            externals.extend(target_meta.star_exports_from_external_modules.iter().copied());
          }
        }
      }

      let meta = &mut self.metas[idx];
      meta.resolved_exports = names;
      meta.star_exports_from_external_modules = externals;
    }
  }
}

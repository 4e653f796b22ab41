use std::collections::VecDeque;

use trimpack_common::WorkspaceMap;
use trimpack_utils::indexmap::FxIndexSet;

/// Every workspace package reachable from `names` through declared dependencies, in breadth-first
/// order. Names that are not workspace members are skipped, including the starting ones.
pub fn collect_transitive_workspace_dependencies<S: AsRef<str>>(
  names: &[S],
  workspace_map: &WorkspaceMap,
) -> FxIndexSet<String> {
  let mut collected = FxIndexSet::default();
  let mut queue = names
    .iter()
    .map(AsRef::as_ref)
    .filter(|name| workspace_map.contains_key(*name))
    .map(ToString::to_string)
    .collect::<VecDeque<_>>();

  while let Some(name) = queue.pop_front() {
    let Some(info) = workspace_map.get(&name) else {
      continue;
    };
    if !collected.insert(name) {
      continue;
    }
    if let Some(dependencies) = &info.dependencies {
      queue.extend(
        dependencies
          .keys()
          .filter(|dep| workspace_map.contains_key(*dep) && !collected.contains(*dep))
          .cloned(),
      );
    }
  }

  collected
}

#[cfg(test)]
use std::path::PathBuf;
#[cfg(test)]
use trimpack_common::WorkspacePackageInfo;

#[cfg(test)]
fn package(deps: &[&str]) -> WorkspacePackageInfo {
  WorkspacePackageInfo {
    location: PathBuf::from("/repo/packages"),
    dependencies: (!deps.is_empty())
      .then(|| deps.iter().map(|dep| ((*dep).to_string(), "workspace:*".to_string())).collect()),
    version: None,
  }
}

#[test]
fn test_breadth_first_closure() {
  let mut map = WorkspaceMap::default();
  map.insert("app".to_string(), package(&["ui", "react"]));
  map.insert("ui".to_string(), package(&["tokens", "utils"]));
  map.insert("tokens".to_string(), package(&[]));
  map.insert("utils".to_string(), package(&["tokens"]));
  map.insert("unused".to_string(), package(&[]));

  let collected = collect_transitive_workspace_dependencies(&["app"], &map);
  assert_eq!(collected.into_iter().collect::<Vec<_>>(), vec!["app", "ui", "tokens", "utils"]);
}

#[test]
fn test_cycles_and_non_members() {
  let mut map = WorkspaceMap::default();
  map.insert("a".to_string(), package(&["b"]));
  map.insert("b".to_string(), package(&["a"]));

  let collected = collect_transitive_workspace_dependencies(&["left-pad", "b"], &map);
  assert_eq!(collected.into_iter().collect::<Vec<_>>(), vec!["b", "a"]);
  assert!(collect_transitive_workspace_dependencies(&["left-pad"], &map).is_empty());
}

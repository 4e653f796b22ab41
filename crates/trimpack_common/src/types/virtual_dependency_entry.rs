#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualDependencyEntry {
  /// Output name of the optimized artifact, `deps/<flattened package name>` in most cases.
  pub name: String,
  pub synthetic_source: String,
}

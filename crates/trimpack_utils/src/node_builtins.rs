use phf::{phf_set, Set};

static NODE_BUILTIN_MODULES: Set<&'static str> = phf_set! {
  "_http_agent", "_http_client", "_http_common", "_http_incoming", "_http_outgoing",
  "_http_server", "_stream_duplex", "_stream_passthrough", "_stream_readable",
  "_stream_transform", "_stream_wrap", "_stream_writable", "_tls_common", "_tls_wrap",
  "assert", "async_hooks", "buffer", "child_process", "cluster", "console", "constants",
  "crypto", "dgram", "diagnostics_channel", "dns", "domain", "events", "fs", "http", "http2",
  "https", "inspector", "module", "net", "os", "path", "perf_hooks", "process", "punycode",
  "querystring", "readline", "repl", "stream", "string_decoder", "sys", "timers", "tls",
  "trace_events", "tty", "url", "util", "v8", "vm", "wasi", "worker_threads", "zlib",
};

/// Modules that only exist behind the `node:` scheme.
static NODE_PREFIXED_ONLY_MODULES: Set<&'static str> = phf_set! {
  "sea", "sqlite", "test", "test/reporters",
};

/// `fs`, `fs/promises`, `node:fs` and `node:test` are builtins, `fs-extra` is not.
pub fn is_builtin_module(specifier: &str) -> bool {
  if let Some(stripped) = specifier.strip_prefix("node:") {
    return NODE_PREFIXED_ONLY_MODULES.contains(stripped)
      || NODE_BUILTIN_MODULES.contains(stripped.split('/').next().unwrap_or(stripped));
  }
  let root = specifier.split('/').next().unwrap_or(specifier);
  NODE_BUILTIN_MODULES.contains(root)
}

#[test]
fn test_is_builtin_module() {
  assert!(is_builtin_module("fs"));
  assert!(is_builtin_module("fs/promises"));
  assert!(is_builtin_module("node:path"));
  assert!(is_builtin_module("node:test"));
  assert!(!is_builtin_module("test"));
  assert!(!is_builtin_module("fs-extra"));
  assert!(!is_builtin_module("left-pad"));
}

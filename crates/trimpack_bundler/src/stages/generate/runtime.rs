/// Helpers shared by every chunk. Module records are shared between chunks through
/// `Object.assign`, so a module initialized by one chunk is seen as initialized by all.
pub const RUNTIME_CODE: &str = r#"function __trimpack_require(key) {
  const record = __trimpack_modules[key];
  if (record === undefined) {
    throw new Error("Module " + JSON.stringify(key) + " is not part of this bundle");
  }
  if (record.module === undefined) {
    const module = { exports: {} };
    record.module = module;
    if (record.esm) {
      Object.defineProperty(module.exports, "__esModule", { value: true });
    }
    record.init.call(module.exports, module, module.exports, __trimpack_missing_require);
  }
  return record.module.exports;
}

function __trimpack_interop(exports) {
  if (exports && exports.__esModule) {
    return exports;
  }
  const namespace = { default: exports };
  if (exports && (typeof exports === "object" || typeof exports === "function")) {
    for (const name of Object.keys(exports)) {
      if (name !== "default") {
        Object.defineProperty(namespace, name, { enumerable: true, get: () => exports[name] });
      }
    }
  }
  return namespace;
}

function __trimpack_export(target, getters) {
  for (const name of Object.keys(getters)) {
    Object.defineProperty(target, name, { enumerable: true, get: getters[name] });
  }
}

function __trimpack_reexport(target, source) {
  for (const name of Object.keys(source)) {
    if (name !== "default" && !Object.prototype.hasOwnProperty.call(target, name)) {
      Object.defineProperty(target, name, { enumerable: true, get: () => source[name] });
    }
  }
}

function __trimpack_external(specifier) {
  return __trimpack_externals[specifier];
}

function __trimpack_external_require(specifier) {
  const namespace = __trimpack_externals[specifier];
  return namespace && "default" in namespace ? namespace.default : namespace;
}

function __trimpack_load(key) {
  return __trimpack_interop(__trimpack_require(key));
}

function __trimpack_dynamic(key) {
  const chunk = __trimpack_dynamic_chunks[key];
  if (chunk === undefined) {
    return Promise.resolve().then(() => __trimpack_load(key));
  }
  return import(chunk).then((loaded) => loaded.__trimpack_load(key));
}

function __trimpack_missing_require(specifier) {
  throw new Error("Cannot find module " + JSON.stringify(specifier));
}
"#;

use std::path::Path;

use oxc::{
  allocator::Allocator,
  ast::ast::{Program, Statement},
  codegen::Codegen,
  diagnostics::OxcDiagnostic,
  parser::Parser,
  semantic::SemanticBuilder,
  span::SourceType,
  transformer::{TransformOptions, Transformer},
};
use trimpack_common::ModuleType;
use trimpack_error::BuildResult;

pub struct EcmaCompiler;

impl EcmaCompiler {
  pub fn parse<'a>(
    allocator: &'a Allocator,
    source: &'a str,
    source_type: SourceType,
  ) -> BuildResult<Program<'a>> {
    let ret = Parser::new(allocator, source, source_type).parse();
    if ret.panicked || !ret.errors.is_empty() {
      Err(diagnostics_to_errors(ret.errors))?;
    }
    Ok(ret.program)
  }

  pub fn print(program: &Program<'_>) -> String {
    Codegen::new().build(program).code
  }

  /// Strips TypeScript syntax and compiles JSX, returning plain JavaScript.
  pub fn transform(source: &str, path: &Path, source_type: SourceType) -> BuildResult<String> {
    let allocator = Allocator::default();
    let mut program = Self::parse(&allocator, source, source_type)?;

    let scoping = SemanticBuilder::new().build(&program).semantic.into_scoping();
    let ret = Transformer::new(&allocator, path, &TransformOptions::default())
      .build_with_scoping(scoping, &mut program);
    if !ret.errors.is_empty() {
      Err(diagnostics_to_errors(ret.errors))?;
    }

    Ok(Self::print(&program))
  }

  /// Specifiers of every `import`/`export ... from` statement, in source order.
  pub fn static_imports(source: &str, source_type: SourceType) -> BuildResult<Vec<String>> {
    let allocator = Allocator::default();
    let program = Self::parse(&allocator, source, source_type)?;
    Ok(
      program
        .body
        .iter()
        .filter_map(|stmt| match stmt {
          Statement::ImportDeclaration(decl) => Some(decl.source.value.to_string()),
          Statement::ExportAllDeclaration(decl) => Some(decl.source.value.to_string()),
          Statement::ExportNamedDeclaration(decl) => {
            decl.source.as_ref().map(|source| source.value.to_string())
          }
          _ => None,
        })
        .collect(),
    )
  }
}

/// The source type a module of `module_type` at `path` is parsed with.
pub fn source_type_for(module_type: ModuleType, path: &Path) -> SourceType {
  let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
  match (module_type, extension) {
    (ModuleType::Js, "mjs") => SourceType::mjs(),
    (ModuleType::Js, "cjs") => SourceType::cjs(),
    (ModuleType::Jsx, _) => SourceType::jsx(),
    (ModuleType::Ts, "cts") => SourceType::ts().with_module(false),
    (ModuleType::Ts, _) => SourceType::ts(),
    (ModuleType::Tsx, _) => SourceType::tsx(),
    _ => SourceType::unambiguous(),
  }
}

fn diagnostics_to_errors(diagnostics: Vec<OxcDiagnostic>) -> Vec<anyhow::Error> {
  diagnostics.into_iter().map(|diagnostic| anyhow::anyhow!("{diagnostic}")).collect()
}

#[test]
fn test_print() {
  let allocator = Allocator::default();
  let program = EcmaCompiler::parse(&allocator, "const a = 1;", SourceType::mjs()).unwrap();
  assert_eq!(EcmaCompiler::print(&program), "const a = 1;\n");
}

#[test]
fn test_transform_strips_types() {
  let code = EcmaCompiler::transform(
    "export const add = (a: number, b: number): number => a + b;",
    Path::new("add.ts"),
    SourceType::ts(),
  )
  .unwrap();
  assert!(code.contains("export const add = (a, b) => a + b;"));
}

#[test]
fn test_static_imports() {
  let imports = EcmaCompiler::static_imports(
    "import a from './a.js'; export * from 'pkg'; export { b } from './b.js'; export const c = 1;",
    SourceType::mjs(),
  )
  .unwrap();
  assert_eq!(imports, vec!["./a.js", "pkg", "./b.js"]);
}

#[test]
fn test_parse_error() {
  let allocator = Allocator::default();
  assert!(EcmaCompiler::parse(&allocator, "const = ;", SourceType::mjs()).is_err());
}

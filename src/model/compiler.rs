//! Loading a root file and its includes into one [`Schema`].

use std::collections::{BTreeSet, HashMap};

use super::resolve::resolve_file;
use super::schema::Schema;
use super::CompileError;
use crate::idl::{parse_idl, IdlFile, SourceLoader};
use crate::logging::{debug, info};

/// One loaded source file.
#[derive(Debug, Clone)]
pub struct FileUnit {
    pub key: String,
    pub ast: IdlFile,
    /// Canonical keys of the files this one includes.
    pub includes: Vec<String>,
    /// Modules declared in this file.
    pub modules: Vec<String>,
}

/// Result of a compilation run.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub schema: Schema,
    /// Files in dependency order: includes before the files including them.
    pub files: Vec<FileUnit>,
    pub root: String,
}

impl Compilation {
    pub fn file(&self, key: &str) -> Option<&FileUnit> {
        self.files.iter().find(|f| f.key == key)
    }

    /// Modules declared by the root file.
    pub fn root_modules(&self) -> &[String] {
        self.file(&self.root)
            .map(|f| f.modules.as_slice())
            .unwrap_or_default()
    }
}

/// Per-run memo table. Every file is parsed and resolved at most once; the
/// stack of files being loaded detects include cycles.
#[derive(Debug, Default)]
struct CompileContext {
    done: HashMap<String, BTreeSet<String>>,
    loading: Vec<String>,
    files: Vec<FileUnit>,
    schema: Schema,
}

/// Compiles IDL files through a [`SourceLoader`].
///
/// # Example
///
/// ```ignore
/// use tars_idl::idl::MemorySource;
/// use tars_idl::model::Compiler;
///
/// let source = MemorySource::new().with_file("a.tars", "module A { struct P { 0 require int x; }; };");
/// let compilation = Compiler::new(source).compile("a.tars")?;
/// assert!(compilation.schema.struct_info("A::P").is_some());
/// ```
pub struct Compiler<L> {
    loader: L,
}

impl<L: SourceLoader> Compiler<L> {
    pub fn new(loader: L) -> Self {
        Self { loader }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Compile `root` and everything it includes.
    pub fn compile(&self, root: &str) -> Result<Compilation, CompileError> {
        self.compile_all(&[root])
    }

    /// Compile several root files into one schema. Files shared between
    /// roots are loaded once.
    pub fn compile_all(&self, roots: &[&str]) -> Result<Compilation, CompileError> {
        let mut ctx = CompileContext::default();
        let mut root_key = String::new();
        for root in roots {
            let key = self
                .loader
                .resolve(root, None)
                .ok_or_else(|| CompileError::IncludeNotFound {
                    path: root.to_string(),
                    from: "<command line>".to_string(),
                })?;
            self.load(&mut ctx, &key)?;
            if root_key.is_empty() {
                root_key = key;
            }
        }
        info!(
            files = ctx.files.len(),
            modules = ctx.schema.modules.len(),
            "compiled IDL"
        );
        Ok(Compilation {
            schema: ctx.schema,
            files: ctx.files,
            root: root_key,
        })
    }

    /// Load one file, returning the modules visible to files that include it.
    fn load(&self, ctx: &mut CompileContext, key: &str) -> Result<BTreeSet<String>, CompileError> {
        if let Some(visible) = ctx.done.get(key) {
            debug!(file = key, "already loaded");
            return Ok(visible.clone());
        }
        if let Some(start) = ctx.loading.iter().position(|k| k == key) {
            let mut chain: Vec<String> = ctx.loading.get(start..).unwrap_or_default().to_vec();
            chain.push(key.to_string());
            return Err(CompileError::IncludeCycle { chain });
        }

        let source = self.loader.read(key).map_err(|e| CompileError::Io {
            file: key.to_string(),
            message: e.to_string(),
        })?;
        let ast = parse_idl(&source).map_err(|e| CompileError::Parse {
            file: key.to_string(),
            line: e.pos.line,
            col: e.pos.col,
            message: e.message,
        })?;
        debug!(file = key, modules = ast.modules.len(), "parsed");

        ctx.loading.push(key.to_string());
        let mut visible = BTreeSet::new();
        let mut includes = Vec::with_capacity(ast.includes.len());
        for include in &ast.includes {
            let include_key = self.loader.resolve(&include.path, Some(key)).ok_or_else(|| {
                CompileError::IncludeNotFound {
                    path: include.path.clone(),
                    from: key.to_string(),
                }
            })?;
            visible.extend(self.load(ctx, &include_key)?);
            includes.push(include_key);
        }
        ctx.loading.pop();

        ctx.schema = resolve_file(&ctx.schema, &visible, key, &ast)?;

        let modules: Vec<String> = ast.modules.iter().map(|m| m.name.clone()).collect();
        visible.extend(modules.iter().cloned());
        ctx.done.insert(key.to_string(), visible.clone());
        ctx.files.push(FileUnit {
            key: key.to_string(),
            ast,
            includes,
            modules,
        });
        Ok(visible)
    }
}

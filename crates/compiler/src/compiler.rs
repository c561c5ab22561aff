//! Stylesheet Compiler
//!
//! Compiles an entry stylesheet and everything it imports into one style
//! tree and its encoded form.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use stylec_css::Stylesheet;
use stylec_style::{encode, AttributeRegistry, OrderCounter, SelectorTerm, StyleTree, WireStyleNode};

use crate::classes::ClassExportMap;
use crate::error::{CompileError, CompileResult};
use crate::loader::{normalize, FsLoader, SourceLoader};
use crate::options::CompileOptions;
use crate::preprocess::{PlainCss, Preprocessor};

/// Result of a compile
#[derive(Debug)]
pub struct CompileOutput {
    pub tree: StyleTree,
    pub wire: WireStyleNode,
    /// Encoded `wire`
    pub bytes: Vec<u8>,
    /// Every file read, the entry included
    pub dependencies: BTreeSet<PathBuf>,
    pub class_names: ClassExportMap,
    pub rule_count: usize,
    pub declaration_count: usize,
}

/// State of a single compile
#[derive(Default)]
struct Session {
    tree: StyleTree,
    counter: OrderCounter,
    /// Files currently being compiled, outermost first
    ancestry: Vec<PathBuf>,
    completed: BTreeSet<PathBuf>,
    dependencies: BTreeSet<PathBuf>,
    terms: Vec<SelectorTerm>,
    rule_count: usize,
}

/// Stylesheet compiler. Holds no per-compile state.
pub struct Compiler<L = FsLoader, P = PlainCss> {
    options: CompileOptions,
    registry: AttributeRegistry,
    loader: L,
    preprocessor: P,
}

impl Compiler {
    /// Compiler reading from the filesystem
    pub fn new(options: CompileOptions) -> Self {
        Self::with_loader(options, FsLoader::new())
    }
}

impl<L: SourceLoader> Compiler<L> {
    pub fn with_loader(options: CompileOptions, loader: L) -> Self {
        Self {
            registry: options.registry(),
            options,
            loader,
            preprocessor: PlainCss,
        }
    }
}

impl<L: SourceLoader, P: Preprocessor> Compiler<L, P> {
    pub fn with_preprocessor<Q: Preprocessor>(self, preprocessor: Q) -> Compiler<L, Q> {
        Compiler {
            options: self.options,
            registry: self.registry,
            loader: self.loader,
            preprocessor,
        }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Compile the stylesheet at `entry` and its imports
    pub fn compile(&self, entry: impl AsRef<Path>) -> CompileResult<CompileOutput> {
        let path = self
            .loader
            .canonicalize(Path::new(""), &entry.as_ref().to_string_lossy())?;
        let source = self.loader.load(&path)?;
        self.compile_source(path, source)
    }

    /// Compile in-memory text as if it were the file at `path`. Imports are
    /// still read through the loader.
    pub fn compile_source(&self, path: impl Into<PathBuf>, source: impl Into<String>) -> CompileResult<CompileOutput> {
        let path = self.source_path(path.into());
        log::info!("Compiling {}", path.display());

        let mut session = Session::default();
        self.compile_file(&mut session, path, source.into())?;

        let wire = session.tree.to_wire();
        let bytes = encode(&wire).map_err(CompileError::Encode)?;
        let class_names = ClassExportMap::from_terms(&session.terms, self.options.class_prefix.as_deref());
        let declaration_count = session.tree.declaration_count();

        log::info!(
            "Compiled {} rules ({} declarations) from {} files into {} bytes",
            session.rule_count,
            declaration_count,
            session.dependencies.len(),
            bytes.len()
        );

        Ok(CompileOutput {
            tree: session.tree,
            wire,
            bytes,
            dependencies: session.dependencies,
            class_names,
            rule_count: session.rule_count,
            declaration_count,
        })
    }

    /// Canonical form of an in-memory source's path. Paths the loader
    /// cannot resolve are made absolute and normalized lexically.
    fn source_path(&self, path: PathBuf) -> PathBuf {
        if let Ok(canonical) = self.loader.canonicalize(Path::new(""), &path.to_string_lossy()) {
            return canonical;
        }
        let absolute = if path.is_relative() {
            match std::env::current_dir() {
                Ok(dir) => dir.join(&path),
                Err(_) => path,
            }
        } else {
            path
        };
        normalize(&absolute)
    }

    /// Compile one file: its imports first, in order, then its own rules
    fn compile_file(&self, session: &mut Session, path: PathBuf, source: String) -> CompileResult<()> {
        session.ancestry.push(path.clone());
        session.dependencies.insert(path.clone());

        let preprocessed = self
            .preprocessor
            .preprocess(&path, source)
            .map_err(|message| CompileError::Preprocess { path: path.clone(), message })?;
        session.dependencies.extend(preprocessed.files_read);

        let stylesheet = Stylesheet::parse(&preprocessed.css).map_err(|source| CompileError::Css {
            path: path.clone(),
            source,
        })?;

        for import in &stylesheet.imports {
            let target = self.loader.canonicalize(&path, &import.url)?;

            if session.ancestry.contains(&target) {
                let mut chain = session.ancestry.clone();
                chain.push(target);
                return Err(CompileError::CyclicImport { chain });
            }
            if session.completed.contains(&target) {
                log::debug!("Skipping {}, already compiled", target.display());
                continue;
            }

            log::debug!("Importing {} from {}", target.display(), path.display());
            let text = self.loader.load(&target)?;
            self.compile_file(session, target, text)?;
        }

        for rule in &stylesheet.rules {
            let terms = session
                .tree
                .add_rule(rule, &self.registry, &mut session.counter)
                .map_err(|source| CompileError::Style { path: path.clone(), source })?;
            session.terms.extend(terms);
            session.rule_count += 1;
        }

        session.ancestry.pop();
        session.completed.insert(path);
        Ok(())
    }
}

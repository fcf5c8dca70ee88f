//! Import collection for generated gateway files.

use std::collections::{HashMap, HashSet};

use gwgen_descriptor::{EnumLookup, File, GoPackage, Method};

/// Ordered set of Go packages, keyed by import path.
///
/// The first insertion of an import path wins; later insertions are ignored,
/// which keeps generated import blocks stable across runs. Each package also
/// claims the name it is referenced by; a package whose name is already taken
/// by an earlier import is aliased `<name>_<n>`.
///
/// # Example
///
/// ```
/// use gwgen_codegen::generation::ImportSet;
/// use gwgen_descriptor::GoPackage;
///
/// let mut imports = ImportSet::new();
/// assert!(imports.insert(&GoPackage::from_path("net/http")));
/// assert!(imports.insert(&GoPackage::from_path("context")));
/// assert!(!imports.insert(&GoPackage::from_path("net/http")));
///
/// let paths: Vec<_> = imports.iter().map(|p| p.path.as_str()).collect();
/// assert_eq!(paths, ["net/http", "context"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ImportSet {
    packages: Vec<GoPackage>,
    seen: HashSet<String>,
    /// Referenced name to the import path that claimed it.
    names: HashMap<String, String>,
}

impl ImportSet {
    /// Create a new empty import set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a package unless its import path is already present.
    ///
    /// Returns true if the package was added.
    pub fn insert(&mut self, pkg: &GoPackage) -> bool {
        if !self.seen.insert(pkg.path.clone()) {
            return false;
        }
        let pkg = self.claim_name(pkg);
        self.packages.push(pkg);
        true
    }

    fn claim_name(&mut self, pkg: &GoPackage) -> GoPackage {
        if !self.names.contains_key(pkg.qualifier()) {
            self.names.insert(pkg.qualifier().to_string(), pkg.path.clone());
            return pkg.clone();
        }
        let alias = (1..)
            .map(|n| format!("{}_{}", pkg.name, n))
            .find(|candidate| !self.names.contains_key(candidate))
            .unwrap_or_else(|| pkg.name.clone());
        self.names.insert(alias.clone(), pkg.path.clone());
        pkg.clone().with_alias(alias)
    }

    /// Check if an import path is already present.
    pub fn contains(&self, path: &str) -> bool {
        self.seen.contains(path)
    }

    /// Iterate over packages in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &GoPackage> {
        self.packages.iter()
    }

    /// Packages in insertion order.
    pub fn as_slice(&self) -> &[GoPackage] {
        &self.packages
    }

    /// Consume the set, returning packages in insertion order.
    pub fn into_vec(self) -> Vec<GoPackage> {
        self.packages
    }

    /// Get the number of packages.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// Computes the packages a file's gateway companion must import.
///
/// The result starts with the base imports, then (in standalone mode) the
/// file's own package, then for each method in declaration order the
/// packages of enum-typed path parameters followed by the package of the
/// request message. The file's own package is otherwise never imported.
pub struct ImportCollector<'a> {
    base: &'a [GoPackage],
    standalone: bool,
    lookup: &'a dyn EnumLookup,
}

impl<'a> ImportCollector<'a> {
    /// Create a collector seeded with the always-required packages.
    pub fn new(base: &'a [GoPackage], lookup: &'a dyn EnumLookup) -> Self {
        Self {
            base,
            standalone: false,
            lookup,
        }
    }

    /// Import the file's own package, for code generated outside of it.
    pub fn standalone(mut self, standalone: bool) -> Self {
        self.standalone = standalone;
        self
    }

    /// Collect the imports for `file`.
    pub fn collect(&self, file: &File) -> ImportSet {
        let mut imports = ImportSet::new();
        for pkg in self.base {
            imports.insert(pkg);
        }

        if self.standalone {
            imports.insert(&file.go_package);
        }

        for svc in &file.services {
            for method in &svc.methods {
                self.add_enum_path_param_imports(file, method, &mut imports);

                let pkg = &method.request_type.go_package;
                if method.bindings.is_empty() || *pkg == file.go_package {
                    continue;
                }
                imports.insert(pkg);
            }
        }
        imports
    }

    /// Import the packages declaring enums used as path parameters.
    ///
    /// Parameters whose type is not an enum are skipped.
    fn add_enum_path_param_imports(&self, file: &File, method: &Method, imports: &mut ImportSet) {
        let params = method.bindings.iter().flat_map(|b| &b.path_params);
        for param in params {
            let Some(e) = self.lookup.lookup_enum(param.target.type_name()) else {
                continue;
            };
            if e.go_package == file.go_package {
                continue;
            }
            imports.insert(&e.go_package);
        }
    }
}

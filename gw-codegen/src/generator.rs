//! Generation orchestrator.

use gwgen_descriptor::{EnumLookup, File, GoPackage, Registry, ResponseFile};
use miette::{NamedSource, SourceSpan};

use crate::{
    Error, GeneratorOptions, Result,
    format::GoFormatter,
    generation::ImportCollector,
    language::{FormatError, SourceFormatter, TemplateParams, TemplateRenderer},
    paths::{PathConfig, gateway_file_name},
    template::GatewayTemplate,
};

/// Produces one `.pb.gw.go` companion per target file that has HTTP bindings.
///
/// A run is all-or-nothing: the first render, format or path failure aborts
/// the batch and no partial output is returned.
///
/// # Example
///
/// ```
/// use gwgen_codegen::{Generator, GeneratorOptions};
/// use gwgen_descriptor::Registry;
///
/// let registry: Registry = r#"{
///     "files_to_generate": ["echo.proto"],
///     "files": [{
///         "name": "echo.proto",
///         "package": "example.echo",
///         "go_package": "example.com/echo",
///         "messages": ["EchoRequest"],
///         "services": [{
///             "name": "EchoService",
///             "methods": [{
///                 "name": "Echo",
///                 "request_type": "EchoRequest",
///                 "response_type": "EchoRequest",
///                 "bindings": [{"method": "post", "pattern": "/v1/echo", "body": "*"}]
///             }]
///         }]
///     }]
/// }"#
/// .parse()
/// .unwrap();
///
/// let generator = Generator::from_registry(&registry, GeneratorOptions::default()).unwrap();
/// let files = generator.generate(registry.targets()).unwrap();
///
/// assert_eq!(files.len(), 1);
/// assert_eq!(files[0].name, "example.com/echo/echo.pb.gw.go");
/// ```
pub struct Generator<'a> {
    lookup: &'a dyn EnumLookup,
    options: GeneratorOptions,
    base: Vec<GoPackage>,
    paths: PathConfig,
    renderer: Box<dyn TemplateRenderer + 'a>,
    formatter: Box<dyn SourceFormatter + 'a>,
}

impl<'a> Generator<'a> {
    /// Create a generator with the default template and formatter.
    ///
    /// Fails if the path options conflict, before any file is looked at.
    pub fn new(lookup: &'a dyn EnumLookup, options: GeneratorOptions) -> Result<Self> {
        let paths = options.path_config()?;
        Ok(Self {
            lookup,
            base: options.base_packages(),
            paths,
            options,
            renderer: Box::new(GatewayTemplate::new(lookup)),
            formatter: Box::new(GoFormatter::new()),
        })
    }

    /// Create a generator over a registry, honoring the registry's package doc setting.
    pub fn from_registry(registry: &'a Registry, mut options: GeneratorOptions) -> Result<Self> {
        options.omit_package_doc |= registry.omit_package_doc();
        Self::new(registry, options)
    }

    /// Replace the template renderer.
    pub fn renderer(mut self, renderer: impl TemplateRenderer + 'a) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    /// Replace the source formatter.
    pub fn formatter(mut self, formatter: impl SourceFormatter + 'a) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    /// Generate companions for `targets`, in order.
    ///
    /// Files without any HTTP binding are skipped.
    pub fn generate<'f, I>(&self, targets: I) -> Result<Vec<ResponseFile>>
    where
        I: IntoIterator<Item = &'f File>,
    {
        let mut files = Vec::new();
        for file in targets {
            if !file.has_bindings() {
                tracing::debug!(file = %file.name, "skipping file without HTTP bindings");
                continue;
            }
            files.push(self.generate_file(file)?);
        }

        tracing::info!(generated = files.len(), "gateway generation finished");
        Ok(files)
    }

    fn generate_file(&self, file: &File) -> Result<ResponseFile> {
        let imports = ImportCollector::new(&self.base, self.lookup)
            .standalone(self.options.standalone)
            .collect(file);
        tracing::debug!(file = %file.name, imports = imports.len(), "collected imports");

        let params = TemplateParams {
            file,
            imports: imports.as_slice(),
            use_request_context: self.options.request_context,
            register_func_suffix: &self.options.register_func_suffix,
            allow_patch_feature: self.options.allow_patch_feature,
            standalone: self.options.standalone,
            omit_package_doc: self.options.omit_package_doc,
        };

        let raw = self
            .renderer
            .render(&params)
            .map_err(|source| Error::Render {
                file: file.name.clone(),
                source,
            })?;

        let content = match self.formatter.format(&raw) {
            Ok(content) => content,
            Err(source) => {
                tracing::error!(file = %file.name, line = source.line, "{}", source.message);
                return Err(format_error(file, raw, source));
            }
        };

        let resolved = match self.paths.resolve(file) {
            Ok(resolved) => resolved,
            Err(source) => {
                tracing::error!(file = %file.name, code = %content, "{source}");
                return Err(resolve_error(file, content, source));
            }
        };

        let name = gateway_file_name(&resolved);
        tracing::debug!(file = %file.name, output = %name, "generated gateway file");
        Ok(ResponseFile {
            go_package: file.go_package.clone(),
            name,
            content,
        })
    }
}

fn resolve_error(file: &File, content: String, source: Error) -> Error {
    let span = package_clause(&content).map(SourceSpan::from);
    Error::ResolvePath {
        file: file.name.clone(),
        code: NamedSource::new(&file.name, content),
        span,
        source: Box::new(source),
    }
}

/// Byte range of the first line starting with `package `.
fn package_clause(content: &str) -> Option<(usize, usize)> {
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        if line.starts_with("package ") {
            return Some((offset, line.trim_end().len()));
        }
        offset += line.len();
    }
    None
}

fn format_error(file: &File, raw: String, source: FormatError) -> Error {
    let span = (source.offset < raw.len()).then(|| SourceSpan::from((source.offset, 1)));
    Error::Format {
        file: file.name.clone(),
        code: NamedSource::new(&file.name, raw),
        span,
        source,
    }
}

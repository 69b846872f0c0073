//! Data types used throughout the annotation inspector.
//!
//! This module contains the "model" structs and enums shared by the
//! walker, the resolver, and the inspector: namespace paths, class
//! symbols, `use` imports, parsed annotation tags, and the
//! [`ResolutionResult`] sum type that encodes every resolution outcome.

use std::fmt;

/// The PHP namespace separator.
pub const NS_SEPARATOR: char = '\\';

/// A normalized namespace path such as `\Doctrine\ORM\Mapping`.
///
/// Always starts with `\` and never ends with one.  The global namespace
/// is the lone `\`.  Display keeps the original case; [`NamespacePath::key`]
/// gives the lowercase form used for index lookups, since PHP namespace
/// names are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamespacePath(String);

impl NamespacePath {
    /// The global namespace (`\`).
    pub fn global() -> Self {
        NamespacePath(NS_SEPARATOR.to_string())
    }

    /// Normalize any spelling of a namespace name.
    ///
    /// `Foo\Bar`, `\Foo\Bar\`, and ` \\Foo\\\Bar ` all become `\Foo\Bar`.
    /// Empty input yields the global namespace.
    pub fn parse(raw: &str) -> Self {
        let segments: Vec<&str> = raw
            .trim()
            .split(NS_SEPARATOR)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        if segments.is_empty() {
            return Self::global();
        }

        NamespacePath(format!("{}{}", NS_SEPARATOR, segments.join("\\")))
    }

    pub fn is_global(&self) -> bool {
        self.0.len() == 1
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The namespace without its leading separator (`Foo\Bar`), or an
    /// empty string for the global namespace.
    pub fn trimmed(&self) -> &str {
        &self.0[1..]
    }

    /// Lowercase lookup key.
    pub fn key(&self) -> String {
        self.0.to_lowercase()
    }

    /// Append one child segment.
    pub fn child(&self, name: &str) -> Self {
        if self.is_global() {
            NamespacePath::parse(name)
        } else {
            NamespacePath::parse(&format!("{}\\{}", self.0, name))
        }
    }

    /// The parent namespace, or `None` for the global namespace.
    pub fn parent(&self) -> Option<Self> {
        if self.is_global() {
            return None;
        }
        match self.0.rfind(NS_SEPARATOR) {
            Some(0) | None => Some(Self::global()),
            Some(idx) => Some(NamespacePath(self.0[..idx].to_string())),
        }
    }

    /// The last segment (`Mapping` for `\Doctrine\ORM\Mapping`).
    pub fn last_segment(&self) -> &str {
        short_name(&self.0)
    }

    /// Build the fully-qualified name of a class declared in this namespace.
    pub fn qualify(&self, class_name: &str) -> String {
        if self.is_global() {
            format!("\\{}", class_name)
        } else {
            format!("{}\\{}", self.0, class_name)
        }
    }
}

impl fmt::Display for NamespacePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The last `\`-separated segment of a (possibly qualified) name.
pub fn short_name(name: &str) -> &str {
    name.rsplit(NS_SEPARATOR).next().unwrap_or(name)
}

/// Ensure a class name carries exactly one leading `\`.
pub fn to_fqn(name: &str) -> String {
    format!("\\{}", name.trim_start_matches(NS_SEPARATOR))
}

/// The kind of class-like declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassLikeKind {
    Class,
    Interface,
    Trait,
    Enum,
}

/// A declared class-like entity, as seen by the project index.
///
/// This is an immutable snapshot; the index owns the real declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassSymbol {
    /// Fully-qualified name with a leading `\` (e.g. `\App\Annotation\Foo`).
    pub fqn: String,
    /// Simple name (e.g. `Foo`).
    pub name: String,
    /// The namespace the class is declared in.
    pub namespace: NamespacePath,
    pub kind: ClassLikeKind,
}

impl ClassSymbol {
    pub fn new(namespace: NamespacePath, name: &str, kind: ClassLikeKind) -> Self {
        ClassSymbol {
            fqn: namespace.qualify(name),
            name: name.to_string(),
            namespace,
            kind,
        }
    }

    /// Lowercase FQN, used for deduplication.
    pub fn fqn_key(&self) -> String {
        self.fqn.to_lowercase()
    }
}

/// One class import introduced by a `use` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UseImport {
    /// The short name the import binds: the explicit alias, or the last
    /// segment of the imported name.
    pub alias: String,
    /// The imported name as written, without a leading `\`.
    pub fqn: String,
    /// Byte offset where the enclosing `use` statement ends.
    pub statement_end: u32,
}

/// A byte range inside a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    pub fn contains(&self, offset: u32) -> bool {
        offset >= self.start && offset <= self.end
    }
}

/// A docblock tag considered for annotation resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationTag {
    /// Raw tag name token including the `@` (e.g. `@ORM\Column`).
    pub raw_name: String,
    /// Span of the name token inside the file.
    pub span: Span,
}

impl AnnotationTag {
    pub fn new(raw_name: &str, span: Span) -> Self {
        AnnotationTag {
            raw_name: raw_name.to_string(),
            span,
        }
    }

    /// The tag name without the leading `@` (e.g. `ORM\Column`).
    pub fn name(&self) -> &str {
        self.raw_name.trim_start_matches('@')
    }

    /// First segment, the candidate import alias (`ORM` for `@ORM\Column`).
    pub fn alias_candidate(&self) -> &str {
        self.name().split(NS_SEPARATOR).next().unwrap_or_default()
    }

    /// Last segment, the simple class name searched for (`Column`).
    pub fn terminal_segment(&self) -> &str {
        short_name(self.name())
    }

    /// Whether the name is written with a leading `\` (`@\Foo\Bar`).
    pub fn is_fully_qualified(&self) -> bool {
        self.name().starts_with(NS_SEPARATOR)
    }

    /// Whether the name contains a namespace separator after its first
    /// character (`@ORM\Column`).
    pub fn is_qualified(&self) -> bool {
        self.name().contains(NS_SEPARATOR)
    }
}

/// The outcome of resolving one annotation tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionResult {
    /// The tag's first segment matches an import alias.
    AlreadyImported,
    /// The tag is written fully qualified (`@\Foo\Bar`) and is exempt.
    FullyQualified,
    /// The tag resolves to a class without any new import
    /// (same namespace, or a qualified name the namespace rules reach).
    ResolvedReference(ClassSymbol),
    /// No direct resolution; these allow-listed classes carry the tag's
    /// simple name.  Deduplicated and sorted by FQN.
    Candidates(Vec<ClassSymbol>),
    /// No direct resolution and nothing plausible to import.
    NoCandidates,
}

impl ResolutionResult {
    /// Whether this outcome should be reported as a missing import.
    pub fn is_missing_import(&self) -> bool {
        matches!(
            self,
            ResolutionResult::Candidates(_) | ResolutionResult::NoCandidates
        )
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

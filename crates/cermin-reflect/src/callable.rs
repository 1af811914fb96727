//! Callable descriptors and labeling
//!
//! [`describe_callable`] turns a callable descriptor into the
//! human-readable label used in diagnostics. Pure formatting, no caching.

/// Source position of a closure body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Source file path
    pub file: String,
    /// 1-based line number
    pub line: u32,
}

impl SourceLocation {
    /// Create a source location
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        SourceLocation {
            file: file.into(),
            line,
        }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Descriptor for a function, bound method, or closure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallableDescriptor {
    /// Anonymous closure, optionally with a known source location
    Closure {
        /// Where the closure body lives, if known
        location: Option<SourceLocation>,
    },
    /// Method bound to its declaring class
    Method {
        /// Declaring class name
        class: String,
        /// Method name
        name: String,
    },
    /// Free function
    Function {
        /// Function name
        name: String,
    },
}

impl CallableDescriptor {
    /// Closure with no known source location
    pub fn closure() -> Self {
        CallableDescriptor::Closure { location: None }
    }

    /// Closure at a known source location
    pub fn closure_at(file: impl Into<String>, line: u32) -> Self {
        CallableDescriptor::Closure {
            location: Some(SourceLocation::new(file, line)),
        }
    }

    /// Method bound to a declaring class
    pub fn method(class: impl Into<String>, name: impl Into<String>) -> Self {
        CallableDescriptor::Method {
            class: class.into(),
            name: name.into(),
        }
    }

    /// Free function
    pub fn function(name: impl Into<String>) -> Self {
        CallableDescriptor::Function { name: name.into() }
    }
}

/// Format a human-readable label for a callable.
///
/// - closure with a known location, when `include_location` is set:
///   `Closure [<file>:<line>]`
/// - any other closure: the literal `Closure`
/// - bound method: `<DeclaringClassName>::<MethodName>`
/// - free function: the bare name
pub fn describe_callable(callable: &CallableDescriptor, include_location: bool) -> String {
    match callable {
        CallableDescriptor::Closure {
            location: Some(location),
        } if include_location => format!("Closure [{location}]"),
        CallableDescriptor::Closure { .. } => "Closure".to_string(),
        CallableDescriptor::Method { class, name } => format!("{class}::{name}"),
        CallableDescriptor::Function { name } => name.clone(),
    }
}

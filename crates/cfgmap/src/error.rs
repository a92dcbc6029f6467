//! error taxonomy
//!
//! Every conversion failure is a [ConversionError] attributed to the dotted path it happened at.
//! It is raised where it is detected and travels up unchanged: a single failing field aborts the
//! whole value being built.
use crate::messages::Message;
use crate::value::Value;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    #[error("Invalid path {0:?}")]
    InvalidPath(String),
    #[error("Unsupported mapping key {0}")]
    UnsupportedKey(String),
    #[error("Configuration has no backing file to save to")]
    NoBackingFile,
    #[error("IO error")]
    IoError(#[from] std::io::Error),
    #[error("Unable to parse yaml document")]
    YamlError(#[from] serde_yaml::Error),
}

impl Error {
    /// Kind of the underlying conversion error, if this is one
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Conversion(e) => Some(e.kind()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The raw value could not be converted into the requested type
    TypeConversion,
    /// Shape (scalar, sequence, mapping) or enum symbol does not match the requested type
    UnexpectedType,
    /// An empty sequence gives no evidence of its element type
    EmptyCollectionEvidence,
    /// Nothing is stored at the requested path
    MissingRequiredValue,
}

impl ErrorKind {
    /// `UnexpectedType` and `EmptyCollectionEvidence` are special cases of `TypeConversion`
    pub fn is_type_conversion(&self) -> bool {
        !matches!(self, ErrorKind::MissingRequiredValue)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{}", render(.path, .name, .value, .message))]
pub struct ConversionError {
    kind: ErrorKind,
    /// dotted path of the parent, empty at the root
    path: String,
    /// last path segment
    name: String,
    value: Option<Value>,
    message: String,
}

impl ConversionError {
    /// Split `full_path` into parent path and field name
    pub fn new(
        kind: ErrorKind,
        full_path: &str,
        value: Option<Value>,
        message: impl Into<String>,
    ) -> Self {
        let (path, name) = match full_path.rfind('.') {
            Some(dot) => (&full_path[..dot], &full_path[dot + 1..]),
            None => ("", full_path),
        };

        Self {
            kind,
            path: path.to_string(),
            name: name.to_string(),
            value,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `path.name`, or just the name at the root
    pub fn full_path(&self) -> String {
        if self.path.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.path, self.name)
        }
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

fn render(path: &str, name: &str, value: &Option<Value>, message: &str) -> String {
    let path = if path.is_empty() {
        String::new()
    } else {
        format!("{path}.")
    };
    let value = value
        .as_ref()
        .map_or_else(|| "null".to_string(), Value::to_string);

    Message::ConversionError.format(&[
        ("path", &path),
        ("name", name),
        ("value", &value),
        ("message", message),
    ])
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_path_and_name() {
        let error = ConversionError::new(
            ErrorKind::UnexpectedType,
            "server.listen.port",
            Some(Value::from("http")),
            "expected u16 but received string",
        );

        assert_eq!(error.path(), "server.listen");
        assert_eq!(error.name(), "port");
        assert_eq!(error.full_path(), "server.listen.port");
        assert_eq!(
            error.to_string(),
            r#"Error at server.listen.port (value: "http"): expected u16 but received string"#
        );
    }

    #[test]
    fn root_level_name() {
        let error = ConversionError::new(ErrorKind::MissingRequiredValue, "port", None, "missing");
        assert_eq!(error.path(), "");
        assert_eq!(error.to_string(), "Error at port (value: null): missing");
        assert!(!error.kind().is_type_conversion());
    }

    #[test]
    fn placeholders_inside_values_stay_literal() {
        let error = ConversionError::new(
            ErrorKind::UnexpectedType,
            "p",
            Some(Value::from("%message%")),
            "expected u16 but received string",
        );
        assert_eq!(
            error.to_string(),
            r#"Error at p (value: "%message%"): expected u16 but received string"#
        );
    }
}

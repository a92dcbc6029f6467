//! human readable message templates
//!
//! Templates contain `%key%` placeholders that are replaced by [Message::format].
//! Only the text of errors is built here, never their kind.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// Wraps every conversion error
    ConversionError,
    UnexpectedType,
    NoParser,
    WrongParserOutput,
    TypeMismatch,
    CannotDecipherEmptyArray,
    MissingValue,
    ArrayLength,
    UnknownVariant,
    OutOfRange,
}

impl Message {
    pub fn template(&self) -> &'static str {
        match self {
            Message::ConversionError => "Error at %path%%name% (value: %value%): %message%",
            Message::UnexpectedType => "expected %expected% but received %received%",
            Message::NoParser => "no parser available for type %type%",
            Message::WrongParserOutput => "parser for %parser% did not produce a %type%",
            Message::TypeMismatch => "value is not a %type%",
            Message::CannotDecipherEmptyArray => {
                "cannot decipher the element type of an empty array"
            }
            Message::MissingValue => "no value present",
            Message::ArrayLength => "expected %expected% elements but received %received%",
            Message::UnknownVariant => "expected one of %expected% but received %received%",
            Message::OutOfRange => "value does not fit into %type%",
        }
    }

    /// Render the template, replacing each `%key%` with its value
    ///
    /// Placeholders without a substitution are left untouched. Substituted values are copied
    /// verbatim and never scanned for placeholders themselves.
    pub fn format(&self, substitutions: &[(&str, &str)]) -> String {
        let template = self.template();
        let mut message = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find('%') {
            message.push_str(&rest[..start]);
            let after = &rest[start + 1..];

            let substitution = after.find('%').and_then(|end| {
                substitutions
                    .iter()
                    .find(|(key, _)| *key == &after[..end])
                    .map(|(_, value)| (end, *value))
            });

            match substitution {
                Some((end, value)) => {
                    message.push_str(value);
                    rest = &after[end + 1..];
                }
                None => {
                    message.push('%');
                    rest = after;
                }
            }
        }

        message.push_str(rest);
        message
    }
}

//! Parameter Tokenizer and Validator
//!
//! The raw value of an AT command is a comma-separated list, e.g.
//! `0,"firmware,v2.bin",1,512,0`. A comma is a separator only when an even
//! number of double quotes follows it on the rest of the line, which keeps
//! commas inside a balanced quoted section intact.
//!
//! Each command declares a [`CommandSpec`]: an ordered list of fields with a
//! type and bounds. Tokens are mapped to fields by position, extra tokens are
//! dropped and missing ones are absent. Validation either produces the whole
//! [`Params`] set or a [`ValidationError`], never something in between.

use thiserror::Error;

/// Errors produced while validating command parameters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field had no token
    #[error("'{field}' is required")]
    Missing { field: &'static str },

    /// The token is not a decimal integer
    #[error("'{field}' must be an integer, got '{value}'")]
    NotAnInteger { field: &'static str, value: String },

    /// Integer below its lower bound
    #[error("'{field}' must be at least {min}, got {value}")]
    BelowMinimum {
        field: &'static str,
        value: i64,
        min: i64,
    },

    /// Integer above its upper bound
    #[error("'{field}' must be at most {max}, got {value}")]
    AboveMaximum {
        field: &'static str,
        value: i64,
        max: i64,
    },

    /// String shorter than allowed
    #[error("'{field}' must be at least {min} characters, got {len}")]
    TooShort {
        field: &'static str,
        len: usize,
        min: usize,
    },

    /// String longer than allowed
    #[error("'{field}' must be at most {max} characters, got {len}")]
    TooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    /// A file name that would leave its directory
    #[error("'{field}' must be a relative path inside its directory, got '{value}'")]
    UnsafePath { field: &'static str, value: String },
}

/// Type and bounds of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Decimal integer in `min..=max` (no upper bound when `max` is `None`)
    Integer { min: i64, max: Option<i64> },
    /// String whose length in characters is in `min_len..=max_len`
    Text { min_len: usize, max_len: usize },
}

/// One positional field of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    /// A required integer field.
    pub const fn integer(name: &'static str, min: i64, max: Option<i64>) -> Self {
        Self {
            name,
            kind: FieldKind::Integer { min, max },
            required: true,
        }
    }

    /// A required string field.
    pub const fn text(name: &'static str, min_len: usize, max_len: usize) -> Self {
        Self {
            name,
            kind: FieldKind::Text { min_len, max_len },
            required: true,
        }
    }

    /// Marks the field as optional.
    pub const fn optional(self) -> Self {
        Self {
            required: false,
            ..self
        }
    }

    fn coerce(&self, token: &str) -> Result<Value, ValidationError> {
        match self.kind {
            FieldKind::Integer { min, max } => {
                let value: i64 =
                    token
                        .trim()
                        .parse()
                        .map_err(|_| ValidationError::NotAnInteger {
                            field: self.name,
                            value: token.to_string(),
                        })?;
                if value < min {
                    return Err(ValidationError::BelowMinimum {
                        field: self.name,
                        value,
                        min,
                    });
                }
                if let Some(max) = max {
                    if value > max {
                        return Err(ValidationError::AboveMaximum {
                            field: self.name,
                            value,
                            max,
                        });
                    }
                }
                Ok(Value::Integer(value))
            }
            FieldKind::Text { min_len, max_len } => {
                let len = token.chars().count();
                if len < min_len {
                    return Err(ValidationError::TooShort {
                        field: self.name,
                        len,
                        min: min_len,
                    });
                }
                if len > max_len {
                    return Err(ValidationError::TooLong {
                        field: self.name,
                        len,
                        max: max_len,
                    });
                }
                Ok(Value::Text(unescape(token)))
            }
        }
    }
}

/// The parameter schema of one command.
#[derive(Debug, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl CommandSpec {
    /// Tokenizes `raw_args` and validates the tokens against this schema.
    pub fn validate(&self, raw_args: &str) -> Result<Params, ValidationError> {
        let mut tokens = tokenize(raw_args).into_iter();
        let mut values = Vec::with_capacity(self.fields.len());

        for field in self.fields {
            let value = match tokens.next() {
                Some(token) => Some(field.coerce(token)?),
                None if field.required => {
                    return Err(ValidationError::Missing { field: field.name })
                }
                None => None,
            };
            values.push((field.name, value));
        }

        Ok(Params { values })
    }
}

/// A validated parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(i64),
    Text(String),
}

/// Validated parameters of one command, keyed by field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Params {
    values: Vec<(&'static str, Option<Value>)>,
}

impl Params {
    /// Returns the value of a field, or `None` if it was absent.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(name, _)| *name == field)
            .and_then(|(_, value)| value.as_ref())
    }

    /// Returns an integer field.
    pub fn integer(&self, field: &'static str) -> Result<i64, ValidationError> {
        match self.get(field) {
            Some(Value::Integer(n)) => Ok(*n),
            _ => Err(ValidationError::Missing { field }),
        }
    }

    /// Returns a string field.
    pub fn text(&self, field: &'static str) -> Result<&str, ValidationError> {
        match self.get(field) {
            Some(Value::Text(s)) => Ok(s.as_str()),
            _ => Err(ValidationError::Missing { field }),
        }
    }
}

/// Splits a raw argument string on commas outside quoted sections.
///
/// An empty input yields one empty token.
pub fn tokenize(raw: &str) -> Vec<&str> {
    let mut quotes_ahead = raw.bytes().filter(|&b| b == b'"').count();
    let mut tokens = Vec::new();
    let mut start = 0;

    for (i, b) in raw.bytes().enumerate() {
        match b {
            b'"' => quotes_ahead -= 1,
            b',' if quotes_ahead % 2 == 0 => {
                tokens.push(&raw[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    tokens.push(&raw[start..]);

    tokens
}

/// Strips one level of quoting from every `"<text>"` section.
///
/// `<text>` must be non-empty and quote-free; anything else, such as `""`
/// or a dangling quote, is kept literally.
pub fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(open) = rest.find('"') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('"') {
            Some(close) if close > 0 => {
                out.push_str(&after[..close]);
                rest = &after[close + 1..];
            }
            _ => {
                out.push('"');
                rest = after;
            }
        }
    }
    out.push_str(rest);

    out
}
